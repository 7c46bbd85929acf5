//! souschef - hands-free cooking session engine
//!
//! Drives a live cooking session: step progress, an arbitrary number of
//! independent countdown timers, voice commands interpreted into typed
//! actions, and free-text step analysis. The engine renders nothing and
//! records nothing durably itself; it emits a single outward event stream
//! (state changes plus speak/sound/vibrate requests) for the host app to
//! act on.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod analyzer;
pub mod clock;
pub mod defaults;
pub mod error;
pub mod events;
pub mod session;
pub mod settings;
pub mod store;
pub mod timer;
pub mod voice;

// Core orchestration
pub use session::manager::{SessionManager, VoiceOutcome};
pub use session::navigator::{StepNavigation, navigation};
pub use session::types::{
    CookingSession, CookingStep, SessionId, SessionStatus, StartSession, StepId, StepInput,
};

// Timers
pub use timer::engine::{TimerEngine, spawn_ticker};
pub use timer::types::{CookingTimer, TimerControl, TimerId};

// Voice commands
pub use voice::interpreter::{
    CommandTable, VoiceAction, VoiceCommand, VoiceInterpreter, VoiceParameters,
};

// Step analysis
pub use analyzer::{Difficulty, StepAnalysis, TimerCandidate, analyze_step};

// Events
pub use events::{EngineEvent, EventSender, SoundKind, VibrationPattern, event_channel};

// Error handling
pub use error::{Result, SousChefError};

// Settings and seams
pub use clock::{Clock, SystemClock};
pub use settings::{CookingModeSettings, SharedSettings, shared_settings};
pub use store::{MemorySessionStore, NullSessionStore, SessionStore};
