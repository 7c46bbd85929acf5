//! Cooking sessions: state machine, navigation and orchestration.

pub mod manager;
pub mod navigator;
pub mod types;

pub use manager::{SessionManager, VoiceOutcome};
pub use navigator::{StepNavigation, navigation};
pub use types::{
    CookingSession, CookingStep, SessionId, SessionStatus, StartSession, StepId, StepInput,
};
