//! Countdown timers: registry, tick advancement and expiry events.

pub mod engine;
pub mod types;

pub use engine::{TimerEngine, spawn_ticker};
pub use types::{CookingTimer, TimerControl, TimerId};
