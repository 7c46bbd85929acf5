//! Countdown timer data types and per-timer state transitions.

use crate::error::{Result, SousChefError};
use crate::session::types::{SessionId, StepId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a countdown timer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId(String);

impl TimerId {
    /// Creates a new random timer id.
    pub fn new() -> Self {
        Self(format!("timer-{}", Uuid::new_v4()))
    }

    /// Creates an id from an existing string.
    pub fn from_string(id: String) -> Self {
        Self(id)
    }

    /// Returns the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TimerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TimerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Control action applied to a single timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerControl {
    Start,
    Pause,
    Resume,
    Stop,
    Reset,
}

/// One countdown instance, owned by the timer engine and tagged with the
/// session (and optionally the step) it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CookingTimer {
    pub id: TimerId,
    pub session_id: SessionId,
    pub step_id: Option<StepId>,
    pub name: String,
    /// Fixed at creation, always > 0.
    pub duration_seconds: u32,
    /// Counts down while the timer is active and unpaused; floor 0.
    pub remaining_seconds: u32,
    pub is_active: bool,
    pub is_paused: bool,
    /// Set when a session-wide pause froze this timer, so a session resume
    /// knows to restart it. A timer the user paused individually keeps this
    /// false and stays paused across a session pause/resume cycle.
    pub paused_by_session: bool,
    /// Set once the expiry notification has been emitted.
    pub expired: bool,
    pub created_at: DateTime<Utc>,
}

impl CookingTimer {
    pub(crate) fn new(
        session_id: SessionId,
        step_id: Option<StepId>,
        name: String,
        duration_seconds: u32,
        auto_start: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TimerId::new(),
            session_id,
            step_id,
            name,
            duration_seconds,
            remaining_seconds: duration_seconds,
            is_active: auto_start,
            is_paused: false,
            paused_by_session: false,
            expired: false,
            created_at: now,
        }
    }

    /// Returns true while the timer counts down.
    pub fn is_running(&self) -> bool {
        self.is_active && !self.is_paused
    }

    /// Applies a control action, validating the transition.
    pub(crate) fn apply(&mut self, control: TimerControl) -> Result<()> {
        match control {
            TimerControl::Start => {
                if self.is_active {
                    return Err(SousChefError::invalid_input(format!(
                        "timer {} is already running",
                        self.id
                    )));
                }
                self.is_active = true;
                self.is_paused = false;
                self.paused_by_session = false;
                Ok(())
            }
            TimerControl::Pause => {
                if !self.is_active {
                    return Err(SousChefError::invalid_input(format!(
                        "timer {} is not active",
                        self.id
                    )));
                }
                if self.is_paused {
                    return Err(SousChefError::invalid_input(format!(
                        "timer {} is already paused",
                        self.id
                    )));
                }
                self.is_paused = true;
                self.paused_by_session = false;
                Ok(())
            }
            TimerControl::Resume => {
                if !self.is_active || !self.is_paused {
                    return Err(SousChefError::invalid_input(format!(
                        "timer {} is not paused",
                        self.id
                    )));
                }
                self.is_paused = false;
                self.paused_by_session = false;
                Ok(())
            }
            TimerControl::Stop => {
                self.is_active = false;
                self.is_paused = false;
                self.paused_by_session = false;
                Ok(())
            }
            TimerControl::Reset => {
                self.remaining_seconds = self.duration_seconds;
                self.is_active = false;
                self.is_paused = false;
                self.paused_by_session = false;
                self.expired = false;
                Ok(())
            }
        }
    }

    /// Advances the countdown by one second.
    ///
    /// Returns true exactly once, on the tick where the remaining time
    /// reaches zero. The timer stays active at zero until it is stopped or
    /// reset, so callers can still reference the timer that just expired.
    pub(crate) fn tick(&mut self) -> bool {
        if !self.is_running() || self.expired {
            return false;
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            self.expired = true;
            return true;
        }
        false
    }
}
