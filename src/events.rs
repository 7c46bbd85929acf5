//! Outward event stream: state changes and side-effect requests.
//!
//! The engine emits every externally visible occurrence on a single
//! channel. State-change events let a UI mirror session progress;
//! side-effect requests (speak, play sound, vibrate) are fire-and-forget
//! instructions for the host's audio/haptics layer. Delivery is
//! non-blocking: when the host stops draining the channel, events are
//! dropped rather than stalling the engine.

use crate::session::types::{SessionId, StepId};
use crate::timer::types::TimerId;
use serde::{Deserialize, Serialize};

/// Sound asset categories the host is asked to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundKind {
    TimerExpired,
    StepComplete,
    SessionComplete,
    Acknowledge,
}

/// Haptic feedback patterns the host is asked to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VibrationPattern {
    Short,
    Double,
    Long,
}

/// Events emitted by the engine for external sinks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    SessionStarted {
        session_id: SessionId,
        recipe_name: String,
    },
    SessionPaused {
        session_id: SessionId,
    },
    SessionResumed {
        session_id: SessionId,
    },
    SessionCompleted {
        session_id: SessionId,
    },
    SessionAbandoned {
        session_id: SessionId,
    },
    StepChanged {
        session_id: SessionId,
        step_index: usize,
        total_steps: usize,
    },
    StepCompleted {
        session_id: SessionId,
        step_id: StepId,
    },
    TimerCreated {
        session_id: SessionId,
        timer_id: TimerId,
        name: String,
        duration_seconds: u32,
    },
    TimerExpired {
        session_id: SessionId,
        timer_id: TimerId,
        name: String,
        duration_seconds: u32,
    },
    /// Ask the host to speak the given text aloud.
    Speak {
        session_id: SessionId,
        text: String,
    },
    /// Ask the host to play a notification sound.
    PlaySound {
        kind: SoundKind,
    },
    /// Ask the host to run a vibration pattern.
    Vibrate {
        pattern: VibrationPattern,
    },
}

impl EngineEvent {
    /// Serialize event to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize event from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// Non-blocking handle for emitting engine events.
///
/// Cloned into every component that produces events. A disabled sender
/// silently discards everything, so embedding the engine without an event
/// consumer stays zero-cost.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: Option<crossbeam_channel::Sender<EngineEvent>>,
}

impl EventSender {
    /// Creates a sender that discards all events.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Wraps a crossbeam sender.
    pub fn new(tx: crossbeam_channel::Sender<EngineEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Emits an event without blocking. Drops the event when the channel
    /// is full or disconnected.
    pub fn emit(&self, event: EngineEvent) {
        if let Some(tx) = &self.tx
            && let Err(e) = tx.try_send(event)
        {
            tracing::warn!("engine event dropped: {}", e);
        }
    }
}

/// Creates a bounded event channel with the default buffer size.
pub fn event_channel() -> (EventSender, crossbeam_channel::Receiver<EngineEvent>) {
    let (tx, rx) = crossbeam_channel::bounded(crate::defaults::EVENT_BUFFER);
    (EventSender::new(tx), rx)
}
