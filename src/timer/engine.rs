//! Timer engine: an id-keyed registry of countdown timers advanced by one
//! central tick function.
//!
//! A single ticker task drives `tick()` once per second. Each timer's
//! state transitions are serialized through its own lock, so a `control`
//! call never interleaves with a tick on the same timer, while distinct
//! timers advance independently. Expiry is raised exactly once per timer
//! and the expired timer stays in the registry, active at zero, until the
//! caller stops or resets it.

use crate::clock::{Clock, SystemClock};
use crate::defaults::TICK_INTERVAL_MS;
use crate::error::{Result, SousChefError};
use crate::events::{EngineEvent, EventSender, SoundKind, VibrationPattern};
use crate::session::types::{SessionId, StepId};
use crate::settings::SharedSettings;
use crate::timer::types::{CookingTimer, TimerControl, TimerId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

/// Owns every live countdown timer, independent of session lifecycle
/// except for the cascading pause/stop hooks the session manager calls.
pub struct TimerEngine {
    timers: RwLock<HashMap<TimerId, Arc<Mutex<CookingTimer>>>>,
    settings: SharedSettings,
    events: EventSender,
    clock: Arc<dyn Clock>,
}

impl TimerEngine {
    /// Creates an engine emitting on the given event channel.
    pub fn new(settings: SharedSettings, events: EventSender) -> Self {
        Self {
            timers: RwLock::new(HashMap::new()),
            settings,
            events,
            clock: Arc::new(SystemClock),
        }
    }

    /// Sets a custom clock (for deterministic testing).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Creates a timer for a session, optionally tied to a step.
    pub async fn create(
        &self,
        session_id: SessionId,
        step_id: Option<StepId>,
        name: impl Into<String>,
        duration_seconds: u32,
        auto_start: bool,
    ) -> Result<CookingTimer> {
        if duration_seconds == 0 {
            return Err(SousChefError::invalid_input(
                "timer duration must be positive",
            ));
        }

        let timer = CookingTimer::new(
            session_id.clone(),
            step_id,
            name.into(),
            duration_seconds,
            auto_start,
            self.clock.now(),
        );
        let snapshot = timer.clone();

        self.timers
            .write()
            .await
            .insert(timer.id.clone(), Arc::new(Mutex::new(timer)));

        tracing::debug!(
            timer = %snapshot.id,
            session = %session_id,
            duration_seconds,
            auto_start,
            "timer created"
        );
        self.events.emit(EngineEvent::TimerCreated {
            session_id,
            timer_id: snapshot.id.clone(),
            name: snapshot.name.clone(),
            duration_seconds,
        });

        Ok(snapshot)
    }

    /// Applies a control action to one timer and returns its new snapshot.
    pub async fn control(&self, id: &TimerId, control: TimerControl) -> Result<CookingTimer> {
        let entry = self.entry(id).await?;
        let mut timer = entry.lock().await;
        timer.apply(control)?;
        tracing::debug!(timer = %id, ?control, "timer control applied");
        Ok(timer.clone())
    }

    /// Returns a snapshot of one timer.
    pub async fn get(&self, id: &TimerId) -> Result<CookingTimer> {
        let entry = self.entry(id).await?;
        let timer = entry.lock().await;
        Ok(timer.clone())
    }

    /// Removes a timer from the registry entirely.
    pub async fn remove(&self, id: &TimerId) -> Result<()> {
        self.timers
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| SousChefError::TimerNotFound {
                id: id.to_string(),
            })
    }

    /// Snapshots every timer belonging to a session. The snapshot may be
    /// stale by the time the caller looks at it; ticks keep running.
    pub async fn timers_for_session(&self, session_id: &SessionId) -> Vec<CookingTimer> {
        let entries: Vec<Arc<Mutex<CookingTimer>>> =
            self.timers.read().await.values().cloned().collect();

        let mut result = Vec::new();
        for entry in entries {
            let timer = entry.lock().await;
            if &timer.session_id == session_id {
                result.push(timer.clone());
            }
        }
        result
    }

    /// Advances every active, unpaused timer by one second and emits one
    /// expiry event per timer whose remaining time reaches zero.
    ///
    /// No lock spans the whole registry while decrementing: each timer is
    /// locked individually, so a concurrent `control` call on one timer
    /// never delays the others.
    pub async fn tick(&self) {
        let entries: Vec<Arc<Mutex<CookingTimer>>> =
            self.timers.read().await.values().cloned().collect();

        let mut expired = Vec::new();
        for entry in entries {
            let mut timer = entry.lock().await;
            if timer.tick() {
                expired.push(timer.clone());
            }
        }

        for timer in expired {
            tracing::info!(timer = %timer.id, name = %timer.name, "timer expired");
            self.events.emit(EngineEvent::TimerExpired {
                session_id: timer.session_id.clone(),
                timer_id: timer.id.clone(),
                name: timer.name.clone(),
                duration_seconds: timer.duration_seconds,
            });
            self.emit_expiry_feedback(&timer);
        }
    }

    /// Cascade hook: freezes every running timer of a session, marking it
    /// so the matching resume can tell a session pause apart from a pause
    /// the user issued on the timer itself.
    pub async fn pause_session_timers(&self, session_id: &SessionId) {
        self.for_session(session_id, |timer| {
            if timer.is_running() {
                timer.is_paused = true;
                timer.paused_by_session = true;
            }
        })
        .await;
    }

    /// Cascade hook: resumes only the timers the matching session pause
    /// froze. Timers the user paused individually stay paused.
    pub async fn resume_session_timers(&self, session_id: &SessionId) {
        self.for_session(session_id, |timer| {
            if timer.is_active && timer.is_paused && timer.paused_by_session {
                timer.is_paused = false;
                timer.paused_by_session = false;
            }
        })
        .await;
    }

    /// Cascade hook: stops every timer of a session, cancelling future
    /// ticks immediately.
    pub async fn stop_session_timers(&self, session_id: &SessionId) {
        self.for_session(session_id, |timer| {
            // Stop is valid from any state.
            let _ = timer.apply(TimerControl::Stop);
        })
        .await;
    }

    /// Drops every timer belonging to a removed session.
    pub async fn remove_session_timers(&self, session_id: &SessionId) {
        let mut timers = self.timers.write().await;
        let ids: Vec<TimerId> = timers
            .iter()
            .filter(|(_, entry)| {
                // try_lock never fails here for removal purposes: a locked
                // timer belongs to an in-flight tick or control call and
                // will be dropped when that call releases it.
                entry
                    .try_lock()
                    .map(|timer| &timer.session_id == session_id)
                    .unwrap_or(false)
            })
            .map(|(id, _)| id.clone())
            .collect();
        for id in ids {
            timers.remove(&id);
        }
    }

    async fn entry(&self, id: &TimerId) -> Result<Arc<Mutex<CookingTimer>>> {
        self.timers
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| SousChefError::TimerNotFound {
                id: id.to_string(),
            })
    }

    async fn for_session(&self, session_id: &SessionId, mut apply: impl FnMut(&mut CookingTimer)) {
        let entries: Vec<Arc<Mutex<CookingTimer>>> =
            self.timers.read().await.values().cloned().collect();

        for entry in entries {
            let mut timer = entry.lock().await;
            if &timer.session_id == session_id {
                apply(&mut timer);
            }
        }
    }

    fn emit_expiry_feedback(&self, timer: &CookingTimer) {
        let settings = self
            .settings
            .read()
            .expect("settings lock poisoned")
            .clone();
        if settings.feedback.sound_enabled {
            self.events.emit(EngineEvent::PlaySound {
                kind: SoundKind::TimerExpired,
            });
        }
        if settings.feedback.vibration_enabled {
            self.events.emit(EngineEvent::Vibrate {
                pattern: VibrationPattern::Long,
            });
        }
        if settings.feedback.voice_feedback {
            self.events.emit(EngineEvent::Speak {
                session_id: timer.session_id.clone(),
                text: format!("O timer {} terminou", timer.name),
            });
        }
    }
}

/// Spawns the background task driving `tick()` once per second.
///
/// Holds only a weak reference: dropping the engine stops the ticker.
pub fn spawn_ticker(engine: &Arc<TimerEngine>) -> tokio::task::JoinHandle<()> {
    let weak = Arc::downgrade(engine);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(TICK_INTERVAL_MS));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let Some(engine) = weak.upgrade() else {
                break;
            };
            engine.tick().await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::event_channel;
    use crate::settings::{CookingModeSettings, shared_settings};
    use crossbeam_channel::Receiver;

    fn engine() -> (TimerEngine, Receiver<EngineEvent>) {
        let (events, rx) = event_channel();
        let engine = TimerEngine::new(shared_settings(CookingModeSettings::default()), events);
        (engine, rx)
    }

    fn expiries(rx: &Receiver<EngineEvent>) -> usize {
        rx.try_iter()
            .filter(|event| matches!(event, EngineEvent::TimerExpired { .. }))
            .count()
    }

    #[tokio::test]
    async fn test_create_rejects_zero_duration() {
        let (engine, _rx) = engine();
        let result = engine
            .create(SessionId::new(), None, "Massa", 0, true)
            .await;
        assert!(matches!(
            result,
            Err(SousChefError::InvalidInput { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_timer_is_not_found() {
        let (engine, _rx) = engine();
        let id = TimerId::new();
        assert!(matches!(
            engine.control(&id, TimerControl::Pause).await,
            Err(SousChefError::TimerNotFound { .. })
        ));
        assert!(matches!(
            engine.get(&id).await,
            Err(SousChefError::TimerNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_timer_expires_exactly_once() {
        let (engine, rx) = engine();
        let timer = engine
            .create(SessionId::new(), None, "Ovo", 3, true)
            .await
            .unwrap();

        for _ in 0..3 {
            engine.tick().await;
        }
        let snapshot = engine.get(&timer.id).await.unwrap();
        assert_eq!(snapshot.remaining_seconds, 0);
        assert!(snapshot.is_active, "expired timer stays referenceable");
        assert_eq!(expiries(&rx), 1);

        // One more tick past expiry: no duplicate event.
        engine.tick().await;
        assert_eq!(expiries(&rx), 0);
    }

    #[tokio::test]
    async fn test_expiry_feedback_follows_settings() {
        let (events, rx) = event_channel();
        let settings = shared_settings(CookingModeSettings::default());
        {
            let mut s = settings.write().unwrap();
            s.feedback.sound_enabled = true;
            s.feedback.vibration_enabled = false;
            s.feedback.voice_feedback = false;
        }
        let engine = TimerEngine::new(settings, events);
        engine
            .create(SessionId::new(), None, "Ovo", 1, true)
            .await
            .unwrap();
        engine.tick().await;

        let events: Vec<EngineEvent> = rx.try_iter().collect();
        assert!(events
            .iter()
            .any(|e| matches!(e, EngineEvent::PlaySound { .. })));
        assert!(!events.iter().any(|e| matches!(e, EngineEvent::Vibrate { .. })));
        assert!(!events.iter().any(|e| matches!(e, EngineEvent::Speak { .. })));
    }

    #[tokio::test]
    async fn test_timers_tick_independently() {
        let (engine, rx) = engine();
        let session = SessionId::new();
        let short = engine
            .create(session.clone(), None, "Curto", 2, true)
            .await
            .unwrap();
        let long = engine
            .create(session.clone(), None, "Longo", 10, true)
            .await
            .unwrap();

        engine.tick().await;
        engine.control(&short.id, TimerControl::Pause).await.unwrap();
        engine.tick().await;
        engine.tick().await;

        let short_snapshot = engine.get(&short.id).await.unwrap();
        let long_snapshot = engine.get(&long.id).await.unwrap();
        assert_eq!(short_snapshot.remaining_seconds, 1, "paused timer froze");
        assert_eq!(long_snapshot.remaining_seconds, 7, "other timer kept going");
        assert_eq!(expiries(&rx), 0);
    }

    #[tokio::test]
    async fn test_same_tick_expiry_emits_both() {
        let (engine, rx) = engine();
        let session = SessionId::new();
        engine
            .create(session.clone(), None, "A", 2, true)
            .await
            .unwrap();
        engine.create(session, None, "B", 2, true).await.unwrap();

        engine.tick().await;
        engine.tick().await;
        assert_eq!(expiries(&rx), 2);
    }

    #[tokio::test]
    async fn test_cascade_pause_and_resume_preserve_user_pause() {
        let (engine, _rx) = engine();
        let session = SessionId::new();
        let cascade = engine
            .create(session.clone(), None, "Arroz", 30, true)
            .await
            .unwrap();
        let user_paused = engine
            .create(session.clone(), None, "Feijão", 40, true)
            .await
            .unwrap();

        engine
            .control(&user_paused.id, TimerControl::Pause)
            .await
            .unwrap();
        engine.pause_session_timers(&session).await;

        let all = engine.timers_for_session(&session).await;
        assert!(all.iter().all(|t| t.is_paused));

        engine.resume_session_timers(&session).await;
        let cascade_after = engine.get(&cascade.id).await.unwrap();
        let user_after = engine.get(&user_paused.id).await.unwrap();
        assert!(!cascade_after.is_paused, "cascade-paused timer resumed");
        assert!(user_after.is_paused, "user-paused timer stays paused");
    }

    #[tokio::test]
    async fn test_cascade_pause_keeps_remaining_unchanged() {
        let (engine, _rx) = engine();
        let session = SessionId::new();
        let a = engine
            .create(session.clone(), None, "A", 10, true)
            .await
            .unwrap();
        let b = engine
            .create(session.clone(), None, "B", 20, true)
            .await
            .unwrap();

        engine.tick().await;
        engine.pause_session_timers(&session).await;
        engine.tick().await;
        engine.tick().await;
        engine.resume_session_timers(&session).await;

        assert_eq!(engine.get(&a.id).await.unwrap().remaining_seconds, 9);
        assert_eq!(engine.get(&b.id).await.unwrap().remaining_seconds, 19);
    }

    #[tokio::test]
    async fn test_stop_session_timers_cancels_ticks() {
        let (engine, rx) = engine();
        let session = SessionId::new();
        let timer = engine
            .create(session.clone(), None, "A", 2, true)
            .await
            .unwrap();

        engine.stop_session_timers(&session).await;
        engine.tick().await;
        engine.tick().await;

        let snapshot = engine.get(&timer.id).await.unwrap();
        assert!(!snapshot.is_active);
        assert_eq!(snapshot.remaining_seconds, 2);
        assert_eq!(expiries(&rx), 0);
    }

    #[tokio::test]
    async fn test_reset_rearms_for_reuse() {
        let (engine, rx) = engine();
        let timer = engine
            .create(SessionId::new(), None, "Molho", 2, true)
            .await
            .unwrap();
        engine.tick().await;
        engine.tick().await;
        assert_eq!(expiries(&rx), 1);

        let reset = engine.control(&timer.id, TimerControl::Reset).await.unwrap();
        assert_eq!(reset.remaining_seconds, 2);
        assert!(!reset.is_active);

        engine.control(&timer.id, TimerControl::Start).await.unwrap();
        engine.tick().await;
        engine.tick().await;
        assert_eq!(expiries(&rx), 1, "re-armed timer expires again");
    }

    #[tokio::test]
    async fn test_remove_session_timers() {
        let (engine, _rx) = engine();
        let session = SessionId::new();
        let other = SessionId::new();
        engine
            .create(session.clone(), None, "A", 5, true)
            .await
            .unwrap();
        let kept = engine
            .create(other.clone(), None, "B", 5, true)
            .await
            .unwrap();

        engine.remove_session_timers(&session).await;
        assert!(engine.timers_for_session(&session).await.is_empty());
        assert!(engine.get(&kept.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_autostart_false_waits_for_start() {
        let (engine, _rx) = engine();
        let timer = engine
            .create(SessionId::new(), None, "Manual", 5, false)
            .await
            .unwrap();

        engine.tick().await;
        assert_eq!(engine.get(&timer.id).await.unwrap().remaining_seconds, 5);

        engine.control(&timer.id, TimerControl::Start).await.unwrap();
        engine.tick().await;
        assert_eq!(engine.get(&timer.id).await.unwrap().remaining_seconds, 4);
    }
}
