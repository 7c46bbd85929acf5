//! Session manager: orchestrates cooking sessions, their steps, timers
//! and voice actions, emitting one outward event stream.
//!
//! Each session's command stream is serialized through a per-session lock;
//! distinct sessions never contend. Timer ticks run independently in the
//! timer engine and only meet sessions through the cascading pause/stop
//! hooks.

use crate::analyzer;
use crate::clock::{Clock, SystemClock};
use crate::defaults;
use crate::error::{Result, SousChefError};
use crate::events::{EngineEvent, EventSender, SoundKind, VibrationPattern};
use crate::session::navigator::{StepNavigation, navigation};
use crate::session::types::{
    CookingSession, CookingStep, SessionId, SessionStatus, StartSession, StepId,
};
use crate::settings::{CookingModeSettings, SharedSettings, shared_settings};
use crate::store::SessionStore;
use crate::timer::engine::TimerEngine;
use crate::voice::{VoiceAction, VoiceCommand, VoiceParameters};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

/// Outcome of applying a voice command to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceOutcome {
    /// The action was dispatched as a session command.
    Applied(VoiceAction),
    /// Nothing matched; the caller should surface a help prompt. Reported,
    /// never an error.
    Unrecognized,
}

type SessionRegistry = RwLock<HashMap<SessionId, Arc<Mutex<CookingSession>>>>;
type PendingAdvance = std::sync::Mutex<HashMap<SessionId, tokio::task::JoinHandle<()>>>;

/// Owns every live cooking session and drives all non-timer commands.
pub struct SessionManager {
    sessions: Arc<SessionRegistry>,
    timers: Arc<TimerEngine>,
    settings: SharedSettings,
    events: EventSender,
    clock: Arc<dyn Clock>,
    store: Option<Arc<dyn SessionStore>>,
    /// Pending auto-advance task per session; any command cancels it.
    pending_advance: Arc<PendingAdvance>,
}

impl SessionManager {
    /// Creates a manager emitting on the given event channel.
    pub fn new(settings: CookingModeSettings, events: EventSender) -> Self {
        let settings = shared_settings(settings);
        let timers = Arc::new(TimerEngine::new(settings.clone(), events.clone()));
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            timers,
            settings,
            events,
            clock: Arc::new(SystemClock),
            store: None,
            pending_advance: Arc::new(std::sync::Mutex::new(HashMap::new())),
        }
    }

    /// Sets a custom clock (for deterministic testing). Call before any
    /// sessions or timers exist; the timer engine is rebuilt.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.timers = Arc::new(
            TimerEngine::new(self.settings.clone(), self.events.clone()).with_clock(clock.clone()),
        );
        self.clock = clock;
        self
    }

    /// Backs the manager with a durable session store. Writes are
    /// fire-and-forget; the in-memory registry stays authoritative.
    pub fn with_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// The timer engine owning this manager's timers. Hand it to
    /// `spawn_ticker` to start real-time ticking.
    pub fn timer_engine(&self) -> &Arc<TimerEngine> {
        &self.timers
    }

    /// Snapshot of the current settings.
    pub fn settings(&self) -> CookingModeSettings {
        self.settings_snapshot()
    }

    /// Replaces the settings; later commands see the new values.
    pub fn update_settings(&self, settings: CookingModeSettings) {
        *self.settings.write().expect("settings lock poisoned") = settings;
    }

    /// Starts a session over the given recipe steps.
    ///
    /// Steps are seeded with 1-based numbers and, when enabled, annotated
    /// with analyzer suggestions (missing durations, equipment, tips).
    pub async fn start(&self, request: StartSession) -> Result<CookingSession> {
        if request.steps.is_empty() {
            return Err(SousChefError::invalid_input(
                "a session needs at least one step",
            ));
        }
        if request.servings == 0 {
            return Err(SousChefError::invalid_input("servings must be positive"));
        }

        let annotate = request.analyze_steps && self.settings_snapshot().behavior.analyze_steps;
        let steps = request
            .steps
            .into_iter()
            .enumerate()
            .map(|(index, input)| {
                let mut step = CookingStep::from_input(index, input);
                if annotate {
                    annotate_step(&mut step);
                }
                step
            })
            .collect();

        let session = CookingSession::new(
            request.recipe_id,
            request.recipe_name,
            request.servings,
            steps,
            self.clock.now(),
        );
        let snapshot = session.clone();

        self.sessions
            .write()
            .await
            .insert(session.id.clone(), Arc::new(Mutex::new(session)));

        tracing::info!(
            session = %snapshot.id,
            recipe = %snapshot.recipe_name,
            steps = snapshot.steps.len(),
            "session started"
        );
        self.events.emit(EngineEvent::SessionStarted {
            session_id: snapshot.id.clone(),
            recipe_name: snapshot.recipe_name.clone(),
        });
        self.persist(&snapshot);
        Ok(snapshot)
    }

    /// Moves to the next step. A session already on its last step is left
    /// unchanged; boundary navigation is a no-op, not an error.
    pub async fn advance_step(&self, id: &SessionId) -> Result<CookingSession> {
        self.cancel_pending_advance(id);
        self.shift_step(id, 1).await
    }

    /// Moves to the previous step. No-op on the first step.
    pub async fn retreat_step(&self, id: &SessionId) -> Result<CookingSession> {
        self.cancel_pending_advance(id);
        self.shift_step(id, -1).await
    }

    /// Marks a step complete, with optional notes.
    ///
    /// Completion is one-way: a second call on the same step is a no-op.
    /// When auto-advance is enabled and the completed step is the current
    /// one (and not the last), a delayed advance is scheduled; any other
    /// command for the session cancels it.
    pub async fn mark_step_complete(
        &self,
        id: &SessionId,
        step_id: &StepId,
        notes: Option<String>,
    ) -> Result<CookingSession> {
        self.cancel_pending_advance(id);
        let settings = self.settings_snapshot();
        let now = self.clock.now();

        let entry = self.session_entry(id).await?;
        let mut session = entry.lock().await;
        ensure_commandable(&session)?;

        let Some(step) = session.step_by_id_mut(step_id) else {
            return Err(SousChefError::StepNotFound {
                id: step_id.to_string(),
            });
        };

        let newly_completed = !step.is_completed;
        if newly_completed {
            step.is_completed = true;
            step.completed_at = Some(now);
            if notes.is_some() {
                step.notes = notes;
            }
        }
        let step_number = step.step_number;
        let completed_current = session
            .current_step()
            .map(|current| &current.id == step_id)
            .unwrap_or(false);
        let nav = navigation(session.steps.len(), session.current_step_index);
        let snapshot = session.clone();
        drop(session);

        if newly_completed {
            tracing::debug!(session = %id, step = %step_id, "step completed");
            self.events.emit(EngineEvent::StepCompleted {
                session_id: id.clone(),
                step_id: step_id.clone(),
            });
            self.emit_feedback(
                id,
                SoundKind::StepComplete,
                VibrationPattern::Short,
                Some(format!("Passo {} concluído", step_number)),
            );
            self.persist(&snapshot);

            if settings.behavior.auto_advance_steps && completed_current && nav.can_go_next {
                self.schedule_auto_advance(id.clone(), settings.behavior.auto_advance_delay_ms);
            }
        }
        Ok(snapshot)
    }

    /// Pauses the session and cascades the pause to its timers. Pausing a
    /// paused session is a no-op.
    pub async fn pause(&self, id: &SessionId) -> Result<CookingSession> {
        self.cancel_pending_advance(id);
        let entry = self.session_entry(id).await?;
        let mut session = entry.lock().await;
        ensure_commandable(&session)?;
        if session.is_paused() {
            return Ok(session.clone());
        }

        session.status = SessionStatus::Paused;
        session.paused_at = Some(self.clock.now());
        let snapshot = session.clone();
        drop(session);

        self.timers.pause_session_timers(id).await;
        tracing::info!(session = %id, "session paused");
        self.events.emit(EngineEvent::SessionPaused {
            session_id: id.clone(),
        });
        self.persist(&snapshot);
        Ok(snapshot)
    }

    /// Resumes a paused session, restarting only the timers the session
    /// pause froze. Timers the user paused individually stay paused.
    pub async fn resume(&self, id: &SessionId) -> Result<CookingSession> {
        self.cancel_pending_advance(id);
        let entry = self.session_entry(id).await?;
        let mut session = entry.lock().await;
        ensure_commandable(&session)?;
        if !session.is_paused() {
            return Ok(session.clone());
        }

        session.status = SessionStatus::Active;
        session.paused_at = None;
        let snapshot = session.clone();
        drop(session);

        self.timers.resume_session_timers(id).await;
        tracing::info!(session = %id, "session resumed");
        self.events.emit(EngineEvent::SessionResumed {
            session_id: id.clone(),
        });
        self.persist(&snapshot);
        Ok(snapshot)
    }

    /// Completes the session, optionally recording a rating (1 to 5) and a
    /// final note. All of the session's timers are stopped.
    pub async fn complete(
        &self,
        id: &SessionId,
        rating: Option<u8>,
        notes: Option<String>,
    ) -> Result<CookingSession> {
        if let Some(rating) = rating
            && !(1..=defaults::MAX_RATING).contains(&rating)
        {
            return Err(SousChefError::invalid_input(format!(
                "rating must be between 1 and {}",
                defaults::MAX_RATING
            )));
        }

        let snapshot = self
            .finish(id, SessionStatus::Completed, rating, notes)
            .await?;
        self.events.emit(EngineEvent::SessionCompleted {
            session_id: id.clone(),
        });
        self.emit_feedback(
            id,
            SoundKind::SessionComplete,
            VibrationPattern::Double,
            Some("Parabéns, receita concluída!".to_string()),
        );
        Ok(snapshot)
    }

    /// Abandons the session before its last step. Timers are stopped.
    pub async fn abandon(&self, id: &SessionId) -> Result<CookingSession> {
        let snapshot = self.finish(id, SessionStatus::Abandoned, None, None).await?;
        self.events.emit(EngineEvent::SessionAbandoned {
            session_id: id.clone(),
        });
        Ok(snapshot)
    }

    /// Appends a free-text note to the session.
    pub async fn add_note(&self, id: &SessionId, note: impl Into<String>) -> Result<CookingSession> {
        self.cancel_pending_advance(id);
        let entry = self.session_entry(id).await?;
        let mut session = entry.lock().await;
        ensure_commandable(&session)?;
        session.notes.push(note.into());
        let snapshot = session.clone();
        drop(session);
        self.persist(&snapshot);
        Ok(snapshot)
    }

    /// Applies an interpreted voice command.
    pub async fn apply_voice_command(
        &self,
        id: &SessionId,
        command: &VoiceCommand,
    ) -> Result<VoiceOutcome> {
        self.apply_voice_action(id, command.action, command.parameters)
            .await
    }

    /// Dispatches a typed voice action onto the corresponding operation.
    ///
    /// An unrecognized action is reported (with a spoken help prompt), not
    /// an error.
    pub async fn apply_voice_action(
        &self,
        id: &SessionId,
        action: VoiceAction,
        parameters: Option<VoiceParameters>,
    ) -> Result<VoiceOutcome> {
        tracing::debug!(session = %id, ?action, "voice action");
        match action {
            VoiceAction::Next => {
                self.advance_step(id).await?;
            }
            VoiceAction::Previous => {
                self.retreat_step(id).await?;
            }
            VoiceAction::Repeat => {
                self.cancel_pending_advance(id);
                self.speak_current_instruction(id).await?;
            }
            VoiceAction::Pause => {
                self.pause(id).await?;
            }
            VoiceAction::Resume => {
                self.resume(id).await?;
            }
            VoiceAction::Complete => {
                let step = self.current_step(id).await?;
                self.mark_step_complete(id, &step.id, None).await?;
            }
            VoiceAction::Timer => {
                self.cancel_pending_advance(id);
                let session = self.session(id).await?;
                ensure_commandable(&session)?;
                let seconds = parameters
                    .map(|p| p.seconds)
                    .unwrap_or(self.settings_snapshot().behavior.default_timer_seconds);
                let (step_id, name) = match session.current_step() {
                    Some(step) => (
                        Some(step.id.clone()),
                        format!("Timer do passo {}", step.step_number),
                    ),
                    None => (None, "Timer".to_string()),
                };
                self.timers
                    .create(id.clone(), step_id, name, seconds, true)
                    .await?;
            }
            VoiceAction::Unrecognized => {
                self.events.emit(EngineEvent::Speak {
                    session_id: id.clone(),
                    text: "Não entendi. Diga próximo, anterior, repetir, pausar ou timer."
                        .to_string(),
                });
                return Ok(VoiceOutcome::Unrecognized);
            }
        }
        Ok(VoiceOutcome::Applied(action))
    }

    /// Snapshot of one session.
    pub async fn session(&self, id: &SessionId) -> Result<CookingSession> {
        let entry = self.session_entry(id).await?;
        let session = entry.lock().await;
        Ok(session.clone())
    }

    /// Snapshots of every live session.
    pub async fn sessions(&self) -> Vec<CookingSession> {
        let entries: Vec<Arc<Mutex<CookingSession>>> =
            self.sessions.read().await.values().cloned().collect();
        let mut result = Vec::with_capacity(entries.len());
        for entry in entries {
            result.push(entry.lock().await.clone());
        }
        result
    }

    /// Navigation legality and progress for one session.
    pub async fn navigation(&self, id: &SessionId) -> Result<StepNavigation> {
        let session = self.session(id).await?;
        Ok(navigation(session.steps.len(), session.current_step_index))
    }

    /// The session's current step.
    pub async fn current_step(&self, id: &SessionId) -> Result<CookingStep> {
        let session = self.session(id).await?;
        session
            .current_step()
            .cloned()
            .ok_or_else(|| SousChefError::StepNotFound {
                id: "current".to_string(),
            })
    }

    /// Removes a session and its timers entirely. Allowed in any state,
    /// including terminal ones.
    pub async fn remove_session(&self, id: &SessionId) -> Result<()> {
        self.cancel_pending_advance(id);
        self.sessions
            .write()
            .await
            .remove(id)
            .ok_or_else(|| SousChefError::SessionNotFound {
                id: id.to_string(),
            })?;
        self.timers.remove_session_timers(id).await;

        if let Some(store) = &self.store {
            let store = store.clone();
            let id = id.clone();
            tokio::spawn(async move {
                if let Err(e) = store.remove_session(&id).await {
                    tracing::warn!(session = %id, error = %e, "session store removal failed");
                }
            });
        }
        tracing::info!(session = %id, "session removed");
        Ok(())
    }

    async fn shift_step(&self, id: &SessionId, direction: i64) -> Result<CookingSession> {
        let entry = self.session_entry(id).await?;
        let mut session = entry.lock().await;
        ensure_commandable(&session)?;

        let nav = navigation(session.steps.len(), session.current_step_index);
        let moved = if direction > 0 && nav.can_go_next {
            session.current_step_index += 1;
            true
        } else if direction < 0 && nav.can_go_previous {
            session.current_step_index -= 1;
            true
        } else {
            false
        };
        let snapshot = session.clone();
        drop(session);

        if moved {
            self.events.emit(EngineEvent::StepChanged {
                session_id: id.clone(),
                step_index: snapshot.current_step_index,
                total_steps: snapshot.steps.len(),
            });
            self.persist(&snapshot);
        }
        Ok(snapshot)
    }

    async fn finish(
        &self,
        id: &SessionId,
        status: SessionStatus,
        rating: Option<u8>,
        notes: Option<String>,
    ) -> Result<CookingSession> {
        self.cancel_pending_advance(id);
        let entry = self.session_entry(id).await?;
        let mut session = entry.lock().await;
        if session.is_terminal() {
            return Err(SousChefError::AlreadyTerminated { id: id.to_string() });
        }

        session.status = status;
        session.completed_at = Some(self.clock.now());
        session.paused_at = None;
        session.rating = rating;
        if let Some(note) = notes {
            session.notes.push(note);
        }
        let snapshot = session.clone();
        drop(session);

        self.timers.stop_session_timers(id).await;
        tracing::info!(session = %id, ?status, "session finished");
        self.persist(&snapshot);
        Ok(snapshot)
    }

    async fn speak_current_instruction(&self, id: &SessionId) -> Result<()> {
        let session = self.session(id).await?;
        ensure_commandable(&session)?;
        if let Some(step) = session.current_step() {
            self.events.emit(EngineEvent::Speak {
                session_id: id.clone(),
                text: step.instruction.clone(),
            });
        }
        Ok(())
    }

    /// Schedules the delayed advance that follows a step completion. The
    /// task captures only the registries it needs, so it keeps working
    /// however the host holds the manager.
    fn schedule_auto_advance(&self, id: SessionId, delay_ms: u64) {
        let sessions = self.sessions.clone();
        let events = self.events.clone();
        let store = self.store.clone();
        let pending = self.pending_advance.clone();
        let session_id = id.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            // Drop our own handle first so a later command does not abort
            // an already-finished task.
            pending
                .lock()
                .expect("pending advance lock poisoned")
                .remove(&session_id);
            auto_advance(&sessions, &events, &store, &session_id).await;
        });

        let mut pending = self
            .pending_advance
            .lock()
            .expect("pending advance lock poisoned");
        if let Some(previous) = pending.insert(id, handle) {
            previous.abort();
        }
    }

    fn cancel_pending_advance(&self, id: &SessionId) {
        if let Some(handle) = self
            .pending_advance
            .lock()
            .expect("pending advance lock poisoned")
            .remove(id)
        {
            handle.abort();
        }
    }

    async fn session_entry(&self, id: &SessionId) -> Result<Arc<Mutex<CookingSession>>> {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| SousChefError::SessionNotFound {
                id: id.to_string(),
            })
    }

    fn settings_snapshot(&self) -> CookingModeSettings {
        self.settings.read().expect("settings lock poisoned").clone()
    }

    fn emit_feedback(
        &self,
        session_id: &SessionId,
        sound: SoundKind,
        pattern: VibrationPattern,
        speech: Option<String>,
    ) {
        let settings = self.settings_snapshot();
        if settings.feedback.sound_enabled {
            self.events.emit(EngineEvent::PlaySound { kind: sound });
        }
        if settings.feedback.vibration_enabled {
            self.events.emit(EngineEvent::Vibrate { pattern });
        }
        if settings.feedback.voice_feedback
            && let Some(text) = speech
        {
            self.events.emit(EngineEvent::Speak {
                session_id: session_id.clone(),
                text,
            });
        }
    }

    fn persist(&self, snapshot: &CookingSession) {
        persist_snapshot(&self.store, snapshot);
    }
}

/// Performs the delayed advance scheduled after a step completion.
async fn auto_advance(
    sessions: &SessionRegistry,
    events: &EventSender,
    store: &Option<Arc<dyn SessionStore>>,
    id: &SessionId,
) {
    let Some(entry) = sessions.read().await.get(id).cloned() else {
        return;
    };
    let mut session = entry.lock().await;
    if session.is_terminal() || session.is_paused() {
        return;
    }
    let nav = navigation(session.steps.len(), session.current_step_index);
    if !nav.can_go_next {
        return;
    }
    session.current_step_index += 1;
    let snapshot = session.clone();
    drop(session);

    tracing::debug!(session = %id, step = snapshot.current_step_index, "auto-advanced");
    events.emit(EngineEvent::StepChanged {
        session_id: id.clone(),
        step_index: snapshot.current_step_index,
        total_steps: snapshot.steps.len(),
    });
    persist_snapshot(store, &snapshot);
}

fn persist_snapshot(store: &Option<Arc<dyn SessionStore>>, snapshot: &CookingSession) {
    if let Some(store) = store {
        let store = store.clone();
        let session = snapshot.clone();
        tokio::spawn(async move {
            if let Err(e) = store.save_session(&session).await {
                tracing::warn!(session = %session.id, error = %e, "session store write failed");
            }
        });
    }
}

fn ensure_commandable(session: &CookingSession) -> Result<()> {
    if session.is_terminal() {
        return Err(SousChefError::SessionTerminated {
            id: session.id.to_string(),
        });
    }
    Ok(())
}

/// Fills analyzer suggestions into a freshly seeded step, never replacing
/// provider-supplied data.
fn annotate_step(step: &mut CookingStep) {
    let analysis = analyzer::analyze_step(&step.instruction, step.step_number);
    if step.duration_minutes.is_none()
        && let Some(best) = analysis.best_candidate()
        && best.confidence >= defaults::ANNOTATION_CONFIDENCE
    {
        step.duration_minutes = Some(best.seconds.div_ceil(60));
    }
    if step.equipment.is_empty() {
        step.equipment = analysis.equipment;
    }
    if step.tips.is_empty() {
        step.tips = analysis.tips;
    }
}
