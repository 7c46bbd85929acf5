//! Core data types for cooking sessions and their steps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a cooking session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Creates a new random session id.
    pub fn new() -> Self {
        Self(format!("session-{}", Uuid::new_v4()))
    }

    /// Creates an id from an existing string (e.g. restored from a store).
    pub fn from_string(id: String) -> Self {
        Self(id)
    }

    /// Returns the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a step within a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepId(String);

impl StepId {
    /// Creates a new random step id.
    pub fn new() -> Self {
        Self(format!("step-{}", Uuid::new_v4()))
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

impl Default for StepId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a cooking session.
///
/// `Completed` and `Abandoned` are terminal. A terminal session only
/// accepts read-state and removal operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Session is running; commands and timer ticks apply normally.
    Active,
    /// Session is frozen; its timers are cascade-paused.
    Paused,
    /// Session finished by the cook.
    Completed,
    /// Session given up before the last step.
    Abandoned,
}

impl SessionStatus {
    /// Returns true for `Completed` and `Abandoned`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Abandoned)
    }
}

/// One instruction unit of a recipe being cooked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CookingStep {
    pub id: StepId,
    /// 1-based position, matching the step's index + 1.
    pub step_number: u32,
    pub instruction: String,
    pub duration_minutes: Option<u32>,
    pub temperature: Option<String>,
    pub ingredients: Vec<String>,
    pub equipment: Vec<String>,
    pub tips: Vec<String>,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl CookingStep {
    /// Builds a step from provider input at the given 0-based position.
    pub fn from_input(index: usize, input: StepInput) -> Self {
        Self {
            id: StepId::new(),
            step_number: index as u32 + 1,
            instruction: input.instruction,
            duration_minutes: input.duration_minutes,
            temperature: input.temperature,
            ingredients: input.ingredients,
            equipment: input.equipment,
            tips: input.tips,
            is_completed: false,
            completed_at: None,
            notes: None,
        }
    }
}

/// Raw step data supplied by the recipe provider when starting a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepInput {
    pub instruction: String,
    pub duration_minutes: Option<u32>,
    pub temperature: Option<String>,
    pub ingredients: Vec<String>,
    pub equipment: Vec<String>,
    pub tips: Vec<String>,
}

impl StepInput {
    /// Creates a step input with only an instruction.
    pub fn new(instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            ..Self::default()
        }
    }
}

/// Request to start a new cooking session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartSession {
    pub recipe_id: String,
    pub recipe_name: String,
    pub servings: u32,
    pub steps: Vec<StepInput>,
    /// Fill in missing step durations, equipment and tips from the step
    /// analyzer when seeding the session.
    pub analyze_steps: bool,
}

impl StartSession {
    /// Creates a start request with analysis enabled.
    pub fn new(
        recipe_id: impl Into<String>,
        recipe_name: impl Into<String>,
        servings: u32,
        steps: Vec<StepInput>,
    ) -> Self {
        Self {
            recipe_id: recipe_id.into(),
            recipe_name: recipe_name.into(),
            servings,
            steps,
            analyze_steps: true,
        }
    }
}

/// One active cooking run through a fixed sequence of steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CookingSession {
    pub id: SessionId,
    pub recipe_id: String,
    pub recipe_name: String,
    pub servings: u32,
    /// Fixed at creation; steps only mutate their completion fields.
    pub steps: Vec<CookingStep>,
    /// Invariant: `current_step_index < steps.len()`, or 0 when empty.
    pub current_step_index: usize,
    pub status: SessionStatus,
    /// Append-only free-text notes.
    pub notes: Vec<String>,
    /// Rating given at completion, 1 to 5.
    pub rating: Option<u8>,
    pub started_at: DateTime<Utc>,
    pub paused_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl CookingSession {
    /// Creates an active session over already-built steps.
    pub(crate) fn new(
        recipe_id: String,
        recipe_name: String,
        servings: u32,
        steps: Vec<CookingStep>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: SessionId::new(),
            recipe_id,
            recipe_name,
            servings,
            steps,
            current_step_index: 0,
            status: SessionStatus::Active,
            notes: Vec::new(),
            rating: None,
            started_at: now,
            paused_at: None,
            completed_at: None,
        }
    }

    /// Returns true while the session is running and not paused.
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Returns true while the session is paused.
    pub fn is_paused(&self) -> bool {
        self.status == SessionStatus::Paused
    }

    /// Returns true once the session completed or was abandoned.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// The step the cook is currently on, if any steps exist.
    pub fn current_step(&self) -> Option<&CookingStep> {
        self.steps.get(self.current_step_index)
    }

    /// Looks up a step by id.
    pub fn step_by_id(&self, id: &StepId) -> Option<&CookingStep> {
        self.steps.iter().find(|s| &s.id == id)
    }

    pub(crate) fn step_by_id_mut(&mut self, id: &StepId) -> Option<&mut CookingStep> {
        self.steps.iter_mut().find(|s| &s.id == id)
    }
}
