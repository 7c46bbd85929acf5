//! Pure step navigation computation.
//!
//! A function of the step count and the current index; never mutates
//! shared state. The session manager rejects out-of-bounds motion before
//! it gets here.

use serde::{Deserialize, Serialize};

/// Navigation legality and progress for a session position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepNavigation {
    pub can_go_next: bool,
    pub can_go_previous: bool,
    /// 1-based "step N of M" convention: on the last step this reads 100.
    pub progress_percent: f32,
}

/// Computes navigation state for `current_index` within `total_steps`.
pub fn navigation(total_steps: usize, current_index: usize) -> StepNavigation {
    let progress_percent = if total_steps == 0 {
        0.0
    } else {
        ((current_index + 1) as f32 / total_steps as f32) * 100.0
    };
    StepNavigation {
        can_go_next: current_index + 1 < total_steps,
        can_go_previous: current_index > 0,
        progress_percent,
    }
}
