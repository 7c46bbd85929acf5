//! Output types of the step analyzer.

use serde::{Deserialize, Serialize};

/// Difficulty classification of one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// One extracted timer duration with its context confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerCandidate {
    pub seconds: u32,
    /// In [0, 1]. Cooking context raises it, preparation context lowers it.
    pub confidence: f32,
    /// The matched time phrase, for display ("10 minutos").
    pub source_phrase: String,
}

/// Derived, recomputable analysis of one instruction string.
///
/// Never authoritative state: always a pure function of the instruction
/// text and the step's ordinal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepAnalysis {
    pub has_timer: bool,
    /// Sorted by descending confidence, deduplicated by duration.
    pub candidates: Vec<TimerCandidate>,
    pub difficulty: Difficulty,
    pub equipment: Vec<String>,
    pub critical_ingredients: Vec<String>,
    /// At most three generated tips.
    pub tips: Vec<String>,
}

impl StepAnalysis {
    /// The most confident timer suggestion, if any.
    pub fn best_candidate(&self) -> Option<&TimerCandidate> {
        self.candidates.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_candidate_is_first() {
        let analysis = StepAnalysis {
            has_timer: true,
            candidates: vec![
                TimerCandidate {
                    seconds: 600,
                    confidence: 0.9,
                    source_phrase: "10 minutos".to_string(),
                },
                TimerCandidate {
                    seconds: 30,
                    confidence: 0.4,
                    source_phrase: "30 segundos".to_string(),
                },
            ],
            difficulty: Difficulty::Easy,
            equipment: vec![],
            critical_ingredients: vec![],
            tips: vec![],
        };
        assert_eq!(analysis.best_candidate().map(|c| c.seconds), Some(600));
    }

    #[test]
    fn test_difficulty_serde_snake_case() {
        let json = serde_json::to_string(&Difficulty::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
    }
}
