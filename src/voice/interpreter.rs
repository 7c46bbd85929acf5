//! Maps recognized utterances onto typed session actions.
//!
//! The engine consumes already-transcribed text plus a recognition
//! confidence; no audio processing happens here. Matching is substring
//! containment against a locale-keyed phrase table. The table is data,
//! not logic: swap it to support another language.

use crate::defaults;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static SPOKEN_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s*(minutos?|min|segundos?|seg)?").expect("spoken duration regex")
});

/// Typed action derived from recognized speech.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceAction {
    Next,
    Previous,
    Repeat,
    Pause,
    Resume,
    Timer,
    Complete,
    /// No phrase matched, or the recognition confidence was too low.
    /// A normal outcome for the caller to prompt on, never a failure.
    Unrecognized,
}

/// Numeric payload for actions that carry a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceParameters {
    pub seconds: u32,
}

/// A recognized utterance mapped onto an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceCommand {
    /// Normalized (trimmed, lowercased) recognized text.
    pub text: String,
    pub confidence: f32,
    pub action: VoiceAction,
    pub parameters: Option<VoiceParameters>,
}

/// Locale-keyed table of command phrases.
#[derive(Debug, Clone)]
pub struct CommandTable {
    locale: String,
    /// Sorted by descending phrase length so longer phrases match first
    /// ("concluir passo" before "passo").
    entries: Vec<(String, VoiceAction)>,
}

impl CommandTable {
    /// Builds a table from (phrase, action) pairs.
    pub fn new(locale: impl Into<String>, pairs: Vec<(String, VoiceAction)>) -> Self {
        let mut entries = pairs;
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Self {
            locale: locale.into(),
            entries,
        }
    }

    /// Built-in Brazilian Portuguese command phrases.
    pub fn pt_br() -> Self {
        let pairs = [
            ("próximo passo", VoiceAction::Next),
            ("proximo passo", VoiceAction::Next),
            ("próximo", VoiceAction::Next),
            ("proximo", VoiceAction::Next),
            ("avançar", VoiceAction::Next),
            ("avancar", VoiceAction::Next),
            ("passo anterior", VoiceAction::Previous),
            ("anterior", VoiceAction::Previous),
            ("voltar", VoiceAction::Previous),
            ("repetir", VoiceAction::Repeat),
            ("repete", VoiceAction::Repeat),
            ("de novo", VoiceAction::Repeat),
            ("pausar", VoiceAction::Pause),
            ("pausa", VoiceAction::Pause),
            ("continuar", VoiceAction::Resume),
            ("retomar", VoiceAction::Resume),
            ("temporizador", VoiceAction::Timer),
            ("cronômetro", VoiceAction::Timer),
            ("cronometro", VoiceAction::Timer),
            ("timer", VoiceAction::Timer),
            ("concluir passo", VoiceAction::Complete),
            ("concluído", VoiceAction::Complete),
            ("concluido", VoiceAction::Complete),
            ("completar", VoiceAction::Complete),
            ("pronto", VoiceAction::Complete),
            ("feito", VoiceAction::Complete),
        ];
        Self::new(
            defaults::DEFAULT_LOCALE,
            pairs
                .into_iter()
                .map(|(phrase, action)| (phrase.to_string(), action))
                .collect(),
        )
    }

    /// Adds or overrides a phrase, keeping longest-first ordering.
    pub fn with_phrase(mut self, phrase: impl Into<String>, action: VoiceAction) -> Self {
        let phrase = phrase.into().to_lowercase();
        self.entries.retain(|(existing, _)| existing != &phrase);
        self.entries.push((phrase, action));
        self.entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        self
    }

    /// Locale tag this table was built for.
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// First (longest) phrase contained in the utterance, if any.
    fn lookup(&self, text: &str) -> Option<VoiceAction> {
        self.entries
            .iter()
            .find(|(phrase, _)| text.contains(phrase.as_str()))
            .map(|(_, action)| *action)
    }
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::pt_br()
    }
}

/// Interpreter over a command table with a confidence gate.
#[derive(Debug, Clone)]
pub struct VoiceInterpreter {
    table: CommandTable,
    confidence_threshold: f32,
}

impl VoiceInterpreter {
    /// Creates an interpreter with the built-in table and default gate.
    pub fn new() -> Self {
        Self {
            table: CommandTable::pt_br(),
            confidence_threshold: defaults::VOICE_CONFIDENCE_THRESHOLD,
        }
    }

    /// Replaces the phrase table.
    pub fn with_table(mut self, table: CommandTable) -> Self {
        self.table = table;
        self
    }

    /// Replaces the confidence gate.
    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Interprets one recognized utterance.
    ///
    /// Confidence below the gate yields `Unrecognized` regardless of text,
    /// so noisy recognition cannot trigger expensive actions. A timer
    /// command carries its spoken duration in seconds when one can be
    /// parsed; otherwise the caller applies its default duration.
    pub fn interpret(&self, text: &str, confidence: f32) -> VoiceCommand {
        let normalized = text.trim().to_lowercase();

        if confidence < self.confidence_threshold {
            tracing::debug!(
                confidence,
                threshold = self.confidence_threshold,
                "utterance below confidence gate"
            );
            return VoiceCommand {
                text: normalized,
                confidence,
                action: VoiceAction::Unrecognized,
                parameters: None,
            };
        }

        let action = self
            .table
            .lookup(&normalized)
            .unwrap_or(VoiceAction::Unrecognized);
        let parameters = if action == VoiceAction::Timer {
            parse_spoken_duration(&normalized)
        } else {
            None
        };

        VoiceCommand {
            text: normalized,
            confidence,
            action,
            parameters,
        }
    }
}

impl Default for VoiceInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses a leading "<N> [minutos|segundos]" from an utterance. The unit
/// defaults to minutes when omitted.
fn parse_spoken_duration(text: &str) -> Option<VoiceParameters> {
    let capture = SPOKEN_DURATION.captures(text)?;
    let value: u32 = capture.get(1)?.as_str().parse().ok()?;
    if value == 0 {
        return None;
    }
    let unit = capture.get(2).map(|m| m.as_str()).unwrap_or("minutos");
    let seconds = if unit.starts_with("seg") {
        value
    } else {
        value.saturating_mul(60)
    };
    Some(VoiceParameters { seconds })
}
