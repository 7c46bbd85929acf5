//! Extraction of countdown durations from free-text instructions.

use crate::analyzer::lexicon::{COOKING_VERBS, HEAT_TERMS, PREP_VERBS};
use crate::analyzer::types::TimerCandidate;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static TIME_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s*(horas?|minutos?|segundos?|min|seg|h)\b").expect("time phrase regex")
});

/// Fixed spoken idioms that carry a duration without a numeral.
const TIME_IDIOMS: &[(&str, u32)] = &[("uma hora e meia", 5400), ("meia hora", 1800)];

/// Context window in bytes around a time phrase. The verb governing a
/// duration almost always precedes it ("cozinhe por 10 minutos"), so the
/// lookbehind is wider than the lookahead.
const PRE_WINDOW: usize = 32;
const POST_WINDOW: usize = 16;

/// Extracts every time-bearing phrase from the instruction as a timer
/// candidate, deduplicated by duration (highest confidence wins) and
/// sorted by descending confidence.
pub fn extract_timer_candidates(instruction: &str) -> Vec<TimerCandidate> {
    let text = instruction.to_lowercase();
    let mut by_seconds: HashMap<u32, TimerCandidate> = HashMap::new();

    for capture in TIME_PHRASE.captures_iter(&text) {
        let Some(whole) = capture.get(0) else {
            continue;
        };
        let Some(seconds) = capture
            .get(1)
            .and_then(|value| value.as_str().parse::<u32>().ok())
            .and_then(|value| {
                capture
                    .get(2)
                    .map(|unit| value.saturating_mul(unit_seconds(unit.as_str())))
            })
        else {
            continue;
        };
        if seconds == 0 {
            continue;
        }

        let confidence = context_confidence(&text, whole.start(), whole.end());
        insert_candidate(
            &mut by_seconds,
            TimerCandidate {
                seconds,
                confidence,
                source_phrase: whole.as_str().to_string(),
            },
        );
    }

    for (idiom, seconds) in TIME_IDIOMS {
        if let Some(start) = text.find(idiom) {
            let confidence = context_confidence(&text, start, start + idiom.len());
            insert_candidate(
                &mut by_seconds,
                TimerCandidate {
                    seconds: *seconds,
                    confidence,
                    source_phrase: (*idiom).to_string(),
                },
            );
        }
    }

    let mut candidates: Vec<TimerCandidate> = by_seconds.into_values().collect();
    candidates.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then(a.seconds.cmp(&b.seconds))
    });
    candidates
}

fn unit_seconds(unit: &str) -> u32 {
    if unit.starts_with('h') {
        3600
    } else if unit.starts_with("min") {
        60
    } else {
        1
    }
}

/// Scores a time phrase by the verbs and heat references surrounding it.
fn context_confidence(text: &str, start: usize, end: usize) -> f32 {
    let window = context_window(text, start, end);

    let mut confidence: f32 = 0.5;
    if COOKING_VERBS.iter().any(|verb| window.contains(verb)) {
        confidence += 0.25;
    }
    if PREP_VERBS.iter().any(|verb| window.contains(verb)) {
        confidence -= 0.2;
    }
    if HEAT_TERMS.iter().any(|term| window.contains(term)) {
        confidence += 0.15;
    }
    confidence.clamp(0.05, 0.95)
}

fn context_window(text: &str, start: usize, end: usize) -> &str {
    let mut lo = start.saturating_sub(PRE_WINDOW);
    while lo > 0 && !text.is_char_boundary(lo) {
        lo -= 1;
    }
    let mut hi = (end + POST_WINDOW).min(text.len());
    while hi < text.len() && !text.is_char_boundary(hi) {
        hi += 1;
    }
    &text[lo..hi]
}

fn insert_candidate(by_seconds: &mut HashMap<u32, TimerCandidate>, candidate: TimerCandidate) {
    match by_seconds.get(&candidate.seconds) {
        Some(existing) if existing.confidence >= candidate.confidence => {}
        _ => {
            by_seconds.insert(candidate.seconds, candidate);
        }
    }
}
