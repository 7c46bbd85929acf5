//! Step analyzer: pure text analysis of recipe instructions.
//!
//! Given one step's instruction text, extracts candidate timer durations,
//! equipment mentions, critical ingredients, a difficulty classification
//! and a handful of tips. Stateless; every result is recomputable from the
//! instruction text and the step ordinal.

pub mod duration;
mod lexicon;
pub mod types;

pub use duration::extract_timer_candidates;
pub use types::{Difficulty, StepAnalysis, TimerCandidate};

use crate::defaults::MAX_TIPS_PER_STEP;
use lexicon::{EQUIPMENT_KEYWORDS, FIRST_STEP_TIP, HARD_TECHNIQUES, MEDIUM_TECHNIQUES, TIP_RULES};
use regex::Regex;
use std::sync::LazyLock;

static INGREDIENT_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:adicione|acrescente|coloque|junte|incorpore|misture|tempere com)\s+([^,.;:!?]+)")
        .expect("ingredient phrase regex")
});

/// Analyzes one instruction. `step_number` is 1-based and only influences
/// ordinal tips (the first step gets a read-the-recipe reminder).
pub fn analyze_step(instruction: &str, step_number: u32) -> StepAnalysis {
    let candidates = extract_timer_candidates(instruction);
    StepAnalysis {
        has_timer: !candidates.is_empty(),
        difficulty: classify_difficulty(instruction),
        equipment: detect_equipment(instruction),
        critical_ingredients: extract_ingredients(instruction),
        tips: generate_tips(instruction, step_number),
        candidates,
    }
}

/// Three-tier lexical difficulty lookup: any hard technique forces `Hard`,
/// two or more medium techniques yield `Medium`, everything else is `Easy`.
pub fn classify_difficulty(instruction: &str) -> Difficulty {
    let text = instruction.to_lowercase();
    if HARD_TECHNIQUES.iter().any(|term| text.contains(term)) {
        return Difficulty::Hard;
    }
    let medium_hits = MEDIUM_TECHNIQUES
        .iter()
        .filter(|term| text.contains(*term))
        .count();
    if medium_hits >= 2 {
        Difficulty::Medium
    } else {
        Difficulty::Easy
    }
}

/// Detects kitchen equipment by keyword, deduplicated. Matched spans are
/// consumed so "panela de pressão" does not also report "panela".
pub fn detect_equipment(instruction: &str) -> Vec<String> {
    let mut text = instruction.to_lowercase();
    let mut found = Vec::new();
    for (keyword, canonical) in EQUIPMENT_KEYWORDS {
        if text.contains(keyword) {
            if !found.iter().any(|name| name == canonical) {
                found.push((*canonical).to_string());
            }
            text = text.replace(keyword, " ");
        }
    }
    found
}

/// Extracts ingredients named by add/place/mix/season-with phrases,
/// deduplicated, with leading articles stripped.
pub fn extract_ingredients(instruction: &str) -> Vec<String> {
    let text = instruction.to_lowercase();
    let mut ingredients: Vec<String> = Vec::new();

    for capture in INGREDIENT_PHRASE.captures_iter(&text) {
        let Some(phrase) = capture.get(1) else {
            continue;
        };
        let trimmed = trim_ingredient(phrase.as_str());
        if !trimmed.is_empty() && !ingredients.iter().any(|existing| existing == &trimmed) {
            ingredients.push(trimmed);
        }
    }

    ingredients
}

/// Cuts an ingredient phrase at trailing process description ("o arroz e
/// refogue por 2 minutos" becomes "arroz") and strips leading articles.
fn trim_ingredient(phrase: &str) -> String {
    let mut result = phrase;
    for boundary in [
        " e ", " até ", " por ", " durante ", " quando ", " em ", " na ", " no ", " nas ", " nos ",
        " ao ", " aos ",
    ] {
        if let Some(index) = result.find(boundary) {
            result = &result[..index];
        }
    }

    let mut words: Vec<&str> = result.split_whitespace().collect();
    while let Some(first) = words.first() {
        if matches!(*first, "o" | "a" | "os" | "as" | "um" | "uma" | "de" | "do" | "da") {
            words.remove(0);
        } else {
            break;
        }
    }
    words.join(" ")
}

/// Generates at most three tips from keyword matches, with an ordinal tip
/// for the first step. Earlier-matched keywords win the limited slots.
pub fn generate_tips(instruction: &str, step_number: u32) -> Vec<String> {
    let text = instruction.to_lowercase();
    let mut tips = Vec::new();

    if step_number == 1 {
        tips.push(FIRST_STEP_TIP.to_string());
    }

    for (keyword, tip) in TIP_RULES {
        if tips.len() >= MAX_TIPS_PER_STEP {
            break;
        }
        if text.contains(keyword) && !tips.iter().any(|existing| existing == tip) {
            tips.push((*tip).to_string());
        }
    }

    tips.truncate(MAX_TIPS_PER_STEP);
    tips
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_step_full_result() {
        let analysis = analyze_step(
            "Adicione o arroz na panela e deixe cozinhar por 10 minutos em fogo baixo",
            2,
        );
        assert!(analysis.has_timer);
        assert_eq!(analysis.best_candidate().map(|c| c.seconds), Some(600));
        assert_eq!(analysis.equipment, vec!["panela".to_string()]);
        assert_eq!(analysis.critical_ingredients, vec!["arroz".to_string()]);
        assert_eq!(analysis.difficulty, Difficulty::Easy);
    }

    #[test]
    fn test_difficulty_hard_single_term() {
        assert_eq!(
            classify_difficulty("Flambe a banana com cachaça"),
            Difficulty::Hard
        );
        assert_eq!(
            classify_difficulty("Emulsione o molho aos poucos"),
            Difficulty::Hard
        );
    }

    #[test]
    fn test_difficulty_medium_needs_two_terms() {
        assert_eq!(
            classify_difficulty("Refogue a cebola e reduza o molho"),
            Difficulty::Medium
        );
        // A single medium technique is still easy
        assert_eq!(classify_difficulty("Refogue a cebola"), Difficulty::Easy);
    }

    #[test]
    fn test_difficulty_defaults_to_easy() {
        assert_eq!(classify_difficulty("Sirva em seguida"), Difficulty::Easy);
    }

    #[test]
    fn test_equipment_detection_dedupes_compounds() {
        let equipment = detect_equipment("Leve a panela de pressão ao fogo");
        assert_eq!(equipment, vec!["panela de pressão".to_string()]);
    }

    #[test]
    fn test_equipment_detects_multiple() {
        let equipment = detect_equipment("Passe da frigideira para a assadeira e leve ao forno");
        assert!(equipment.contains(&"frigideira".to_string()));
        assert!(equipment.contains(&"assadeira".to_string()));
        assert!(equipment.contains(&"forno".to_string()));
    }

    #[test]
    fn test_equipment_absent() {
        assert!(detect_equipment("Misture bem com as mãos").is_empty());
    }

    #[test]
    fn test_ingredient_extraction() {
        let ingredients =
            extract_ingredients("Adicione o arroz e refogue por 2 minutos, tempere com sal");
        assert_eq!(
            ingredients,
            vec!["arroz".to_string(), "sal".to_string()]
        );
    }

    #[test]
    fn test_ingredient_extraction_dedupes() {
        let ingredients = extract_ingredients("Adicione o alho, misture o alho até dourar");
        assert_eq!(ingredients, vec!["alho".to_string()]);
    }

    #[test]
    fn test_first_step_gets_ordinal_tip() {
        let tips = generate_tips("Separe os ingredientes", 1);
        assert_eq!(tips[0], "Leia a receita inteira antes de começar.");
    }

    #[test]
    fn test_later_steps_skip_ordinal_tip() {
        let tips = generate_tips("Separe os ingredientes", 3);
        assert!(tips.is_empty());
    }

    #[test]
    fn test_tips_capped_at_three() {
        let tips = generate_tips(
            "Leve ao forno em fogo alto, tempere com sal, alho e óleo",
            1,
        );
        assert_eq!(tips.len(), 3);
    }

    #[test]
    fn test_tips_keyword_match() {
        let tips = generate_tips("Acerte o sal no final", 2);
        assert_eq!(tips, vec!["Prove antes de corrigir o sal.".to_string()]);
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let text = "Ferva por 5 minutos e tempere com sal";
        assert_eq!(analyze_step(text, 2), analyze_step(text, 2));
    }
}
