//! Trigger scoring for transcribed utterances.
//!
//! Max-intensity wins: within a category the first level (HIGH → LOW) that
//! matches is final. Across categories the heavier match wins and STRESS
//! wins ties.

use crate::lexicon::{IntensityLevel, Lexicon, TriggerCategory};
use serde::{Deserialize, Serialize};

/// Result of scoring one utterance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriggerScore {
    pub category: Option<TriggerCategory>,
    pub level: Option<IntensityLevel>,
    /// Phrase weight (3/2/1) or word weight (2/1/0.5); 0 when nothing matched.
    pub intensity: f32,
}

impl TriggerScore {
    pub fn none() -> Self {
        Self {
            category: None,
            level: None,
            intensity: 0.0,
        }
    }

    pub fn is_match(&self) -> bool {
        self.category.is_some()
    }
}

impl Default for TriggerScore {
    fn default() -> Self {
        Self::none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TriggerScorer {
    lexicon: Lexicon,
}

impl TriggerScorer {
    pub fn new() -> Self {
        Self { lexicon: Lexicon }
    }

    pub fn score(&self, utterance: &str) -> TriggerScore {
        let text = utterance.trim().to_lowercase();
        if text.is_empty() {
            return TriggerScore::none();
        }

        let tokens: Vec<&str> = text
            .split_whitespace()
            .map(|t| t.trim_matches(|c: char| c.is_ascii_punctuation()))
            .filter(|t| !t.is_empty())
            .collect();

        let mut best = TriggerScore::none();
        for category in Lexicon::CATEGORIES {
            if let Some((level, intensity)) = self.best_in_category(category, &text, &tokens) {
                // Strictly greater: an equal CALM weight never displaces STRESS.
                if intensity > best.intensity {
                    best = TriggerScore {
                        category: Some(category),
                        level: Some(level),
                        intensity,
                    };
                }
            }
        }

        if best.is_match() {
            tracing::debug!(
                "Trigger detected: {:?}/{:?} intensity={}",
                best.category,
                best.level,
                best.intensity
            );
        }
        best
    }

    fn best_in_category(
        &self,
        category: TriggerCategory,
        text: &str,
        tokens: &[&str],
    ) -> Option<(IntensityLevel, f32)> {
        for level in IntensityLevel::ALL {
            let entry = self.lexicon.entry(category, level);
            if entry.phrases.iter().any(|p| text.contains(p)) {
                return Some((level, level.phrase_weight()));
            }
            if entry.words.iter().any(|w| tokens.contains(w)) {
                return Some((level, level.word_weight()));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stress_phrase_high() {
        let score = TriggerScorer::new().score("this is terrible");
        assert_eq!(score.category, Some(TriggerCategory::Stress));
        assert_eq!(score.level, Some(IntensityLevel::High));
        assert!((score.intensity - 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_calm_phrase_high() {
        let score = TriggerScorer::new().score("I feel better");
        assert_eq!(score.category, Some(TriggerCategory::Calm));
        assert!((score.intensity - 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_no_match() {
        assert_eq!(TriggerScorer::new().score("hello"), TriggerScore::none());
        assert_eq!(TriggerScorer::new().score("   "), TriggerScore::none());
    }

    #[test]
    fn test_word_channel_weights() {
        let scorer = TriggerScorer::new();
        let high = scorer.score("that was huge");
        assert_eq!(high.level, Some(IntensityLevel::High));
        assert!((high.intensity - 2.0).abs() < f32::EPSILON);

        let low = scorer.score("feeling tired today");
        assert_eq!(low.category, Some(TriggerCategory::Stress));
        assert!((low.intensity - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_words_need_whole_tokens() {
        // "madness" must not match the word "mad"
        assert!(!TriggerScorer::new().score("madness").is_match());
    }

    #[test]
    fn test_token_edge_punctuation_is_ignored() {
        let score = TriggerScorer::new().score("Relax!");
        assert_eq!(score.category, Some(TriggerCategory::Calm));
    }

    #[test]
    fn test_higher_level_is_never_overridden() {
        // "busy" is LOW, "terrible" is HIGH
        let score = TriggerScorer::new().score("busy and terrible");
        assert_eq!(score.level, Some(IntensityLevel::High));
    }

    #[test]
    fn test_stress_wins_equal_weight() {
        // "mad" (stress medium word, 1.0) vs "rest" (calm medium word, 1.0)
        let score = TriggerScorer::new().score("mad rest");
        assert_eq!(score.category, Some(TriggerCategory::Stress));
        assert!((score.intensity - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_heavier_calm_beats_lighter_stress() {
        // "busy" (stress low word, 0.5) vs "i feel better" (calm high phrase, 3.0)
        let score = TriggerScorer::new().score("busy but i feel better");
        assert_eq!(score.category, Some(TriggerCategory::Calm));
    }
}
