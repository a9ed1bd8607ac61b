//! Trigger lexicon: literal phrases and words that signal stress or calm.
//!
//! Each category carries three intensity levels. A level holds a phrase list
//! (substring match) and a word list (whole-token match). All literals are
//! lowercase ASCII; callers lowercase the utterance before matching.

use serde::{Deserialize, Serialize};

/// Emotional direction of a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerCategory {
    Stress,
    Calm,
}

/// Strength bucket of a trigger, ordered from strongest to weakest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntensityLevel {
    High,
    Medium,
    Low,
}

impl IntensityLevel {
    /// Scan order: HIGH first so the strongest match is found first.
    pub const ALL: [IntensityLevel; 3] = [
        IntensityLevel::High,
        IntensityLevel::Medium,
        IntensityLevel::Low,
    ];

    /// Weight when a full phrase matched.
    pub fn phrase_weight(self) -> f32 {
        match self {
            IntensityLevel::High => 3.0,
            IntensityLevel::Medium => 2.0,
            IntensityLevel::Low => 1.0,
        }
    }

    /// Weight when only a single word matched.
    pub fn word_weight(self) -> f32 {
        match self {
            IntensityLevel::High => 2.0,
            IntensityLevel::Medium => 1.0,
            IntensityLevel::Low => 0.5,
        }
    }
}

/// Phrase and word literals for one category at one level.
#[derive(Debug, Clone, Copy)]
pub struct TriggerEntry {
    pub phrases: &'static [&'static str],
    pub words: &'static [&'static str],
}

const STRESS_HIGH: TriggerEntry = TriggerEntry {
    phrases: &[
        "beat the chef",
        "end to end",
        "the only",
        "industry standard",
        "trojan horse",
        "this is terrible",
    ],
    words: &[
        "unlock", "huge", "biggest", "terrible", "idiot", "hook", "killer", "esl", "exciting",
    ],
};

const STRESS_MEDIUM: TriggerEntry = TriggerEntry {
    phrases: &[
        "i am stressed",
        "this is frustrating",
        "i feel overwhelmed",
        "this is annoying",
    ],
    words: &["worried", "anxiety", "stress", "pressure", "mad"],
};

const STRESS_LOW: TriggerEntry = TriggerEntry {
    phrases: &["i need a break", "this is difficult", "i dont like this"],
    words: &["busy", "tired", "overwhelmed", "milan"],
};

const CALM_HIGH: TriggerEntry = TriggerEntry {
    phrases: &[
        "i feel better",
        "this is nice",
        "i am calm now",
        "thank you for helping",
    ],
    words: &["peaceful", "relax", "calm", "tranquil"],
};

const CALM_MEDIUM: TriggerEntry = TriggerEntry {
    phrases: &["lets take a break", "i need to rest", "time to relax"],
    words: &["breathe", "rest", "quiet", "gentle"],
};

const CALM_LOW: TriggerEntry = TriggerEntry {
    phrases: &["this is good", "im feeling okay", "getting better"],
    words: &["happy", "smile", "good", "perfect"],
};

/// Static table mapping `category × level` to literal lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lexicon;

impl Lexicon {
    /// Categories in scan order. STRESS comes first, which is also the tie-break.
    pub const CATEGORIES: [TriggerCategory; 2] = [TriggerCategory::Stress, TriggerCategory::Calm];

    pub fn entry(&self, category: TriggerCategory, level: IntensityLevel) -> &'static TriggerEntry {
        match (category, level) {
            (TriggerCategory::Stress, IntensityLevel::High) => &STRESS_HIGH,
            (TriggerCategory::Stress, IntensityLevel::Medium) => &STRESS_MEDIUM,
            (TriggerCategory::Stress, IntensityLevel::Low) => &STRESS_LOW,
            (TriggerCategory::Calm, IntensityLevel::High) => &CALM_HIGH,
            (TriggerCategory::Calm, IntensityLevel::Medium) => &CALM_MEDIUM,
            (TriggerCategory::Calm, IntensityLevel::Low) => &CALM_LOW,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literals_are_lowercase_ascii() {
        let lexicon = Lexicon;
        for category in Lexicon::CATEGORIES {
            for level in IntensityLevel::ALL {
                let entry = lexicon.entry(category, level);
                for literal in entry.phrases.iter().chain(entry.words.iter()) {
                    assert!(literal.is_ascii(), "{literal} is not ascii");
                    assert_eq!(*literal, literal.to_lowercase());
                }
            }
        }
    }

    #[test]
    fn test_words_are_single_tokens() {
        let lexicon = Lexicon;
        for category in Lexicon::CATEGORIES {
            for level in IntensityLevel::ALL {
                for word in lexicon.entry(category, level).words {
                    assert_eq!(word.split_whitespace().count(), 1, "{word}");
                }
            }
        }
    }

    #[test]
    fn test_weights_descend_with_level() {
        assert!(IntensityLevel::High.phrase_weight() > IntensityLevel::Medium.phrase_weight());
        assert!(IntensityLevel::Medium.phrase_weight() > IntensityLevel::Low.phrase_weight());
        assert!(IntensityLevel::High.word_weight() > IntensityLevel::Medium.word_weight());
        assert!((IntensityLevel::Low.word_weight() - 0.5).abs() < f32::EPSILON);
    }
}
