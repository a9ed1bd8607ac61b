//! Face-channel emotions.
//!
//! Labels arrive as free-form strings from a recognition backend. Unknown
//! labels land in [`Emotion::Other`] instead of failing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Angry,
    Disgust,
    Fear,
    Sad,
    Surprise,
    Happy,
    Neutral,
    /// Default bucket for labels the companion has no table entry for.
    Other,
}

impl Emotion {
    /// Parse a backend label. Never fails.
    pub fn parse(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "angry" | "anger" => Emotion::Angry,
            "disgust" | "disgusted" => Emotion::Disgust,
            "fear" | "fearful" | "scared" => Emotion::Fear,
            "sad" | "sadness" => Emotion::Sad,
            "surprise" | "surprised" => Emotion::Surprise,
            "happy" | "happiness" => Emotion::Happy,
            "neutral" | "" => Emotion::Neutral,
            _ => Emotion::Other,
        }
    }

    /// Signed stress delta applied when this emotion is seen on a face.
    pub fn stress_impact(self) -> f32 {
        match self {
            Emotion::Angry => 3.0,
            Emotion::Disgust => 2.0,
            Emotion::Fear => 2.0,
            Emotion::Sad => 1.0,
            Emotion::Happy => -2.0,
            Emotion::Surprise | Emotion::Neutral | Emotion::Other => 0.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::Angry => "angry",
            Emotion::Disgust => "disgust",
            Emotion::Fear => "fear",
            Emotion::Sad => "sad",
            Emotion::Surprise => "surprise",
            Emotion::Happy => "happy",
            Emotion::Neutral => "neutral",
            Emotion::Other => "other",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recognition result from the face channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceEvent {
    /// Dominant emotion label, if the backend reported one.
    pub emotion: Option<String>,
    /// Recognized person, `None` or `"Unknown"` when not recognized.
    pub person: Option<String>,
    /// Per-label confidence scores.
    pub scores: HashMap<String, f32>,
}

impl FaceEvent {
    pub fn new(emotion: &str, person: Option<&str>) -> Self {
        Self {
            emotion: Some(emotion.to_string()),
            person: person.map(str::to_string),
            scores: HashMap::new(),
        }
    }

    /// Resolve the emotion to react to.
    ///
    /// A present label wins; otherwise the highest finite score; otherwise neutral.
    pub fn dominant_emotion(&self) -> Emotion {
        if let Some(label) = self.emotion.as_deref().filter(|l| !l.trim().is_empty()) {
            return Emotion::parse(label);
        }
        self.scores
            .iter()
            .filter(|(_, v)| v.is_finite())
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(label, _)| Emotion::parse(label))
            .unwrap_or(Emotion::Neutral)
    }

    /// The person, unless missing, blank or the backend's "Unknown" marker.
    pub fn known_person(&self) -> Option<&str> {
        self.person
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty() && !p.eq_ignore_ascii_case("unknown"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_and_unknown_labels() {
        assert_eq!(Emotion::parse("Happy"), Emotion::Happy);
        assert_eq!(Emotion::parse(" fear "), Emotion::Fear);
        assert_eq!(Emotion::parse("contempt"), Emotion::Other);
        assert_eq!(Emotion::parse(""), Emotion::Neutral);
    }

    #[test]
    fn test_stress_impact_table() {
        assert_eq!(Emotion::Angry.stress_impact(), 3.0);
        assert_eq!(Emotion::Happy.stress_impact(), -2.0);
        assert_eq!(Emotion::Other.stress_impact(), 0.0);
    }

    #[test]
    fn test_dominant_emotion_falls_back_to_scores() {
        let mut event = FaceEvent::default();
        assert_eq!(event.dominant_emotion(), Emotion::Neutral);

        event.scores.insert("sad".into(), 0.7);
        event.scores.insert("happy".into(), 0.2);
        event.scores.insert("angry".into(), f32::NAN);
        assert_eq!(event.dominant_emotion(), Emotion::Sad);

        event.emotion = Some("surprise".into());
        assert_eq!(event.dominant_emotion(), Emotion::Surprise);
    }

    #[test]
    fn test_unknown_person_is_not_a_person() {
        assert_eq!(FaceEvent::new("happy", Some("Unknown")).known_person(), None);
        assert_eq!(FaceEvent::new("happy", Some("  ")).known_person(), None);
        assert_eq!(FaceEvent::new("happy", Some("Emma")).known_person(), Some("Emma"));
    }

    #[test]
    fn test_deserialize_backend_payload() {
        let json = r#"{"emotion":"angry","person":"John","scores":{"angry":0.9}}"#;
        let event: FaceEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.dominant_emotion(), Emotion::Angry);
        assert_eq!(event.known_person(), Some("John"));

        let partial: FaceEvent = serde_json::from_str("{}").unwrap();
        assert_eq!(partial.dominant_emotion(), Emotion::Neutral);
    }
}
