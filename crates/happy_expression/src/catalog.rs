//! Literal response texts.
//!
//! Emotion lines are stored without the person prefix; [`emotion_lines`]
//! adds `"{name}, "` when someone is recognized.

use happy_core::{Emotion, IntensityLevel, TriggerCategory};

pub const UNCLEAR_INPUT: &str =
    "I heard you, but I'm not sure how to help. Try saying 'hello' or 'meditate'!";

pub const PERCEPTION_FAILURE: &str = "I had trouble reading you. Could you try again?";

pub const GREETING: &[&str] = &[
    "Hello! I'm Happy, nice to meet you!",
    "Hi there! How are you feeling today?",
    "Hey! I'm here to help you stay mindful!",
];

pub const MEDITATION_START: &[&str] = &[
    "Let's meditate together!",
    "Starting a meditation session. Get comfortable.",
    "Taking time to meditate is always good.",
];

pub const MEDITATION_STOP: &[&str] = &[
    "Meditation complete. Well done!",
    "Nice session. Carry that calm with you.",
];

pub const BREATHING_START: &[&str] = &[
    "Let's do some breathing exercises!",
    "Remember to breathe deeply.",
    "Focus on your breath...",
];

pub const BREATHING_STOP: &[&str] = &[
    "Breathing exercise finished. How do you feel?",
    "Good breathing. Come back any time.",
];

const STRESS_HIGH: &[&str] = &[
    "I understand you're feeling very frustrated. Let's work through this together.",
    "I hear how stressed you are. Let's try some deep breathing.",
    "That sounds really challenging. I'm here to help you calm down.",
];

const STRESS_MEDIUM: &[&str] = &[
    "I can sense your anxiety. Would you like to meditate?",
    "Let's work on reducing that stress together.",
    "Things will get better. Shall we try some calming exercises?",
];

const STRESS_LOW: &[&str] = &[
    "Taking a break sounds like a good idea.",
    "Sometimes things can be overwhelming. Let's take it step by step.",
    "I'm here to help you feel more relaxed.",
];

const CALM_HIGH: &[&str] = &[
    "I can feel your peaceful energy!",
    "This tranquility is wonderful.",
    "You're in such a calm state!",
];

const CALM_MEDIUM: &[&str] = &[
    "That's the spirit! You're doing great.",
    "I can sense you're feeling better.",
    "Let's maintain this peaceful mood.",
];

const CALM_LOW: &[&str] = &[
    "Every small step toward peace counts.",
    "That's a good start to feeling better.",
    "Let's build on this positive feeling.",
];

/// Reply to a scored speech trigger.
pub fn mood(category: TriggerCategory, level: IntensityLevel) -> &'static [&'static str] {
    use IntensityLevel::*;
    use TriggerCategory::*;
    match (category, level) {
        (Stress, High) => STRESS_HIGH,
        (Stress, Medium) => STRESS_MEDIUM,
        (Stress, Low) => STRESS_LOW,
        (Calm, High) => CALM_HIGH,
        (Calm, Medium) => CALM_MEDIUM,
        (Calm, Low) => CALM_LOW,
    }
}

/// Face-emotion lines. Disgust and unknown labels share the default bucket.
pub fn emotion(which: Emotion) -> &'static [&'static str] {
    match which {
        Emotion::Happy => &[
            "I see your smile! It's contagious!",
            "Your happiness brightens the room!",
            "You look pleased today. Wonderful!",
        ],
        Emotion::Sad => &[
            "You seem a bit down. Would a meditation help?",
            "I notice you look sad. Let's do something calming.",
            "When you're feeling blue, breathing exercises can help.",
        ],
        Emotion::Angry => &[
            "I sense some frustration. Let's breathe together.",
            "You seem tense. Would you like to try a calming exercise?",
            "Anger is natural, but let's find your center again.",
        ],
        Emotion::Fear => &[
            "You look concerned. Breathing might help you relax.",
            "I notice you seem worried. Let's find some calm.",
            "When anxiety appears, meditation can create space.",
        ],
        Emotion::Surprise => &[
            "Something surprised you? Let's take a moment to center.",
            "Unexpected things happen! Let's breathe together.",
            "Surprises can be jarring. Would you like to meditate?",
        ],
        Emotion::Neutral => &[
            "Would you like to try a meditation session?",
            "This is a perfect time for mindfulness practice.",
            "How about we do some breathing exercises?",
        ],
        Emotion::Disgust | Emotion::Other => &[
            "I'm here to help you find balance.",
            "Would you like to meditate with me?",
            "Let's practice mindfulness together.",
        ],
    }
}

/// Emotion lines, personalized when a person is known.
pub fn emotion_lines(which: Emotion, person: Option<&str>) -> Vec<String> {
    let prefix = person.map(|name| format!("{name}, ")).unwrap_or_default();
    emotion(which)
        .iter()
        .map(|line| format!("{prefix}{line}"))
        .collect()
}

/// Greetings for someone without an entry in the greeting table.
pub fn generic_greetings(name: &str) -> Vec<String> {
    vec![format!("Hello {name}!"), format!("Nice to see you, {name}!")]
}

pub fn owned(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|s| s.to_string()).collect()
}
