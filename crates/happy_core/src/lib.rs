//! # Happy Core
//!
//! Shared vocabulary for the companion's affective response loop:
//!
//! - **Lexicon / Scorer**: which words and phrases move stress up or down
//! - **Emotion**: labels delivered by the face channel, with their stress impact
//! - **Clock / TimerQueue**: explicit time so every timer can run on a virtual clock
//! - **RandomSource**: injectable randomness for message selection and throttling
//! - **KeyValueStore**: the single persisted marker (last meditation date)
//! - **Config**: TOML configuration with environment overrides

pub mod clock;
pub mod config;
pub mod emotion;
pub mod lexicon;
pub mod perception;
pub mod random;
pub mod scorer;
pub mod store;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    BreathingConfig, BreathingPatternConfig, HappyConfig, QueueConfig, StorageConfig,
    StressConfig, ThrottleConfig,
};
pub use emotion::{Emotion, FaceEvent};
pub use lexicon::{IntensityLevel, Lexicon, TriggerCategory, TriggerEntry};
pub use perception::{PerceptionEvent, PerceptionSource};
pub use random::{RandomSource, ScriptedRandom, SeededRandom};
pub use scorer::{TriggerScore, TriggerScorer};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, StoreError, LAST_MEDITATION_KEY};
pub use timer::{TimerKind, TimerQueue, TimerToken};

/// Message priority for direct user commands (meditation, breathing).
pub const PRIORITY_COMMAND: i32 = 3;
/// Message priority for reactive emotion and trigger responses.
pub const PRIORITY_REACTIVE: i32 = 2;
/// Message priority for fallback and unclear-input messages.
pub const PRIORITY_FALLBACK: i32 = 1;
