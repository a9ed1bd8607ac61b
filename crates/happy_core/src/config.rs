use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HappyConfig {
    pub stress: StressConfig,
    pub throttle: ThrottleConfig,
    pub queue: QueueConfig,
    pub breathing: BreathingConfig,
    pub storage: StorageConfig,
}

impl HappyConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    /// After loading, env var overrides are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: HappyConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        config.validate();
        Ok(config)
    }

    /// Try to load from path; if file doesn't exist, return defaults with env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({:#}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                cfg.validate();
                cfg
            }
        }
    }

    /// Apply environment variable overrides on top of file-based config.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("HAPPY_STORE_PATH") {
            self.storage.path = Some(PathBuf::from(v));
        }
        if let Ok(v) = std::env::var("HAPPY_MESSAGE_DURATION_MS") {
            if let Ok(n) = v.parse() {
                self.queue.default_duration_ms = n;
            }
        }
        if let Ok(v) = std::env::var("HAPPY_ROUTINE_PROBABILITY") {
            if let Ok(p) = v.parse::<f64>() {
                self.throttle.routine_probability = p.clamp(0.0, 1.0);
            }
        }
        if let Ok(v) = std::env::var("HAPPY_BREATHING_PATTERN") {
            self.breathing.default_pattern = v;
        }
    }

    /// Replace values that would break the state machines with safe ones.
    pub fn validate(&mut self) {
        self.stress.validate();
        self.throttle.validate();
    }
}

// ============================================================================
// Sub-configs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StressConfig {
    /// Upper bound of the stress level; reaching it means ANGRY.
    pub max_level: f32,
    /// Seconds in the critical band before one level decays.
    pub cooldown_secs: u64,
    /// Stress removed by finishing a meditation.
    pub meditation_relief: f32,
    /// Stress removed by starting a meditation or breathing exercise.
    pub activity_relief: f32,
    /// Stress added when more than a day passed since the last meditation.
    pub missed_day_penalty: f32,
}

impl StressConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    /// The ceiling must be a positive finite number; anything else falls
    /// back to the default.
    pub fn validate(&mut self) {
        if !(self.max_level.is_finite() && self.max_level > 0.0) {
            let fallback = Self::default().max_level;
            tracing::warn!(
                "Invalid stress max_level {}, using {}",
                self.max_level,
                fallback
            );
            self.max_level = fallback;
        }
    }
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            max_level: 5.0,
            cooldown_secs: 30,
            meditation_relief: 2.0,
            activity_relief: 1.0,
            missed_day_penalty: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    pub new_person_cooldown_ms: u64,
    pub routine_cooldown_ms: u64,
    /// Chance to speak once the routine cooldown has passed.
    pub routine_probability: f64,
    /// Length of the welcome window at session start.
    pub welcome_window_ms: u64,
    pub welcome_probability: f64,
    /// How many recent texts are avoided when picking a new one.
    pub history_size: usize,
    /// Personal greetings keyed by recognized name.
    pub greetings: HashMap<String, Vec<String>>,
}

impl ThrottleConfig {
    pub fn new_person_cooldown(&self) -> Duration {
        Duration::from_millis(self.new_person_cooldown_ms)
    }

    pub fn routine_cooldown(&self) -> Duration {
        Duration::from_millis(self.routine_cooldown_ms)
    }

    pub fn welcome_window(&self) -> Duration {
        Duration::from_millis(self.welcome_window_ms)
    }

    /// Probabilities are clamped into `[0, 1]`; NaN falls back to the default.
    pub fn validate(&mut self) {
        let defaults = Self::default();
        self.routine_probability =
            probability(self.routine_probability, defaults.routine_probability);
        self.welcome_probability =
            probability(self.welcome_probability, defaults.welcome_probability);
    }
}

fn probability(value: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        tracing::warn!("Invalid probability, using {}", fallback);
        fallback
    } else {
        value.clamp(0.0, 1.0)
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            new_person_cooldown_ms: 30_000,
            routine_cooldown_ms: 30_000,
            routine_probability: 0.2,
            welcome_window_ms: 10_000,
            welcome_probability: 0.5,
            history_size: 5,
            greetings: default_greetings(),
        }
    }
}

fn default_greetings() -> HashMap<String, Vec<String>> {
    HashMap::from([
        (
            "John".to_string(),
            vec![
                "Welcome back, John!".to_string(),
                "Great to see you, John!".to_string(),
            ],
        ),
        (
            "Emma".to_string(),
            vec![
                "Hello Emma, nice to see you today!".to_string(),
                "Emma, looking well today!".to_string(),
            ],
        ),
    ])
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// How long a message stays visible unless the caller says otherwise.
    pub default_duration_ms: u64,
}

impl QueueConfig {
    pub fn default_duration(&self) -> Duration {
        Duration::from_millis(self.default_duration_ms)
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            default_duration_ms: 7_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BreathingPatternConfig {
    pub inhale_ms: u64,
    pub hold_ms: u64,
    pub exhale_ms: u64,
}

impl BreathingPatternConfig {
    pub const FOUR_SEVEN_EIGHT: Self = Self {
        inhale_ms: 4_000,
        hold_ms: 7_000,
        exhale_ms: 8_000,
    };

    pub const BOX: Self = Self {
        inhale_ms: 4_000,
        hold_ms: 4_000,
        exhale_ms: 4_000,
    };

    fn builtin(name: &str) -> Option<Self> {
        match name {
            "4-7-8" => Some(Self::FOUR_SEVEN_EIGHT),
            "4-4-4" => Some(Self::BOX),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BreathingConfig {
    /// Render tick while a session runs (about 60 Hz by default).
    pub tick_ms: u64,
    pub default_pattern: String,
    /// Extra or overriding named patterns.
    pub patterns: BTreeMap<String, BreathingPatternConfig>,
}

impl BreathingConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    /// Resolve a pattern by name.
    ///
    /// Unknown names fall back to the default pattern, then to `4-7-8`.
    /// Returns the name actually used.
    pub fn resolve(&self, name: &str) -> (String, BreathingPatternConfig) {
        let lookup = |n: &str| {
            self.patterns
                .get(n)
                .copied()
                .or_else(|| BreathingPatternConfig::builtin(n))
        };
        if let Some(pattern) = lookup(name) {
            return (name.to_string(), pattern);
        }
        tracing::debug!("Unknown breathing pattern '{}', using default", name);
        match lookup(&self.default_pattern) {
            Some(pattern) => (self.default_pattern.clone(), pattern),
            None => ("4-7-8".to_string(), BreathingPatternConfig::FOUR_SEVEN_EIGHT),
        }
    }
}

impl Default for BreathingConfig {
    fn default() -> Self {
        Self {
            tick_ms: 16,
            default_pattern: "4-7-8".to_string(),
            patterns: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file for the last-meditation marker. `None` keeps it in memory.
    pub path: Option<PathBuf>,
}

// ============================================================================
// Tests
// ============================================================================
