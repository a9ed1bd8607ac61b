//! The session object.
//!
//! One [`Orchestrator`] owns every component and the timer queue for one
//! companion session. Handlers run to completion: they read the clock once,
//! mutate state, enqueue messages and finally fire whatever timers are due at
//! that instant.

use chrono::{DateTime, Utc};
use happy_core::{
    Clock, FaceEvent, HappyConfig, KeyValueStore, MemoryStore, PerceptionEvent, RandomSource,
    SeededRandom, SystemClock, TimerKind, TimerQueue, TriggerCategory, TriggerScorer,
    LAST_MEDITATION_KEY, PRIORITY_COMMAND, PRIORITY_FALLBACK, PRIORITY_REACTIVE,
};
use happy_expression::{catalog, MessageQueue, ResponseThrottle};
use happy_limbic::{
    BreathingPattern, BreathingPhase, BreathingTimer, Classification, StressMachine,
};
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

const GREETING_WORDS: [&str; 3] = ["hello", "hi", "hey"];

/// Everything the presentation layer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub session_id: Uuid,
    pub visible_message: Option<String>,
    pub stress_level: f32,
    pub classification: Classification,
    pub breathing_phase: BreathingPhase,
    pub breathing_progress: f32,
    pub is_breathing: bool,
    pub is_meditating: bool,
}

/// Injectable collaborators.
pub struct OrchestratorParts {
    pub clock: Box<dyn Clock>,
    pub random: Box<dyn RandomSource>,
    pub store: Box<dyn KeyValueStore>,
}

impl Default for OrchestratorParts {
    fn default() -> Self {
        Self {
            clock: Box::new(SystemClock::new()),
            random: Box::new(SeededRandom::from_entropy()),
            store: Box::new(MemoryStore::new()),
        }
    }
}

pub struct Orchestrator {
    session_id: Uuid,
    span: tracing::Span,
    config: HappyConfig,
    clock: Box<dyn Clock>,
    rng: Box<dyn RandomSource>,
    store: Box<dyn KeyValueStore>,
    timers: TimerQueue<TimerKind>,
    scorer: TriggerScorer,
    stress: StressMachine,
    breathing: BreathingTimer,
    throttle: ResponseThrottle,
    queue: MessageQueue,
    meditating: bool,
}

impl Orchestrator {
    pub fn new(config: HappyConfig) -> Self {
        Self::with_parts(config, OrchestratorParts::default())
    }

    /// Build a session and restore the persisted meditation marker.
    pub fn with_parts(mut config: HappyConfig, parts: OrchestratorParts) -> Self {
        config.validate();
        let session_id = Uuid::new_v4();
        let span = tracing::info_span!("session", id = %session_id);
        let now = parts.clock.now();

        let mut orchestrator = Self {
            session_id,
            span,
            stress: StressMachine::new(config.stress.clone()),
            breathing: BreathingTimer::new(config.breathing.tick()),
            throttle: ResponseThrottle::new(config.throttle.clone(), now),
            queue: MessageQueue::new(config.queue.default_duration()),
            config,
            clock: parts.clock,
            rng: parts.random,
            store: parts.store,
            timers: TimerQueue::new(),
            scorer: TriggerScorer::new(),
            meditating: false,
        };
        orchestrator.restore();
        orchestrator
    }

    fn restore(&mut self) {
        let _guard = self.span.clone().entered();
        let Some(raw) = self.store.get(LAST_MEDITATION_KEY) else {
            return;
        };
        match DateTime::parse_from_rfc3339(&raw) {
            Ok(date) => {
                let now = self.clock.now();
                let wall = self.clock.wall_now();
                self.stress.restore_last_meditation(
                    date.with_timezone(&Utc),
                    wall,
                    &mut self.timers,
                    now,
                );
                tracing::info!("Restored last meditation: {}", raw);
            }
            Err(e) => tracing::warn!("Ignoring unreadable {}: {} ({})", LAST_MEDITATION_KEY, raw, e),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn config(&self) -> &HappyConfig {
        &self.config
    }

    /// Session time according to the injected clock.
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    pub fn is_meditating(&self) -> bool {
        self.meditating
    }

    pub fn last_meditation(&self) -> Option<DateTime<Utc>> {
        self.stress.state().last_meditation
    }

    /// Earliest pending timer, for the event loop to sleep until.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    pub fn snapshot(&self) -> Snapshot {
        let sample = self.breathing.sample(self.clock.now());
        Snapshot {
            session_id: self.session_id,
            visible_message: self.queue.current().map(|m| m.text.clone()),
            stress_level: self.stress.level(),
            classification: self.stress.classification(),
            breathing_phase: sample.phase,
            breathing_progress: sample.progress,
            is_breathing: self.breathing.is_active(),
            is_meditating: self.meditating,
        }
    }

    pub fn handle(&mut self, event: PerceptionEvent) {
        match event {
            PerceptionEvent::Utterance(text) => self.on_utterance(&text),
            PerceptionEvent::Face(face) => self.on_face_emotion(&face),
            PerceptionEvent::Failure(reason) => self.on_perception_failure(&reason),
        }
    }

    /// Transcribed speech.
    ///
    /// Meditation and breathing keywords toggle those activities. Otherwise
    /// the trigger score moves stress and picks a mood reply; a bare greeting
    /// gets a greeting; anything else gets the unclear-input hint.
    pub fn on_utterance(&mut self, text: &str) {
        let _guard = self.span.clone().entered();
        let text = text.trim();
        if text.is_empty() {
            tracing::debug!("Ignoring empty utterance");
            return;
        }
        let lower = text.to_lowercase();
        tracing::debug!("Heard: {}", lower);

        if lower.contains("meditate") || lower.contains("meditation") {
            if self.meditating {
                self.stop_meditation();
            } else {
                self.start_meditation();
            }
            return;
        }
        if lower.contains("breathe") || lower.contains("breathing") {
            if self.breathing.is_active() {
                self.stop_breathing();
            } else {
                let pattern = self.config.breathing.default_pattern.clone();
                self.start_breathing(&pattern);
            }
            return;
        }

        let now = self.clock.now();
        let score = self.scorer.score(&lower);
        match (score.category, score.level) {
            (Some(category), Some(level)) => {
                match category {
                    TriggerCategory::Stress => {
                        self.stress.increase(score.intensity, &mut self.timers, now)
                    }
                    TriggerCategory::Calm => {
                        self.stress.decrease(score.intensity, &mut self.timers, now)
                    }
                };
                tracing::info!(
                    "Trigger {:?}/{:?} (weight {}), stress now {:.1}",
                    category,
                    level,
                    score.intensity,
                    self.stress.level()
                );
                self.say(catalog::mood(category, level), PRIORITY_REACTIVE, now);
            }
            _ if is_greeting(&lower) => {
                self.say(catalog::GREETING, PRIORITY_REACTIVE, now);
            }
            _ => {
                self.enqueue(catalog::UNCLEAR_INPUT, PRIORITY_FALLBACK, now);
            }
        }
        self.pump(now);
    }

    /// Face recognition result: adjust stress, then maybe say something.
    pub fn on_face_emotion(&mut self, event: &FaceEvent) {
        let _guard = self.span.clone().entered();
        let now = self.clock.now();
        let emotion = event.dominant_emotion();
        let person = event.known_person();

        let impact = emotion.stress_impact();
        if impact != 0.0 {
            self.stress.adjust(impact, &mut self.timers, now);
        }
        tracing::debug!(
            "Face: {} (person {:?}), stress {:.1}",
            emotion,
            person,
            self.stress.level()
        );

        if let Some(text) = self.throttle.respond(emotion, person, now, self.rng.as_mut()) {
            self.enqueue(&text, PRIORITY_REACTIVE, now);
        }
        self.pump(now);
    }

    /// The recognition backend failed. Only a fallback message is queued.
    pub fn on_perception_failure(&mut self, reason: &str) {
        let _guard = self.span.clone().entered();
        tracing::warn!("Perception failed: {}", reason);
        let now = self.clock.now();
        self.enqueue(catalog::PERCEPTION_FAILURE, PRIORITY_FALLBACK, now);
        self.pump(now);
    }

    pub fn start_meditation(&mut self) {
        let _guard = self.span.clone().entered();
        if self.meditating {
            tracing::debug!("Meditation already running");
            return;
        }
        let now = self.clock.now();
        self.meditating = true;
        self.stress
            .decrease(self.config.stress.activity_relief, &mut self.timers, now);
        tracing::info!("Meditation started");
        self.say(catalog::MEDITATION_START, PRIORITY_COMMAND, now);
        self.pump(now);
    }

    /// Finish meditating: record today, ease stress and persist the marker.
    pub fn stop_meditation(&mut self) {
        let _guard = self.span.clone().entered();
        if !self.meditating {
            tracing::debug!("No meditation to stop");
            return;
        }
        let now = self.clock.now();
        let wall = self.clock.wall_now();
        self.meditating = false;
        self.stress.record_meditation(wall, &mut self.timers, now);
        if let Err(e) = self.store.set(LAST_MEDITATION_KEY, &wall.to_rfc3339()) {
            tracing::warn!("Failed to persist last meditation: {}", e);
        }
        tracing::info!("Meditation finished");
        self.say(catalog::MEDITATION_STOP, PRIORITY_COMMAND, now);
        self.pump(now);
    }

    /// Start (or restart) a breathing exercise. Unknown names use the default pattern.
    pub fn start_breathing(&mut self, pattern_name: &str) {
        let _guard = self.span.clone().entered();
        let now = self.clock.now();
        let (name, pattern) = self.config.breathing.resolve(pattern_name);
        let restarting = self.breathing.is_active();
        self.breathing
            .start(&name, BreathingPattern::from(pattern), &mut self.timers, now);
        // Relief only for a fresh exercise, not a restart.
        if !restarting {
            self.stress
                .decrease(self.config.stress.activity_relief, &mut self.timers, now);
        }
        self.say(catalog::BREATHING_START, PRIORITY_COMMAND, now);
        self.pump(now);
    }

    pub fn stop_breathing(&mut self) {
        let _guard = self.span.clone().entered();
        if !self.breathing.stop(&mut self.timers) {
            tracing::debug!("No breathing session to stop");
            return;
        }
        let now = self.clock.now();
        self.say(catalog::BREATHING_STOP, PRIORITY_COMMAND, now);
        self.pump(now);
    }

    /// Drop the visible message and everything waiting behind it.
    pub fn clear_messages(&mut self) {
        let _guard = self.span.clone().entered();
        self.queue.clear(&mut self.timers);
    }

    /// Fire every timer due at the current clock time.
    pub fn tick(&mut self) {
        let _guard = self.span.clone().entered();
        let now = self.clock.now();
        self.pump(now);
    }

    fn pump(&mut self, now: Duration) {
        while let Some((token, kind)) = self.timers.pop_due(now) {
            match kind {
                TimerKind::StressCooldown => {
                    self.stress.on_cooldown_elapsed(token, &mut self.timers, now);
                }
                TimerKind::MessageExpiry => {
                    self.queue.on_expired(token, &mut self.timers, now);
                }
                TimerKind::BreathingTick => {
                    self.breathing.on_tick(token, &mut self.timers, now);
                }
            }
        }
    }

    /// Pick one line avoiding recent repeats and queue it.
    fn say(&mut self, lines: &[&str], priority: i32, now: Duration) {
        let candidates = catalog::owned(lines);
        if let Some(text) = self.throttle.choose(&candidates, self.rng.as_mut()) {
            self.enqueue(&text, priority, now);
        }
    }

    fn enqueue(&mut self, text: &str, priority: i32, now: Duration) {
        self.queue
            .enqueue(text, priority, None, &mut self.timers, now);
    }
}

fn is_greeting(lower: &str) -> bool {
    lower
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()))
        .any(|t| GREETING_WORDS.contains(&t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use happy_core::{ManualClock, ScriptedRandom};

    fn session() -> (Orchestrator, ManualClock) {
        let clock = ManualClock::new();
        let orchestrator = Orchestrator::with_parts(
            HappyConfig::default(),
            OrchestratorParts {
                clock: Box::new(clock.clone()),
                random: Box::new(ScriptedRandom::constant(0.0)),
                store: Box::new(MemoryStore::new()),
            },
        );
        (orchestrator, clock)
    }

    #[test]
    fn test_greeting_detection() {
        assert!(is_greeting("hello there"));
        assert!(is_greeting("well, hi!"));
        assert!(!is_greeting("this is high"));
    }

    #[test]
    fn test_empty_utterance_is_noop() {
        let (mut o, _clock) = session();
        o.on_utterance("   ");
        assert_eq!(o.snapshot().visible_message, None);
        assert!(o.next_deadline().is_none());
    }

    #[test]
    fn test_stress_trigger_shows_mood_reply() {
        let (mut o, _clock) = session();
        o.on_utterance("This is terrible");
        let snap = o.snapshot();
        assert_eq!(snap.stress_level, 3.0);
        let visible = snap.visible_message.unwrap();
        assert!(catalog::mood(TriggerCategory::Stress, happy_core::IntensityLevel::High)
            .contains(&visible.as_str()));
    }

    #[test]
    fn test_unclear_input_fallback() {
        let (mut o, _clock) = session();
        o.on_utterance("the weather report");
        assert_eq!(o.snapshot().visible_message.as_deref(), Some(catalog::UNCLEAR_INPUT));
    }

    #[test]
    fn test_failure_touches_no_stress() {
        let (mut o, _clock) = session();
        o.on_utterance("this is terrible");
        o.clear_messages();
        o.on_perception_failure("camera offline");
        let snap = o.snapshot();
        assert_eq!(snap.stress_level, 3.0);
        assert_eq!(snap.visible_message.as_deref(), Some(catalog::PERCEPTION_FAILURE));
    }

    #[test]
    fn test_snapshot_serializes() {
        let (o, _clock) = session();
        let json = serde_json::to_value(o.snapshot()).unwrap();
        assert_eq!(json["classification"], "normal");
        assert_eq!(json["breathing_phase"], "rest");
        assert_eq!(json["visible_message"], serde_json::Value::Null);
    }
}
