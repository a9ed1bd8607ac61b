//! Stress state machine.
//!
//! The level lives in `[0, max_level]`. Reaching the top arms one cool-down
//! timer that lowers the level by one step when it fires. The classification
//! only flips at the edges: ANGRY at the top, NORMAL at zero, unchanged in
//! between.

use chrono::{DateTime, Utc};
use happy_core::{StressConfig, TimerKind, TimerQueue, TimerToken};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Emotional classification shown by the presentation layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    #[default]
    Normal,
    Angry,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StressState {
    pub level: f32,
    pub last_meditation: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct StressMachine {
    config: StressConfig,
    state: StressState,
    classification: Classification,
    cooldown: Option<TimerToken>,
}

impl StressMachine {
    pub fn new(mut config: StressConfig) -> Self {
        config.validate();
        Self {
            config,
            state: StressState::default(),
            classification: Classification::Normal,
            cooldown: None,
        }
    }

    pub fn level(&self) -> f32 {
        self.state.level
    }

    pub fn state(&self) -> &StressState {
        &self.state
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    pub fn in_critical_band(&self) -> bool {
        self.state.level >= self.config.max_level
    }

    /// Live cool-down timer, if one is armed.
    pub fn cooldown_token(&self) -> Option<TimerToken> {
        self.cooldown
    }

    pub fn increase(
        &mut self,
        amount: f32,
        timers: &mut TimerQueue<TimerKind>,
        now: Duration,
    ) -> f32 {
        if !amount.is_finite() {
            tracing::warn!("Ignoring non-finite stress increase: {}", amount);
            return self.state.level;
        }
        self.apply(amount.max(0.0), timers, now)
    }

    pub fn decrease(
        &mut self,
        amount: f32,
        timers: &mut TimerQueue<TimerKind>,
        now: Duration,
    ) -> f32 {
        if !amount.is_finite() {
            tracing::warn!("Ignoring non-finite stress decrease: {}", amount);
            return self.state.level;
        }
        self.apply(-amount.max(0.0), timers, now)
    }

    /// Positive deltas raise stress, negative deltas lower it.
    pub fn adjust(
        &mut self,
        delta: f32,
        timers: &mut TimerQueue<TimerKind>,
        now: Duration,
    ) -> f32 {
        if delta >= 0.0 {
            self.increase(delta, timers, now)
        } else {
            self.decrease(-delta, timers, now)
        }
    }

    fn apply(&mut self, delta: f32, timers: &mut TimerQueue<TimerKind>, now: Duration) -> f32 {
        let max = self.config.max_level;
        let before = self.state.level;
        let after = (before + delta).clamp(0.0, max);
        self.state.level = after;

        if after >= max {
            self.classification = Classification::Angry;
            if before < max {
                timers.rearm(
                    &mut self.cooldown,
                    now,
                    self.config.cooldown(),
                    TimerKind::StressCooldown,
                );
                tracing::debug!("Stress reached critical band, cool-down armed");
            }
        } else if after <= 0.0 {
            self.classification = Classification::Normal;
        }

        if (after - before).abs() > f32::EPSILON {
            tracing::debug!("Stress {:.1} -> {:.1}", before, after);
        }
        after
    }

    /// Handle a fired cool-down timer. Stale tokens are ignored.
    pub fn on_cooldown_elapsed(
        &mut self,
        token: TimerToken,
        timers: &mut TimerQueue<TimerKind>,
        now: Duration,
    ) {
        if self.cooldown != Some(token) {
            return;
        }
        self.cooldown = None;
        if self.in_critical_band() {
            tracing::debug!("Cool-down elapsed, easing stress by one step");
            self.apply(-1.0, timers, now);
        }
    }

    /// Record a finished meditation at `wall_now` and ease stress.
    pub fn record_meditation(
        &mut self,
        wall_now: DateTime<Utc>,
        timers: &mut TimerQueue<TimerKind>,
        now: Duration,
    ) {
        self.set_last_meditation(wall_now, wall_now, timers, now);
        self.decrease(self.config.meditation_relief, timers, now);
    }

    /// Restore the persisted marker at session start; runs the streak check.
    pub fn restore_last_meditation(
        &mut self,
        date: DateTime<Utc>,
        wall_now: DateTime<Utc>,
        timers: &mut TimerQueue<TimerKind>,
        now: Duration,
    ) {
        self.set_last_meditation(date, wall_now, timers, now);
    }

    fn set_last_meditation(
        &mut self,
        date: DateTime<Utc>,
        wall_now: DateTime<Utc>,
        timers: &mut TimerQueue<TimerKind>,
        now: Duration,
    ) {
        if self.state.last_meditation == Some(date) {
            return;
        }
        self.state.last_meditation = Some(date);

        let days = days_between(date, wall_now);
        if days > 1 {
            tracing::info!("{} days since last meditation, stress rises", days);
            self.increase(self.config.missed_day_penalty, timers, now);
        }
    }
}

/// Whole days between two instants, rounded up.
fn days_between(a: DateTime<Utc>, b: DateTime<Utc>) -> i64 {
    const DAY_MS: i64 = 24 * 60 * 60 * 1000;
    let ms = (b - a).num_milliseconds().abs();
    (ms + DAY_MS - 1) / DAY_MS
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn setup() -> (StressMachine, TimerQueue<TimerKind>) {
        (StressMachine::new(StressConfig::default()), TimerQueue::new())
    }

    fn fire_due(machine: &mut StressMachine, timers: &mut TimerQueue<TimerKind>, now: Duration) {
        while let Some((token, kind)) = timers.pop_due(now) {
            assert_eq!(kind, TimerKind::StressCooldown);
            machine.on_cooldown_elapsed(token, timers, now);
        }
    }

    #[test]
    fn test_negative_ceiling_falls_back_to_default() {
        let config = StressConfig {
            max_level: -1.0,
            ..StressConfig::default()
        };
        let mut m = StressMachine::new(config);
        let mut t = TimerQueue::new();
        assert_eq!(m.increase(9.0, &mut t, secs(0)), 5.0);
        assert_eq!(m.classification(), Classification::Angry);
    }

    #[test]
    fn test_clamped_to_bounds() {
        let (mut m, mut t) = setup();
        assert_eq!(m.increase(9.0, &mut t, secs(0)), 5.0);
        assert_eq!(m.decrease(42.0, &mut t, secs(1)), 0.0);
        assert_eq!(m.increase(-3.0, &mut t, secs(2)), 0.0);
        assert_eq!(m.increase(f32::NAN, &mut t, secs(3)), 0.0);
    }

    #[test]
    fn test_critical_band_decays_once() {
        let (mut m, mut t) = setup();
        m.increase(5.0, &mut t, secs(0));
        assert_eq!(m.classification(), Classification::Angry);
        assert!(m.cooldown_token().is_some());

        fire_due(&mut m, &mut t, secs(29));
        assert_eq!(m.level(), 5.0);

        fire_due(&mut m, &mut t, secs(30));
        assert_eq!(m.level(), 4.0);

        fire_due(&mut m, &mut t, secs(120));
        assert_eq!(m.level(), 4.0);
        assert!(t.is_empty());
    }

    #[test]
    fn test_hysteresis_keeps_angry_inside_band() {
        let (mut m, mut t) = setup();
        m.increase(5.0, &mut t, secs(0));
        m.decrease(2.0, &mut t, secs(1));
        assert_eq!(m.classification(), Classification::Angry);
        m.decrease(3.0, &mut t, secs(2));
        assert_eq!(m.classification(), Classification::Normal);
        m.increase(4.0, &mut t, secs(3));
        assert_eq!(m.classification(), Classification::Normal);
    }

    #[test]
    fn test_reentering_band_rearms_single_timer() {
        let (mut m, mut t) = setup();
        m.increase(5.0, &mut t, secs(0));
        let first = m.cooldown_token().unwrap();
        m.decrease(1.0, &mut t, secs(10));
        m.increase(1.0, &mut t, secs(20));
        let second = m.cooldown_token().unwrap();

        assert_ne!(first, second);
        assert!(!t.is_live(first));
        assert_eq!(t.count(TimerKind::StressCooldown), 1);
        assert_eq!(t.next_deadline(), Some(secs(50)));
    }

    #[test]
    fn test_saturating_increase_does_not_rearm() {
        let (mut m, mut t) = setup();
        m.increase(5.0, &mut t, secs(0));
        let token = m.cooldown_token();
        m.increase(2.0, &mut t, secs(10));
        assert_eq!(m.cooldown_token(), token);
        assert_eq!(t.next_deadline(), Some(secs(30)));
    }

    #[test]
    fn test_cooldown_outside_band_is_noop() {
        let (mut m, mut t) = setup();
        m.increase(5.0, &mut t, secs(0));
        m.decrease(2.5, &mut t, secs(5));
        fire_due(&mut m, &mut t, secs(30));
        assert_eq!(m.level(), 2.5);
    }

    #[test]
    fn test_stale_token_is_ignored() {
        let (mut m, mut t) = setup();
        m.increase(5.0, &mut t, secs(0));
        let stale = m.cooldown_token().unwrap();
        m.decrease(1.0, &mut t, secs(1));
        m.increase(1.0, &mut t, secs(2));
        m.on_cooldown_elapsed(stale, &mut t, secs(31));
        assert_eq!(m.level(), 5.0);
        assert!(m.cooldown_token().is_some());
    }

    #[test]
    fn test_meditation_streak_penalty() {
        let (mut m, mut t) = setup();
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).unwrap();

        m.restore_last_meditation(now - chrono::Duration::hours(20), now, &mut t, secs(0));
        assert_eq!(m.level(), 0.0);

        m.restore_last_meditation(now - chrono::Duration::hours(30), now, &mut t, secs(0));
        assert_eq!(m.level(), 1.0);

        // Same date again is not a change
        m.restore_last_meditation(now - chrono::Duration::hours(30), now, &mut t, secs(0));
        assert_eq!(m.level(), 1.0);
    }

    #[test]
    fn test_record_meditation_relieves_stress() {
        let (mut m, mut t) = setup();
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).unwrap();
        m.increase(3.0, &mut t, secs(0));
        m.record_meditation(now, &mut t, secs(1));
        assert_eq!(m.level(), 1.0);
        assert_eq!(m.state().last_meditation, Some(now));
    }

    #[test]
    fn test_days_between_rounds_up() {
        let a = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(days_between(a, a), 0);
        assert_eq!(days_between(a, a + chrono::Duration::minutes(1)), 1);
        assert_eq!(days_between(a + chrono::Duration::hours(25), a), 2);
    }
}
