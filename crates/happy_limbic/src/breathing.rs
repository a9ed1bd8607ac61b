//! Breathing session clock.
//!
//! Phase and progress are a pure function of the time since the session
//! started, so sampling at any rate gives the same curve. The render tick is
//! only a cadence for publishing samples.

use happy_core::{BreathingPatternConfig, TimerKind, TimerQueue, TimerToken};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreathingPhase {
    #[default]
    Rest,
    Inhale,
    Hold,
    Exhale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreathingPattern {
    pub inhale: Duration,
    pub hold: Duration,
    pub exhale: Duration,
}

impl BreathingPattern {
    pub fn cycle(&self) -> Duration {
        self.inhale + self.hold + self.exhale
    }
}

impl From<BreathingPatternConfig> for BreathingPattern {
    fn from(cfg: BreathingPatternConfig) -> Self {
        Self {
            inhale: Duration::from_millis(cfg.inhale_ms),
            hold: Duration::from_millis(cfg.hold_ms),
            exhale: Duration::from_millis(cfg.exhale_ms),
        }
    }
}

/// Phase plus a 0..1 scale for the animation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BreathingSample {
    pub phase: BreathingPhase,
    pub progress: f32,
}

impl BreathingSample {
    pub fn rest() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone)]
pub struct BreathingSession {
    pub name: String,
    pub pattern: BreathingPattern,
    pub started_at: Duration,
}

impl BreathingSession {
    pub fn sample(&self, now: Duration) -> BreathingSample {
        let cycle = self.pattern.cycle().as_millis();
        if cycle == 0 {
            return BreathingSample {
                phase: BreathingPhase::Hold,
                progress: 1.0,
            };
        }

        let inhale = self.pattern.inhale.as_millis();
        let hold = self.pattern.hold.as_millis();
        let exhale = self.pattern.exhale.as_millis();
        let elapsed = now.saturating_sub(self.started_at).as_millis() % cycle;

        if elapsed < inhale {
            BreathingSample {
                phase: BreathingPhase::Inhale,
                progress: (elapsed as f64 / inhale as f64) as f32,
            }
        } else if elapsed < inhale + hold {
            BreathingSample {
                phase: BreathingPhase::Hold,
                progress: 1.0,
            }
        } else {
            let into_exhale = elapsed - inhale - hold;
            BreathingSample {
                phase: BreathingPhase::Exhale,
                progress: (1.0 - into_exhale as f64 / exhale as f64) as f32,
            }
        }
    }
}

/// Owns the optional session and its render tick.
#[derive(Debug)]
pub struct BreathingTimer {
    tick: Duration,
    session: Option<BreathingSession>,
    tick_timer: Option<TimerToken>,
    last: BreathingSample,
}

impl BreathingTimer {
    pub fn new(tick: Duration) -> Self {
        Self {
            tick: tick.max(Duration::from_millis(1)),
            session: None,
            tick_timer: None,
            last: BreathingSample::rest(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&BreathingSession> {
        self.session.as_ref()
    }

    /// Start (or restart) a session at `now`. Any previous tick is cancelled first.
    pub fn start(
        &mut self,
        name: &str,
        pattern: BreathingPattern,
        timers: &mut TimerQueue<TimerKind>,
        now: Duration,
    ) {
        timers.disarm(&mut self.tick_timer);
        self.session = Some(BreathingSession {
            name: name.to_string(),
            pattern,
            started_at: now,
        });
        self.last = BreathingSample {
            phase: BreathingPhase::Inhale,
            progress: 0.0,
        };
        timers.rearm(&mut self.tick_timer, now, self.tick, TimerKind::BreathingTick);
        tracing::info!("Breathing session '{}' started", name);
    }

    /// Stop the session and cancel ticking. Returns false if nothing was running.
    pub fn stop(&mut self, timers: &mut TimerQueue<TimerKind>) -> bool {
        timers.disarm(&mut self.tick_timer);
        self.last = BreathingSample::rest();
        match self.session.take() {
            Some(session) => {
                tracing::info!("Breathing session '{}' stopped", session.name);
                true
            }
            None => false,
        }
    }

    pub fn sample(&self, now: Duration) -> BreathingSample {
        match &self.session {
            Some(session) => session.sample(now),
            None => BreathingSample::rest(),
        }
    }

    /// Sample stored by the latest tick.
    pub fn last_sample(&self) -> BreathingSample {
        self.last
    }

    /// Handle a fired tick: refresh the sample and schedule the next tick.
    pub fn on_tick(
        &mut self,
        token: TimerToken,
        timers: &mut TimerQueue<TimerKind>,
        now: Duration,
    ) -> Option<BreathingSample> {
        if self.tick_timer != Some(token) {
            return None;
        }
        self.tick_timer = None;
        let session = self.session.as_ref()?;
        let sample = session.sample(now);
        if sample.phase != self.last.phase {
            tracing::trace!("Breathing phase -> {:?}", sample.phase);
        }
        self.last = sample;
        timers.rearm(&mut self.tick_timer, now, self.tick, TimerKind::BreathingTick);
        Some(sample)
    }
}
