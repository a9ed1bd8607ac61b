//! # Happy Limbic System
//!
//! Fast, non-verbal state regulation for the companion:
//!
//! - **Stress**: a bounded level with a critical band, a single cool-down
//!   timer and hysteresis between NORMAL and ANGRY
//! - **Breathing**: a purely time-driven inhale/hold/exhale clock that yields
//!   a 0..1 animation scalar
//!
//! Both components own their timer slots and arm them on a shared
//! [`happy_core::TimerQueue`], cancelling before re-arming.

mod breathing;
mod stress;

pub use breathing::{BreathingPattern, BreathingPhase, BreathingSample, BreathingSession, BreathingTimer};
pub use stress::{Classification, StressMachine, StressState};
