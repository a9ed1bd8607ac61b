//! # Happy Expression
//!
//! Everything between "something happened" and "text on screen":
//!
//! - [`catalog`]: the literal texts the companion can say
//! - [`ResponseThrottle`]: cooldowns, probabilities, greetings and anti-repetition
//! - [`MessageQueue`]: one visible message at a time, highest priority first

pub mod catalog;
mod queue;
mod throttle;

pub use queue::{MessageQueue, PendingMessage, QueueState};
pub use throttle::{RecentHistory, ResponseThrottle};
