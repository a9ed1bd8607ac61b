//! # Happy Orchestrator
//!
//! Ties the scorer, stress machine, breathing clock, throttle and display
//! queue into one session. Use [`Orchestrator`] directly with a virtual clock
//! in tests, or [`runtime::spawn`] to drive it from a tokio task.

pub mod orchestrator;
pub mod runtime;

pub use orchestrator::{Orchestrator, OrchestratorParts, Snapshot};
pub use runtime::{forward, spawn, Input, OrchestratorHandle};
