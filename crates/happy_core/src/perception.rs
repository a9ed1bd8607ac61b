//! Perception seam: whatever listens to the user hands events over here.

use crate::emotion::FaceEvent;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single observation delivered by a perception source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerceptionEvent {
    /// Transcribed speech.
    Utterance(String),
    /// Face recognition result.
    Face(FaceEvent),
    /// The recognition backend failed or timed out.
    Failure(String),
}

#[async_trait]
pub trait PerceptionSource: Send {
    /// Wait for the next event. `Ok(None)` means the source is exhausted.
    async fn listen(&mut self) -> anyhow::Result<Option<PerceptionEvent>>;
}
