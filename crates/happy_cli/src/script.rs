//! Replays perception events from a JSON-lines file.
//!
//! One event per line, e.g. `{"utterance":"hello"}` or
//! `{"face":{"emotion":"sad","person":"Emma"}}`. Blank lines and lines
//! starting with `#` are skipped.

use anyhow::{Context, Result};
use async_trait::async_trait;
use happy_core::{PerceptionEvent, PerceptionSource};
use std::collections::VecDeque;
use std::path::Path;

pub struct JsonLinesSource {
    events: VecDeque<PerceptionEvent>,
}

impl JsonLinesSource {
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read script: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid script: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut events = VecDeque::new();
        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let event: PerceptionEvent = serde_json::from_str(line)
                .with_context(|| format!("line {}: not a perception event", index + 1))?;
            events.push_back(event);
        }
        Ok(Self { events })
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[async_trait]
impl PerceptionSource for JsonLinesSource {
    async fn listen(&mut self) -> Result<Option<PerceptionEvent>> {
        Ok(self.events.pop_front())
    }
}
