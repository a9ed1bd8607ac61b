//! Async driver for an [`Orchestrator`].
//!
//! A single tokio task owns the session. It sleeps until the next timer
//! deadline or the next input, whichever comes first, handles it to
//! completion and publishes a fresh [`Snapshot`] on a watch channel.

use crate::orchestrator::{Orchestrator, Snapshot};
use anyhow::Context;
use happy_core::{PerceptionEvent, PerceptionSource};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Everything that can be delivered into the loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Perception(PerceptionEvent),
    StartMeditation,
    StopMeditation,
    StartBreathing(String),
    StopBreathing,
    ClearMessages,
}

impl From<PerceptionEvent> for Input {
    fn from(event: PerceptionEvent) -> Self {
        Input::Perception(event)
    }
}

pub struct OrchestratorHandle {
    tx: mpsc::Sender<Input>,
    snapshots: watch::Receiver<Snapshot>,
    task: JoinHandle<Orchestrator>,
}

impl OrchestratorHandle {
    pub async fn send(&self, input: impl Into<Input>) -> anyhow::Result<()> {
        self.tx
            .send(input.into())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to deliver input: {}", e))
    }

    pub fn sender(&self) -> mpsc::Sender<Input> {
        self.tx.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Stop accepting input, let the loop drain and hand the session back.
    pub async fn shutdown(self) -> anyhow::Result<Orchestrator> {
        drop(self.tx);
        self.task.await.context("Orchestrator task panicked")
    }
}

/// Move the session onto its own task.
pub fn spawn(orchestrator: Orchestrator) -> OrchestratorHandle {
    let (tx, rx) = mpsc::channel(64);
    let (snapshot_tx, snapshots) = watch::channel(orchestrator.snapshot());
    let task = tokio::spawn(run(orchestrator, rx, snapshot_tx));
    OrchestratorHandle {
        tx,
        snapshots,
        task,
    }
}

async fn run(
    mut orchestrator: Orchestrator,
    mut rx: mpsc::Receiver<Input>,
    snapshot_tx: watch::Sender<Snapshot>,
) -> Orchestrator {
    tracing::debug!(session = %orchestrator.session_id(), "Event loop started");
    loop {
        let wait = orchestrator
            .next_deadline()
            .map(|deadline| deadline.saturating_sub(orchestrator.now()));

        tokio::select! {
            _ = sleep_for(wait) => {
                orchestrator.tick();
            }
            input = rx.recv() => match input {
                Some(input) => apply(&mut orchestrator, input),
                None => break,
            },
        }

        let snapshot = orchestrator.snapshot();
        snapshot_tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
    tracing::debug!(session = %orchestrator.session_id(), "Event loop stopped");
    orchestrator
}

fn apply(orchestrator: &mut Orchestrator, input: Input) {
    match input {
        Input::Perception(event) => orchestrator.handle(event),
        Input::StartMeditation => orchestrator.start_meditation(),
        Input::StopMeditation => orchestrator.stop_meditation(),
        Input::StartBreathing(pattern) => orchestrator.start_breathing(&pattern),
        Input::StopBreathing => orchestrator.stop_breathing(),
        Input::ClearMessages => orchestrator.clear_messages(),
    }
}

async fn sleep_for(wait: Option<Duration>) {
    match wait {
        Some(d) => tokio::time::sleep(d).await,
        None => std::future::pending().await,
    }
}

/// Consecutive source errors tolerated before `forward` gives up.
const MAX_SOURCE_FAILURES: usize = 3;

/// Pump a perception source into the loop until it is exhausted.
///
/// A source error is delivered as a [`PerceptionEvent::Failure`] and
/// listening continues; after [`MAX_SOURCE_FAILURES`] errors in a row the
/// last one is returned. Returns how many events were delivered.
pub async fn forward<S: PerceptionSource>(
    mut source: S,
    tx: mpsc::Sender<Input>,
) -> anyhow::Result<usize> {
    let mut delivered = 0;
    let mut failures = 0;
    loop {
        let event = match source.listen().await {
            Ok(Some(event)) => {
                failures = 0;
                event
            }
            Ok(None) => break,
            Err(e) => {
                failures += 1;
                tracing::warn!(
                    "Perception source failed ({}/{}): {:#}",
                    failures,
                    MAX_SOURCE_FAILURES,
                    e
                );
                deliver(&tx, PerceptionEvent::Failure(format!("{e:#}"))).await?;
                delivered += 1;
                if failures >= MAX_SOURCE_FAILURES {
                    return Err(e.context("Perception source keeps failing"));
                }
                continue;
            }
        };
        deliver(&tx, event).await?;
        delivered += 1;
    }
    Ok(delivered)
}

async fn deliver(tx: &mpsc::Sender<Input>, event: PerceptionEvent) -> anyhow::Result<()> {
    tx.send(Input::Perception(event))
        .await
        .map_err(|e| anyhow::anyhow!("Orchestrator stopped: {}", e))
}
