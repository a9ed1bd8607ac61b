//! Single-slot message display queue.
//!
//! One message is visible at a time. Pending messages wait in a backlog
//! ordered by priority (highest first), ties in arrival order. Each shown
//! message owns one expiry timer; when it fires the next message takes over.
//!
//! Enqueuing while idle does not show the message synchronously. It arms a
//! zero-delay expiry timer, so everything enqueued while handling one event is
//! arbitrated together and the highest priority wins the slot.

use happy_core::{TimerKind, TimerQueue, TimerToken};
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingMessage {
    pub text: String,
    pub priority: i32,
    pub duration: Duration,
    pub enqueued_at: Duration,
    /// Arrival order, unique within one queue.
    pub seq: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueState {
    Idle,
    Showing,
}

#[derive(Debug)]
pub struct MessageQueue {
    default_duration: Duration,
    backlog: Vec<PendingMessage>,
    current: Option<PendingMessage>,
    timer: Option<TimerToken>,
    next_seq: u64,
}

impl MessageQueue {
    pub fn new(default_duration: Duration) -> Self {
        Self {
            default_duration,
            backlog: Vec::new(),
            current: None,
            timer: None,
            next_seq: 0,
        }
    }

    pub fn current(&self) -> Option<&PendingMessage> {
        self.current.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.current.is_some()
    }

    pub fn state(&self) -> QueueState {
        if self.current.is_some() {
            QueueState::Showing
        } else {
            QueueState::Idle
        }
    }

    /// Waiting messages, in the order they will be shown.
    pub fn backlog(&self) -> &[PendingMessage] {
        &self.backlog
    }

    /// Add a message. Blank text is ignored and returns false.
    ///
    /// `duration` defaults to the configured display time.
    pub fn enqueue(
        &mut self,
        text: &str,
        priority: i32,
        duration: Option<Duration>,
        timers: &mut TimerQueue<TimerKind>,
        now: Duration,
    ) -> bool {
        if text.trim().is_empty() {
            tracing::debug!("Ignoring empty message");
            return false;
        }

        let message = PendingMessage {
            text: text.to_string(),
            priority,
            duration: duration.unwrap_or(self.default_duration),
            enqueued_at: now,
            seq: self.next_seq,
        };
        self.next_seq += 1;

        let index = self.backlog.partition_point(|m| m.priority >= priority);
        self.backlog.insert(index, message);
        tracing::debug!(
            "Queued message (priority {}, {} waiting)",
            priority,
            self.backlog.len()
        );

        if self.current.is_none() && self.timer.is_none() {
            timers.rearm(&mut self.timer, now, Duration::ZERO, TimerKind::MessageExpiry);
        }
        true
    }

    /// Show the next waiting message, or go idle when none is left.
    pub fn advance(
        &mut self,
        timers: &mut TimerQueue<TimerKind>,
        now: Duration,
    ) -> Option<&PendingMessage> {
        timers.disarm(&mut self.timer);

        if self.backlog.is_empty() {
            if self.current.take().is_some() {
                tracing::debug!("Message queue idle");
            }
            return None;
        }

        let next = self.backlog.remove(0);
        timers.rearm(&mut self.timer, now, next.duration, TimerKind::MessageExpiry);
        tracing::info!(priority = next.priority, "Showing: {}", next.text);
        self.current = Some(next);
        self.current.as_ref()
    }

    /// Handle a fired expiry timer. Stale tokens return false.
    pub fn on_expired(
        &mut self,
        token: TimerToken,
        timers: &mut TimerQueue<TimerKind>,
        now: Duration,
    ) -> bool {
        if self.timer != Some(token) {
            return false;
        }
        self.timer = None;
        self.advance(timers, now);
        true
    }

    /// Drop everything, cancel the timer and go idle.
    pub fn clear(&mut self, timers: &mut TimerQueue<TimerKind>) {
        timers.disarm(&mut self.timer);
        self.backlog.clear();
        self.current = None;
        tracing::debug!("Message queue cleared");
    }
}
