//! Explicit timer scheduling.
//!
//! Timers carry a [`TimerKind`] instead of a callback. The owner of the queue
//! pops due timers and dispatches them, which keeps every firing inside the
//! single event loop and lets tests drive time with a virtual clock.
//!
//! Every kind in this crate is exclusive: at most one live timer per kind.
//! [`TimerQueue::rearm`] enforces cancel-before-arm.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// What a timer does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Stress cool-down after reaching the critical band.
    StressCooldown,
    /// Current message display time elapsed (or a pending advance).
    MessageExpiry,
    /// Breathing animation render tick.
    BreathingTick,
}

/// Cancel handle returned by [`TimerQueue::after`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(u64);

#[derive(Debug)]
pub struct TimerQueue<K> {
    next_id: u64,
    /// Ordered by deadline, then by arm order.
    pending: BTreeMap<(Duration, u64), K>,
    deadlines: HashMap<u64, Duration>,
}

impl<K: Copy + PartialEq> TimerQueue<K> {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            pending: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }

    /// Schedule `kind` to fire `delay` after `now`.
    pub fn after(&mut self, now: Duration, delay: Duration, kind: K) -> TimerToken {
        let id = self.next_id;
        self.next_id += 1;
        let deadline = now.saturating_add(delay);
        self.pending.insert((deadline, id), kind);
        self.deadlines.insert(id, deadline);
        TimerToken(id)
    }

    /// Cancel a timer. Returns false when it already fired or was cancelled.
    pub fn cancel(&mut self, token: TimerToken) -> bool {
        match self.deadlines.remove(&token.0) {
            Some(deadline) => self.pending.remove(&(deadline, token.0)).is_some(),
            None => false,
        }
    }

    /// Cancel whatever `slot` holds, then arm a new timer into it.
    pub fn rearm(
        &mut self,
        slot: &mut Option<TimerToken>,
        now: Duration,
        delay: Duration,
        kind: K,
    ) -> TimerToken {
        if let Some(previous) = slot.take() {
            self.cancel(previous);
        }
        let token = self.after(now, delay, kind);
        debug_assert_eq!(
            self.count(kind),
            1,
            "more than one live timer of an exclusive kind"
        );
        *slot = Some(token);
        token
    }

    /// Cancel the timer in `slot`, if any, and empty the slot.
    pub fn disarm(&mut self, slot: &mut Option<TimerToken>) {
        if let Some(token) = slot.take() {
            self.cancel(token);
        }
    }

    /// Remove and return the earliest timer whose deadline is `<= now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<(TimerToken, K)> {
        let (&(deadline, id), _) = self.pending.iter().next()?;
        if deadline > now {
            return None;
        }
        let kind = self.pending.remove(&(deadline, id))?;
        self.deadlines.remove(&id);
        Some((TimerToken(id), kind))
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.keys().next().map(|(deadline, _)| *deadline)
    }

    pub fn is_live(&self, token: TimerToken) -> bool {
        self.deadlines.contains_key(&token.0)
    }

    /// Number of live timers of `kind`.
    pub fn count(&self, kind: K) -> usize {
        self.pending.values().filter(|k| **k == kind).count()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<K: Copy + PartialEq> Default for TimerQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}
