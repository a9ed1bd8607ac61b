//! Property-based tests for the display queue and the response throttle.

use happy_core::{Emotion, ScriptedRandom, ThrottleConfig, TimerKind, TimerQueue};
use happy_expression::{MessageQueue, ResponseThrottle};
use proptest::prelude::*;
use std::time::Duration;

fn arb_emotion() -> impl Strategy<Value = Emotion> {
    prop_oneof![
        Just(Emotion::Happy),
        Just(Emotion::Sad),
        Just(Emotion::Angry),
        Just(Emotion::Fear),
        Just(Emotion::Surprise),
        Just(Emotion::Neutral),
        Just(Emotion::Other),
    ]
}

proptest! {
    /// Backlog is always sorted by priority, descending, and stable within a
    /// priority; at most one expiry timer is ever live.
    #[test]
    fn backlog_is_priority_desc_fifo(priorities in prop::collection::vec(1i32..=3, 1..30)) {
        let mut timers = TimerQueue::new();
        let mut queue = MessageQueue::new(Duration::from_secs(7));
        for (i, p) in priorities.iter().enumerate() {
            queue.enqueue(&format!("m{i}"), *p, None, &mut timers, Duration::ZERO);
            prop_assert!(timers.count(TimerKind::MessageExpiry) <= 1);
        }

        let backlog = queue.backlog();
        for pair in backlog.windows(2) {
            prop_assert!(pair[0].priority >= pair[1].priority);
            if pair[0].priority == pair[1].priority {
                prop_assert!(pair[0].seq < pair[1].seq);
            }
        }
    }

    /// Draining the queue shows every message exactly once, highest priority first.
    #[test]
    fn drain_shows_everything_in_order(priorities in prop::collection::vec(1i32..=3, 1..20)) {
        let mut timers = TimerQueue::new();
        let mut queue = MessageQueue::new(Duration::from_millis(100));
        for (i, p) in priorities.iter().enumerate() {
            queue.enqueue(&format!("m{i}"), *p, None, &mut timers, Duration::ZERO);
        }

        let mut shown = Vec::new();
        let mut now = Duration::ZERO;
        while let Some(deadline) = timers.next_deadline() {
            now = now.max(deadline);
            while let Some((token, _)) = timers.pop_due(now) {
                queue.on_expired(token, &mut timers, now);
                if let Some(current) = queue.current() {
                    shown.push(current.priority);
                }
            }
        }

        prop_assert_eq!(shown.len(), priorities.len());
        let mut expected = priorities.clone();
        expected.sort_by(|a, b| b.cmp(a));
        prop_assert_eq!(shown, expected);
        prop_assert!(!queue.is_visible());
    }

    /// No literal is ever chosen twice in a row for the same emotion.
    #[test]
    fn never_repeats_back_to_back(
        emotion in arb_emotion(),
        draws in prop::collection::vec(0.0f64..1.0, 1..16),
    ) {
        let mut throttle = ResponseThrottle::new(ThrottleConfig::default(), Duration::ZERO);
        let mut rng = ScriptedRandom::new(draws);
        let mut previous: Option<String> = None;
        for _ in 0..12 {
            let text = throttle.compose_message(emotion, None, &mut rng);
            prop_assert!(text.is_some());
            let text = text.unwrap_or_default();
            prop_assert_ne!(Some(&text), previous.as_ref());
            previous = Some(text);
        }
    }
}
