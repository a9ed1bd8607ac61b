//! Whatever arrives, the session stays consistent.

use happy_core::{FaceEvent, HappyConfig, ManualClock, MemoryStore, ScriptedRandom};
use happy_orchestrator::{Orchestrator, OrchestratorParts};
use proptest::prelude::*;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Event {
    Say(String),
    Face(String, Option<String>),
    Failure,
    StartMeditation,
    StopMeditation,
    StartBreathing,
    StopBreathing,
    Wait(u64),
}

fn arb_event() -> impl Strategy<Value = Event> {
    let phrases = prop::sample::select(vec![
        "this is terrible",
        "i feel better",
        "i am stressed",
        "hello",
        "whatever",
        "so tired",
        "",
    ]);
    let emotions = prop::sample::select(vec!["angry", "happy", "sad", "fear", "neutral", "bogus"]);
    let people = prop::option::of(prop::sample::select(vec!["John", "Emma", "Ada", "Unknown"]));
    prop_oneof![
        phrases.prop_map(|p| Event::Say(p.to_string())),
        (emotions, people).prop_map(|(e, p)| Event::Face(e.to_string(), p.map(str::to_string))),
        Just(Event::Failure),
        Just(Event::StartMeditation),
        Just(Event::StopMeditation),
        Just(Event::StartBreathing),
        Just(Event::StopBreathing),
        (0u64..40_000).prop_map(Event::Wait),
    ]
}

proptest! {
    #[test]
    fn session_state_stays_consistent(
        events in prop::collection::vec(arb_event(), 0..50),
        draws in prop::collection::vec(0.0f64..1.0, 1..8),
    ) {
        let clock = ManualClock::new();
        let mut o = Orchestrator::with_parts(
            HappyConfig::default(),
            OrchestratorParts {
                clock: Box::new(clock.clone()),
                random: Box::new(ScriptedRandom::new(draws)),
                store: Box::new(MemoryStore::new()),
            },
        );

        for event in events {
            match event {
                Event::Say(text) => o.on_utterance(&text),
                Event::Face(emotion, person) => {
                    o.on_face_emotion(&FaceEvent::new(&emotion, person.as_deref()))
                }
                Event::Failure => o.on_perception_failure("offline"),
                Event::StartMeditation => o.start_meditation(),
                Event::StopMeditation => o.stop_meditation(),
                Event::StartBreathing => o.start_breathing("4-7-8"),
                Event::StopBreathing => o.stop_breathing(),
                Event::Wait(ms) => {
                    clock.advance(Duration::from_millis(ms));
                    o.tick();
                }
            }

            let snap = o.snapshot();
            prop_assert!((0.0..=5.0).contains(&snap.stress_level));
            prop_assert!((0.0..=1.0).contains(&snap.breathing_progress));
            prop_assert_eq!(snap.is_meditating, o.is_meditating());
            // Every due timer has been handled.
            if let Some(deadline) = o.next_deadline() {
                prop_assert!(deadline > o.now());
            }
        }
    }
}
