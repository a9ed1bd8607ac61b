//! Rate limiting and selection for reactive face-emotion messages.
//!
//! Decides *whether* the companion speaks up when a face event arrives and
//! *what* it says. The policy is checked in order; the first rule that fires
//! wins:
//!
//! 1. A recognized person not yet greeted, and the new-person cooldown passed
//! 2. The routine cooldown passed, with a small probability
//! 3. Early in the session and nothing shown yet, with an even chance
//!
//! Selection avoids the last few texts so the companion does not sound like a
//! broken record.

use crate::catalog;
use happy_core::{Emotion, RandomSource, ThrottleConfig};
use std::collections::{HashSet, VecDeque};
use std::time::Duration;

/// Bounded ring of recently emitted texts.
#[derive(Debug, Clone)]
pub struct RecentHistory {
    capacity: usize,
    items: VecDeque<String>,
}

impl RecentHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, text: String) {
        if self.capacity == 0 {
            return;
        }
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(text);
    }

    pub fn contains(&self, text: &str) -> bool {
        self.items.iter().any(|t| t == text)
    }

    pub fn last(&self) -> Option<&str> {
        self.items.back().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug)]
pub struct ResponseThrottle {
    config: ThrottleConfig,
    session_start: Duration,
    last_shown: Option<Duration>,
    greeted: HashSet<String>,
    history: RecentHistory,
}

impl ResponseThrottle {
    pub fn new(config: ThrottleConfig, session_start: Duration) -> Self {
        let history = RecentHistory::new(config.history_size);
        Self {
            config,
            session_start,
            last_shown: None,
            greeted: HashSet::new(),
            history,
        }
    }

    pub fn has_greeted(&self, person: &str) -> bool {
        self.greeted.contains(person)
    }

    pub fn last_shown(&self) -> Option<Duration> {
        self.last_shown
    }

    pub fn history(&self) -> &RecentHistory {
        &self.history
    }

    /// Remember that a reactive message went on screen at `now`.
    pub fn mark_shown(&mut self, now: Duration) {
        self.last_shown = Some(now);
    }

    /// Whether a face event at `now` deserves a message.
    pub fn should_respond(
        &self,
        person: Option<&str>,
        now: Duration,
        rng: &mut dyn RandomSource,
    ) -> bool {
        // Never shown counts as infinitely long ago.
        let since_last = match self.last_shown {
            Some(at) => now.saturating_sub(at),
            None => Duration::MAX,
        };

        if let Some(name) = recognized(person) {
            if !self.greeted.contains(name) && since_last > self.config.new_person_cooldown() {
                tracing::debug!("New person '{}' in view, responding", name);
                return true;
            }
        }

        if since_last > self.config.routine_cooldown()
            && rng.chance(self.config.routine_probability)
        {
            tracing::debug!("Routine message after cooldown");
            return true;
        }

        let session_age = now.saturating_sub(self.session_start);
        if session_age < self.config.welcome_window()
            && self.last_shown.is_none()
            && rng.chance(self.config.welcome_probability)
        {
            tracing::debug!("Welcome message at session start");
            return true;
        }

        false
    }

    /// Pick the text for `emotion`, greeting a new person first.
    ///
    /// `None` when there is nothing sayable, e.g. a configured greeting list
    /// holding only blank lines.
    pub fn compose_message(
        &mut self,
        emotion: Emotion,
        person: Option<&str>,
        rng: &mut dyn RandomSource,
    ) -> Option<String> {
        let person = recognized(person);

        let greeting = person.filter(|name| !self.greeted.contains(*name));
        let candidates = match greeting {
            Some(name) => self.greetings_for(name),
            None => catalog::emotion_lines(emotion, person),
        };

        let text = self.choose(&candidates, rng)?;
        if let Some(name) = greeting {
            self.greeted.insert(name.to_string());
        }
        Some(text)
    }

    /// Throttle and compose in one step; records the shown time on success.
    pub fn respond(
        &mut self,
        emotion: Emotion,
        person: Option<&str>,
        now: Duration,
        rng: &mut dyn RandomSource,
    ) -> Option<String> {
        if !self.should_respond(person, now, rng) {
            return None;
        }
        let text = self.compose_message(emotion, person, rng)?;
        self.mark_shown(now);
        Some(text)
    }

    /// Random choice that avoids the recent history.
    ///
    /// When every candidate was used recently, the full set is used minus the
    /// immediately previous text, as long as two or more remain.
    pub fn choose(&mut self, candidates: &[String], rng: &mut dyn RandomSource) -> Option<String> {
        let candidates: Vec<&String> = candidates
            .iter()
            .filter(|c| !c.trim().is_empty())
            .collect();
        if candidates.is_empty() {
            return None;
        }

        let fresh: Vec<&String> = candidates
            .iter()
            .copied()
            .filter(|c| !self.history.contains(c))
            .collect();

        let pool = if !fresh.is_empty() {
            fresh
        } else {
            let previous = self.history.last();
            let without_previous: Vec<&String> = candidates
                .iter()
                .copied()
                .filter(|c| Some(c.as_str()) != previous)
                .collect();
            if without_previous.len() >= 2 {
                without_previous
            } else {
                candidates
            }
        };

        let text = pool[rng.pick(pool.len())].clone();
        self.history.push(text.clone());
        Some(text)
    }

    fn greetings_for(&self, name: &str) -> Vec<String> {
        match self.config.greetings.get(name) {
            Some(lines) if !lines.is_empty() => lines.clone(),
            _ => catalog::generic_greetings(name),
        }
    }
}

fn recognized(person: Option<&str>) -> Option<&str> {
    person
        .map(str::trim)
        .filter(|p| !p.is_empty() && !p.eq_ignore_ascii_case("unknown"))
}
