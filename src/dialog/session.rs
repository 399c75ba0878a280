//! Per-user conversation state.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::search::Profile;

use super::question::QuestionCatalog;

/// Where profile pagination currently stands for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationState {
    /// No search has produced results yet.
    Empty,
    /// Cached results exist and the cursor has not reached the end.
    Paging,
    /// Every cached result has been delivered.
    Exhausted,
}

/// Everything the bot remembers about one user between events.
#[derive(Debug, Clone)]
pub struct DialogSession {
    /// Answer code per question index. Sparse; a key appears only after
    /// that question was answered. Iteration order is ascending.
    pub answers: BTreeMap<usize, usize>,
    found_profiles: Vec<Profile>,
    cursor: usize,
    pub last_activity: DateTime<Utc>,
    greeting_sent: bool,
}

impl DialogSession {
    pub fn new() -> Self {
        Self {
            answers: BTreeMap::new(),
            found_profiles: Vec::new(),
            cursor: 0,
            last_activity: Utc::now(),
            greeting_sent: false,
        }
    }

    /// Start-over copy: persistent answers survive, cached results and
    /// the pending greeting do not.
    pub fn restarted(&self, catalog: &QuestionCatalog) -> Self {
        let answers = self
            .answers
            .iter()
            .filter(|(index, _)| catalog.is_persistent(**index))
            .map(|(index, answer)| (*index, *answer))
            .collect();

        Self {
            answers,
            found_profiles: Vec::new(),
            cursor: 0,
            last_activity: Utc::now(),
            greeting_sent: true,
        }
    }

    pub fn has_answers(&self) -> bool {
        !self.answers.is_empty()
    }

    pub fn pagination_state(&self) -> PaginationState {
        if self.found_profiles.is_empty() {
            PaginationState::Empty
        } else if self.cursor < self.found_profiles.len() {
            PaginationState::Paging
        } else {
            PaginationState::Exhausted
        }
    }

    /// Cache a fresh result set and rewind the cursor.
    pub fn store_results(&mut self, profiles: Vec<Profile>) {
        self.found_profiles = profiles;
        self.cursor = 0;
    }

    /// Drop cached results, e.g. before re-running the search.
    pub fn clear_results(&mut self) {
        self.found_profiles.clear();
        self.cursor = 0;
    }

    /// Hand out the profile under the cursor and advance it. The flag is
    /// true when the returned profile is the final cached one. The cursor
    /// never moves past the result count.
    pub fn next_profile(&mut self) -> Option<(Profile, bool)> {
        let profile = self.found_profiles.get(self.cursor)?.clone();
        self.cursor += 1;
        Some((profile, self.cursor == self.found_profiles.len()))
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn result_count(&self) -> usize {
        self.found_profiles.len()
    }

    /// True exactly once, on the session's first outbound prompt. Consumed
    /// even when no greeting text is configured, so a greeting enabled
    /// later never fires mid-conversation.
    pub fn take_greeting(&mut self) -> bool {
        !std::mem::replace(&mut self.greeting_sent, true)
    }
}

impl Default for DialogSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::question::{Question, QuestionKind};

    fn profile(n: usize) -> Profile {
        Profile {
            title: format!("Person {n}"),
            image_url: format!("https://example.com/{n}.jpg"),
            details: "details".into(),
            profile_url: format!("https://example.com/people/{n}"),
        }
    }

    fn question(persistent: bool) -> Question {
        Question {
            kind: QuestionKind::Button,
            prompt: "?".into(),
            answers: vec!["a".into(), "b".into()],
            search_params: BTreeMap::new(),
            persistent,
        }
    }

    #[test]
    fn cursor_stays_within_bounds() {
        let mut session = DialogSession::new();
        session.store_results(vec![profile(1), profile(2)]);

        assert_eq!(session.pagination_state(), PaginationState::Paging);

        let (first, last) = session.next_profile().unwrap();
        assert_eq!(first.title, "Person 1");
        assert!(!last);
        assert_eq!(session.cursor(), 1);

        let (second, last) = session.next_profile().unwrap();
        assert_eq!(second.title, "Person 2");
        assert!(last);
        assert_eq!(session.cursor(), 2);

        assert_eq!(session.pagination_state(), PaginationState::Exhausted);
        assert!(session.next_profile().is_none());
        assert_eq!(session.cursor(), session.result_count());
    }

    #[test]
    fn empty_until_results_stored() {
        let mut session = DialogSession::new();
        assert_eq!(session.pagination_state(), PaginationState::Empty);
        assert!(session.next_profile().is_none());

        session.store_results(vec![profile(1)]);
        assert_eq!(session.pagination_state(), PaginationState::Paging);

        session.clear_results();
        assert_eq!(session.pagination_state(), PaginationState::Empty);
        assert_eq!(session.cursor(), 0);
    }

    #[test]
    fn single_result_is_immediately_last() {
        let mut session = DialogSession::new();
        session.store_results(vec![profile(1)]);

        let (_, last) = session.next_profile().unwrap();
        assert!(last);
    }

    #[test]
    fn restart_keeps_only_persistent_answers() {
        let catalog = QuestionCatalog::new(vec![question(true), question(false)]);

        let mut session = DialogSession::new();
        session.answers.insert(0, 1);
        session.answers.insert(1, 0);
        session.store_results(vec![profile(1)]);
        session.next_profile();

        let restarted = session.restarted(&catalog);
        assert_eq!(restarted.answers.len(), 1);
        assert_eq!(restarted.answers.get(&0), Some(&1));
        assert_eq!(restarted.result_count(), 0);
        assert_eq!(restarted.cursor(), 0);
    }

    #[test]
    fn restart_suppresses_greeting() {
        let catalog = QuestionCatalog::new(vec![question(false)]);

        let mut restarted = DialogSession::new().restarted(&catalog);
        assert!(!restarted.take_greeting());
    }

    #[test]
    fn greeting_taken_once() {
        let mut session = DialogSession::new();
        assert!(session.take_greeting());
        assert!(!session.take_greeting());
    }
}
