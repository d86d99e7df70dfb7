//! Review session over a learner's most urgent due items.
//! Handles multi-round practice on top of the SM-2 scheduler.

use super::{Rating, ReviewEvent, ReviewableItem};
use crate::database::db;
use crate::error::Result;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::{debug, info};

/// One item served during a session.
#[derive(Clone, Debug)]
pub struct SessionItem {
    pub item: ReviewableItem,
    /// Recalled successfully in the current round.
    pub passed: bool,
    /// The first grading has been committed to the store.
    pub submitted: bool,
}

/// Manages a review session with multiple rounds.
/// Items graded below 3 are repeated in later rounds until recalled. Only the
/// first grading of each item is committed; repeats are practice.
pub struct ReviewSession {
    pub learner: String,
    pub items: Vec<SessionItem>,
    pub current_round: Vec<usize>,
    pub current_index: usize,
    pub round_number: usize,
}

impl ReviewSession {
    /// Creates a session from items already ranked by urgency.
    pub fn new(learner: impl Into<String>, ranked: Vec<ReviewableItem>) -> Self {
        let items: Vec<SessionItem> = ranked
            .into_iter()
            .map(|item| SessionItem {
                item,
                passed: false,
                submitted: false,
            })
            .collect();

        Self {
            learner: learner.into(),
            current_round: (0..items.len()).collect(),
            items,
            current_index: 0,
            round_number: 1,
        }
    }

    /// Loads the learner's top `limit` due items and starts a session on them.
    pub fn start(learner: &str, limit: i64, now: DateTime<Utc>, conn: &Connection) -> Result<Self> {
        let ranked = db::get_due_reviews(learner, limit, now, conn)?;
        info!(learner, items = ranked.len(), "review session started");
        Ok(Self::new(learner, ranked))
    }

    pub fn current_item(&self) -> Option<&ReviewableItem> {
        self.current_round
            .get(self.current_index)
            .and_then(|&idx| self.items.get(idx).map(|entry| &entry.item))
    }

    /// Grades the current item.
    ///
    /// On the item's first grading the review is committed through the store
    /// and the resulting event returned; repeat gradings return `None`.
    /// Grading a completed session is a no-op.
    pub fn grade_current_item(
        &mut self,
        rating: Rating,
        now: DateTime<Utc>,
        conn: &Connection,
    ) -> Result<Option<ReviewEvent>> {
        if self.is_completed() {
            return Ok(None);
        }
        let Some(&idx) = self.current_round.get(self.current_index) else {
            return Ok(None);
        };
        let Some(entry) = self.items.get_mut(idx) else {
            return Ok(None);
        };

        entry.passed = rating.is_success();

        if entry.submitted {
            debug!(item_id = entry.item.id, rating = rating.value(), "practice grade");
            return Ok(None);
        }

        let (updated, event) = db::submit_review(&self.learner, entry.item.id, rating, now, conn)?;
        entry.item = updated;
        entry.submitted = true;
        Ok(Some(event))
    }

    pub fn next_item(&mut self) {
        if self.current_index + 1 < self.current_round.len() {
            self.current_index += 1;
        } else {
            self.start_next_round();
        }
    }

    /// Starts a new round with the items not recalled in this one.
    /// If none remain, the session is complete.
    fn start_next_round(&mut self) {
        let failed: Vec<usize> = self
            .current_round
            .iter()
            .copied()
            .filter(|&idx| self.items.get(idx).is_some_and(|entry| !entry.passed))
            .collect();

        if failed.is_empty() {
            return;
        }

        self.current_round = failed;
        self.current_index = 0;
        self.round_number += 1;
        debug!(round = self.round_number, items = self.current_round.len(), "new round");
    }

    pub fn learned_count(&self) -> usize {
        self.current_round
            .iter()
            .filter(|&&idx| self.items.get(idx).is_some_and(|entry| entry.passed))
            .count()
    }

    pub fn total_count(&self) -> usize {
        self.current_round.len()
    }

    pub fn remaining_count(&self) -> usize {
        self.total_count() - self.learned_count()
    }

    pub fn is_completed(&self) -> bool {
        self.learned_count() == self.total_count()
    }

    pub fn phase_message(&self) -> String {
        if self.round_number == 1 {
            format!("Round {}: {} items", self.round_number, self.total_count())
        } else {
            format!(
                "Round {} (Retry): {} items to retry",
                self.round_number,
                self.total_count()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::db::{add_item, get_item, get_review_history, init_schema};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap()
    }

    fn setup(units: &[&str]) -> (Connection, Vec<i64>) {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        let ids = units
            .iter()
            .map(|unit| add_item("ana", unit, now(), &conn).unwrap())
            .collect();
        (conn, ids)
    }

    #[test]
    fn test_empty_session_is_completed() {
        let (conn, _) = setup(&[]);
        let mut session = ReviewSession::start("ana", 10, now(), &conn).unwrap();

        assert!(session.is_completed());
        assert!(session.current_item().is_none());
        assert_eq!(session.grade_current_item(Rating::clamped(5), now(), &conn).unwrap(), None);
        session.next_item();
        assert!(session.is_completed());
    }

    #[test]
    fn test_all_passed_in_one_round() {
        let (conn, ids) = setup(&["ephemeral", "laconic"]);
        let mut session = ReviewSession::start("ana", 10, now(), &conn).unwrap();
        assert_eq!(session.phase_message(), "Round 1: 2 items");

        for _ in 0..2 {
            let event = session.grade_current_item(Rating::clamped(4), now(), &conn).unwrap();
            assert!(event.is_some());
            session.next_item();
        }

        assert!(session.is_completed());
        assert_eq!(session.round_number, 1);
        for id in ids {
            assert_eq!(get_item("ana", id, &conn).unwrap().unwrap().repetitions, 1);
        }
    }

    #[test]
    fn test_failed_items_repeat_without_resubmitting() {
        let (conn, ids) = setup(&["ephemeral", "laconic"]);
        let mut session = ReviewSession::start("ana", 10, now(), &conn).unwrap();

        let first = session.current_item().unwrap().id;
        session.grade_current_item(Rating::clamped(1), now(), &conn).unwrap();
        session.next_item();
        session.grade_current_item(Rating::clamped(5), now(), &conn).unwrap();
        assert_eq!(session.remaining_count(), 1);
        session.next_item();

        assert_eq!(session.round_number, 2);
        assert_eq!(session.total_count(), 1);
        assert_eq!(session.current_item().unwrap().id, first);
        assert_eq!(session.phase_message(), "Round 2 (Retry): 1 items to retry");

        let later = now() + Duration::minutes(5);
        let event = session.grade_current_item(Rating::clamped(4), later, &conn).unwrap();
        assert!(event.is_none());
        session.next_item();

        assert!(session.is_completed());
        assert_eq!(get_review_history("ana", first, &conn).unwrap().len(), 1);
        let stored = get_item("ana", first, &conn).unwrap().unwrap();
        assert_eq!((stored.repetitions, stored.interval_days), (0, 1));
        assert!(ids.contains(&first));
    }

    #[test]
    fn test_grading_after_completion_is_ignored() {
        let (conn, ids) = setup(&["ephemeral"]);
        let mut session = ReviewSession::start("ana", 10, now(), &conn).unwrap();
        session.grade_current_item(Rating::clamped(5), now(), &conn).unwrap();
        session.next_item();
        assert!(session.is_completed());

        let event = session.grade_current_item(Rating::clamped(0), now(), &conn).unwrap();

        assert!(event.is_none());
        assert!(session.is_completed());
        assert_eq!(session.learned_count(), 1);
        assert_eq!(get_review_history("ana", ids[0], &conn).unwrap().len(), 1);
    }

    #[test]
    fn test_session_respects_limit() {
        let (conn, _) = setup(&["a", "b", "c"]);
        let session = ReviewSession::start("ana", 2, now(), &conn).unwrap();

        assert_eq!(session.total_count(), 2);
    }
}
