//! Per-learner scheduling state for one learned unit.
use super::sm2::NextReview;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Difficulty given to every freshly added item.
pub const DEFAULT_DIFFICULTY: f64 = 2.5;
/// Floor enforced by the scheduler on every update.
pub const MIN_DIFFICULTY: f64 = 1.3;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewableItem {
    pub id: i64,
    pub learner: String,
    pub unit: String,
    /// Easiness factor; higher means easier to recall.
    pub difficulty: f64,
    pub interval_days: u32,
    /// Consecutive successful reviews since creation or the last failure.
    pub repetitions: u32,
    pub last_reviewed_at: Option<DateTime<Utc>>,
    /// `None` means due immediately.
    pub next_review_at: Option<DateTime<Utc>>,
}

impl ReviewableItem {
    pub fn new(id: i64, learner: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            id,
            learner: learner.into(),
            unit: unit.into(),
            difficulty: DEFAULT_DIFFICULTY,
            interval_days: 0,
            repetitions: 0,
            last_reviewed_at: None,
            next_review_at: None,
        }
    }

    pub fn is_new(&self) -> bool {
        self.last_reviewed_at.is_none()
    }

    /// Eligible for review: never scheduled, or scheduled at or before `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_at.is_none_or(|next| next <= now)
    }

    /// Returns this item with the scheduler's output applied.
    ///
    /// Both timestamps move together so `next_review_at` always equals
    /// `last_reviewed_at + interval_days`.
    pub fn with_review(&self, next: &NextReview, reviewed_at: DateTime<Utc>) -> Self {
        Self {
            difficulty: next.difficulty,
            interval_days: next.interval_days,
            repetitions: next.repetitions,
            last_reviewed_at: Some(reviewed_at),
            next_review_at: Some(next.next_review_at),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Rating, sm2::calculate_next_review};
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_new_item_defaults() {
        let item = ReviewableItem::new(7, "ana", "ephemeral");

        assert_eq!(item.difficulty, DEFAULT_DIFFICULTY);
        assert_eq!(item.interval_days, 0);
        assert_eq!(item.repetitions, 0);
        assert!(item.is_new());
        assert!(item.next_review_at.is_none());
    }

    #[test]
    fn test_unscheduled_item_is_due() {
        let item = ReviewableItem::new(1, "ana", "ephemeral");
        assert!(item.is_due(Utc::now()));
    }

    #[test]
    fn test_due_boundary_is_inclusive() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let mut item = ReviewableItem::new(1, "ana", "ephemeral");

        item.next_review_at = Some(now);
        assert!(item.is_due(now));

        item.next_review_at = Some(now + Duration::seconds(1));
        assert!(!item.is_due(now));
    }

    #[test]
    fn test_with_review_keeps_timestamps_in_step() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let item = ReviewableItem::new(1, "ana", "ephemeral");
        let next = calculate_next_review(&item, Rating::clamped(4), now);

        let reviewed = item.with_review(&next, now);

        assert_eq!(reviewed.id, 1);
        assert_eq!(reviewed.unit, "ephemeral");
        assert_eq!(reviewed.last_reviewed_at, Some(now));
        assert_eq!(
            reviewed.next_review_at,
            Some(now + Duration::days(i64::from(reviewed.interval_days)))
        );
    }
}
