//! Append-only audit record of one review submission.
use super::Rating;
use super::sm2::NextReview;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewEvent {
    pub item_id: i64,
    pub rating: Rating,
    pub difficulty: f64,
    pub interval_days: u32,
    pub repetitions: u32,
    pub next_review_at: DateTime<Utc>,
    pub reviewed_at: DateTime<Utc>,
}

impl ReviewEvent {
    pub fn new(item_id: i64, rating: Rating, next: &NextReview, reviewed_at: DateTime<Utc>) -> Self {
        Self {
            item_id,
            rating,
            difficulty: next.difficulty,
            interval_days: next.interval_days,
            repetitions: next.repetitions,
            next_review_at: next.next_review_at,
            reviewed_at,
        }
    }
}
