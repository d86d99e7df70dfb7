//! SM-2 (SuperMemo 2) spaced repetition scheduling.
//!
//! - Difficulty (easiness factor) moves by a quadratic penalty on how far the
//!   rating falls short of 5, and never drops below 1.3
//! - Ratings 0-2: repetitions reset to 0, item comes back the next day
//! - Ratings 3-5: intervals grow 1 day → 6 days → previous interval × difficulty
//!
//! Everything here is a pure function of its inputs.

use super::reviewable_item::MIN_DIFFICULTY;
use super::{Rating, ReviewableItem};
use chrono::{DateTime, Duration, Utc};

const FIRST_INTERVAL_DAYS: u32 = 1;
const SECOND_INTERVAL_DAYS: u32 = 6;
const RELEARN_INTERVAL_DAYS: u32 = 1;

/// Scheduling state produced by one review.
#[derive(Clone, Debug, PartialEq)]
pub struct NextReview {
    pub difficulty: f64,
    pub interval_days: u32,
    pub repetitions: u32,
    pub next_review_at: DateTime<Utc>,
}

/// Applies the difficulty update for `rating`, floored at 1.3.
pub fn next_difficulty(difficulty: f64, rating: Rating) -> f64 {
    let shortfall = rating.shortfall();
    let updated = difficulty + (0.1 - shortfall * (0.08 + shortfall * 0.02));
    updated.max(MIN_DIFFICULTY)
}

/// Computes the item's next scheduling state after a review rated `rating` at `now`.
pub fn calculate_next_review(item: &ReviewableItem, rating: Rating, now: DateTime<Utc>) -> NextReview {
    let difficulty = next_difficulty(item.difficulty, rating);

    let (interval_days, repetitions) = if rating.is_success() {
        let repetitions = item.repetitions.saturating_add(1);
        let interval_days = match repetitions {
            1 => FIRST_INTERVAL_DAYS,
            2 => SECOND_INTERVAL_DAYS,
            _ => grown_interval(item.interval_days, difficulty),
        };
        (interval_days, repetitions)
    } else {
        (RELEARN_INTERVAL_DAYS, 0)
    };

    NextReview {
        difficulty,
        interval_days,
        repetitions,
        next_review_at: due_after(now, interval_days),
    }
}

/// `prior × difficulty`, rounded and saturated at `u32::MAX`.
fn grown_interval(prior_days: u32, difficulty: f64) -> u32 {
    (f64::from(prior_days) * difficulty)
        .round()
        .clamp(0.0, f64::from(u32::MAX)) as u32
}

/// `now + interval_days`, saturated at the latest representable instant.
fn due_after(now: DateTime<Utc>, interval_days: u32) -> DateTime<Utc> {
    now.checked_add_signed(Duration::days(i64::from(interval_days)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
