//! Orders a learner's due items by how likely they are to have been forgotten.
//!
//! Sort keys, most significant first:
//! 1. forgetting ratio (elapsed days / interval), descending; never-reviewed
//!    items rank above everything else
//! 2. difficulty, ascending (harder items first)
//! 3. repetitions, ascending (less practiced items first)
//!
//! Items tying on all three keep their input order.

use super::ReviewableItem;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// Used when the caller asks for zero or a negative number of items.
pub const DEFAULT_LIMIT: usize = 20;
/// Upper bound on the number of items returned.
pub const MAX_LIMIT: usize = 100;

/// Ratio assigned to items that were never reviewed.
pub const NEVER_REVIEWED_RATIO: f64 = f64::INFINITY;
/// Ratio for a reviewed item that carries no interval: maximally overdue,
/// still behind never-reviewed items.
const NO_INTERVAL_RATIO: f64 = f64::MAX;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Maps a requested limit onto `1..=MAX_LIMIT`.
pub fn effective_limit(limit: i64) -> usize {
    if limit <= 0 {
        DEFAULT_LIMIT
    } else {
        limit.min(MAX_LIMIT as i64) as usize
    }
}

pub fn forgetting_ratio(item: &ReviewableItem, now: DateTime<Utc>) -> f64 {
    match item.last_reviewed_at {
        None => NEVER_REVIEWED_RATIO,
        Some(_) if item.interval_days == 0 => NO_INTERVAL_RATIO,
        Some(last_reviewed_at) => {
            let elapsed_days = (now - last_reviewed_at).num_seconds() as f64 / SECONDS_PER_DAY;
            elapsed_days / f64::from(item.interval_days)
        }
    }
}

/// Precomputed sort key so the ratio is evaluated once per item.
struct UrgencyKey {
    ratio: f64,
    difficulty: f64,
    repetitions: u32,
}

impl UrgencyKey {
    fn of(item: &ReviewableItem, now: DateTime<Utc>) -> Self {
        Self {
            ratio: forgetting_ratio(item, now),
            difficulty: item.difficulty,
            repetitions: item.repetitions,
        }
    }

    fn most_urgent_first(&self, other: &Self) -> Ordering {
        other
            .ratio
            .total_cmp(&self.ratio)
            .then_with(|| self.difficulty.total_cmp(&other.difficulty))
            .then_with(|| self.repetitions.cmp(&other.repetitions))
    }
}

/// Ranks eligible items by descending urgency and keeps at most `limit` of them.
///
/// Eligibility filtering is up to the caller.
pub fn rank_due_items(
    items: Vec<ReviewableItem>,
    limit: i64,
    now: DateTime<Utc>,
) -> Vec<ReviewableItem> {
    let mut keyed: Vec<(UrgencyKey, ReviewableItem)> = items
        .into_iter()
        .map(|item| (UrgencyKey::of(&item, now), item))
        .collect();

    // `sort_by` is stable, which keeps full ties in input order.
    keyed.sort_by(|(a, _), (b, _)| a.most_urgent_first(b));

    keyed
        .into_iter()
        .take(effective_limit(limit))
        .map(|(_, item)| item)
        .collect()
}
