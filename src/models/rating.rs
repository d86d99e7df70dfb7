//! Recall quality reported by the learner for a single review.
use serde::{Deserialize, Serialize};

/// Perfect, effortless recall.
pub const MAX_RATING: u8 = 5;
/// Lowest rating that still counts as a successful recall.
pub const PASSING_RATING: u8 = 3;

/// A rating in `0..=5`. Out-of-range input is clamped, never rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub fn clamped(raw: i64) -> Self {
        Self(raw.clamp(0, i64::from(MAX_RATING)) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_success(self) -> bool {
        self.0 >= PASSING_RATING
    }

    /// Points short of a perfect rating.
    pub fn shortfall(self) -> f64 {
        f64::from(MAX_RATING - self.0)
    }
}

impl From<i64> for Rating {
    fn from(raw: i64) -> Self {
        Self::clamped(raw)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}
