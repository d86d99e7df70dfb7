//! Daily review counters for one learner.
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewStats {
    /// Items eligible for review right now.
    pub total_due: u32,
    /// Distinct items reviewed since the start of the current UTC day.
    pub reviewed_today: u32,
    /// Items added since the start of the current UTC day.
    pub new_today: u32,
}
