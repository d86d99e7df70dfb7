pub mod ranking;
pub mod rating;
pub mod review_event;
pub mod review_session;
pub mod reviewable_item;
pub mod sm2;
pub mod stats;

pub use rating::Rating;
pub use review_event::ReviewEvent;
pub use review_session::ReviewSession;
pub use reviewable_item::ReviewableItem;
pub use stats::ReviewStats;
