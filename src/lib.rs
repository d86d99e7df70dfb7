pub mod config;
pub mod database;
pub mod error;
pub mod models;

pub use config::Config;
pub use error::{Result, ReviewError};
pub use models::ranking::rank_due_items;
pub use models::sm2::{NextReview, calculate_next_review};
pub use models::{Rating, ReviewEvent, ReviewSession, ReviewStats, ReviewableItem};
