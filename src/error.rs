//! Error type shared by the storage layer, review sessions and the CLI.

#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Item {item_id} not found or not due for review for learner '{learner}'")]
    ItemNotFound { learner: String, item_id: i64 },

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(i64),

    #[error("Invalid stored date: {0}")]
    InvalidStoredDate(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReviewError>;
