//! Database operations for the review engine
//!
//! Handles SQLite schema setup, learner-scoped item lookups, the due-item query,
//! transactional review submission and the append-only review log.

use crate::error::{ReviewError, Result};
use crate::models::ranking::rank_due_items;
use crate::models::sm2::calculate_next_review;
use crate::models::{Rating, ReviewEvent, ReviewStats, ReviewableItem};
use chrono::{DateTime, Duration, Utc};
use rusqlite::{Connection, OptionalExtension, Row, Transaction, TransactionBehavior, params};
use std::path::Path;
use tracing::{debug, info, warn};

const ITEM_COLUMNS: &str = "id, learner, unit, difficulty, interval_days, repetitions, last_reviewed_at, next_review_at";

/// Opens (or creates) the database file and makes sure the schema exists.
pub fn init_database(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();
    let conn = Connection::open(path)?;
    init_schema(&conn)?;
    info!(path = %path.display(), "review database ready");
    Ok(conn)
}

/// Creates tables for items, the review log and app state.
///
/// Seeds the simulated current date with the wall clock if not already set.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;

    // One row per (learner, unit); timestamps are unix seconds
    conn.execute(
        "CREATE TABLE IF NOT EXISTS items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            learner TEXT NOT NULL,
            unit TEXT NOT NULL,
            difficulty REAL NOT NULL DEFAULT 2.5,
            interval_days INTEGER NOT NULL DEFAULT 0,
            repetitions INTEGER NOT NULL DEFAULT 0,
            last_reviewed_at INTEGER,
            next_review_at INTEGER,
            created_at INTEGER NOT NULL,
            UNIQUE(learner, unit)
        )",
        (),
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_items_learner_due ON items (learner, next_review_at)",
        (),
    )?;

    // Append-only; rows are never updated or deleted
    conn.execute(
        "CREATE TABLE IF NOT EXISTS review_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            item_id INTEGER NOT NULL,
            rating INTEGER NOT NULL,
            difficulty REAL NOT NULL,
            interval_days INTEGER NOT NULL,
            repetitions INTEGER NOT NULL,
            next_review_at INTEGER NOT NULL,
            reviewed_at INTEGER NOT NULL,
            FOREIGN KEY (item_id) REFERENCES items(id)
        )",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS app_state (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        (),
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO app_state (key, value) VALUES ('current_date', ?1)",
        params![Utc::now().timestamp().to_string()],
    )?;

    Ok(())
}

fn from_timestamp(secs: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0).ok_or(ReviewError::InvalidTimestamp(secs))
}

/// Drops sub-second precision so values survive a round trip through the store.
fn whole_seconds(time: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(time.timestamp(), 0).unwrap_or(time)
}

fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
        .unwrap_or(now)
}

/// Retrieves the simulated current date
pub fn get_current_date(conn: &Connection) -> Result<DateTime<Utc>> {
    let value: String = conn.query_row(
        "SELECT value FROM app_state WHERE key = 'current_date'",
        [],
        |row| row.get(0),
    )?;

    let secs = value
        .parse::<i64>()
        .map_err(|_| ReviewError::InvalidStoredDate(value.clone()))?;
    from_timestamp(secs)
}

/// Moves the simulated current date forward by one day and returns it
pub fn advance_day(conn: &Connection) -> Result<DateTime<Utc>> {
    let current = get_current_date(conn)?;
    let next_day = current
        .checked_add_signed(Duration::days(1))
        .ok_or(ReviewError::InvalidTimestamp(current.timestamp()))?;

    conn.execute(
        "UPDATE app_state SET value = ?1 WHERE key = 'current_date'",
        params![next_day.timestamp().to_string()],
    )?;

    debug!(date = %next_day, "advanced simulated date");
    Ok(next_day)
}

/// Raw `items` row, before timestamps are validated.
struct ItemRow {
    id: i64,
    learner: String,
    unit: String,
    difficulty: f64,
    interval_days: u32,
    repetitions: u32,
    last_reviewed_at: Option<i64>,
    next_review_at: Option<i64>,
}

impl ItemRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            learner: row.get(1)?,
            unit: row.get(2)?,
            difficulty: row.get(3)?,
            interval_days: row.get(4)?,
            repetitions: row.get(5)?,
            last_reviewed_at: row.get(6)?,
            next_review_at: row.get(7)?,
        })
    }

    fn into_item(self) -> Result<ReviewableItem> {
        Ok(ReviewableItem {
            id: self.id,
            learner: self.learner,
            unit: self.unit,
            difficulty: self.difficulty,
            interval_days: self.interval_days,
            repetitions: self.repetitions,
            last_reviewed_at: self.last_reviewed_at.map(from_timestamp).transpose()?,
            next_review_at: self.next_review_at.map(from_timestamp).transpose()?,
        })
    }
}

/// Adds a unit to a learner's collection with default scheduling state
///
/// Returns the item ID. Re-adding a unit the learner already has returns the
/// existing ID and leaves its state untouched.
pub fn add_item(learner: &str, unit: &str, now: DateTime<Utc>, conn: &Connection) -> Result<i64> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO items (learner, unit, created_at) VALUES (?1, ?2, ?3)",
        params![learner, unit, now.timestamp()],
    )?;

    let item_id: i64 = conn.query_row(
        "SELECT id FROM items WHERE learner = ?1 AND unit = ?2",
        params![learner, unit],
        |row| row.get(0),
    )?;

    if inserted > 0 {
        info!(learner, unit, item_id, "item added");
    } else {
        debug!(learner, unit, item_id, "item already in collection");
    }

    Ok(item_id)
}

/// Looks up one item by ID, scoped to the learner
pub fn get_item(learner: &str, item_id: i64, conn: &Connection) -> Result<Option<ReviewableItem>> {
    conn.query_row(
        &format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1 AND learner = ?2"),
        params![item_id, learner],
        ItemRow::from_row,
    )
    .optional()?
    .map(ItemRow::into_item)
    .transpose()
}

/// Retrieves the learner's items that are eligible for review
///
/// Eligible means never scheduled, or scheduled at or before `now`.
/// Results come back in insertion order; ranking is a separate step.
pub fn get_due_items(learner: &str, now: DateTime<Utc>, conn: &Connection) -> Result<Vec<ReviewableItem>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ITEM_COLUMNS} FROM items
         WHERE learner = ?1 AND (next_review_at IS NULL OR next_review_at <= ?2)
         ORDER BY id ASC"
    ))?;

    let rows = stmt
        .query_map(params![learner, now.timestamp()], ItemRow::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    debug!(learner, due = rows.len(), "loaded due items");
    rows.into_iter().map(ItemRow::into_item).collect()
}

/// Retrieves the learner's due items, most urgent first, at most `limit` of them
pub fn get_due_reviews(
    learner: &str,
    limit: i64,
    now: DateTime<Utc>,
    conn: &Connection,
) -> Result<Vec<ReviewableItem>> {
    let due = get_due_items(learner, now, conn)?;
    Ok(rank_due_items(due, limit, now))
}

/// Records one review: reschedules the item and appends to the review log
///
/// Lookup, update and log insert run in a single IMMEDIATE transaction, so two
/// concurrent reviews of the same item cannot both read the same prior state.
/// Fails with [`ReviewError::ItemNotFound`] if the learner has no such item or
/// the item is not due yet.
pub fn submit_review(
    learner: &str,
    item_id: i64,
    rating: Rating,
    now: DateTime<Utc>,
    conn: &Connection,
) -> Result<(ReviewableItem, ReviewEvent)> {
    let now = whole_seconds(now);
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;

    let item = match get_item(learner, item_id, &tx)? {
        Some(item) if item.is_due(now) => item,
        _ => {
            warn!(learner, item_id, "review rejected: item not found or not due");
            return Err(ReviewError::ItemNotFound {
                learner: learner.to_string(),
                item_id,
            });
        }
    };

    let next = calculate_next_review(&item, rating, now);
    let updated = item.with_review(&next, now);
    let event = ReviewEvent::new(item.id, rating, &next, now);

    tx.execute(
        "UPDATE items
         SET difficulty = ?1, interval_days = ?2, repetitions = ?3,
             last_reviewed_at = ?4, next_review_at = ?5
         WHERE id = ?6",
        params![
            updated.difficulty,
            updated.interval_days,
            updated.repetitions,
            now.timestamp(),
            next.next_review_at.timestamp(),
            updated.id
        ],
    )?;

    tx.execute(
        "INSERT INTO review_logs
            (item_id, rating, difficulty, interval_days, repetitions, next_review_at, reviewed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            event.item_id,
            event.rating.value(),
            event.difficulty,
            event.interval_days,
            event.repetitions,
            event.next_review_at.timestamp(),
            event.reviewed_at.timestamp()
        ],
    )?;

    tx.commit()?;

    info!(
        learner,
        item_id,
        rating = event.rating.value(),
        interval_days = event.interval_days,
        repetitions = event.repetitions,
        "review recorded"
    );

    Ok((updated, event))
}

/// Retrieves an item's review log, oldest first
///
/// Returns an empty list for items the learner does not have.
pub fn get_review_history(learner: &str, item_id: i64, conn: &Connection) -> Result<Vec<ReviewEvent>> {
    let mut stmt = conn.prepare(
        "SELECT rl.item_id, rl.rating, rl.difficulty, rl.interval_days, rl.repetitions,
                rl.next_review_at, rl.reviewed_at
         FROM review_logs rl
         JOIN items i ON rl.item_id = i.id
         WHERE rl.item_id = ?1 AND i.learner = ?2
         ORDER BY rl.reviewed_at ASC, rl.id ASC",
    )?;

    let rows = stmt
        .query_map(params![item_id, learner], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, u32>(3)?,
                row.get::<_, u32>(4)?,
                row.get::<_, i64>(5)?,
                row.get::<_, i64>(6)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    rows.into_iter()
        .map(
            |(item_id, rating, difficulty, interval_days, repetitions, next_review_at, reviewed_at)| {
                Ok(ReviewEvent {
                    item_id,
                    rating: Rating::clamped(rating),
                    difficulty,
                    interval_days,
                    repetitions,
                    next_review_at: from_timestamp(next_review_at)?,
                    reviewed_at: from_timestamp(reviewed_at)?,
                })
            },
        )
        .collect()
}

/// Counts due items, items reviewed today and items added today
pub fn get_today_stats(learner: &str, now: DateTime<Utc>, conn: &Connection) -> Result<ReviewStats> {
    let day_start = start_of_day(now).timestamp();

    let total_due: u32 = conn.query_row(
        "SELECT COUNT(*) FROM items
         WHERE learner = ?1 AND (next_review_at IS NULL OR next_review_at <= ?2)",
        params![learner, now.timestamp()],
        |row| row.get(0),
    )?;

    let reviewed_today: u32 = conn.query_row(
        "SELECT COUNT(DISTINCT rl.item_id)
         FROM review_logs rl
         JOIN items i ON rl.item_id = i.id
         WHERE i.learner = ?1 AND rl.reviewed_at >= ?2",
        params![learner, day_start],
        |row| row.get(0),
    )?;

    let new_today: u32 = conn.query_row(
        "SELECT COUNT(*) FROM items WHERE learner = ?1 AND created_at >= ?2",
        params![learner, day_start],
        |row| row.get(0),
    )?;

    Ok(ReviewStats {
        total_due,
        reviewed_today,
        new_today,
    })
}
