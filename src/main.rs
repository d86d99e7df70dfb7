//! vocab-review CLI: drives the review engine against a local SQLite store.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vocab_review::database::db;
use vocab_review::{Config, Rating, ReviewSession, Result};

#[derive(Parser)]
#[command(name = "vocab-review", version, about = "Spaced-repetition review scheduler")]
struct Cli {
    /// SQLite database path (overrides VOCAB_REVIEW_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add units to a learner's collection
    Add {
        learner: String,
        #[arg(required = true)]
        units: Vec<String>,
    },

    /// List due items, most urgent first
    Due {
        learner: String,
        /// Max items (<= 0 uses the default, capped at 100)
        #[arg(long, allow_negative_numbers = true)]
        limit: Option<i64>,
    },

    /// Submit a 0-5 rating for one item
    Review {
        learner: String,
        item_id: i64,
        #[arg(allow_negative_numbers = true)]
        rating: i64,
    },

    /// Interactive review of the due queue
    Session {
        learner: String,
        #[arg(long, allow_negative_numbers = true)]
        limit: Option<i64>,
    },

    /// Show an item's review log
    History { learner: String, item_id: i64 },

    /// Show today's review counters
    Stats { learner: String },

    /// Move the simulated date forward one day
    AdvanceDay,

    /// Print the simulated date
    Today,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vocab_review=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(path) = cli.db {
        config.database_path = path;
    }

    if let Err(e) = run(cli.command, &config) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(command: Commands, config: &Config) -> Result<()> {
    let conn = db::init_database(&config.database_path)?;
    let now = db::get_current_date(&conn)?;

    match command {
        Commands::Add { learner, units } => {
            for unit in &units {
                let id = db::add_item(&learner, unit, now, &conn)?;
                println!("{id}\t{unit}");
            }
        }
        Commands::Due { learner, limit } => {
            let limit = limit.unwrap_or(config.default_limit);
            let due = db::get_due_reviews(&learner, limit, now, &conn)?;
            println!("{}", serde_json::to_string_pretty(&due)?);
        }
        Commands::Review {
            learner,
            item_id,
            rating,
        } => {
            let (_, event) = db::submit_review(&learner, item_id, Rating::clamped(rating), now, &conn)?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        Commands::Session { learner, limit } => {
            let limit = limit.unwrap_or(config.default_limit);
            let session = ReviewSession::start(&learner, limit, now, &conn)?;
            run_session(session, &conn)?;
        }
        Commands::History { learner, item_id } => {
            let history = db::get_review_history(&learner, item_id, &conn)?;
            println!("{}", serde_json::to_string_pretty(&history)?);
        }
        Commands::Stats { learner } => {
            let stats = db::get_today_stats(&learner, now, &conn)?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Commands::AdvanceDay => {
            let date = db::advance_day(&conn)?;
            println!("{}", date.format("%Y-%m-%d"));
        }
        Commands::Today => println!("{}", now.format("%Y-%m-%d")),
    }

    Ok(())
}

/// Prompts for a rating per item on stdin until the session completes or input ends.
fn run_session(mut session: ReviewSession, conn: &rusqlite::Connection) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut round = 0;

    while !session.is_completed() {
        if session.round_number != round {
            round = session.round_number;
            println!("{}", session.phase_message());
        }
        let Some(item) = session.current_item() else {
            break;
        };

        print!("{} [0-5]: ", item.unit);
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let Ok(raw) = line?.trim().parse::<i64>() else {
            println!("enter a number from 0 to 5");
            continue;
        };

        let now = db::get_current_date(conn)?;
        if let Some(event) = session.grade_current_item(Rating::clamped(raw), now, conn)? {
            println!("  next review in {} day(s)", event.interval_days);
        }
        session.next_item();
    }

    println!("{} item(s) remaining", session.remaining_count());
    Ok(())
}
