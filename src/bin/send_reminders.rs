//! Sends a reminder for every income that lands tomorrow.
//!
//! Meant to be run once a day from cron. The shipped sender logs each
//! reminder payload; the deployment wires in the real WhatsApp provider.

use std::{error::Error, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt, Layer};

use dinari_rs::{LoggingSender, get_local_offset, local_today, send_due_reminders};

/// Send reminders for incomes due tomorrow.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The canonical timezone used to decide what "tomorrow" means.
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_filter(filter::LevelFilter::INFO),
        )
        .init();

    let args = Args::parse();

    let db_path = Path::new(&args.db_path);
    if !db_path.is_file() {
        eprintln!("File does not exist at {db_path:#?}!");
        exit(1);
    }

    let offset = match get_local_offset(&args.timezone) {
        Some(offset) => offset,
        None => {
            eprintln!("{:?} is not a valid canonical timezone name.", args.timezone);
            exit(1);
        }
    };
    let today = local_today(offset);

    let connection = Connection::open(db_path)?;
    let summary = send_due_reminders(&connection, today, &LoggingSender)?;

    println!(
        "{} due, {} sent, {} without a profile, {} failed",
        summary.due, summary.sent, summary.missing_profile, summary.failed
    );

    Ok(())
}
