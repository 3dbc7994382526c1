use clap::Parser;
use colored::Colorize;
use env_logger::Env;
use log::{debug, warn};
use std::path::PathBuf;
use thiserror::Error;

use tikulianxi::libtiku::db::{SqliteStore, StoreError};
use tikulianxi::libtiku::question::{Bank, BankError};
use tikulianxi::libtiku::session::{Mode, SessionError, EXAM_SIZE};

mod cli;

#[derive(Parser, Debug)]
#[command(name = "題庫練習 (Tíkù Liànxí)")]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON question bank to practise.
    #[arg(value_name = "BANK")]
    bank: PathBuf,
    #[arg(short, long, value_name = "FILE", default_value = "tiku.db")]
    db: PathBuf,
    /// sequence, random, exam or error. Asked for when omitted.
    #[arg(short, long)]
    mode: Option<String>,
    #[arg(long, default_value_t = EXAM_SIZE)]
    exam_size: usize,
    #[arg(short, long, default_value = "error")]
    log_level: String,
}

#[derive(Debug, Error)]
pub(crate) enum Error {
    #[error(transparent)]
    Bank(#[from] BankError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("cannot open database: {0}")]
    Database(#[from] rusqlite::Error),
}

fn main() -> Result<(), Error> {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level)).init();

    let preset = match args.mode.as_deref().map(str::parse::<Mode>) {
        Some(Ok(mode)) => Some(mode),
        Some(Err(err)) => {
            warn!("[Setup] {}", err);
            println!("{}", format!("{err}, expected sequence, random, exam or error.").bright_red());
            return Err(err.into());
        }
        None => None,
    };

    let bank = match Bank::load(&args.bank) {
        Ok(bank) => bank,
        Err(err) => {
            println!("{}", format!("Failed to load the question bank: {err}").bright_red());
            return Err(err.into());
        }
    };
    debug!("[Setup] Bank '{}' with {} questions", bank.key, bank.len());

    let store = SqliteStore::open(&args.db)?;
    debug!("[DB] Database Connection Successful!");

    println!(
        "{}",
        format!("==========> {} ({} questions) <==========", bank.key, bank.len()).cyan()
    );

    let result = cli::mode_loop(&store, &bank, preset, args.exam_size);
    finish(store, result)
}

fn finish(store: SqliteStore, to_error: Result<(), Error>) -> Result<(), Error> {
    store.close()?;
    to_error
}
