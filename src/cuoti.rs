use colored::Colorize;
use env_logger::Env;
use log::{error, info};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tikulianxi::libtiku::cuoti::{ErrorStore, KEY_PREFIX};
use tikulianxi::libtiku::db::SqliteStore;
use tikulianxi::libtiku::question::QuestionId;

#[derive(Parser, Debug)]
#[command(name = "錯題 (Cuòtí)")]
#[command(version, about = "Inspect and maintain the missed-question records", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, default_value = "info")]
    log_level: String,
    #[arg(short, long, value_name = "FILE", default_value = "tiku.db")]
    db: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Every bank with missed questions on record.
    Banks,
    List { bank: String },
    Clear { bank: String },
    Export { bank: String, json: PathBuf },
    /// Merges the ids in a JSON array into the bank's record.
    Import { bank: String, json: PathBuf },
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level)).init();

    let store = match SqliteStore::open(&args.db) {
        Ok(s) => s,
        Err(e) => {
            error!("{}{}", "Unable to open Database: ".red(), e);
            std::process::exit(1);
        }
    };
    info!("{}", format!("Database at {:?}", args.db).cyan());

    let result = run(&store, args.command);
    if let Err(e) = store.close() {
        error!("{}", format!("Cannot close Database: {e}").red());
    }
    if let Err(message) = result {
        error!("{}", message.red());
        std::process::exit(1);
    }
}

fn run(store: &SqliteStore, command: Commands) -> Result<(), String> {
    let errors = ErrorStore::new(store);
    match command {
        Commands::Banks => {
            let keys = store
                .keys_with_prefix(KEY_PREFIX)
                .map_err(|e| format!("Error accessing records: {e}!"))?;
            for key in keys {
                let bank = &key[KEY_PREFIX.len()..];
                println!("{} ({})", bank.bold(), errors.count(bank));
            }
        }
        Commands::List { bank } => {
            let ids = errors.ids(&bank);
            info!("{}", format!("{} missed question(s) in '{}'", ids.len(), bank).blue());
            for id in ids {
                println!("{id}");
            }
        }
        Commands::Clear { bank } => {
            errors
                .clear(&bank)
                .map_err(|e| format!("Cannot clear '{bank}': {e}!"))?;
            info!("{}", format!("Cleared missed questions of '{}'", bank).green());
        }
        Commands::Export { bank, json } => {
            let ids = errors.ids(&bank);
            let content = serde_json::to_string_pretty(&ids)
                .map_err(|e| format!("Cannot serialise ids: {e}!"))?;
            std::fs::write(&json, content)
                .map_err(|e| format!("Cannot write {:?}: {e}!", json))?;
            info!(
                "{}",
                format!("Exported {} id(s) of '{}' to {:?}", ids.len(), bank, json).green()
            );
        }
        Commands::Import { bank, json } => {
            let ids = read_ids(&json)?;
            let added = errors
                .add_all(&bank, &ids)
                .map_err(|e| format!("Cannot update '{bank}': {e}!"))?;
            info!(
                "{}",
                format!("Imported {} new id(s) of {} into '{}'", added, ids.len(), bank).green()
            );
        }
    }
    Ok(())
}

fn read_ids(path: &Path) -> Result<Vec<QuestionId>, String> {
    let json = std::fs::read_to_string(path).map_err(|e| format!("Cannot read {:?}: {e}!", path))?;
    serde_json::from_str(&json).map_err(|e| format!("Malformed JSON: {e}!"))
}
