use log::{debug, error, info, warn};
use rusqlite::{params, Connection, DatabaseName, OptionalExtension, Result};
use std::path::Path;
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("persistence failure: {0}")]
pub struct StoreError(#[from] pub rusqlite::Error);

/// String-keyed storage the error store reads and writes through.
/// Anything else may modify it between calls.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        SqliteStore { conn }
    }

    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(create_or_open(path)?))
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(init_db(Connection::open_in_memory()?)?))
    }

    pub fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut statement = self
            .conn
            .prepare("SELECT key FROM KeyValue WHERE substr(key, 1, length(:prefix)) = :prefix ORDER BY key")?;
        let rows = statement.query_map(&[(":prefix", &prefix)], |row| row.get(0))?;
        Ok(rows.collect::<Result<Vec<String>>>()?)
    }

    pub fn close(self) -> Result<()> {
        close_db(self.conn)
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut statement = self
            .conn
            .prepare("SELECT value FROM KeyValue WHERE key = :key LIMIT 1")?;
        let value = statement
            .query_row(&[(":key", &key)], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        match self.conn.execute(
            "INSERT INTO KeyValue(key, value) VALUES (?1, ?2) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        ) {
            Ok(_) => {
                debug!("[DB] Stored '{}'", key);
                Ok(())
            }
            Err(err) => {
                error!("[DB] Error while storing '{}': {:?}", key, err);
                Err(err.into())
            }
        }
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match self
            .conn
            .execute("DELETE FROM KeyValue WHERE key = ?1", params![key])
        {
            Ok(_) => {
                debug!("[DB] Deleted '{}'", key);
                Ok(())
            }
            Err(err) => {
                error!("[DB] Error while deleting '{}': {:?}", key, err);
                Err(err.into())
            }
        }
    }
}

pub(crate) fn create_or_open(src: &Path) -> Result<Connection> {
    if src.exists() {
        info!("[DB] Opening existing Database");
        open_db(src)
    } else {
        info!("[DB] Creating new Database");
        create_db(src)
    }
}

pub(crate) fn create_db(dest: &Path) -> Result<Connection> {
    let now = Instant::now();
    let db = init_db(Connection::open_in_memory()?)?;
    match db.backup(DatabaseName::Main, dest, None) {
        Ok(_) => {
            debug!(
                "[DB] Creating and Saving took {} ms.",
                now.elapsed().as_millis()
            );
            // Keep working on the file from here on, not the in-memory copy.
            close_db(db)?;
            open_db(dest)
        }
        Err(err) => {
            warn!("[DB] Failed to create database file: {}", err);
            close_db(db)?;
            Err(err)
        }
    }
}

pub(crate) fn open_db(src: &Path) -> Result<Connection> {
    let now = Instant::now();
    let db = Connection::open(src)?;
    // A file that exists but was never initialised still needs the table.
    db.execute(
        "CREATE TABLE IF NOT EXISTS KeyValue (key TEXT NOT NULL PRIMARY KEY, value TEXT NOT NULL)",
        (),
    )?;
    debug!("[DB] Opening took {} ms.", now.elapsed().as_millis());
    Ok(db)
}

pub(crate) fn close_db(connection: Connection) -> Result<()> {
    info!("[DB] Closing Database");
    let mut connection = connection;
    for attempt in 1..=3 {
        match connection.close() {
            Ok(_) => return Ok(()),
            Err((_, err)) if attempt == 3 => {
                error!("[DB] Cannot close connection! Giving up.");
                return Err(err);
            }
            Err((conn, err)) => {
                error!("[DB] Cannot close connection ({}). Retrying {}/2...", err, attempt);
                connection = conn;
            }
        }
    }
    Ok(())
}

fn init_db(conn: Connection) -> Result<Connection> {
    info!("[DB INIT] Creating tables");
    conn.execute(
        "CREATE TABLE KeyValue (
              key TEXT NOT NULL PRIMARY KEY,
              value TEXT NOT NULL
            )",
        (),
    )?;
    info!("[DB INIT] Created table KeyValue");
    info!("[DB INIT] Database Creation Successful!");

    Ok(conn)
}
