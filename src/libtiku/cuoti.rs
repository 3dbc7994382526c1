//! Per-bank record of missed questions.
//!
//! Each bank's ids live under `errors_<bank key>` as a JSON array. Every
//! call reads and rewrites the stored value; nothing is cached, since the
//! store can be edited or wiped from outside at any moment.

use crate::libtiku::db::{KeyValueStore, StoreError};
use crate::libtiku::question::QuestionId;
use log::{debug, warn};
use std::collections::HashSet;

pub const KEY_PREFIX: &str = "errors_";

pub fn store_key(bank_key: &str) -> String {
    format!("{KEY_PREFIX}{bank_key}")
}

pub struct ErrorStore<'a, S: KeyValueStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: KeyValueStore + ?Sized> ErrorStore<'a, S> {
    pub fn new(store: &'a S) -> Self {
        ErrorStore { store }
    }

    pub fn load(&self, bank_key: &str) -> HashSet<QuestionId> {
        self.ids(bank_key).into_iter().collect()
    }

    /// Stored ids in the order they were first missed.
    pub fn ids(&self, bank_key: &str) -> Vec<QuestionId> {
        let key = store_key(bank_key);
        let raw = match self.store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!("[Errors] Cannot read '{}', treating as empty: {}", key, err);
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<QuestionId>>(&raw) {
            Ok(mut ids) => {
                let mut seen = HashSet::new();
                ids.retain(|id| seen.insert(id.clone()));
                ids
            }
            Err(err) => {
                warn!("[Errors] Stored value for '{}' is corrupt, treating as empty: {}", key, err);
                Vec::new()
            }
        }
    }

    pub fn add(&self, bank_key: &str, id: &QuestionId) -> Result<(), StoreError> {
        let mut ids = self.ids(bank_key);
        if ids.contains(id) {
            return Ok(());
        }
        debug!("[Errors] Recording {} for '{}'", id, bank_key);
        ids.push(id.clone());
        self.write(bank_key, &ids)
    }

    /// Adds several ids with a single write.
    pub fn add_all<'i>(
        &self,
        bank_key: &str,
        new_ids: impl IntoIterator<Item = &'i QuestionId>,
    ) -> Result<usize, StoreError> {
        let mut ids = self.ids(bank_key);
        let before = ids.len();
        for id in new_ids {
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }
        let added = ids.len() - before;
        if added > 0 {
            debug!("[Errors] Recording {} ids for '{}'", added, bank_key);
            self.write(bank_key, &ids)?;
        }
        Ok(added)
    }

    pub fn remove(&self, bank_key: &str, id: &QuestionId) -> Result<(), StoreError> {
        let mut ids = self.ids(bank_key);
        let before = ids.len();
        ids.retain(|stored| stored != id);
        if ids.len() == before {
            return Ok(());
        }
        debug!("[Errors] Clearing {} for '{}'", id, bank_key);
        self.write(bank_key, &ids)
    }

    pub fn count(&self, bank_key: &str) -> usize {
        self.ids(bank_key).len()
    }

    pub fn clear(&self, bank_key: &str) -> Result<(), StoreError> {
        self.store.remove(&store_key(bank_key))
    }

    fn write(&self, bank_key: &str, ids: &[QuestionId]) -> Result<(), StoreError> {
        // Serialising a list of numbers and strings cannot fail.
        let raw = serde_json::to_string(ids).unwrap_or_else(|_| "[]".to_string());
        self.store.set(&store_key(bank_key), &raw)
    }
}
