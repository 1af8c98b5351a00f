//! Durable storage
//!
//! The drink list is kept as one JSON array under a single key of a
//! key-value store. Each element looks like:
//!
//! ```json
//! {"type": "Beer", "volume": 350, "alcoholPercentage": 5,
//!  "alcoholGrams": 13.8, "date": "2024-01-01", "id": "…"}
//! ```
//!
//! Dates are written as `YYYY-MM-DD`. Full RFC 3339 timestamps are accepted on
//! read and contribute the date shown in their own offset. `alcoholGrams` is
//! recomputed on read, and records that fail validation or clash with earlier
//! records are skipped.

use crate::error::LedgerError;
use crate::store::DrinkStore;
use crate::types::{calendar_date, DrinkEntry, DrinkType, EntryId};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Date format used in the persisted blob
pub const WIRE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Minimal key-value storage the ledger persists into
pub trait KeyValueStore {
    /// Read the value under `key`, `None` if it was never written
    fn get(&self, key: &str) -> Result<Option<String>, LedgerError>;

    /// Write `value` under `key`, replacing any previous value
    fn set(&mut self, key: &str, value: &str) -> Result<(), LedgerError>;
}

/// Volatile in-process storage
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    values: HashMap<String, String>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, LedgerError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), LedgerError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Whether `key` can name a stored blob: non-empty ASCII letters, digits, `-`
/// and `_`, so it maps to a single file name on every backend
pub fn is_valid_storage_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// One JSON file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    root: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, LedgerError> {
        if !is_valid_storage_key(key) {
            return Err(LedgerError::Persistence(format!(
                "invalid storage key '{key}'"
            )));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, LedgerError> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), LedgerError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root)?;

        // Write beside the target, then swap it in
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// A drink as it appears in the persisted JSON array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedDrink {
    #[serde(rename = "type")]
    pub drink_type: String,
    pub volume: f64,
    pub alcohol_percentage: f64,
    #[serde(default)]
    pub alcohol_grams: f64,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl From<&DrinkEntry> for PersistedDrink {
    fn from(entry: &DrinkEntry) -> Self {
        Self {
            drink_type: entry.drink_type().as_str().to_string(),
            volume: entry.volume_ml(),
            alcohol_percentage: entry.percentage_abv(),
            alcohol_grams: entry.alcohol_grams(),
            date: entry.date().format(WIRE_DATE_FORMAT).to_string(),
            id: Some(entry.id().to_string()),
        }
    }
}

impl PersistedDrink {
    /// Rebuild a validated entry. Grams are derived again from volume and strength.
    pub fn to_entry(&self) -> Result<DrinkEntry, LedgerError> {
        let date = parse_wire_date(&self.date)?;
        let drink_type = DrinkType::from_label(&self.drink_type);
        let entry = if drink_type.is_abstinence_marker() {
            DrinkEntry::abstinence(date)
        } else {
            DrinkEntry::new(drink_type, self.volume, self.alcohol_percentage, date)?
        };

        match &self.id {
            Some(id) => Ok(entry.with_id(id.parse::<EntryId>()?)),
            None => Ok(entry),
        }
    }
}

/// Parse a persisted date: `YYYY-MM-DD` or an RFC 3339 timestamp
pub fn parse_wire_date(value: &str) -> Result<NaiveDate, LedgerError> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, WIRE_DATE_FORMAT) {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(value)
        .map(|ts| calendar_date(&ts))
        .map_err(|e| LedgerError::DateParse(format!("'{value}': {e}")))
}

/// Serialize a store to the persisted JSON array
pub fn encode(store: &DrinkStore) -> Result<String, LedgerError> {
    let records: Vec<PersistedDrink> = store.list_all().iter().map(PersistedDrink::from).collect();
    Ok(serde_json::to_string(&records)?)
}

/// Rebuild a store from the persisted JSON array.
///
/// Malformed JSON is an error. Individual records that are invalid or that
/// conflict with records read before them are dropped with a warning.
pub fn decode(json: &str) -> Result<DrinkStore, LedgerError> {
    let records: Vec<PersistedDrink> = serde_json::from_str(json)?;
    let mut store = DrinkStore::new();
    let mut skipped = 0usize;

    for (index, record) in records.iter().enumerate() {
        let result = record.to_entry().and_then(|entry| store.add(entry));
        if let Err(e) = result {
            skipped += 1;
            tracing::warn!(index, date = %record.date, error = %e, "Skipping persisted drink");
        }
    }

    tracing::debug!(loaded = store.len(), skipped, "Decoded drink store");
    Ok(store)
}

/// Read the store under `key`. A missing key yields an empty store.
pub fn load(storage: &dyn KeyValueStore, key: &str) -> Result<DrinkStore, LedgerError> {
    match storage.get(key)? {
        Some(json) => decode(&json),
        None => Ok(DrinkStore::new()),
    }
}

/// Write the store under `key`
pub fn save(storage: &mut dyn KeyValueStore, key: &str, store: &DrinkStore) -> Result<(), LedgerError> {
    let json = encode(store)?;
    storage.set(key, &json)
}
