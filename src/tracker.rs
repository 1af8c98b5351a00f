//! Drink tracker
//!
//! This module provides the public API of the ledger: one explicit store,
//! injected durable storage, and the read-side computations over it.
//!
//! Every successful mutation is written through to storage. A failed write
//! never undoes the in-memory change; the error is logged and kept for the
//! caller to inspect.

use crate::aggregator::{self, PeriodReport};
use crate::bucketizer;
use crate::classifier::Thresholds;
use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::persistence::{self, KeyValueStore, MemoryKeyValueStore};
use crate::store::DrinkStore;
use crate::types::{
    DayBucket, DayHighlight, DrinkEntry, EntryId, PeriodKind, PeriodSummary, SeriesPoint,
    Severity,
};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Stateful drink log with write-through persistence.
///
/// # Example
/// ```
/// use alcohol_ledger::{DrinkEntry, DrinkTracker, DrinkType, PeriodKind, Severity};
/// use chrono::NaiveDate;
///
/// let mut tracker = DrinkTracker::in_memory();
/// let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// for _ in 0..3 {
///     tracker.add(DrinkEntry::new(DrinkType::Beer, 350.0, 5.0, day).unwrap()).unwrap();
/// }
/// let summary = tracker.summarize(day, day);
/// assert_eq!(summary.count, 3);
/// assert_eq!(tracker.classify(summary.total_grams, PeriodKind::Daily), Severity::High);
/// ```
pub struct DrinkTracker {
    store: DrinkStore,
    storage: Box<dyn KeyValueStore>,
    config: LedgerConfig,
    thresholds: Thresholds,
    last_persistence_error: Option<LedgerError>,
}

impl DrinkTracker {
    /// Open a tracker backed by `storage`, rehydrating any saved drinks.
    ///
    /// A missing, unreadable or corrupt blob never prevents startup: the
    /// tracker starts empty and the load error is kept as the last
    /// persistence error.
    pub fn open(config: LedgerConfig, storage: Box<dyn KeyValueStore>) -> Result<Self, LedgerError> {
        config.validate()?;

        let (store, load_error) = match persistence::load(storage.as_ref(), &config.storage_key) {
            Ok(store) => {
                tracing::debug!(key = %config.storage_key, entries = store.len(), "Loaded drink store");
                (store, None)
            }
            Err(e) => {
                tracing::warn!(key = %config.storage_key, error = %e, "Failed to load drinks, starting empty");
                (DrinkStore::new(), Some(e))
            }
        };

        Ok(Self {
            store,
            storage,
            thresholds: Thresholds::from(&config),
            config,
            last_persistence_error: load_error,
        })
    }

    /// A tracker with default settings and volatile storage
    pub fn in_memory() -> Self {
        let config = LedgerConfig::default();
        Self {
            store: DrinkStore::new(),
            storage: Box::new(MemoryKeyValueStore::new()),
            thresholds: Thresholds::from(&config),
            config,
            last_persistence_error: None,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Read-only view of the underlying store
    pub fn store(&self) -> &DrinkStore {
        &self.store
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    pub fn add(&mut self, entry: DrinkEntry) -> Result<EntryId, LedgerError> {
        let id = self.store.add(entry)?;
        self.write_through();
        Ok(id)
    }

    /// Add a preset submission of several drinks atomically
    pub fn add_batch(&mut self, entries: Vec<DrinkEntry>) -> Result<Vec<EntryId>, LedgerError> {
        let ids = self.store.add_batch(entries)?;
        self.write_through();
        Ok(ids)
    }

    pub fn remove(&mut self, id: EntryId) -> Result<DrinkEntry, LedgerError> {
        let removed = self.store.remove(id)?;
        self.write_through();
        Ok(removed)
    }

    pub fn update(&mut self, id: EntryId, replacement: DrinkEntry) -> Result<(), LedgerError> {
        self.store.update(id, replacement)?;
        self.write_through();
        Ok(())
    }

    /// Replace every entry with those in a persisted JSON array
    pub fn import_json(&mut self, json: &str) -> Result<usize, LedgerError> {
        self.store = persistence::decode(json)?;
        self.write_through();
        Ok(self.store.len())
    }

    /// Current entries in the persisted JSON format
    pub fn export_json(&self) -> Result<String, LedgerError> {
        persistence::encode(&self.store)
    }

    /// Write the current store to storage, returning any failure directly
    pub fn persist(&mut self) -> Result<(), LedgerError> {
        persistence::save(self.storage.as_mut(), &self.config.storage_key, &self.store)
    }

    /// The most recent load or save failure, if any
    pub fn last_persistence_error(&self) -> Option<&LedgerError> {
        self.last_persistence_error.as_ref()
    }

    /// Take and clear the most recent load or save failure
    pub fn take_persistence_error(&mut self) -> Option<LedgerError> {
        self.last_persistence_error.take()
    }

    fn write_through(&mut self) {
        match self.persist() {
            Ok(()) => self.last_persistence_error = None,
            Err(e) => {
                tracing::warn!(key = %self.config.storage_key, error = %e, "Failed to persist drinks");
                self.last_persistence_error = Some(e);
            }
        }
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn get(&self, id: EntryId) -> Option<&DrinkEntry> {
        self.store.get(id)
    }

    pub fn list_all(&self) -> Vec<DrinkEntry> {
        self.store.list_all()
    }

    pub fn list_by_date(&self, date: NaiveDate) -> Vec<DrinkEntry> {
        self.store.list_by_date(date)
    }

    pub fn summarize(&self, start: NaiveDate, end: NaiveDate) -> PeriodSummary {
        aggregator::summarize(self.store.entries(), start, end)
    }

    /// Report for the period of `kind` containing `today`
    pub fn report(&self, kind: PeriodKind, today: NaiveDate) -> Result<PeriodReport, LedgerError> {
        aggregator::report(self.store.entries(), kind, today, &self.config)
    }

    /// Daily, weekly and monthly reports for `today`
    pub fn reports(&self, today: NaiveDate) -> Result<Vec<PeriodReport>, LedgerError> {
        aggregator::reports(self.store.entries(), today, &self.config)
    }

    pub fn classify(&self, total_grams: f64, kind: PeriodKind) -> Severity {
        self.thresholds.classify(total_grams, kind)
    }

    pub fn bucket_by_day(&self) -> BTreeMap<NaiveDate, DayBucket> {
        bucketizer::bucket_by_day(self.store.entries())
    }

    pub fn highlights(&self) -> BTreeMap<NaiveDate, DayHighlight> {
        bucketizer::highlights(self.store.entries(), &self.thresholds)
    }

    pub fn daily_series(&self, start: NaiveDate, end: NaiveDate) -> Vec<SeriesPoint> {
        bucketizer::daily_series(self.store.entries(), start, end)
    }

    pub fn month_series(&self, day_in_month: NaiveDate) -> Result<Vec<SeriesPoint>, LedgerError> {
        bucketizer::month_series(self.store.entries(), day_in_month)
    }
}

impl Default for DrinkTracker {
    fn default() -> Self {
        Self::in_memory()
    }
}
