//! Alcohol Ledger - On-device engine for logging drinks and tracking alcohol intake
//!
//! The ledger turns logged drinks into grams of pure alcohol and aggregates
//! them per day, week and month against fixed safety thresholds:
//! conversion → storage → aggregation → classification → calendar bucketing.
//!
//! ## Modules
//!
//! - **Engine**: `converter`, `store`, `aggregator`, `classifier`, `bucketizer`
//! - **Tracker**: a single store handle with write-through persistence
//! - **FFI**: C bindings for presentation layers in other languages

pub mod aggregator;
pub mod bucketizer;
pub mod classifier;
pub mod config;
pub mod converter;
pub mod error;
pub mod persistence;
pub mod store;
pub mod tracker;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use aggregator::{summarize, Period, PeriodReport};
pub use bucketizer::bucket_by_day;
pub use classifier::{classify, Thresholds};
pub use config::{LedgerConfig, MonthlyDivisor};
pub use converter::{grams_of_alcohol, ALCOHOL_DENSITY_G_PER_ML};
pub use error::LedgerError;
pub use persistence::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use store::DrinkStore;
pub use tracker::DrinkTracker;
pub use types::{
    DayBucket, DayHighlight, DrinkEntry, DrinkType, EntryId, PeriodKind, PeriodSummary,
    SeriesPoint, Severity,
};

/// Ledger version
pub const LEDGER_VERSION: &str = env!("CARGO_PKG_VERSION");
