//! Error types for the alcohol ledger

use crate::types::EntryId;
use thiserror::Error;

/// Errors that can occur while recording or aggregating drinks
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Invalid drink entry: {0}")]
    Validation(String),

    #[error("Conflicting entry: {0}")]
    Conflict(String),

    #[error("No entry with id {0}")]
    NotFound(EntryId),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Date parse error: {0}")]
    DateParse(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl LedgerError {
    /// Whether this error came from reading or writing durable storage
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            LedgerError::Persistence(_) | LedgerError::Json(_) | LedgerError::Io(_)
        )
    }
}
