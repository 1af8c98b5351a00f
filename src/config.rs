//! Ledger configuration
//!
//! Settings are plain serde structs with a default for every field, so a
//! partial JSON document (or none at all) yields a usable configuration.

use crate::error::LedgerError;
use crate::persistence::is_valid_storage_key;
use serde::{Deserialize, Serialize};

/// Base daily limit in grams of alcohol
pub const DEFAULT_DAILY_LIMIT_GRAMS: f64 = 40.0;

/// Key under which the drink list is persisted
pub const DEFAULT_STORAGE_KEY: &str = "drinks";

/// Divisor used when averaging a monthly total per day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthlyDivisor {
    /// The month's actual length (28-31)
    #[default]
    CalendarDays,
    /// Always 30, reproducing legacy numbers
    Fixed30,
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default = "default_daily_limit")]
    pub daily_limit_grams: f64,

    #[serde(default)]
    pub monthly_divisor: MonthlyDivisor,

    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

fn default_daily_limit() -> f64 {
    DEFAULT_DAILY_LIMIT_GRAMS
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            daily_limit_grams: default_daily_limit(),
            monthly_divisor: MonthlyDivisor::default(),
            storage_key: default_storage_key(),
        }
    }
}

impl LedgerConfig {
    /// Parse and validate a JSON configuration document
    pub fn from_json(json: &str) -> Result<Self, LedgerError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        if !self.daily_limit_grams.is_finite() || self.daily_limit_grams <= 0.0 {
            return Err(LedgerError::InvalidConfig(format!(
                "daily_limit_grams must be positive, got {}",
                self.daily_limit_grams
            )));
        }
        if !is_valid_storage_key(&self.storage_key) {
            return Err(LedgerError::InvalidConfig(format!(
                "storage_key must be non-empty ASCII letters, digits, '-' or '_', got '{}'",
                self.storage_key
            )));
        }
        Ok(())
    }
}
