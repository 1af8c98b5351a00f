//! Threshold classification
//!
//! Maps an aggregated total onto a [`Severity`]. All limits are scaled from a
//! single daily limit: a week allows seven days' worth and a month thirty.
//! Both boundaries are exclusive: a total equal to a limit is not above it.

use crate::config::{LedgerConfig, DEFAULT_DAILY_LIMIT_GRAMS};
use crate::types::{DayBucket, DayHighlight, PeriodKind, Severity};
use serde::{Deserialize, Serialize};

/// Safety thresholds derived from one daily limit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub daily_limit_grams: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            daily_limit_grams: DEFAULT_DAILY_LIMIT_GRAMS,
        }
    }
}

impl From<&LedgerConfig> for Thresholds {
    fn from(config: &LedgerConfig) -> Self {
        Self {
            daily_limit_grams: config.daily_limit_grams,
        }
    }
}

impl Thresholds {
    pub fn new(daily_limit_grams: f64) -> Self {
        Self { daily_limit_grams }
    }

    /// Upper limit for a whole period
    pub fn limit_for(&self, kind: PeriodKind) -> f64 {
        let days = match kind {
            PeriodKind::Daily => 1.0,
            PeriodKind::Weekly => 7.0,
            PeriodKind::Monthly => 30.0,
        };
        self.daily_limit_grams * days
    }

    /// `High` above the limit, `Moderate` above half of it, otherwise `None`
    pub fn classify(&self, total_grams: f64, kind: PeriodKind) -> Severity {
        let limit = self.limit_for(kind);
        if total_grams > limit {
            Severity::High
        } else if total_grams > limit / 2.0 {
            Severity::Moderate
        } else {
            Severity::None
        }
    }

    /// Share of the period limit consumed; may exceed 1.0
    pub fn limit_fraction(&self, total_grams: f64, kind: PeriodKind) -> f64 {
        total_grams / self.limit_for(kind)
    }

    /// Decoration for one calendar day
    pub fn highlight(&self, bucket: &DayBucket) -> DayHighlight {
        if bucket.has_abstinence_marker {
            DayHighlight::Abstinent
        } else {
            DayHighlight::Drinks(self.classify(bucket.total_grams, PeriodKind::Daily))
        }
    }
}

/// Classify against the default 40 g daily limit
pub fn classify(total_grams: f64, kind: PeriodKind) -> Severity {
    Thresholds::default().classify(total_grams, kind)
}
