//! Core types for the alcohol ledger
//!
//! This module defines the values that flow between the store, the aggregator,
//! the classifier and the bucketizer: drink entries, periods, severities and
//! per-day buckets.
//!
//! All dates are plain calendar dates. Time-of-day never reaches the engine;
//! a timestamp contributes the date it shows in its own UTC offset (see
//! [`calendar_date`]).

use crate::converter::grams_of_alcohol;
use crate::error::LedgerError;
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier for a drink entry, independent of its position in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Generate a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for EntryId {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| LedgerError::Validation(format!("invalid entry id '{s}': {e}")))
    }
}

impl From<Uuid> for EntryId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Drink category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrinkType {
    Beer,
    Highball,
    Wine,
    Spirits,
    Cocktail,
    Other,
    /// A deliberate no-drink day; carries zero volume and strength
    #[serde(rename = "no drink day")]
    AbstinenceMarker,
}

impl DrinkType {
    /// All drink categories, marker last
    pub const ALL: [DrinkType; 7] = [
        DrinkType::Beer,
        DrinkType::Highball,
        DrinkType::Wine,
        DrinkType::Spirits,
        DrinkType::Cocktail,
        DrinkType::Other,
        DrinkType::AbstinenceMarker,
    ];

    /// Label used in the persisted blob
    pub fn as_str(&self) -> &'static str {
        match self {
            DrinkType::Beer => "Beer",
            DrinkType::Highball => "Highball",
            DrinkType::Wine => "Wine",
            DrinkType::Spirits => "Spirits",
            DrinkType::Cocktail => "Cocktail",
            DrinkType::Other => "Other",
            DrinkType::AbstinenceMarker => "no drink day",
        }
    }

    /// Map a stored label back to a category. Unknown labels become `Other`.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(label))
            .unwrap_or(DrinkType::Other)
    }

    pub fn is_abstinence_marker(&self) -> bool {
        matches!(self, DrinkType::AbstinenceMarker)
    }
}

impl fmt::Display for DrinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single logged drink (or no-drink-day marker)
///
/// Entries are immutable once created. `alcohol_grams` is always the
/// converter's output for the entry's volume and strength.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrinkEntry {
    id: EntryId,
    drink_type: DrinkType,
    volume_ml: f64,
    percentage_abv: f64,
    alcohol_grams: f64,
    date: NaiveDate,
}

impl DrinkEntry {
    /// Create a validated entry with a freshly generated id.
    ///
    /// Drinks need a positive volume and a strength in `[0, 100]`. An
    /// `AbstinenceMarker` must carry zero volume and zero strength.
    pub fn new(
        drink_type: DrinkType,
        volume_ml: f64,
        percentage_abv: f64,
        date: NaiveDate,
    ) -> Result<Self, LedgerError> {
        validate_amounts(drink_type, volume_ml, percentage_abv)?;
        Ok(Self {
            id: EntryId::new(),
            drink_type,
            volume_ml,
            percentage_abv,
            alcohol_grams: grams_of_alcohol(volume_ml, percentage_abv),
            date,
        })
    }

    /// A no-drink-day marker for `date`
    pub fn abstinence(date: NaiveDate) -> Self {
        Self {
            id: EntryId::new(),
            drink_type: DrinkType::AbstinenceMarker,
            volume_ml: 0.0,
            percentage_abv: 0.0,
            alcohol_grams: 0.0,
            date,
        }
    }

    /// Several identical drinks logged on one date in one submission.
    ///
    /// Each entry gets its own id.
    pub fn batch(
        drink_type: DrinkType,
        volume_ml: f64,
        percentage_abv: f64,
        date: NaiveDate,
        count: usize,
    ) -> Result<Vec<Self>, LedgerError> {
        if count == 0 {
            return Err(LedgerError::Validation(
                "batch must contain at least one drink".to_string(),
            ));
        }
        (0..count)
            .map(|_| Self::new(drink_type, volume_ml, percentage_abv, date))
            .collect()
    }

    /// Re-check an existing value, including the derived grams.
    pub fn validate(&self) -> Result<(), LedgerError> {
        validate_amounts(self.drink_type, self.volume_ml, self.percentage_abv)?;
        let expected = grams_of_alcohol(self.volume_ml, self.percentage_abv);
        if (self.alcohol_grams - expected).abs() > 1e-9 {
            return Err(LedgerError::Validation(format!(
                "alcohol grams {} do not match {} ml at {}%",
                self.alcohol_grams, self.volume_ml, self.percentage_abv
            )));
        }
        Ok(())
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn drink_type(&self) -> DrinkType {
        self.drink_type
    }

    pub fn volume_ml(&self) -> f64 {
        self.volume_ml
    }

    pub fn percentage_abv(&self) -> f64 {
        self.percentage_abv
    }

    pub fn alcohol_grams(&self) -> f64 {
        self.alcohol_grams
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn is_abstinence_marker(&self) -> bool {
        self.drink_type.is_abstinence_marker()
    }

    /// Same entry under a different id
    pub(crate) fn with_id(mut self, id: EntryId) -> Self {
        self.id = id;
        self
    }
}

fn validate_amounts(
    drink_type: DrinkType,
    volume_ml: f64,
    percentage_abv: f64,
) -> Result<(), LedgerError> {
    if drink_type.is_abstinence_marker() {
        if volume_ml != 0.0 || percentage_abv != 0.0 {
            return Err(LedgerError::Validation(
                "a no-drink-day marker carries no volume or strength".to_string(),
            ));
        }
        return Ok(());
    }

    if !volume_ml.is_finite() || volume_ml <= 0.0 {
        return Err(LedgerError::Validation(format!(
            "volume must be a positive number of millilitres, got {volume_ml}"
        )));
    }
    if !percentage_abv.is_finite() || !(0.0..=100.0).contains(&percentage_abv) {
        return Err(LedgerError::Validation(format!(
            "alcohol percentage must be between 0 and 100, got {percentage_abv}"
        )));
    }
    if !grams_of_alcohol(volume_ml, percentage_abv).is_finite() {
        return Err(LedgerError::Validation(format!(
            "volume of {volume_ml} ml is too large to convert"
        )));
    }
    Ok(())
}

/// Calendar date of a timestamp, as seen in the timestamp's own offset
pub fn calendar_date(timestamp: &DateTime<FixedOffset>) -> NaiveDate {
    timestamp.date_naive()
}

/// Granularity at which totals are compared against thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    Daily,
    Weekly,
    Monthly,
}

impl PeriodKind {
    pub const ALL: [PeriodKind; 3] = [PeriodKind::Daily, PeriodKind::Weekly, PeriodKind::Monthly];

    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodKind::Daily => "daily",
            PeriodKind::Weekly => "weekly",
            PeriodKind::Monthly => "monthly",
        }
    }
}

impl FromStr for PeriodKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" | "day" => Ok(PeriodKind::Daily),
            "weekly" | "week" => Ok(PeriodKind::Weekly),
            "monthly" | "month" => Ok(PeriodKind::Monthly),
            other => Err(LedgerError::Validation(format!(
                "unknown period kind '{other}'"
            ))),
        }
    }
}

/// How far a total sits above the safety thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    None,
    Moderate,
    High,
}

/// Aggregated consumption over a closed date interval
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PeriodSummary {
    /// Number of drinks (markers excluded)
    pub count: usize,
    /// Sum of per-entry grams, unrounded
    pub total_grams: f64,
    /// Number of dates in the interval marked as no-drink days
    pub abstinent_days: usize,
}

/// Consumption on a single calendar date
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DayBucket {
    pub total_grams: f64,
    pub drink_count: usize,
    pub has_abstinence_marker: bool,
}

/// One point of a per-day time series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub total_grams: f64,
}

/// Calendar-cell decoration for a day with entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "severity", rename_all = "snake_case")]
pub enum DayHighlight {
    Abstinent,
    Drinks(Severity),
}
