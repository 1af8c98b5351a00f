//! Calendar bucketing
//!
//! Groups entries by calendar date for calendar decoration and time-series
//! charts. Buckets hold no state of their own and can be re-derived from the
//! entry list at any time.

use crate::aggregator::Period;
use crate::classifier::Thresholds;
use crate::error::LedgerError;
use crate::types::{DayBucket, DayHighlight, DrinkEntry, PeriodKind, SeriesPoint};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// One bucket per distinct date present in `entries`, keyed in ascending order
pub fn bucket_by_day(entries: &[DrinkEntry]) -> BTreeMap<NaiveDate, DayBucket> {
    let mut buckets: BTreeMap<NaiveDate, DayBucket> = BTreeMap::new();
    for entry in entries {
        let bucket = buckets.entry(entry.date()).or_default();
        if entry.is_abstinence_marker() {
            bucket.has_abstinence_marker = true;
        } else {
            bucket.total_grams += entry.alcohol_grams();
            bucket.drink_count += 1;
        }
    }
    buckets
}

/// Calendar decoration for every date that has entries
pub fn highlights(
    entries: &[DrinkEntry],
    thresholds: &Thresholds,
) -> BTreeMap<NaiveDate, DayHighlight> {
    bucket_by_day(entries)
        .into_iter()
        .map(|(date, bucket)| (date, thresholds.highlight(&bucket)))
        .collect()
}

/// Per-day totals for the dates within `[start, end]` that have entries,
/// sorted ascending
pub fn daily_series(entries: &[DrinkEntry], start: NaiveDate, end: NaiveDate) -> Vec<SeriesPoint> {
    if start > end {
        return Vec::new();
    }
    bucket_by_day(entries)
        .range(start..=end)
        .map(|(date, bucket)| SeriesPoint {
            date: *date,
            total_grams: bucket.total_grams,
        })
        .collect()
}

/// Per-day totals for the calendar month containing `day_in_month`
pub fn month_series(
    entries: &[DrinkEntry],
    day_in_month: NaiveDate,
) -> Result<Vec<SeriesPoint>, LedgerError> {
    let month = Period::containing(PeriodKind::Monthly, day_in_month)?;
    Ok(daily_series(entries, month.start, month.end))
}
