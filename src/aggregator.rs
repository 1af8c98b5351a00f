//! Period aggregation
//!
//! Sums drink entries over closed date intervals and derives the day, week
//! (Monday start) and calendar-month periods that contain a given date.
//! Everything is recomputed from the entry list on each call.

use crate::classifier::Thresholds;
use crate::config::{LedgerConfig, MonthlyDivisor};
use crate::error::LedgerError;
use crate::types::{DrinkEntry, PeriodKind, PeriodSummary, Severity};
use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Count and total of the entries dated within `[start, end]` (inclusive).
///
/// No-drink-day markers are left out of `count` and `total_grams` and are
/// reported through `abstinent_days` instead. An inverted interval is empty.
pub fn summarize(entries: &[DrinkEntry], start: NaiveDate, end: NaiveDate) -> PeriodSummary {
    let mut summary = PeriodSummary::default();
    let mut abstinent = BTreeSet::new();

    for entry in entries.iter().filter(|e| e.date() >= start && e.date() <= end) {
        if entry.is_abstinence_marker() {
            abstinent.insert(entry.date());
        } else {
            summary.count += 1;
            summary.total_grams += entry.alcohol_grams();
        }
    }

    summary.abstinent_days = abstinent.len();
    summary
}

/// A concrete calendar period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub kind: PeriodKind,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    /// The period of `kind` that contains `date`.
    ///
    /// Fails with [`LedgerError::Validation`] when the period would reach past
    /// the last or first representable date.
    pub fn containing(kind: PeriodKind, date: NaiveDate) -> Result<Self, LedgerError> {
        let (start, end) = match kind {
            PeriodKind::Daily => (date, date),
            PeriodKind::Weekly => {
                let offset = u64::from(date.weekday().num_days_from_monday());
                let start = date
                    .checked_sub_days(Days::new(offset))
                    .ok_or_else(|| out_of_range(kind, date))?;
                let end = start
                    .checked_add_days(Days::new(6))
                    .ok_or_else(|| out_of_range(kind, date))?;
                (start, end)
            }
            PeriodKind::Monthly => {
                let start = date.with_day(1).ok_or_else(|| out_of_range(kind, date))?;
                let end = start
                    .checked_add_months(Months::new(1))
                    .and_then(|first_of_next| first_of_next.pred_opt())
                    .ok_or_else(|| out_of_range(kind, date))?;
                (start, end)
            }
        };
        Ok(Self { kind, start, end })
    }

    /// Number of days in the period, both ends included
    pub fn length_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// The period of the same kind immediately before this one
    pub fn previous(&self) -> Result<Self, LedgerError> {
        let day_before = self
            .start
            .pred_opt()
            .ok_or_else(|| out_of_range(self.kind, self.start))?;
        Self::containing(self.kind, day_before)
    }

    /// The period of the same kind immediately after this one
    pub fn next(&self) -> Result<Self, LedgerError> {
        let day_after = self
            .end
            .succ_opt()
            .ok_or_else(|| out_of_range(self.kind, self.end))?;
        Self::containing(self.kind, day_after)
    }

    pub fn summarize(&self, entries: &[DrinkEntry]) -> PeriodSummary {
        summarize(entries, self.start, self.end)
    }

    /// Days to divide a total by for a per-day average
    pub fn average_divisor(&self, monthly: MonthlyDivisor) -> f64 {
        match (self.kind, monthly) {
            (PeriodKind::Monthly, MonthlyDivisor::Fixed30) => 30.0,
            _ => self.length_days() as f64,
        }
    }
}

fn out_of_range(kind: PeriodKind, date: NaiveDate) -> LedgerError {
    LedgerError::Validation(format!(
        "{} period around {date} is outside the supported calendar range",
        kind.as_str()
    ))
}

/// Average grams per day over a period
pub fn average_per_day(total_grams: f64, period: &Period, monthly: MonthlyDivisor) -> f64 {
    total_grams / period.average_divisor(monthly)
}

/// Summary, average and severity for one period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodReport {
    pub period: Period,
    pub summary: PeriodSummary,
    pub average_per_day: f64,
    pub severity: Severity,
    /// Share of the period limit consumed (unclamped)
    pub limit_fraction: f64,
}

/// Build the report for the period of `kind` containing `today`
pub fn report(
    entries: &[DrinkEntry],
    kind: PeriodKind,
    today: NaiveDate,
    config: &LedgerConfig,
) -> Result<PeriodReport, LedgerError> {
    let period = Period::containing(kind, today)?;
    let summary = period.summarize(entries);
    let thresholds = Thresholds::from(config);

    Ok(PeriodReport {
        period,
        summary,
        average_per_day: average_per_day(summary.total_grams, &period, config.monthly_divisor),
        severity: thresholds.classify(summary.total_grams, kind),
        limit_fraction: thresholds.limit_fraction(summary.total_grams, kind),
    })
}

/// Daily, weekly and monthly reports, in that order
pub fn reports(
    entries: &[DrinkEntry],
    today: NaiveDate,
    config: &LedgerConfig,
) -> Result<Vec<PeriodReport>, LedgerError> {
    PeriodKind::ALL
        .into_iter()
        .map(|kind| report(entries, kind, today, config))
        .collect()
}
