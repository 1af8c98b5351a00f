//! End-to-end checks through the public API

use alcohol_ledger::persistence::{self, MemoryKeyValueStore};
use alcohol_ledger::{
    bucket_by_day, classify, grams_of_alcohol, summarize, DrinkEntry, DrinkTracker, DrinkType,
    KeyValueStore, LedgerConfig, LedgerError, MonthlyDivisor, PeriodKind, Severity,
};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn three_beers_and_a_dry_day() -> DrinkTracker {
    let mut tracker = DrinkTracker::in_memory();
    let beers = DrinkEntry::batch(DrinkType::Beer, 350.0, 5.0, day(2024, 1, 1), 3).unwrap();
    tracker.add_batch(beers).unwrap();
    tracker.add(DrinkEntry::abstinence(day(2024, 1, 2))).unwrap();
    tracker
}

#[test]
fn converter_examples() {
    assert_eq!(grams_of_alcohol(350.0, 5.0), 13.8);
    assert_eq!(grams_of_alcohol(500.0, 7.0), 27.6);
    assert_eq!(grams_of_alcohol(0.0, 5.0), 0.0);
    assert_eq!(grams_of_alcohol(350.0, 0.0), 0.0);
}

#[test]
fn three_beers_exceed_daily_limit() {
    let tracker = three_beers_and_a_dry_day();

    let summary = tracker.summarize(day(2024, 1, 1), day(2024, 1, 2));
    assert_eq!(summary.count, 3);
    assert!((summary.total_grams - 41.4).abs() < 1e-9);

    let first_day = tracker.summarize(day(2024, 1, 1), day(2024, 1, 1));
    assert_eq!(classify(first_day.total_grams, PeriodKind::Daily), Severity::High);
}

#[test]
fn marker_on_drinking_day_is_rejected() {
    let mut tracker = DrinkTracker::in_memory();
    tracker
        .add(DrinkEntry::new(DrinkType::Beer, 350.0, 5.0, day(2024, 1, 1)).unwrap())
        .unwrap();
    let before = tracker.list_by_date(day(2024, 1, 1));

    let result = tracker.add(DrinkEntry::abstinence(day(2024, 1, 1)));
    assert!(matches!(result, Err(LedgerError::Conflict(_))));
    assert_eq!(tracker.list_by_date(day(2024, 1, 1)), before);
}

#[test]
fn classification_boundary_is_exclusive() {
    assert_eq!(classify(40.0, PeriodKind::Daily), Severity::Moderate);
    assert_eq!(classify(40.01, PeriodKind::Daily), Severity::High);
}

#[test]
fn persist_and_reload_round_trip() {
    let tracker = three_beers_and_a_dry_day();
    let mut kv = MemoryKeyValueStore::new();
    persistence::save(&mut kv, "drinks", tracker.store()).unwrap();

    let stored = kv.get("drinks").unwrap().unwrap();
    let reloaded = DrinkTracker::open(LedgerConfig::default(), Box::new(kv)).unwrap();

    assert!(stored.starts_with('['));
    assert_eq!(reloaded.list_all(), tracker.list_all());
    assert!(reloaded.last_persistence_error().is_none());
}

#[test]
fn bucketing_is_idempotent() {
    let tracker = three_beers_and_a_dry_day();
    let entries = tracker.list_all();
    assert_eq!(bucket_by_day(&entries), bucket_by_day(&entries));
    assert_eq!(tracker.bucket_by_day(), tracker.bucket_by_day());
}

#[test]
fn aggregation_is_additive_across_a_partition() {
    let mut tracker = DrinkTracker::in_memory();
    let kinds = [DrinkType::Beer, DrinkType::Wine, DrinkType::Spirits, DrinkType::Highball];
    for (i, d) in (1..=31).enumerate() {
        let date = day(2024, 3, d);
        if d % 5 == 0 {
            tracker.add(DrinkEntry::abstinence(date)).unwrap();
            continue;
        }
        let kind = kinds[i % kinds.len()];
        tracker
            .add(DrinkEntry::new(kind, 50.0 + 10.0 * d as f64, 4.5 + d as f64, date).unwrap())
            .unwrap();
    }

    let entries = tracker.list_all();
    let (a, c) = (day(2024, 3, 1), day(2024, 3, 31));
    let whole = summarize(&entries, a, c);
    for b in 1..31 {
        let left = summarize(&entries, a, day(2024, 3, b));
        let right = summarize(&entries, day(2024, 3, b + 1), c);
        assert!((whole.total_grams - left.total_grams - right.total_grams).abs() < 1e-6);
        assert_eq!(whole.count, left.count + right.count);
        assert_eq!(whole.abstinent_days, left.abstinent_days + right.abstinent_days);
    }
}

#[test]
fn monthly_average_follows_divisor_policy() {
    let entries = vec![DrinkEntry::new(DrinkType::Wine, 750.0, 12.0, day(2023, 2, 14)).unwrap()];
    // 750 * 0.12 * 0.789 = 71.01
    let total = 71.0;

    let calendar = alcohol_ledger::aggregator::report(
        &entries,
        PeriodKind::Monthly,
        day(2023, 2, 20),
        &LedgerConfig::default(),
    )
    .unwrap();
    assert_eq!(calendar.summary.total_grams, total);
    assert!((calendar.average_per_day - total / 28.0).abs() < 1e-9);

    let legacy = LedgerConfig {
        monthly_divisor: MonthlyDivisor::Fixed30,
        ..Default::default()
    };
    let fixed = alcohol_ledger::aggregator::report(&entries, PeriodKind::Monthly, day(2023, 2, 20), &legacy)
        .unwrap();
    assert!((fixed.average_per_day - total / 30.0).abs() < 1e-9);
}

#[test]
fn edit_moves_entry_without_changing_identity() {
    let mut tracker = three_beers_and_a_dry_day();
    let id = tracker.list_by_date(day(2024, 1, 1))[0].id();

    let moved = DrinkEntry::new(DrinkType::Beer, 500.0, 7.0, day(2024, 1, 3)).unwrap();
    tracker.update(id, moved).unwrap();

    let entry = tracker.get(id).unwrap();
    assert_eq!(entry.date(), day(2024, 1, 3));
    assert_eq!(entry.alcohol_grams(), 27.6);
    assert_eq!(tracker.list_by_date(day(2024, 1, 1)).len(), 2);

    let onto_dry_day = DrinkEntry::new(DrinkType::Beer, 500.0, 7.0, day(2024, 1, 2)).unwrap();
    assert!(matches!(tracker.update(id, onto_dry_day), Err(LedgerError::Conflict(_))));

    tracker.remove(id).unwrap();
    assert!(matches!(tracker.remove(id), Err(LedgerError::NotFound(_))));
}
