//! Drink record store
//!
//! An in-memory collection of drink entries addressed by [`EntryId`]. The store
//! enforces the no-drink-day rules: a date carries either drinks or a single
//! abstinence marker, never both.
//!
//! Insertion order carries no meaning; every listing comes back sorted by date.

use crate::error::LedgerError;
use crate::types::{DrinkEntry, EntryId};
use chrono::NaiveDate;

/// Collection of drink entries for one user session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrinkStore {
    entries: Vec<DrinkEntry>,
}

impl DrinkStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry and return its id.
    ///
    /// Fails with [`LedgerError::Conflict`] when the entry's date already holds
    /// an abstinence marker, or when a marker is added to a date with entries.
    pub fn add(&mut self, entry: DrinkEntry) -> Result<EntryId, LedgerError> {
        entry.validate()?;
        let id = entry.id();
        if self.get(id).is_some() {
            return Err(LedgerError::Conflict(format!("entry {id} already exists")));
        }
        self.check_conflicts(&entry, None)?;
        tracing::debug!(id = %id, date = %entry.date(), drink_type = %entry.drink_type(), "Added drink entry");
        self.entries.push(entry);
        Ok(id)
    }

    /// Add several entries at once. Either all of them are stored or none.
    pub fn add_batch(&mut self, entries: Vec<DrinkEntry>) -> Result<Vec<EntryId>, LedgerError> {
        let mut staged = self.clone();
        let mut ids = Vec::with_capacity(entries.len());
        for entry in entries {
            ids.push(staged.add(entry)?);
        }
        *self = staged;
        Ok(ids)
    }

    /// Remove the entry with `id`, returning it
    pub fn remove(&mut self, id: EntryId) -> Result<DrinkEntry, LedgerError> {
        let index = self.position(id)?;
        let removed = self.entries.swap_remove(index);
        tracing::debug!(id = %id, date = %removed.date(), "Removed drink entry");
        Ok(removed)
    }

    /// Replace the entry with `id` by `replacement`, keeping the id.
    ///
    /// The replacement is validated and checked against the other entries on
    /// its (possibly new) date. On error the store is left untouched.
    pub fn update(&mut self, id: EntryId, replacement: DrinkEntry) -> Result<(), LedgerError> {
        let index = self.position(id)?;
        let replacement = replacement.with_id(id);
        replacement.validate()?;
        self.check_conflicts(&replacement, Some(id))?;
        tracing::debug!(id = %id, date = %replacement.date(), "Updated drink entry");
        self.entries[index] = replacement;
        Ok(())
    }

    pub fn get(&self, id: EntryId) -> Option<&DrinkEntry> {
        self.entries.iter().find(|e| e.id() == id)
    }

    /// Snapshot of every entry, sorted by date
    pub fn list_all(&self) -> Vec<DrinkEntry> {
        let mut all = self.entries.clone();
        all.sort_by_key(|e| e.date());
        all
    }

    /// Entries logged on `date`
    pub fn list_by_date(&self, date: NaiveDate) -> Vec<DrinkEntry> {
        self.entries
            .iter()
            .filter(|e| e.date() == date)
            .cloned()
            .collect()
    }

    /// Borrow the entries in storage order
    pub fn entries(&self) -> &[DrinkEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, id: EntryId) -> Result<usize, LedgerError> {
        self.entries
            .iter()
            .position(|e| e.id() == id)
            .ok_or(LedgerError::NotFound(id))
    }

    fn check_conflicts(
        &self,
        candidate: &DrinkEntry,
        ignore: Option<EntryId>,
    ) -> Result<(), LedgerError> {
        let date = candidate.date();
        let mut same_day = self
            .entries
            .iter()
            .filter(|e| e.date() == date && Some(e.id()) != ignore);

        if candidate.is_abstinence_marker() {
            if let Some(existing) = same_day.next() {
                let reason = if existing.is_abstinence_marker() {
                    "is already marked as a no-drink day"
                } else {
                    "already has drinks logged"
                };
                return Err(LedgerError::Conflict(format!("{date} {reason}")));
            }
        } else if same_day.any(|e| e.is_abstinence_marker()) {
            return Err(LedgerError::Conflict(format!(
                "{date} is marked as a no-drink day"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DrinkType;
    use pretty_assertions::assert_eq;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn beer(date: NaiveDate) -> DrinkEntry {
        DrinkEntry::new(DrinkType::Beer, 350.0, 5.0, date).unwrap()
    }

    /// An entry built straight from its serialized fields, skipping `new`
    fn raw_entry(volume_ml: f64, alcohol_grams: f64, date: &str) -> DrinkEntry {
        serde_json::from_value(serde_json::json!({
            "id": EntryId::new(),
            "drink_type": "Beer",
            "volume_ml": volume_ml,
            "percentage_abv": 5.0,
            "alcohol_grams": alcohol_grams,
            "date": date,
        }))
        .unwrap()
    }

    #[test]
    fn test_add_and_list_by_date() {
        let mut store = DrinkStore::new();
        store.add(beer(day(2024, 1, 1))).unwrap();
        store.add(beer(day(2024, 1, 1))).unwrap();
        store.add(beer(day(2024, 1, 3))).unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.list_by_date(day(2024, 1, 1)).len(), 2);
        assert!(store.list_by_date(day(2024, 1, 2)).is_empty());
    }

    #[test]
    fn test_list_all_sorted_by_date() {
        let mut store = DrinkStore::new();
        store.add(beer(day(2024, 2, 10))).unwrap();
        store.add(beer(day(2024, 1, 5))).unwrap();
        store.add(beer(day(2024, 1, 20))).unwrap();

        let dates: Vec<NaiveDate> = store.list_all().iter().map(|e| e.date()).collect();
        assert_eq!(dates, vec![day(2024, 1, 5), day(2024, 1, 20), day(2024, 2, 10)]);
    }

    #[test]
    fn test_marker_on_drink_day_conflicts() {
        let mut store = DrinkStore::new();
        store.add(beer(day(2024, 1, 1))).unwrap();
        let before = store.list_by_date(day(2024, 1, 1));

        let result = store.add(DrinkEntry::abstinence(day(2024, 1, 1)));
        assert!(matches!(result, Err(LedgerError::Conflict(_))));
        assert_eq!(store.list_by_date(day(2024, 1, 1)), before);
    }

    #[test]
    fn test_second_marker_conflicts() {
        let mut store = DrinkStore::new();
        store.add(DrinkEntry::abstinence(day(2024, 1, 2))).unwrap();
        let result = store.add(DrinkEntry::abstinence(day(2024, 1, 2)));
        assert!(matches!(result, Err(LedgerError::Conflict(_))));
    }

    #[test]
    fn test_drink_on_marked_day_conflicts() {
        let mut store = DrinkStore::new();
        store.add(DrinkEntry::abstinence(day(2024, 1, 2))).unwrap();
        let result = store.add(beer(day(2024, 1, 2)));
        assert!(matches!(result, Err(LedgerError::Conflict(_))));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_duplicate_id_conflicts() {
        let mut store = DrinkStore::new();
        let entry = beer(day(2024, 1, 1));
        store.add(entry.clone()).unwrap();
        assert!(matches!(store.add(entry), Err(LedgerError::Conflict(_))));
    }

    #[test]
    fn test_remove_by_id() {
        let mut store = DrinkStore::new();
        let keep = store.add(beer(day(2024, 1, 1))).unwrap();
        let dropped = store.add(beer(day(2024, 1, 1))).unwrap();

        let removed = store.remove(dropped).unwrap();
        assert_eq!(removed.id(), dropped);
        assert!(store.get(keep).is_some());
        assert!(store.get(dropped).is_none());

        assert!(matches!(store.remove(dropped), Err(LedgerError::NotFound(id)) if id == dropped));
    }

    #[test]
    fn test_update_preserves_id() {
        let mut store = DrinkStore::new();
        let id = store.add(beer(day(2024, 1, 1))).unwrap();

        let wine = DrinkEntry::new(DrinkType::Wine, 150.0, 12.0, day(2024, 1, 4)).unwrap();
        store.update(id, wine).unwrap();

        let updated = store.get(id).unwrap();
        assert_eq!(updated.drink_type(), DrinkType::Wine);
        assert_eq!(updated.date(), day(2024, 1, 4));
        assert_eq!(updated.alcohol_grams(), 14.2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_can_turn_only_drink_into_marker() {
        let mut store = DrinkStore::new();
        let id = store.add(beer(day(2024, 1, 1))).unwrap();
        store.update(id, DrinkEntry::abstinence(day(2024, 1, 1))).unwrap();
        assert!(store.get(id).unwrap().is_abstinence_marker());
    }

    #[test]
    fn test_update_conflict_leaves_store_unchanged() {
        let mut store = DrinkStore::new();
        store.add(DrinkEntry::abstinence(day(2024, 1, 2))).unwrap();
        let id = store.add(beer(day(2024, 1, 1))).unwrap();
        let snapshot = store.clone();

        let result = store.update(id, beer(day(2024, 1, 2)));
        assert!(matches!(result, Err(LedgerError::Conflict(_))));
        assert_eq!(store, snapshot);
    }

    #[test]
    fn test_add_rejects_invalid_entry() {
        let mut store = DrinkStore::new();
        store.add(beer(day(2024, 1, 1))).unwrap();
        let snapshot = store.clone();

        let inflated = raw_entry(350.0, 99.0, "2024-01-01");
        assert!(matches!(store.add(inflated), Err(LedgerError::Validation(_))));
        let negative = raw_entry(-350.0, -13.8, "2024-01-02");
        assert!(matches!(store.add(negative), Err(LedgerError::Validation(_))));
        assert_eq!(store, snapshot);
    }

    #[test]
    fn test_update_rejects_invalid_replacement() {
        let mut store = DrinkStore::new();
        let id = store.add(beer(day(2024, 1, 1))).unwrap();
        let snapshot = store.clone();

        let inflated = raw_entry(350.0, 99.0, "2024-01-01");
        assert!(matches!(store.update(id, inflated), Err(LedgerError::Validation(_))));
        let negative = raw_entry(-350.0, -13.8, "2024-01-03");
        assert!(matches!(store.update(id, negative), Err(LedgerError::Validation(_))));
        assert_eq!(store, snapshot);
    }

    #[test]
    fn test_update_unknown_id() {
        let mut store = DrinkStore::new();
        let result = store.update(EntryId::new(), beer(day(2024, 1, 1)));
        assert!(matches!(result, Err(LedgerError::NotFound(_))));
    }

    #[test]
    fn test_add_batch_is_atomic() {
        let mut store = DrinkStore::new();
        store.add(DrinkEntry::abstinence(day(2024, 1, 2))).unwrap();

        let mut batch = DrinkEntry::batch(DrinkType::Beer, 350.0, 5.0, day(2024, 1, 1), 2).unwrap();
        batch.push(beer(day(2024, 1, 2)));
        assert!(store.add_batch(batch).is_err());
        assert_eq!(store.len(), 1);

        let batch = DrinkEntry::batch(DrinkType::Beer, 350.0, 5.0, day(2024, 1, 1), 3).unwrap();
        let ids = store.add_batch(batch).unwrap();
        assert_eq!(ids.len(), 3);
        assert_eq!(store.list_by_date(day(2024, 1, 1)).len(), 3);
    }
}
