//! Expense repository for JSON storage
//!
//! Manages loading and saving expenses to expenses.json, with an owner index
//! so every query only ever touches one owner's entries.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::TrackerError;
use crate::models::{Expense, ExpenseFilter, ExpenseId, OwnerId};

use super::file_io::{read_entries, write_entries};
use super::{read_guard, write_guard, SortOrder};

/// Repository for expense persistence with an owner index
pub struct ExpenseRepository {
    path: PathBuf,
    data: RwLock<HashMap<ExpenseId, Expense>>,
    /// Index: owner -> expense ids
    by_owner: RwLock<HashMap<OwnerId, Vec<ExpenseId>>>,
}

impl ExpenseRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_owner: RwLock::new(HashMap::new()),
        }
    }

    /// Load expenses from disk and rebuild the owner index
    pub fn load(&self) -> Result<(), TrackerError> {
        let expenses: Vec<Expense> = read_entries(&self.path)?;

        let mut data = write_guard(&self.data)?;
        let mut by_owner = write_guard(&self.by_owner)?;
        data.clear();
        by_owner.clear();

        for expense in expenses {
            by_owner
                .entry(expense.owner.clone())
                .or_default()
                .push(expense.id);
            data.insert(expense.id, expense);
        }

        Ok(())
    }

    /// Save expenses to disk, newest first
    pub fn save(&self) -> Result<(), TrackerError> {
        let data = read_guard(&self.data)?;

        let mut expenses: Vec<_> = data.values().cloned().collect();
        expenses.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));

        write_entries(&self.path, &expenses)
    }

    /// Get an expense by ID, only if `owner` owns it
    pub fn get(&self, owner: &OwnerId, id: ExpenseId) -> Result<Option<Expense>, TrackerError> {
        let data = read_guard(&self.data)?;
        Ok(data.get(&id).filter(|e| &e.owner == owner).cloned())
    }

    /// Find the owner's expenses matching `filter`, ordered by date
    ///
    /// Entries with the same date keep creation order (oldest first when
    /// ascending, newest first when descending).
    pub fn find(
        &self,
        owner: &OwnerId,
        filter: &ExpenseFilter,
        order: SortOrder,
    ) -> Result<Vec<Expense>, TrackerError> {
        let data = read_guard(&self.data)?;
        let by_owner = read_guard(&self.by_owner)?;

        let ids = by_owner.get(owner).map(|v| v.as_slice()).unwrap_or(&[]);
        let mut expenses: Vec<_> = ids
            .iter()
            .filter_map(|id| data.get(id))
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();

        expenses.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));
        if order == SortOrder::Descending {
            expenses.reverse();
        }
        Ok(expenses)
    }

    /// Resolve a user-typed reference (full id or short prefix) within one owner
    ///
    /// Ambiguous prefixes resolve to nothing.
    pub fn find_by_reference(
        &self,
        owner: &OwnerId,
        reference: &str,
    ) -> Result<Option<Expense>, TrackerError> {
        let data = read_guard(&self.data)?;
        let by_owner = read_guard(&self.by_owner)?;

        let mut hits = by_owner
            .get(owner)
            .into_iter()
            .flatten()
            .filter(|id| id.matches_reference(reference));

        match (hits.next(), hits.next()) {
            (Some(id), None) => Ok(data.get(id).cloned()),
            _ => Ok(None),
        }
    }

    /// Insert or update an expense
    pub fn upsert(&self, expense: Expense) -> Result<(), TrackerError> {
        let mut data = write_guard(&self.data)?;
        let mut by_owner = write_guard(&self.by_owner)?;

        if let Some(old) = data.get(&expense.id) {
            if let Some(ids) = by_owner.get_mut(&old.owner) {
                ids.retain(|&id| id != expense.id);
            }
        }

        by_owner
            .entry(expense.owner.clone())
            .or_default()
            .push(expense.id);
        data.insert(expense.id, expense);
        Ok(())
    }

    /// Delete an expense owned by `owner`, returning it if it existed
    pub fn delete(&self, owner: &OwnerId, id: ExpenseId) -> Result<Option<Expense>, TrackerError> {
        let mut data = write_guard(&self.data)?;
        let mut by_owner = write_guard(&self.by_owner)?;

        if !data.get(&id).map_or(false, |e| &e.owner == owner) {
            return Ok(None);
        }

        let removed = data.remove(&id);
        if let Some(ids) = by_owner.get_mut(owner) {
            ids.retain(|&eid| eid != id);
        }
        Ok(removed)
    }

    /// Count an owner's expenses
    pub fn count(&self, owner: &OwnerId) -> Result<usize, TrackerError> {
        let by_owner = read_guard(&self.by_owner)?;
        Ok(by_owner.get(owner).map_or(0, Vec::len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DateRange, ExpenseCategory, Money};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, ExpenseRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = ExpenseRepository::new(temp_dir.path().join("expenses.json"));
        repo.load().unwrap();
        (temp_dir, repo)
    }

    fn owner(name: &str) -> OwnerId {
        OwnerId::new(name).unwrap()
    }

    fn expense(who: &str, cat: ExpenseCategory, cents: i64, day: u32) -> Expense {
        Expense::new(
            owner(who),
            cat,
            Money::from_cents(cents),
            NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
        )
    }

    #[test]
    fn test_get_is_owner_scoped() {
        let (_temp_dir, repo) = create_test_repo();
        let e = expense("alice", ExpenseCategory::Food, 500, 3);
        let id = e.id;
        repo.upsert(e).unwrap();

        assert!(repo.get(&owner("alice"), id).unwrap().is_some());
        assert!(repo.get(&owner("bob"), id).unwrap().is_none());
    }

    #[test]
    fn test_find_filters_and_sorts() {
        let (_temp_dir, repo) = create_test_repo();
        repo.upsert(expense("alice", ExpenseCategory::Food, 100, 10)).unwrap();
        repo.upsert(expense("alice", ExpenseCategory::Shopping, 200, 5)).unwrap();
        repo.upsert(expense("alice", ExpenseCategory::Food, 300, 20)).unwrap();
        repo.upsert(expense("bob", ExpenseCategory::Food, 999, 15)).unwrap();

        let all = repo
            .find(&owner("alice"), &ExpenseFilter::new(), SortOrder::Descending)
            .unwrap();
        let amounts: Vec<i64> = all.iter().map(|e| e.amount.cents()).collect();
        assert_eq!(amounts, vec![300, 100, 200]);

        let food = repo
            .find(
                &owner("alice"),
                &ExpenseFilter::new()
                    .categories([ExpenseCategory::Food])
                    .date_range(DateRange::new(
                        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
                    )),
                SortOrder::Ascending,
            )
            .unwrap();
        assert_eq!(food.len(), 1);
        assert_eq!(food[0].amount.cents(), 100);
    }

    #[test]
    fn test_delete_other_owner_is_noop() {
        let (_temp_dir, repo) = create_test_repo();
        let e = expense("alice", ExpenseCategory::Food, 500, 3);
        let id = e.id;
        repo.upsert(e).unwrap();

        assert!(repo.delete(&owner("bob"), id).unwrap().is_none());
        assert_eq!(repo.count(&owner("alice")).unwrap(), 1);

        assert!(repo.delete(&owner("alice"), id).unwrap().is_some());
        assert_eq!(repo.count(&owner("alice")).unwrap(), 0);
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        let e = expense("alice", ExpenseCategory::Education, 4200, 9).with_note("books");
        let id = e.id;
        repo.upsert(e).unwrap();
        repo.save().unwrap();

        let repo2 = ExpenseRepository::new(temp_dir.path().join("expenses.json"));
        repo2.load().unwrap();

        let loaded = repo2.get(&owner("alice"), id).unwrap().unwrap();
        assert_eq!(loaded.amount.cents(), 4200);
        assert_eq!(loaded.note.as_deref(), Some("books"));
        assert_eq!(repo2.count(&owner("alice")).unwrap(), 1);
    }

    #[test]
    fn test_find_by_reference() {
        let (_temp_dir, repo) = create_test_repo();
        let e = expense("alice", ExpenseCategory::Food, 500, 3);
        let id = e.id;
        repo.upsert(e).unwrap();

        let found = repo
            .find_by_reference(&owner("alice"), &id.to_string())
            .unwrap();
        assert_eq!(found.map(|e| e.id), Some(id));

        assert!(repo
            .find_by_reference(&owner("bob"), &id.to_string())
            .unwrap()
            .is_none());
    }
}
