//! Bill repository for JSON storage
//!
//! Manages loading and saving bills to bills.json. Stored status is whatever
//! was last written; lazy overdue evaluation happens in the service layer,
//! and `mark_overdue` is the explicit bulk sweep.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::NaiveDate;

use crate::error::TrackerError;
use crate::models::{Bill, BillFilter, BillId, OwnerId};

use super::file_io::{read_entries, write_entries};
use super::{read_guard, write_guard, SortOrder};

/// Repository for bill persistence with an owner index
pub struct BillRepository {
    path: PathBuf,
    data: RwLock<HashMap<BillId, Bill>>,
    by_owner: RwLock<HashMap<OwnerId, Vec<BillId>>>,
}

impl BillRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_owner: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), TrackerError> {
        let bills: Vec<Bill> = read_entries(&self.path)?;

        let mut data = write_guard(&self.data)?;
        let mut by_owner = write_guard(&self.by_owner)?;
        data.clear();
        by_owner.clear();

        for bill in bills {
            by_owner.entry(bill.owner.clone()).or_default().push(bill.id);
            data.insert(bill.id, bill);
        }

        Ok(())
    }

    /// Save bills to disk, ordered by due date
    pub fn save(&self) -> Result<(), TrackerError> {
        let data = read_guard(&self.data)?;

        let mut bills: Vec<_> = data.values().cloned().collect();
        bills.sort_by(|a, b| a.due_date.cmp(&b.due_date).then(a.created_at.cmp(&b.created_at)));

        write_entries(&self.path, &bills)
    }

    pub fn get(&self, owner: &OwnerId, id: BillId) -> Result<Option<Bill>, TrackerError> {
        let data = read_guard(&self.data)?;
        Ok(data.get(&id).filter(|b| &b.owner == owner).cloned())
    }

    /// Find the owner's bills matching `filter`, ordered by due date
    ///
    /// The filter sees stored status; callers wanting evaluated status must
    /// evaluate before filtering on it.
    pub fn find(
        &self,
        owner: &OwnerId,
        filter: &BillFilter,
        order: SortOrder,
    ) -> Result<Vec<Bill>, TrackerError> {
        let data = read_guard(&self.data)?;
        let by_owner = read_guard(&self.by_owner)?;

        let mut bills: Vec<_> = by_owner
            .get(owner)
            .into_iter()
            .flatten()
            .filter_map(|id| data.get(id))
            .filter(|b| filter.matches(b))
            .cloned()
            .collect();

        bills.sort_by(|a, b| a.due_date.cmp(&b.due_date).then(a.created_at.cmp(&b.created_at)));
        if order == SortOrder::Descending {
            bills.reverse();
        }
        Ok(bills)
    }

    /// Every bill the owner has, in due-date order
    pub fn get_all(&self, owner: &OwnerId) -> Result<Vec<Bill>, TrackerError> {
        self.find(owner, &BillFilter::new(), SortOrder::Ascending)
    }

    /// Resolve a user-typed reference (full id or short prefix) within one owner
    pub fn find_by_reference(
        &self,
        owner: &OwnerId,
        reference: &str,
    ) -> Result<Option<Bill>, TrackerError> {
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

    pub fn upsert(&self, bill: Bill) -> Result<(), TrackerError> {
        let mut data = write_guard(&self.data)?;
        let mut by_owner = write_guard(&self.by_owner)?;

        if let Some(old) = data.get(&bill.id) {
            if let Some(ids) = by_owner.get_mut(&old.owner) {
                ids.retain(|&id| id != bill.id);
            }
        }

        by_owner.entry(bill.owner.clone()).or_default().push(bill.id);
        data.insert(bill.id, bill);
        Ok(())
    }

    pub fn delete(&self, owner: &OwnerId, id: BillId) -> Result<Option<Bill>, TrackerError> {
        let mut data = write_guard(&self.data)?;
        let mut by_owner = write_guard(&self.by_owner)?;

        if !data.get(&id).map_or(false, |b| &b.owner == owner) {
            return Ok(None);
        }

        let removed = data.remove(&id);
        if let Some(ids) = by_owner.get_mut(owner) {
            ids.retain(|&bid| bid != id);
        }
        Ok(removed)
    }

    /// Flip every pending, past-due bill of `owner` to overdue
    ///
    /// Returns `(before, after)` for each bill that changed. Bills already
    /// overdue or paid are untouched, so a second call on the same day
    /// returns nothing.
    pub fn mark_overdue(
        &self,
        owner: &OwnerId,
        today: NaiveDate,
    ) -> Result<Vec<(Bill, Bill)>, TrackerError> {
        let mut data = write_guard(&self.data)?;
        let by_owner = read_guard(&self.by_owner)?;

        let mut changed = Vec::new();
        for id in by_owner.get(owner).into_iter().flatten() {
            if let Some(bill) = data.get_mut(id) {
                let before = bill.clone();
                if bill.refresh_status(today) {
                    changed.push((before, bill.clone()));
                }
            }
        }

        changed.sort_by(|(a, _), (b, _)| a.due_date.cmp(&b.due_date));
        Ok(changed)
    }

    pub fn count(&self, owner: &OwnerId) -> Result<usize, TrackerError> {
        let by_owner = read_guard(&self.by_owner)?;
        Ok(by_owner.get(owner).map_or(0, Vec::len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BillCategory, BillStatus, Money};
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, BillRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = BillRepository::new(temp_dir.path().join("bills.json"));
        repo.load().unwrap();
        (temp_dir, repo)
    }

    fn owner(name: &str) -> OwnerId {
        OwnerId::new(name).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bill(who: &str, title: &str, due: NaiveDate) -> Bill {
        Bill::new(owner(who), title, Money::from_cents(5000), due, BillCategory::Utilities)
    }

    #[test]
    fn test_find_by_status_and_order() {
        let (_temp_dir, repo) = create_test_repo();
        repo.upsert(bill("alice", "Water", date(2025, 3, 20))).unwrap();
        repo.upsert(bill("alice", "Power", date(2025, 3, 5))).unwrap();
        let mut paid = bill("alice", "Rent", date(2025, 3, 1));
        paid.mark_paid();
        repo.upsert(paid).unwrap();

        let pending = repo
            .find(
                &owner("alice"),
                &BillFilter::new().status(BillStatus::Pending),
                SortOrder::Ascending,
            )
            .unwrap();
        let titles: Vec<_> = pending.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Power", "Water"]);
    }

    #[test]
    fn test_mark_overdue_sweep() {
        let (_temp_dir, repo) = create_test_repo();
        let today = date(2025, 3, 10);
        repo.upsert(bill("alice", "Late", date(2025, 3, 1))).unwrap();
        repo.upsert(bill("alice", "Today", today)).unwrap();
        let mut paid = bill("alice", "Paid", date(2025, 2, 1));
        paid.mark_paid();
        repo.upsert(paid).unwrap();
        repo.upsert(bill("bob", "Other", date(2025, 1, 1))).unwrap();

        let changed = repo.mark_overdue(&owner("alice"), today).unwrap();
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].0.status, BillStatus::Pending);
        assert_eq!(changed[0].1.status, BillStatus::Overdue);
        assert_eq!(changed[0].1.title, "Late");

        assert!(repo.mark_overdue(&owner("alice"), today).unwrap().is_empty());

        let bob = repo.get_all(&owner("bob")).unwrap();
        assert_eq!(bob[0].status, BillStatus::Pending);
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        let b = bill("alice", "Internet", date(2025, 4, 1))
            .recurring_every(crate::models::RecurrencePeriod::Monthly);
        let id = b.id;
        repo.upsert(b).unwrap();
        repo.save().unwrap();

        let repo2 = BillRepository::new(temp_dir.path().join("bills.json"));
        repo2.load().unwrap();
        let loaded = repo2.get(&owner("alice"), id).unwrap().unwrap();
        assert!(loaded.recurring);
        assert_eq!(loaded.title, "Internet");
    }

    #[test]
    fn test_owner_isolation() {
        let (_temp_dir, repo) = create_test_repo();
        let b = bill("alice", "Phone", date(2025, 4, 1));
        let id = b.id;
        repo.upsert(b).unwrap();

        assert!(repo.get(&owner("bob"), id).unwrap().is_none());
        assert!(repo.delete(&owner("bob"), id).unwrap().is_none());
        assert_eq!(repo.count(&owner("alice")).unwrap(), 1);
        assert_eq!(repo.count(&owner("bob")).unwrap(), 0);
    }
}
