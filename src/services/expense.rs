//! Expense service
//!
//! Owner-scoped CRUD for expenses. Every write validates, persists, and
//! lands in the audit log.

use chrono::{NaiveDate, Utc};

use crate::error::{TrackerError, TrackerResult};
use crate::models::{Expense, ExpenseCategory, ExpenseFilter, ExpenseId, Money, OwnerId};
use crate::storage::{SortOrder, Storage};

/// Service for expense management
pub struct ExpenseService<'a> {
    storage: &'a Storage,
}

/// Input for recording a new expense
#[derive(Debug, Clone)]
pub struct CreateExpenseInput {
    pub category: ExpenseCategory,
    pub amount: Money,
    pub date: NaiveDate,
    pub note: Option<String>,
}

/// Partial update for an expense; `None` leaves a field alone
#[derive(Debug, Clone, Default)]
pub struct ExpensePatch {
    pub category: Option<ExpenseCategory>,
    pub amount: Option<Money>,
    pub date: Option<NaiveDate>,
    /// `Some(None)` clears the note
    pub note: Option<Option<String>>,
}

impl ExpensePatch {
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.amount.is_none() && self.date.is_none() && self.note.is_none()
    }
}

impl<'a> ExpenseService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Record a new expense
    pub fn create(&self, owner: &OwnerId, input: CreateExpenseInput) -> TrackerResult<Expense> {
        let mut expense = Expense::new(owner.clone(), input.category, input.amount, input.date);
        if let Some(note) = input.note {
            expense = expense.with_note(note);
        }

        expense
            .validate()
            .map_err(|e| TrackerError::Validation(e.to_string()))?;

        self.storage.expenses.upsert(expense.clone())?;
        self.storage.expenses.save()?;
        self.storage.log_create(&expense)?;

        Ok(expense)
    }

    /// Get one of the owner's expenses
    ///
    /// A foreign expense is reported exactly like a missing one.
    pub fn get(&self, owner: &OwnerId, id: ExpenseId) -> TrackerResult<Expense> {
        self.storage
            .expenses
            .get(owner, id)?
            .ok_or_else(|| TrackerError::expense_not_found(id.to_string()))
    }

    /// Find an expense by a user-typed reference (`exp-1a2b3c4d`, full UUID, or prefix)
    pub fn find(&self, owner: &OwnerId, reference: &str) -> TrackerResult<Expense> {
        self.storage
            .expenses
            .find_by_reference(owner, reference)?
            .ok_or_else(|| TrackerError::expense_not_found(reference))
    }

    /// List the owner's matching expenses, newest first
    pub fn list(&self, owner: &OwnerId, filter: &ExpenseFilter) -> TrackerResult<Vec<Expense>> {
        self.storage
            .expenses
            .find(owner, filter, SortOrder::Descending)
    }

    pub fn update(
        &self,
        owner: &OwnerId,
        id: ExpenseId,
        patch: ExpensePatch,
    ) -> TrackerResult<Expense> {
        let mut expense = self.get(owner, id)?;
        if patch.is_empty() {
            return Ok(expense);
        }
        let before = expense.clone();

        if let Some(category) = patch.category {
            expense.category = category;
        }
        if let Some(amount) = patch.amount {
            expense.amount = amount;
        }
        if let Some(date) = patch.date {
            expense.date = date;
        }
        if let Some(note) = patch.note {
            expense.note = note.and_then(crate::models::expense::normalize_note);
        }

        expense
            .validate()
            .map_err(|e| TrackerError::Validation(e.to_string()))?;
        expense.updated_at = Utc::now();

        self.storage.expenses.upsert(expense.clone())?;
        self.storage.expenses.save()?;
        self.storage.log_update(&before, &expense)?;

        Ok(expense)
    }

    pub fn delete(&self, owner: &OwnerId, id: ExpenseId) -> TrackerResult<Expense> {
        let expense = self
            .storage
            .expenses
            .delete(owner, id)?
            .ok_or_else(|| TrackerError::expense_not_found(id.to_string()))?;

        self.storage.expenses.save()?;
        self.storage.log_delete(&expense)?;

        Ok(expense)
    }

    pub fn count(&self, owner: &OwnerId) -> TrackerResult<usize> {
        self.storage.expenses.count(owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::TrackerPaths;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TrackerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        (temp_dir, storage)
    }

    fn owner(name: &str) -> OwnerId {
        OwnerId::new(name).unwrap()
    }

    fn lunch() -> CreateExpenseInput {
        CreateExpenseInput {
            category: ExpenseCategory::Food,
            amount: Money::from_cents(1250),
            date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            note: Some("lunch".into()),
        }
    }

    #[test]
    fn test_create_and_get() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage);

        let expense = service.create(&owner("alice"), lunch()).unwrap();
        let fetched = service.get(&owner("alice"), expense.id).unwrap();

        assert_eq!(fetched.amount.cents(), 1250);
        assert_eq!(fetched.note.as_deref(), Some("lunch"));
        assert_eq!(storage.audit().read_all().unwrap().len(), 1);
    }

    #[test]
    fn test_create_rejects_non_positive_amount() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage);

        let mut input = lunch();
        input.amount = Money::zero();
        let err = service.create(&owner("alice"), input).unwrap_err();

        assert!(err.is_validation());
        assert_eq!(service.count(&owner("alice")).unwrap(), 0);
    }

    #[test]
    fn test_foreign_expense_is_not_found() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage);

        let expense = service.create(&owner("alice"), lunch()).unwrap();

        assert!(service.get(&owner("bob"), expense.id).unwrap_err().is_not_found());
        assert!(service
            .update(&owner("bob"), expense.id, ExpensePatch::default())
            .unwrap_err()
            .is_not_found());
        assert!(service.delete(&owner("bob"), expense.id).unwrap_err().is_not_found());
        assert_eq!(service.count(&owner("alice")).unwrap(), 1);
    }

    #[test]
    fn test_update_applies_patch_and_logs_diff() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage);

        let expense = service.create(&owner("alice"), lunch()).unwrap();
        let updated = service
            .update(
                &owner("alice"),
                expense.id,
                ExpensePatch {
                    amount: Some(Money::from_cents(2000)),
                    note: Some(None),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.amount.cents(), 2000);
        assert!(updated.note.is_none());
        assert_eq!(updated.category, ExpenseCategory::Food);

        let log = storage.audit().read_all().unwrap();
        let changes = log.last().unwrap().changes.clone().unwrap();
        assert!(changes.contains("amount: 12.5 -> 20.0"));
    }

    #[test]
    fn test_update_rejects_bad_amount() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage);

        let expense = service.create(&owner("alice"), lunch()).unwrap();
        let err = service
            .update(
                &owner("alice"),
                expense.id,
                ExpensePatch {
                    amount: Some(Money::from_cents(-1)),
                    ..Default::default()
                },
            )
            .unwrap_err();

        assert!(err.is_validation());
        assert_eq!(service.get(&owner("alice"), expense.id).unwrap().amount.cents(), 1250);
    }

    #[test]
    fn test_delete() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage);

        let expense = service.create(&owner("alice"), lunch()).unwrap();
        service.delete(&owner("alice"), expense.id).unwrap();

        assert!(service.get(&owner("alice"), expense.id).unwrap_err().is_not_found());
    }
}
