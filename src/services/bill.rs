//! Bill service
//!
//! Owner-scoped bill management on top of the lifecycle evaluator:
//!
//! - writes evaluate the bill for `today` before persisting
//! - reads that care about status call [`BillService::normalize_overdue`]
//!   first, so stored status is current before anything is listed or summed

use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::error::{TrackerError, TrackerResult};
use crate::models::expense::normalize_note;
use crate::models::{
    Bill, BillCategory, BillFilter, BillId, BillStatus, Money, OwnerId, RecurrencePeriod,
};
use crate::storage::{SortOrder, Storage};

/// Service for bill management
pub struct BillService<'a> {
    storage: &'a Storage,
}

/// Input for creating a bill
#[derive(Debug, Clone)]
pub struct CreateBillInput {
    pub title: String,
    pub amount: Money,
    pub due_date: NaiveDate,
    pub category: BillCategory,
    pub description: Option<String>,
    pub recurring: bool,
    /// Ignored unless `recurring` is set
    pub recurring_period: Option<RecurrencePeriod>,
}

/// Partial update for a bill; `None` leaves a field alone
#[derive(Debug, Clone, Default)]
pub struct BillPatch {
    pub title: Option<String>,
    pub amount: Option<Money>,
    pub due_date: Option<NaiveDate>,
    pub category: Option<BillCategory>,
    /// `Some(None)` clears the description
    pub description: Option<Option<String>>,
    pub recurring: Option<bool>,
    pub recurring_period: Option<RecurrencePeriod>,
    /// Applied before the bill is re-evaluated
    pub status: Option<BillStatus>,
}

impl BillPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.amount.is_none()
            && self.due_date.is_none()
            && self.category.is_none()
            && self.description.is_none()
            && self.recurring.is_none()
            && self.recurring_period.is_none()
            && self.status.is_none()
    }
}

/// Position of a page within a filtered listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// 1-based page number
    pub current: usize,
    #[serde(rename = "total")]
    pub total_pages: usize,
    /// Bills matching the filter across all pages
    pub count: usize,
    pub limit: usize,
}

/// Count and amount of bills in one status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusTally {
    pub count: usize,
    pub total_amount: Money,
}

impl StatusTally {
    fn add(&mut self, amount: Money) {
        self.count += 1;
        self.total_amount += amount;
    }
}

/// Per-status tallies over every bill an owner has
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub pending: StatusTally,
    pub paid: StatusTally,
    pub overdue: StatusTally,
}

impl StatusSummary {
    pub fn from_bills<'b>(bills: impl IntoIterator<Item = &'b Bill>) -> Self {
        let mut summary = Self::default();
        for bill in bills {
            summary.tally_mut(bill.status).add(bill.amount);
        }
        summary
    }

    pub fn get(&self, status: BillStatus) -> StatusTally {
        match status {
            BillStatus::Pending => self.pending,
            BillStatus::Paid => self.paid,
            BillStatus::Overdue => self.overdue,
        }
    }

    fn tally_mut(&mut self, status: BillStatus) -> &mut StatusTally {
        match status {
            BillStatus::Pending => &mut self.pending,
            BillStatus::Paid => &mut self.paid,
            BillStatus::Overdue => &mut self.overdue,
        }
    }
}

/// One page of a bill listing
#[derive(Debug, Clone, Serialize)]
pub struct BillPage {
    pub bills: Vec<Bill>,
    pub pagination: Pagination,
    pub summary: StatusSummary,
}

/// Urgency counts for the upcoming-bills view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingCounts {
    /// All overdue bills
    pub overdue: usize,
    /// Pending bills due today
    pub due_today: usize,
    /// Pending bills due after today and within the window
    pub due_soon: usize,
    /// Bills returned (after the limit)
    pub total: usize,
}

/// Bills needing attention soon
#[derive(Debug, Clone, Serialize)]
pub struct UpcomingBills {
    pub bills: Vec<Bill>,
    #[serde(rename = "summary")]
    pub counts: UpcomingCounts,
}

impl<'a> BillService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a bill; a past due date makes it overdue immediately
    pub fn create(
        &self,
        owner: &OwnerId,
        input: CreateBillInput,
        today: NaiveDate,
    ) -> TrackerResult<Bill> {
        let mut bill = Bill::new(
            owner.clone(),
            input.title,
            input.amount,
            input.due_date,
            input.category,
        );
        if let Some(description) = input.description {
            bill = bill.with_description(description);
        }
        if input.recurring {
            bill.recurring = true;
            bill.recurring_period = input.recurring_period;
        }

        bill.validate()
            .map_err(|e| TrackerError::Validation(e.to_string()))?;
        let bill = bill.evaluated(today);

        self.storage.bills.upsert(bill.clone())?;
        self.storage.bills.save()?;
        self.storage.log_create(&bill)?;

        Ok(bill)
    }

    /// Get one of the owner's bills, evaluated for `today`
    ///
    /// The returned status is the display status; nothing is written.
    pub fn get(&self, owner: &OwnerId, id: BillId, today: NaiveDate) -> TrackerResult<Bill> {
        self.get_stored(owner, id).map(|b| b.evaluated(today))
    }

    fn get_stored(&self, owner: &OwnerId, id: BillId) -> TrackerResult<Bill> {
        self.storage
            .bills
            .get(owner, id)?
            .ok_or_else(|| TrackerError::bill_not_found(id.to_string()))
    }

    /// Find a bill by a user-typed reference (`bill-1a2b3c4d`, full UUID, or prefix)
    pub fn find(&self, owner: &OwnerId, reference: &str, today: NaiveDate) -> TrackerResult<Bill> {
        self.storage
            .bills
            .find_by_reference(owner, reference)?
            .map(|b| b.evaluated(today))
            .ok_or_else(|| TrackerError::bill_not_found(reference))
    }

    /// Flip the owner's stale pending bills to overdue and persist
    ///
    /// Idempotent for a given `today`. Returns how many bills changed; each
    /// change is written to the audit log.
    pub fn normalize_overdue(&self, owner: &OwnerId, today: NaiveDate) -> TrackerResult<usize> {
        let changed = self.storage.bills.mark_overdue(owner, today)?;
        if changed.is_empty() {
            return Ok(0);
        }

        self.storage.bills.save()?;
        self.storage.log_updates(&changed)?;
        Ok(changed.len())
    }

    /// List the owner's matching bills by due date, after sweeping
    pub fn list(
        &self,
        owner: &OwnerId,
        filter: &BillFilter,
        today: NaiveDate,
    ) -> TrackerResult<Vec<Bill>> {
        self.normalize_overdue(owner, today)?;
        self.storage.bills.find(owner, filter, SortOrder::Ascending)
    }

    /// One page of the owner's matching bills plus per-status totals
    pub fn list_page(
        &self,
        owner: &OwnerId,
        filter: &BillFilter,
        page: usize,
        limit: usize,
        today: NaiveDate,
    ) -> TrackerResult<BillPage> {
        if page == 0 {
            return Err(TrackerError::Validation("Page numbers start at 1".into()));
        }
        if limit == 0 {
            return Err(TrackerError::Validation("Page size must be at least 1".into()));
        }

        let matching = self.list(owner, filter, today)?;
        let count = matching.len();
        let summary = StatusSummary::from_bills(&self.storage.bills.get_all(owner)?);

        let bills = matching
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .collect();

        Ok(BillPage {
            bills,
            pagination: Pagination {
                current: page,
                total_pages: count.div_ceil(limit),
                count,
                limit,
            },
            summary,
        })
    }

    /// Overdue bills and pending bills due within `days`, soonest first
    pub fn upcoming(
        &self,
        owner: &OwnerId,
        days: u32,
        limit: usize,
        today: NaiveDate,
    ) -> TrackerResult<UpcomingBills> {
        self.normalize_overdue(owner, today)?;
        let horizon = today
            .checked_add_signed(Duration::days(i64::from(days)))
            .unwrap_or(NaiveDate::MAX);

        let all = self.storage.bills.get_all(owner)?;
        let mut counts = UpcomingCounts::default();
        for bill in &all {
            match bill.status {
                BillStatus::Overdue => counts.overdue += 1,
                BillStatus::Pending if bill.due_date == today => counts.due_today += 1,
                BillStatus::Pending if bill.due_date > today && bill.due_date <= horizon => {
                    counts.due_soon += 1
                }
                _ => {}
            }
        }

        let bills: Vec<_> = all
            .into_iter()
            .filter(|b| match b.status {
                BillStatus::Overdue => true,
                BillStatus::Pending => b.due_date <= horizon,
                BillStatus::Paid => false,
            })
            .take(limit)
            .collect();
        counts.total = bills.len();

        Ok(UpcomingBills { bills, counts })
    }

    /// Apply a partial update, then re-evaluate the status for `today`
    pub fn update(
        &self,
        owner: &OwnerId,
        id: BillId,
        patch: BillPatch,
        today: NaiveDate,
    ) -> TrackerResult<Bill> {
        let mut bill = self.get_stored(owner, id)?;
        if patch.is_empty() {
            return Ok(bill.evaluated(today));
        }
        let before = bill.clone();

        if let Some(title) = patch.title {
            bill.title = title.trim().to_string();
        }
        if let Some(amount) = patch.amount {
            bill.amount = amount;
        }
        if let Some(due_date) = patch.due_date {
            bill.due_date = due_date;
        }
        if let Some(category) = patch.category {
            bill.category = category;
        }
        if let Some(description) = patch.description {
            bill.description = description.and_then(normalize_note);
        }
        if let Some(period) = patch.recurring_period {
            bill.recurring_period = Some(period);
        }
        if let Some(recurring) = patch.recurring {
            bill.recurring = recurring;
        }
        if !bill.recurring {
            bill.recurring_period = None;
        }
        if let Some(status) = patch.status {
            if status == BillStatus::Overdue && bill.due_date >= today {
                return Err(TrackerError::Validation(format!(
                    "Bill '{}' is not overdue until after {}",
                    bill.title, bill.due_date
                )));
            }
            bill.status = status;
        }

        bill.validate()
            .map_err(|e| TrackerError::Validation(e.to_string()))?;
        let mut bill = bill.evaluated(today);
        bill.updated_at = Utc::now();

        self.storage.bills.upsert(bill.clone())?;
        self.storage.bills.save()?;
        self.storage.log_update(&before, &bill)?;

        Ok(bill)
    }

    /// Explicitly settle a bill
    pub fn mark_paid(&self, owner: &OwnerId, id: BillId, today: NaiveDate) -> TrackerResult<Bill> {
        self.update(
            owner,
            id,
            BillPatch {
                status: Some(BillStatus::Paid),
                ..Default::default()
            },
            today,
        )
    }

    /// Explicitly reopen a bill; it lands on overdue if already past due
    pub fn mark_pending(
        &self,
        owner: &OwnerId,
        id: BillId,
        today: NaiveDate,
    ) -> TrackerResult<Bill> {
        self.update(
            owner,
            id,
            BillPatch {
                status: Some(BillStatus::Pending),
                ..Default::default()
            },
            today,
        )
    }

    pub fn delete(&self, owner: &OwnerId, id: BillId) -> TrackerResult<Bill> {
        let bill = self
            .storage
            .bills
            .delete(owner, id)?
            .ok_or_else(|| TrackerError::bill_not_found(id.to_string()))?;

        self.storage.bills.save()?;
        self.storage.log_delete(&bill)?;

        Ok(bill)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::Operation;
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

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2025, 3, 10)
    }

    fn input(title: &str, due: NaiveDate) -> CreateBillInput {
        CreateBillInput {
            title: title.into(),
            amount: Money::from_cents(10000),
            due_date: due,
            category: BillCategory::Utilities,
            description: None,
            recurring: false,
            recurring_period: None,
        }
    }

    #[test]
    fn test_create_past_due_is_overdue() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BillService::new(&storage);

        let bill = service
            .create(&owner("alice"), input("Water", date(2025, 3, 9)), today())
            .unwrap();
        assert_eq!(bill.status, BillStatus::Overdue);

        let stored = storage.bills.get(&owner("alice"), bill.id).unwrap().unwrap();
        assert_eq!(stored.status, BillStatus::Overdue);
    }

    #[test]
    fn test_create_validation() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BillService::new(&storage);

        let mut no_title = input("   ", today());
        no_title.title = "   ".into();
        assert!(service
            .create(&owner("alice"), no_title, today())
            .unwrap_err()
            .is_validation());

        let mut recurring = input("Gym", today());
        recurring.recurring = true;
        assert!(service
            .create(&owner("alice"), recurring, today())
            .unwrap_err()
            .is_validation());

        let mut stray_period = input("Gym", today());
        stray_period.recurring_period = Some(RecurrencePeriod::Monthly);
        let bill = service.create(&owner("alice"), stray_period, today()).unwrap();
        assert!(!bill.recurring);
        assert!(bill.recurring_period.is_none());
    }

    #[test]
    fn test_normalize_overdue_is_scoped_and_idempotent() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BillService::new(&storage);

        let early = date(2025, 3, 1);
        service.create(&owner("alice"), input("Power", date(2025, 3, 5)), early).unwrap();
        service.create(&owner("alice"), input("Rent", date(2025, 3, 20)), early).unwrap();
        service.create(&owner("bob"), input("Phone", date(2025, 3, 2)), early).unwrap();

        assert_eq!(service.normalize_overdue(&owner("alice"), today()).unwrap(), 1);
        assert_eq!(service.normalize_overdue(&owner("alice"), today()).unwrap(), 0);

        let bob = storage.bills.get_all(&owner("bob")).unwrap();
        assert_eq!(bob[0].status, BillStatus::Pending);

        let last = storage.audit().read_all().unwrap().pop().unwrap();
        assert_eq!(last.operation, Operation::Update);
        assert_eq!(last.label.as_deref(), Some("Power"));
    }

    #[test]
    fn test_paid_bill_never_goes_overdue() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BillService::new(&storage);

        let bill = service
            .create(&owner("alice"), input("Rent", date(2025, 3, 20)), date(2025, 3, 1))
            .unwrap();
        service.mark_paid(&owner("alice"), bill.id, date(2025, 3, 1)).unwrap();

        service.normalize_overdue(&owner("alice"), date(2026, 1, 1)).unwrap();
        let after = service.get(&owner("alice"), bill.id, date(2026, 1, 1)).unwrap();
        assert_eq!(after.status, BillStatus::Paid);
    }

    #[test]
    fn test_update_status_then_reevaluate() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BillService::new(&storage);
        let alice = owner("alice");

        let bill = service.create(&alice, input("Power", date(2025, 3, 1)), today()).unwrap();
        assert_eq!(bill.status, BillStatus::Overdue);

        // Reopening a past-due bill lands back on overdue
        let reopened = service.mark_pending(&alice, bill.id, today()).unwrap();
        assert_eq!(reopened.status, BillStatus::Overdue);

        // Moving the due date forward together with an explicit pending works
        let moved = service
            .update(
                &alice,
                bill.id,
                BillPatch {
                    due_date: Some(date(2025, 4, 1)),
                    status: Some(BillStatus::Pending),
                    ..Default::default()
                },
                today(),
            )
            .unwrap();
        assert_eq!(moved.status, BillStatus::Pending);

        // Without an explicit status, overdue stays overdue
        service.normalize_overdue(&alice, date(2025, 4, 2)).unwrap();
        let still = service
            .update(
                &alice,
                bill.id,
                BillPatch {
                    due_date: Some(date(2025, 5, 1)),
                    ..Default::default()
                },
                date(2025, 4, 2),
            )
            .unwrap();
        assert_eq!(still.status, BillStatus::Overdue);
    }

    #[test]
    fn test_explicit_overdue_needs_past_due_date() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BillService::new(&storage);
        let alice = owner("alice");

        let bill = service.create(&alice, input("Insurance", date(2025, 6, 1)), today()).unwrap();
        let overdue = BillPatch {
            status: Some(BillStatus::Overdue),
            ..Default::default()
        };

        let err = service.update(&alice, bill.id, overdue.clone(), today()).unwrap_err();
        assert!(err.is_validation());
        let stored = storage.bills.get(&alice, bill.id).unwrap().unwrap();
        assert_eq!(stored.status, BillStatus::Pending);

        // Due today is still not overdue
        assert!(service
            .update(&alice, bill.id, overdue.clone(), date(2025, 6, 1))
            .unwrap_err()
            .is_validation());

        let late = service.update(&alice, bill.id, overdue, date(2025, 6, 2)).unwrap();
        assert_eq!(late.status, BillStatus::Overdue);
    }

    #[test]
    fn test_status_only_patch_is_persisted() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BillService::new(&storage);
        let alice = owner("alice");

        let bill = service.create(&alice, input("Rent", date(2025, 4, 1)), today()).unwrap();
        service.mark_paid(&alice, bill.id, today()).unwrap();

        let stored = storage.bills.get(&alice, bill.id).unwrap().unwrap();
        assert_eq!(stored.status, BillStatus::Paid);
        let last = storage.audit().read_all().unwrap().pop().unwrap();
        assert_eq!(last.operation, Operation::Update);
    }

    #[test]
    fn test_update_recurrence_rules() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BillService::new(&storage);
        let alice = owner("alice");

        let bill = service.create(&alice, input("Gym", date(2025, 4, 1)), today()).unwrap();

        let monthly = service
            .update(
                &alice,
                bill.id,
                BillPatch {
                    recurring: Some(true),
                    recurring_period: Some(RecurrencePeriod::Monthly),
                    ..Default::default()
                },
                today(),
            )
            .unwrap();
        assert_eq!(monthly.recurring_period, Some(RecurrencePeriod::Monthly));

        let once = service
            .update(
                &alice,
                bill.id,
                BillPatch {
                    recurring: Some(false),
                    ..Default::default()
                },
                today(),
            )
            .unwrap();
        assert!(once.recurring_period.is_none());

        let err = service
            .update(
                &alice,
                bill.id,
                BillPatch {
                    amount: Some(Money::zero()),
                    ..Default::default()
                },
                today(),
            )
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_list_page() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BillService::new(&storage);
        let alice = owner("alice");

        for day in 11..=15 {
            service.create(&alice, input(&format!("Bill {}", day), date(2025, 3, day)), today()).unwrap();
        }
        let paid = service.create(&alice, input("Paid", date(2025, 3, 1)), date(2025, 2, 1)).unwrap();
        service.mark_paid(&alice, paid.id, date(2025, 2, 1)).unwrap();

        let page = service
            .list_page(&alice, &BillFilter::new().status(BillStatus::Pending), 2, 2, today())
            .unwrap();

        let titles: Vec<_> = page.bills.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Bill 13", "Bill 14"]);
        assert_eq!(
            page.pagination,
            Pagination {
                current: 2,
                total_pages: 3,
                count: 5,
                limit: 2
            }
        );
        assert_eq!(page.summary.pending.count, 5);
        assert_eq!(page.summary.paid.count, 1);
        assert_eq!(page.summary.paid.total_amount.cents(), 10000);

        assert!(service
            .list_page(&alice, &BillFilter::new(), 0, 10, today())
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_upcoming() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BillService::new(&storage);
        let alice = owner("alice");
        let early = date(2025, 3, 1);

        service.create(&alice, input("Late", date(2025, 3, 8)), early).unwrap();
        service.create(&alice, input("Today", today()), early).unwrap();
        service.create(&alice, input("Soon", date(2025, 3, 15)), early).unwrap();
        service.create(&alice, input("Later", date(2025, 4, 15)), early).unwrap();
        let paid = service.create(&alice, input("Paid", date(2025, 3, 12)), early).unwrap();
        service.mark_paid(&alice, paid.id, early).unwrap();

        let upcoming = service.upcoming(&alice, 7, 10, today()).unwrap();
        let titles: Vec<_> = upcoming.bills.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Late", "Today", "Soon"]);
        assert_eq!(
            upcoming.counts,
            UpcomingCounts {
                overdue: 1,
                due_today: 1,
                due_soon: 1,
                total: 3
            }
        );

        let limited = service.upcoming(&alice, 7, 1, today()).unwrap();
        assert_eq!(limited.bills.len(), 1);
        assert_eq!(limited.counts.overdue, 1);
        assert_eq!(limited.counts.total, 1);

        // A horizon past the last representable date covers everything pending
        let unbounded = service.upcoming(&alice, u32::MAX, 10, today()).unwrap();
        assert_eq!(unbounded.bills.len(), 4);
        assert_eq!(unbounded.counts.due_soon, 2);
    }

    #[test]
    fn test_foreign_bill_is_not_found() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BillService::new(&storage);

        let bill = service.create(&owner("alice"), input("Rent", today()), today()).unwrap();
        assert!(service.get(&owner("bob"), bill.id, today()).unwrap_err().is_not_found());
        assert!(service.mark_paid(&owner("bob"), bill.id, today()).unwrap_err().is_not_found());
        assert!(service.delete(&owner("bob"), bill.id).unwrap_err().is_not_found());
        assert!(service.delete(&owner("alice"), bill.id).is_ok());
    }
}
