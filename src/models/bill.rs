//! Bill model
//!
//! A payable obligation with a due date. Status follows a small lifecycle:
//!
//! - `pending` becomes `overdue` once the due date has passed (evaluated
//!   lazily, never by a timer)
//! - `paid` is only ever set explicitly and is never changed automatically
//! - `overdue` goes back to `pending` only by explicit update

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::BillCategory;
use super::expense::normalize_note;
use super::ids::{BillId, OwnerId};
use super::labels::labeled_enum;
use super::money::Money;

labeled_enum! {
    /// Payment status of a bill
    #[derive(Default)]
    pub enum BillStatus as "bill status" {
        /// Not yet paid, due date not passed
        #[default]
        Pending => "pending" / "Pending" | "upcoming",
        Paid => "paid" / "Paid",
        /// Not paid and the due date has passed
        Overdue => "overdue" / "Overdue",
    }
}

impl BillStatus {
    /// The status a bill with this stored status should have on `today`
    ///
    /// Only `pending` moves, and only when the due date is strictly before
    /// `today`. A bill due today is still pending.
    pub fn evaluate(self, due_date: NaiveDate, today: NaiveDate) -> BillStatus {
        match self {
            BillStatus::Pending if due_date < today => BillStatus::Overdue,
            other => other,
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Paid)
    }
}

labeled_enum! {
    /// How often a recurring bill comes due
    pub enum RecurrencePeriod as "recurrence period" {
        Monthly => "monthly" / "Monthly",
        Quarterly => "quarterly" / "Quarterly",
        Yearly => "yearly" / "Yearly" | "annual",
    }
}

/// A bill owned by one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    /// Unique identifier
    pub id: BillId,

    /// The user this bill belongs to
    pub owner: OwnerId,

    pub title: String,

    /// Amount due (always positive)
    pub amount: Money,

    pub due_date: NaiveDate,

    pub category: BillCategory,

    #[serde(default)]
    pub status: BillStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether the bill repeats
    #[serde(default)]
    pub recurring: bool,

    /// Required when `recurring` is set, absent otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_period: Option<RecurrencePeriod>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Bill {
    /// Create a new, pending, non-recurring bill
    pub fn new(
        owner: OwnerId,
        title: impl Into<String>,
        amount: Money,
        due_date: NaiveDate,
        category: BillCategory,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: BillId::new(),
            owner,
            title: title.into().trim().to_string(),
            amount,
            due_date,
            category,
            status: BillStatus::Pending,
            description: None,
            recurring: false,
            recurring_period: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attach a description, dropping it if blank
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = normalize_note(description.into());
        self
    }

    /// Make the bill recurring with the given period
    pub fn recurring_every(mut self, period: RecurrencePeriod) -> Self {
        self.recurring = true;
        self.recurring_period = Some(period);
        self
    }

    /// Return this bill with its status evaluated for `today`
    ///
    /// Pure: only `status` may differ from the input.
    pub fn evaluated(mut self, today: NaiveDate) -> Self {
        self.status = self.status.evaluate(self.due_date, today);
        self
    }

    /// Evaluate the status in place, bumping `updated_at` if it changed
    ///
    /// Returns whether the status changed.
    pub fn refresh_status(&mut self, today: NaiveDate) -> bool {
        let next = self.status.evaluate(self.due_date, today);
        if next == self.status {
            return false;
        }
        self.status = next;
        self.updated_at = Utc::now();
        true
    }

    /// Explicitly set the status
    pub fn set_status(&mut self, status: BillStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    pub fn mark_paid(&mut self) {
        self.set_status(BillStatus::Paid);
    }

    pub fn is_paid(&self) -> bool {
        self.status.is_settled()
    }

    /// Whole days from `today` until the due date (negative once past due)
    pub fn days_until_due(&self, today: NaiveDate) -> i64 {
        (self.due_date - today).num_days()
    }

    /// Validate the bill
    pub fn validate(&self) -> Result<(), BillValidationError> {
        if self.title.trim().is_empty() {
            return Err(BillValidationError::EmptyTitle);
        }
        if !self.amount.is_positive() {
            return Err(BillValidationError::NonPositiveAmount(self.amount));
        }
        if self.recurring && self.recurring_period.is_none() {
            return Err(BillValidationError::MissingRecurrencePeriod);
        }
        if !self.recurring && self.recurring_period.is_some() {
            return Err(BillValidationError::PeriodWithoutRecurrence);
        }
        Ok(())
    }
}

impl fmt::Display for Bill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} [{}]",
            self.due_date.format("%Y-%m-%d"),
            self.title,
            self.amount,
            self.status
        )
    }
}

/// Validation errors for bills
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillValidationError {
    EmptyTitle,
    NonPositiveAmount(Money),
    MissingRecurrencePeriod,
    PeriodWithoutRecurrence,
}

impl fmt::Display for BillValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "Title is required"),
            Self::NonPositiveAmount(amount) => {
                write!(f, "Amount must be greater than 0 (got {})", amount)
            }
            Self::MissingRecurrencePeriod => {
                write!(f, "Recurring bills need a recurrence period")
            }
            Self::PeriodWithoutRecurrence => {
                write!(f, "Recurrence period set on a non-recurring bill")
            }
        }
    }
}

impl std::error::Error for BillValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> OwnerId {
        OwnerId::new("alice").unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bill_due(due: NaiveDate) -> Bill {
        Bill::new(owner(), "Electric", Money::from_cents(12000), due, BillCategory::Utilities)
    }

    #[test]
    fn test_pending_past_due_becomes_overdue() {
        let today = date(2025, 3, 10);
        let bill = bill_due(date(2025, 3, 9)).with_description("March");
        let before = bill.clone();

        let evaluated = bill.evaluated(today);

        assert_eq!(evaluated.status, BillStatus::Overdue);
        assert_eq!(evaluated.amount, before.amount);
        assert_eq!(evaluated.title, before.title);
        assert_eq!(evaluated.due_date, before.due_date);
        assert_eq!(evaluated.description, before.description);
        assert_eq!(evaluated.updated_at, before.updated_at);
    }

    #[test]
    fn test_due_today_or_later_unchanged() {
        let today = date(2025, 3, 10);
        assert_eq!(bill_due(today).evaluated(today).status, BillStatus::Pending);
        assert_eq!(
            bill_due(date(2025, 4, 1)).evaluated(today).status,
            BillStatus::Pending
        );
    }

    #[test]
    fn test_paid_never_transitions() {
        let today = date(2025, 3, 10);
        for due in [date(2020, 1, 1), date(2025, 3, 9), today, date(2030, 1, 1)] {
            let mut bill = bill_due(due);
            bill.mark_paid();
            assert_eq!(bill.clone().evaluated(today).status, BillStatus::Paid);
            assert!(!bill.refresh_status(today));
        }
    }

    #[test]
    fn test_overdue_stays_overdue() {
        let today = date(2025, 3, 10);
        let mut bill = bill_due(date(2025, 5, 1));
        bill.status = BillStatus::Overdue;
        // No automatic un-overdue, even when the due date moved into the future
        assert_eq!(bill.evaluated(today).status, BillStatus::Overdue);
    }

    #[test]
    fn test_refresh_status_is_idempotent() {
        let today = date(2025, 3, 10);
        let mut bill = bill_due(date(2025, 1, 1));
        assert!(bill.refresh_status(today));
        assert!(!bill.refresh_status(today));
        assert_eq!(bill.status, BillStatus::Overdue);
    }

    #[test]
    fn test_upcoming_alias() {
        assert_eq!("upcoming".parse::<BillStatus>().unwrap(), BillStatus::Pending);
        let status: BillStatus = serde_json::from_str("\"upcoming\"").unwrap();
        assert_eq!(status, BillStatus::Pending);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"pending\"");
    }

    #[test]
    fn test_validation() {
        let due = date(2025, 3, 10);
        assert!(bill_due(due).validate().is_ok());

        let untitled = Bill::new(owner(), "  ", Money::from_cents(100), due, BillCategory::Rent);
        assert_eq!(untitled.validate(), Err(BillValidationError::EmptyTitle));

        let mut free = bill_due(due);
        free.amount = Money::zero();
        assert!(matches!(
            free.validate(),
            Err(BillValidationError::NonPositiveAmount(_))
        ));

        let mut recurring = bill_due(due);
        recurring.recurring = true;
        assert_eq!(
            recurring.validate(),
            Err(BillValidationError::MissingRecurrencePeriod)
        );

        let monthly = bill_due(due).recurring_every(RecurrencePeriod::Monthly);
        assert!(monthly.validate().is_ok());
    }

    #[test]
    fn test_days_until_due() {
        let today = date(2025, 3, 10);
        assert_eq!(bill_due(date(2025, 3, 17)).days_until_due(today), 7);
        assert_eq!(bill_due(date(2025, 3, 8)).days_until_due(today), -2);
    }
}
