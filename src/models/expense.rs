//! Expense model
//!
//! A single recorded spend owned by one user. Expenses never change on their
//! own; they are edited or deleted only on request.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::ExpenseCategory;
use super::ids::{ExpenseId, OwnerId};
use super::money::Money;

/// A recorded expense
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    /// Unique identifier
    pub id: ExpenseId,

    /// The user this expense belongs to
    pub owner: OwnerId,

    pub category: ExpenseCategory,

    /// Amount spent (always positive)
    pub amount: Money,

    /// Calendar date of the spend
    pub date: NaiveDate,

    /// Free-text note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Create a new expense
    pub fn new(owner: OwnerId, category: ExpenseCategory, amount: Money, date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: ExpenseId::new(),
            owner,
            category,
            amount,
            date,
            note: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attach a note, dropping it if blank
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = normalize_note(note.into());
        self
    }

    /// Validate the expense
    pub fn validate(&self) -> Result<(), ExpenseValidationError> {
        if !self.amount.is_positive() {
            return Err(ExpenseValidationError::NonPositiveAmount(self.amount));
        }
        Ok(())
    }
}

/// Trim a note; blank notes are stored as absent
pub(crate) fn normalize_note(note: String) -> Option<String> {
    let trimmed = note.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl fmt::Display for Expense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.date.format("%Y-%m-%d"),
            self.category,
            self.amount
        )
    }
}

/// Validation errors for expenses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpenseValidationError {
    NonPositiveAmount(Money),
}

impl fmt::Display for ExpenseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount(amount) => {
                write!(f, "Amount must be greater than 0 (got {})", amount)
            }
        }
    }
}

impl std::error::Error for ExpenseValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> OwnerId {
        OwnerId::new("alice").unwrap()
    }

    #[test]
    fn test_new_expense() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let expense = Expense::new(owner(), ExpenseCategory::Food, Money::from_cents(1250), date)
            .with_note("  lunch  ");

        assert_eq!(expense.owner.as_str(), "alice");
        assert_eq!(expense.note.as_deref(), Some("lunch"));
        assert_eq!(expense.created_at, expense.updated_at);
        assert!(expense.validate().is_ok());
    }

    #[test]
    fn test_blank_note_dropped() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let expense =
            Expense::new(owner(), ExpenseCategory::Food, Money::from_cents(100), date).with_note("   ");
        assert!(expense.note.is_none());
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let zero = Expense::new(owner(), ExpenseCategory::Other, Money::zero(), date);
        assert!(matches!(
            zero.validate(),
            Err(ExpenseValidationError::NonPositiveAmount(_))
        ));

        let negative = Expense::new(owner(), ExpenseCategory::Other, Money::from_cents(-5), date);
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_display() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let expense = Expense::new(owner(), ExpenseCategory::Shopping, Money::from_cents(5000), date);
        assert_eq!(expense.to_string(), "2025-01-15 shopping $50.00");
    }
}
