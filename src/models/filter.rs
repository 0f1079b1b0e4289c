//! Typed query filters for the ledger store
//!
//! Each filter field is optional; an unset field matches everything.

use chrono::{Datelike, NaiveDate};

use super::bill::{Bill, BillStatus};
use super::category::{BillCategory, ExpenseCategory};
use super::expense::Expense;

/// An inclusive calendar-date window, open on either side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Whether `date` falls inside the window (bounds inclusive)
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }

    /// The whole calendar month containing `year`/`month`
    pub fn month(year: i32, month: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        Some(Self::new(start, next.pred_opt()?))
    }

    /// The whole calendar year
    pub fn year(year: i32) -> Option<Self> {
        Some(Self::new(
            NaiveDate::from_ymd_opt(year, 1, 1)?,
            NaiveDate::from_ymd_opt(year, 12, 31)?,
        ))
    }

    /// The same window `years` calendar years earlier
    ///
    /// Feb 29 maps to Feb 28 in non-leap years, and an end on the last day
    /// of February stays on the last day of February.
    pub fn shifted_back_years(&self, years: i32) -> Self {
        Self {
            start: self.start.map(|d| shift_years(d, -years)),
            end: self.end.map(|d| {
                let shifted = shift_years(d, -years);
                if is_last_day_of_february(d) {
                    last_day_of_february(shifted.year()).unwrap_or(shifted)
                } else {
                    shifted
                }
            }),
        }
    }
}

fn shift_years(date: NaiveDate, delta: i32) -> NaiveDate {
    let year = date.year() + delta;
    NaiveDate::from_ymd_opt(year, date.month(), date.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, date.month(), date.day() - 1))
        .unwrap_or(date)
}

fn is_last_day_of_february(date: NaiveDate) -> bool {
    date.month() == 2 && date.succ_opt().map_or(false, |next| next.month() == 3)
}

fn last_day_of_february(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 3, 1)?.pred_opt()
}

/// Filter for expense queries
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    /// Allowed categories; empty means all
    pub categories: Vec<ExpenseCategory>,
    pub dates: DateRange,
    /// Case-insensitive substring match on the note
    pub search: Option<String>,
}

impl ExpenseFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn categories(mut self, categories: impl IntoIterator<Item = ExpenseCategory>) -> Self {
        self.categories = categories.into_iter().collect();
        self
    }

    pub fn date_range(mut self, range: DateRange) -> Self {
        self.dates = range;
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn matches(&self, expense: &Expense) -> bool {
        (self.categories.is_empty() || self.categories.contains(&expense.category))
            && self.dates.contains(expense.date)
            && self.search.as_deref().map_or(true, |needle| {
                contains_ignore_case(expense.note.as_deref(), needle)
            })
    }
}

/// Filter for bill queries
#[derive(Debug, Clone, Default)]
pub struct BillFilter {
    /// Allowed categories; empty means all
    pub categories: Vec<BillCategory>,
    /// Allowed statuses; empty means all
    pub statuses: Vec<BillStatus>,
    /// Window on the due date
    pub due: DateRange,
    /// Case-insensitive substring match on title or description
    pub search: Option<String>,
}

impl BillFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn categories(mut self, categories: impl IntoIterator<Item = BillCategory>) -> Self {
        self.categories = categories.into_iter().collect();
        self
    }

    pub fn status(mut self, status: BillStatus) -> Self {
        self.statuses = vec![status];
        self
    }

    pub fn statuses(mut self, statuses: impl IntoIterator<Item = BillStatus>) -> Self {
        self.statuses = statuses.into_iter().collect();
        self
    }

    pub fn due_range(mut self, range: DateRange) -> Self {
        self.due = range;
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn matches(&self, bill: &Bill) -> bool {
        (self.categories.is_empty() || self.categories.contains(&bill.category))
            && (self.statuses.is_empty() || self.statuses.contains(&bill.status))
            && self.due.contains(bill.due_date)
            && self.search.as_deref().map_or(true, |needle| {
                contains_ignore_case(Some(&bill.title), needle)
                    || contains_ignore_case(bill.description.as_deref(), needle)
            })
    }
}

fn contains_ignore_case(haystack: Option<&str>, needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    haystack.map_or(false, |h| h.to_lowercase().contains(&needle))
}
