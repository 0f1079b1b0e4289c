//! Dashboard summary
//!
//! The at-a-glance view: this month's spending, bills coming due in the
//! next thirty days and the recent monthly spending series.

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::Serialize;

use crate::error::{TrackerError, TrackerResult};
use crate::models::{BillFilter, BillStatus, DateRange, ExpenseFilter, Money, OwnerId};
use crate::services::BillService;
use crate::storage::{SortOrder, Storage};

use super::aggregation::chronological_months;
use super::ledger::Period;

/// Days ahead counted as "upcoming" on the dashboard
pub const DASHBOARD_UPCOMING_DAYS: i64 = 30;

/// Months of history in the spending series
pub const DASHBOARD_HISTORY_MONTHS: u32 = 6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpcomingTotal {
    pub total: Money,
    pub count: usize,
}

/// One point of the spending series
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthPoint {
    /// `Mon YYYY`
    pub month: String,
    pub amount: Money,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_expenses: Money,
    pub upcoming_bills: UpcomingTotal,
    pub monthly_expenses: Vec<MonthPoint>,
    pub period: Period,
}

impl DashboardSummary {
    /// Build the dashboard for `today`
    ///
    /// Overdue bills are swept first so they never count as upcoming.
    pub fn generate(storage: &Storage, owner: &OwnerId, today: NaiveDate) -> TrackerResult<Self> {
        let invalid = || TrackerError::Validation(format!("Date out of range: {}", today));

        let month = DateRange::month(today.year(), today.month()).ok_or_else(invalid)?;
        let total_expenses: Money = storage
            .expenses
            .find(owner, &ExpenseFilter::new().date_range(month), SortOrder::Ascending)?
            .iter()
            .map(|e| e.amount)
            .sum();

        BillService::new(storage).normalize_overdue(owner, today)?;
        let horizon = today
            .checked_add_signed(Duration::days(DASHBOARD_UPCOMING_DAYS))
            .ok_or_else(invalid)?;
        let upcoming = storage.bills.find(
            owner,
            &BillFilter::new()
                .status(BillStatus::Pending)
                .due_range(DateRange::new(today, horizon)),
            SortOrder::Ascending,
        )?;
        let upcoming_bills = UpcomingTotal {
            total: upcoming.iter().map(|b| b.amount).sum(),
            count: upcoming.len(),
        };

        let since = today
            .checked_sub_months(Months::new(DASHBOARD_HISTORY_MONTHS))
            .ok_or_else(invalid)?;
        let recent = storage.expenses.find(
            owner,
            &ExpenseFilter::new().date_range(DateRange {
                start: Some(since),
                end: None,
            }),
            SortOrder::Ascending,
        )?;
        let monthly_expenses = chronological_months(recent.iter().map(|e| (e.date, e.amount)))
            .into_iter()
            .map(|m| MonthPoint {
                month: m.short_label(),
                amount: m.total,
                count: m.count,
            })
            .collect();

        Ok(Self {
            total_expenses,
            upcoming_bills,
            monthly_expenses,
            period: month.into(),
        })
    }

    pub fn format_terminal(&self, currency: &str) -> String {
        let mut out = String::new();
        let m = |amount: Money| amount.format_with_symbol(currency);

        out.push_str("Dashboard\n");
        out.push_str(&"=".repeat(40));
        out.push('\n');
        out.push_str(&format!("{:<24} {:>14}\n", "Spent this month", m(self.total_expenses)));
        out.push_str(&format!(
            "{:<24} {:>14}\n",
            format!("Upcoming bills ({})", self.upcoming_bills.count),
            m(self.upcoming_bills.total)
        ));

        if !self.monthly_expenses.is_empty() {
            out.push_str("\nRecent months\n");
            let peak = self
                .monthly_expenses
                .iter()
                .map(|p| p.amount.cents())
                .max()
                .unwrap_or(0);
            for point in &self.monthly_expenses {
                out.push_str(&format!(
                    "{:<9} {:>12}  {}\n",
                    point.month,
                    m(point.amount),
                    crate::display::format_bar(point.amount.cents(), peak, 20)
                ));
            }
        }

        out
    }
}
