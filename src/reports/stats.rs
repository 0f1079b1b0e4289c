//! Expense statistics
//!
//! Per-category and per-month figures over an optional date window.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{TrackerError, TrackerResult};
use crate::models::{DateRange, ExpenseCategory, ExpenseFilter, Money, OwnerId};
use crate::storage::{SortOrder, Storage};

use super::aggregation::{category_breakdown, chronological_months, CategoryStat};

/// One month of expense activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthStat {
    /// `YYYY-MM`
    pub month: String,
    pub amount: Money,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalStats {
    pub total_amount: Money,
    pub total_count: usize,
    pub avg_amount: Money,
}

/// Expense statistics for one owner
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseStats {
    pub category_stats: Vec<CategoryStat<ExpenseCategory>>,
    pub monthly_stats: Vec<MonthStat>,
    pub total_stats: TotalStats,
}

impl ExpenseStats {
    /// Compute statistics, optionally bounded on either side
    pub fn generate(
        storage: &Storage,
        owner: &OwnerId,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> TrackerResult<Self> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(TrackerError::Validation(format!(
                    "Start date {} is after end date {}",
                    s, e
                )));
            }
        }

        let range = DateRange { start, end };
        let expenses = storage.expenses.find(
            owner,
            &ExpenseFilter::new().date_range(range),
            SortOrder::Ascending,
        )?;

        let total: Money = expenses.iter().map(|e| e.amount).sum();
        let monthly_stats = chronological_months(expenses.iter().map(|e| (e.date, e.amount)))
            .into_iter()
            .map(|m| MonthStat {
                month: m.key(),
                amount: m.total,
                count: m.count,
            })
            .collect();

        Ok(Self {
            category_stats: category_breakdown(expenses.iter().map(|e| (e.category, e.amount))),
            monthly_stats,
            total_stats: TotalStats {
                total_amount: total,
                total_count: expenses.len(),
                avg_amount: total.average(expenses.len()),
            },
        })
    }

    pub fn format_terminal(&self, currency: &str) -> String {
        let mut out = String::new();
        let m = |amount: Money| amount.format_with_symbol(currency);

        out.push_str("Expense Statistics\n");
        out.push_str(&"=".repeat(60));
        out.push('\n');
        out.push_str(&format!(
            "Total: {}   Count: {}   Average: {}\n\n",
            m(self.total_stats.total_amount),
            self.total_stats.total_count,
            m(self.total_stats.avg_amount)
        ));

        out.push_str(&format!(
            "{:<20} {:>12} {:>6} {:>12}\n",
            "Category", "Total", "Count", "Average"
        ));
        out.push_str(&"-".repeat(60));
        out.push('\n');
        for stat in &self.category_stats {
            out.push_str(&format!(
                "{:<20} {:>12} {:>6} {:>12}\n",
                stat.category.title(),
                m(stat.total),
                stat.count,
                m(stat.average)
            ));
        }

        if !self.monthly_stats.is_empty() {
            out.push_str(&format!("\n{:<10} {:>12} {:>6}\n", "Month", "Amount", "Count"));
            for month in &self.monthly_stats {
                out.push_str(&format!(
                    "{:<10} {:>12} {:>6}\n",
                    month.month,
                    m(month.amount),
                    month.count
                ));
            }
        }

        out
    }
}
