//! Aggregation engine
//!
//! Pure grouping functions over already-filtered ledger entries. Nothing here
//! reads storage; the report assembler feeds entries in and packages the
//! results.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::models::{Bill, BillCategory, BillStatus, Category, Money};

use super::trend::growth_percentage;

/// Short English month names, January first
pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Totals for one category
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStat<C> {
    pub category: C,
    pub total: Money,
    pub count: usize,
    /// `total / count`, rounded to the cent
    #[serde(rename = "avgAmount")]
    pub average: Money,
    /// Share of the grand total, 0 when the grand total is 0
    pub percentage: f64,
}

/// Category totals for bills, with a per-status count
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillCategoryStat {
    #[serde(flatten)]
    pub stat: CategoryStat<BillCategory>,
    pub paid_count: usize,
    pub pending_count: usize,
    pub overdue_count: usize,
}

/// Group `(category, amount)` pairs by category
///
/// Sorted by descending total. Categories with equal totals keep the order
/// in which they first appeared in the input.
pub fn category_breakdown<C, I>(entries: I) -> Vec<CategoryStat<C>>
where
    C: Category,
    I: IntoIterator<Item = (C, Money)>,
{
    let mut order: Vec<(C, Money, usize)> = Vec::new();
    let mut index: HashMap<C, usize> = HashMap::new();

    for (category, amount) in entries {
        let slot = *index.entry(category).or_insert_with(|| {
            order.push((category, Money::zero(), 0));
            order.len() - 1
        });
        order[slot].1 += amount;
        order[slot].2 += 1;
    }

    let grand_total: Money = order.iter().map(|(_, total, _)| *total).sum();

    let mut stats: Vec<_> = order
        .into_iter()
        .map(|(category, total, count)| CategoryStat {
            category,
            total,
            count,
            average: total.average(count),
            percentage: total.percent_of(grand_total),
        })
        .collect();

    // sort_by is stable
    stats.sort_by(|a, b| b.total.cmp(&a.total));
    stats
}

/// Category breakdown for bills, including paid/pending/overdue counts
pub fn bill_breakdown<'a, I>(bills: I) -> Vec<BillCategoryStat>
where
    I: IntoIterator<Item = &'a Bill>,
{
    let bills: Vec<&Bill> = bills.into_iter().collect();
    let mut status_counts: HashMap<BillCategory, [usize; 3]> = HashMap::new();
    for bill in &bills {
        let counts = status_counts.entry(bill.category).or_default();
        counts[status_slot(bill.status)] += 1;
    }

    category_breakdown(bills.iter().map(|b| (b.category, b.amount)))
        .into_iter()
        .map(|stat| {
            let [paid, pending, overdue] =
                status_counts.get(&stat.category).copied().unwrap_or_default();
            BillCategoryStat {
                stat,
                paid_count: paid,
                pending_count: pending,
                overdue_count: overdue,
            }
        })
        .collect()
}

fn status_slot(status: BillStatus) -> usize {
    match status {
        BillStatus::Paid => 0,
        BillStatus::Pending => 1,
        BillStatus::Overdue => 2,
    }
}

/// Number of bills in each status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusBreakdown {
    pub pending: usize,
    pub paid: usize,
    pub overdue: usize,
}

pub fn status_breakdown<'a>(bills: impl IntoIterator<Item = &'a Bill>) -> StatusBreakdown {
    let mut breakdown = StatusBreakdown::default();
    for bill in bills {
        match bill.status {
            BillStatus::Pending => breakdown.pending += 1,
            BillStatus::Paid => breakdown.paid += 1,
            BillStatus::Overdue => breakdown.overdue += 1,
        }
    }
    breakdown
}

/// Sum amounts into twelve Jan..Dec slots, ignoring the year
///
/// Entries from different years that share a month land in the same slot.
pub fn month_totals<I>(entries: I) -> [Money; 12]
where
    I: IntoIterator<Item = (NaiveDate, Money)>,
{
    let mut totals = [Money::zero(); 12];
    for (date, amount) in entries {
        totals[date.month0() as usize] += amount;
    }
    totals
}

/// One month of the current-year vs previous-year comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyComparison {
    pub month: &'static str,
    pub current_year: Money,
    pub previous_year: Money,
    pub growth: Money,
    pub growth_percentage: f64,
}

/// Pair up two twelve-slot month series
pub fn monthly_comparison(current: &[Money; 12], previous: &[Money; 12]) -> Vec<MonthlyComparison> {
    MONTH_NAMES
        .iter()
        .zip(current.iter().zip(previous.iter()))
        .map(|(&month, (&cur, &prev))| MonthlyComparison {
            month,
            current_year: cur,
            previous_year: prev,
            growth: cur - prev,
            growth_percentage: growth_percentage(cur, prev),
        })
        .collect()
}

/// Sum amounts per calendar year
pub fn yearly_totals<I>(entries: I) -> BTreeMap<i32, Money>
where
    I: IntoIterator<Item = (NaiveDate, Money)>,
{
    let mut totals = BTreeMap::new();
    for (date, amount) in entries {
        *totals.entry(date.year()).or_insert_with(Money::zero) += amount;
    }
    totals
}

/// One year in a multi-year series
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyComparison {
    pub year: i32,
    pub total: Money,
    /// Change from the previous listed year (the first year compares to 0)
    pub growth: Money,
    pub growth_percentage: f64,
}

/// Years ascending, each compared with the year listed before it
pub fn yearly_comparison(totals: &BTreeMap<i32, Money>) -> Vec<YearlyComparison> {
    let mut previous = Money::zero();
    totals
        .iter()
        .map(|(&year, &total)| {
            let row = YearlyComparison {
                year,
                total,
                growth: total - previous,
                growth_percentage: growth_percentage(total, previous),
            };
            previous = total;
            row
        })
        .collect()
}

/// Total and count for one calendar month of one year
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyStat {
    pub year: i32,
    /// 1-based month
    pub month: u32,
    pub total: Money,
    pub count: usize,
}

impl MonthlyStat {
    /// `YYYY-MM`
    pub fn key(&self) -> String {
        format!("{}-{:02}", self.year, self.month)
    }

    /// `Mon YYYY`
    pub fn short_label(&self) -> String {
        let name = MONTH_NAMES
            .get(self.month.saturating_sub(1) as usize)
            .copied()
            .unwrap_or("???");
        format!("{} {}", name, self.year)
    }
}

/// A chronological per-month series, oldest first, only months with entries
pub fn chronological_months<I>(entries: I) -> Vec<MonthlyStat>
where
    I: IntoIterator<Item = (NaiveDate, Money)>,
{
    let mut buckets: BTreeMap<(i32, u32), (Money, usize)> = BTreeMap::new();
    for (date, amount) in entries {
        let bucket = buckets
            .entry((date.year(), date.month()))
            .or_insert((Money::zero(), 0));
        bucket.0 += amount;
        bucket.1 += 1;
    }

    buckets
        .into_iter()
        .map(|((year, month), (total, count))| MonthlyStat {
            year,
            month,
            total,
            count,
        })
        .collect()
}
