//! Ledger report
//!
//! Packages the aggregation engine and the trend calculator into one report
//! per entry type, for a resolved date window and the same window one year
//! earlier.

use std::io::Write;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::error::{TrackerError, TrackerResult};
use crate::models::labels::labeled_enum;
use crate::models::{
    Bill, BillCategory, BillFilter, Category, DateRange, Expense, ExpenseCategory,
    ExpenseFilter, Money, OwnerId,
};
use crate::services::BillService;
use crate::storage::{SortOrder, Storage};

use super::aggregation::{
    bill_breakdown, category_breakdown, month_totals, monthly_comparison, status_breakdown,
    yearly_comparison, yearly_totals, BillCategoryStat, CategoryStat, MonthlyComparison,
    StatusBreakdown, YearlyComparison,
};
use super::trend::{calculate_trend_with, TrendSummary, DEFAULT_TREND_THRESHOLD};

labeled_enum! {
    /// Which ledger a report covers
    pub enum ReportType as "report type" {
        Expenses => "expenses" / "Expenses" | "expense",
        Bills => "bills" / "Bills" | "bill",
        Both => "both" / "Both",
    }
}

impl ReportType {
    pub fn includes_expenses(&self) -> bool {
        matches!(self, Self::Expenses | Self::Both)
    }

    pub fn includes_bills(&self) -> bool {
        matches!(self, Self::Bills | Self::Both)
    }
}

labeled_enum! {
    /// Report granularity
    pub enum PeriodMode as "period" {
        Monthly => "monthly" / "Monthly" | "month",
        Yearly => "yearly" / "Yearly" | "year",
    }
}

/// Category restriction for a report
///
/// `None` means every category. A label list given on the command line may
/// name expense categories, bill categories, or both (`utilities`, `other`);
/// each side keeps only the labels it knows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorySelection {
    pub expense: Option<Vec<ExpenseCategory>>,
    pub bill: Option<Vec<BillCategory>>,
}

impl CategorySelection {
    pub fn all() -> Self {
        Self::default()
    }

    /// Parse a comma-separated label list
    ///
    /// A label that is neither an expense nor a bill category is rejected.
    pub fn parse(input: &str) -> TrackerResult<Self> {
        let mut expense = Vec::new();
        let mut bill = Vec::new();

        for label in input.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let as_expense = label.parse::<ExpenseCategory>().ok();
            let as_bill = label.parse::<BillCategory>().ok();
            if as_expense.is_none() && as_bill.is_none() {
                return Err(TrackerError::Validation(format!(
                    "Unknown category '{}' (expense categories: {}; bill categories: {})",
                    label,
                    ExpenseCategory::LABELS.join(", "),
                    BillCategory::LABELS.join(", ")
                )));
            }
            if let Some(c) = as_expense.filter(|c| !expense.contains(c)) {
                expense.push(c);
            }
            if let Some(c) = as_bill.filter(|c| !bill.contains(c)) {
                bill.push(c);
            }
        }

        if expense.is_empty() && bill.is_empty() {
            return Ok(Self::all());
        }
        Ok(Self {
            expense: Some(expense),
            bill: Some(bill),
        })
    }
}

fn allowed<C: Category>(selection: &Option<Vec<C>>, category: C) -> bool {
    selection.as_ref().map_or(true, |list| list.contains(&category))
}

/// What to report on
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub report_type: ReportType,
    pub period: PeriodMode,
    pub year: i32,
    /// 1-based; only meaningful in monthly mode
    pub month: Option<u32>,
    pub categories: CategorySelection,
    /// Explicit window bounds; either side overrides the period's bound
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Trend dead zone in percent
    pub trend_threshold: f64,
}

impl ReportRequest {
    /// A monthly expense-and-bill report for one calendar year
    pub fn for_year(year: i32) -> Self {
        Self {
            report_type: ReportType::Both,
            period: PeriodMode::Monthly,
            year,
            month: None,
            categories: CategorySelection::all(),
            start: None,
            end: None,
            trend_threshold: DEFAULT_TREND_THRESHOLD,
        }
    }

    /// Resolve the current and previous windows
    ///
    /// - explicit start/end win over the period
    /// - monthly with a month: that month
    /// - monthly without a month, or yearly: the whole year
    ///
    /// The previous window is the current one shifted back a year.
    pub fn resolve_window(&self) -> TrackerResult<ReportWindow> {
        if let Some(month) = self.month {
            if !(1..=12).contains(&month) {
                return Err(TrackerError::Validation(format!(
                    "Month must be between 1 and 12 (got {})",
                    month
                )));
            }
        }

        let base = match (self.period, self.month) {
            (PeriodMode::Monthly, Some(month)) => DateRange::month(self.year, month),
            _ => DateRange::year(self.year),
        }
        .ok_or_else(|| TrackerError::Validation(format!("Invalid year {}", self.year)))?;

        let (start, end) = match (base.start, base.end) {
            (Some(s), Some(e)) => (self.start.unwrap_or(s), self.end.unwrap_or(e)),
            _ => return Err(TrackerError::Validation("Unbounded report period".into())),
        };

        if start > end {
            return Err(TrackerError::Validation(format!(
                "Start date {} is after end date {}",
                start, end
            )));
        }

        let current = DateRange::new(start, end);
        Ok(ReportWindow {
            current,
            previous: current.shifted_back_years(1),
        })
    }
}

/// Current and previous date windows of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub current: DateRange,
    pub previous: DateRange,
}

/// Inclusive date bounds as they appear in exports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl From<DateRange> for Period {
    fn from(range: DateRange) -> Self {
        Self {
            start: range.start,
            end: range.end,
        }
    }
}

/// Expense section of a report
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseReport {
    pub category_breakdown: Vec<CategoryStat<ExpenseCategory>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_comparison: Option<Vec<MonthlyComparison>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yearly_comparison: Option<Vec<YearlyComparison>>,
    pub totals: TrendSummary,
    pub transaction_count: usize,
    pub average_transaction: Money,
}

/// Bill section of a report
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillReport {
    pub category_breakdown: Vec<BillCategoryStat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_comparison: Option<Vec<MonthlyComparison>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yearly_comparison: Option<Vec<YearlyComparison>>,
    pub totals: TrendSummary,
    pub status_breakdown: StatusBreakdown,
    pub bill_count: usize,
    pub average_bill: Money,
}

/// Ledger report over one window
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerReport {
    pub period: PeriodMode,
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    pub window: Period,
    pub previous_window: Period,
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expenses: Option<ExpenseReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bills: Option<BillReport>,
}

impl LedgerReport {
    /// Generate a report for `owner`
    ///
    /// Bill statuses are normalized for `today` before anything is read.
    pub fn generate(
        storage: &Storage,
        owner: &OwnerId,
        request: &ReportRequest,
        today: NaiveDate,
    ) -> TrackerResult<Self> {
        let window = request.resolve_window()?;

        let expenses = if request.report_type.includes_expenses() {
            Some(expense_section(storage, owner, request, &window)?)
        } else {
            None
        };

        let bills = if request.report_type.includes_bills() {
            BillService::new(storage).normalize_overdue(owner, today)?;
            Some(bill_section(storage, owner, request, &window)?)
        } else {
            None
        };

        Ok(Self {
            period: request.period,
            year: request.year,
            month: request.month,
            window: window.current.into(),
            previous_window: window.previous.into(),
            generated_at: Utc::now(),
            expenses,
            bills,
        })
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self, currency: &str) -> String {
        let mut out = String::new();
        let m = |amount: Money| amount.format_with_symbol(currency);

        out.push_str(&format!(
            "Ledger Report: {} to {} ({})\n",
            fmt_date(self.window.start),
            fmt_date(self.window.end),
            self.period.title()
        ));
        out.push_str(&"=".repeat(72));
        out.push('\n');

        if let Some(exp) = &self.expenses {
            out.push_str("\nEXPENSES\n");
            push_totals(&mut out, &exp.totals, currency);
            out.push_str(&format!(
                "Transactions: {}   Average: {}\n\n",
                exp.transaction_count,
                m(exp.average_transaction)
            ));
            push_category_header(&mut out);
            for row in &exp.category_breakdown {
                push_category_row(&mut out, row, currency);
            }
            push_series(&mut out, &exp.monthly_comparison, &exp.yearly_comparison, currency);
        }

        if let Some(bills) = &self.bills {
            out.push_str("\nBILLS\n");
            push_totals(&mut out, &bills.totals, currency);
            out.push_str(&format!(
                "Bills: {}   Average: {}   Pending: {}  Paid: {}  Overdue: {}\n\n",
                bills.bill_count,
                m(bills.average_bill),
                bills.status_breakdown.pending,
                bills.status_breakdown.paid,
                bills.status_breakdown.overdue
            ));
            push_category_header(&mut out);
            for row in &bills.category_breakdown {
                push_category_row(&mut out, &row.stat, currency);
            }
            push_series(&mut out, &bills.monthly_comparison, &bills.yearly_comparison, currency);
        }

        out
    }

    /// Export the category breakdowns as CSV rows
    pub fn export_csv<W: Write>(&self, writer: W) -> TrackerResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        let export_err = |e: csv::Error| TrackerError::Export(e.to_string());

        csv.write_record([
            "Type", "Start Date", "End Date", "Category", "Total", "Count", "Average",
            "Percentage",
        ])
        .map_err(export_err)?;

        let start = fmt_date(self.window.start);
        let end = fmt_date(self.window.end);
        let mut rows: Vec<(&str, &str, Money, usize, Money, f64)> = Vec::new();
        if let Some(exp) = &self.expenses {
            rows.extend(exp.category_breakdown.iter().map(|s| {
                ("expenses", s.category.as_str(), s.total, s.count, s.average, s.percentage)
            }));
        }
        if let Some(bills) = &self.bills {
            rows.extend(bills.category_breakdown.iter().map(|b| {
                let s = &b.stat;
                ("bills", s.category.as_str(), s.total, s.count, s.average, s.percentage)
            }));
        }

        for (kind, category, total, count, average, pct) in rows {
            csv.write_record([
                kind.to_string(),
                start.clone(),
                end.clone(),
                category.to_string(),
                format!("{:.2}", total.as_decimal()),
                count.to_string(),
                format!("{:.2}", average.as_decimal()),
                format!("{:.2}", pct),
            ])
            .map_err(export_err)?;
        }

        csv.flush()
            .map_err(|e| TrackerError::Export(e.to_string()))?;
        Ok(())
    }
}

fn expense_section(
    storage: &Storage,
    owner: &OwnerId,
    request: &ReportRequest,
    window: &ReportWindow,
) -> TrackerResult<ExpenseReport> {
    let selection = &request.categories.expense;
    let fetch = |range: DateRange| -> TrackerResult<Vec<Expense>> {
        let mut entries = storage.expenses.find(
            owner,
            &ExpenseFilter::new().date_range(range),
            SortOrder::Ascending,
        )?;
        entries.retain(|e| allowed(selection, e.category));
        Ok(entries)
    };

    let current = fetch(window.current)?;
    let previous = fetch(window.previous)?;

    let current_total: Money = current.iter().map(|e| e.amount).sum();
    let previous_total: Money = previous.iter().map(|e| e.amount).sum();

    let monthly = match request.period {
        PeriodMode::Monthly => {
            let this_year = fetch(year_range(request.year)?)?;
            let last_year = fetch(year_range(request.year - 1)?)?;
            Some(monthly_comparison(
                &month_totals(this_year.iter().map(|e| (e.date, e.amount))),
                &month_totals(last_year.iter().map(|e| (e.date, e.amount))),
            ))
        }
        PeriodMode::Yearly => None,
    };

    let yearly = match request.period {
        PeriodMode::Yearly => {
            let all = fetch(DateRange::default())?;
            Some(yearly_comparison(&yearly_totals(
                all.iter().map(|e| (e.date, e.amount)),
            )))
        }
        PeriodMode::Monthly => None,
    };

    Ok(ExpenseReport {
        category_breakdown: category_breakdown(current.iter().map(|e| (e.category, e.amount))),
        monthly_comparison: monthly,
        yearly_comparison: yearly,
        totals: calculate_trend_with(current_total, previous_total, request.trend_threshold),
        transaction_count: current.len(),
        average_transaction: current_total.average(current.len()),
    })
}

fn bill_section(
    storage: &Storage,
    owner: &OwnerId,
    request: &ReportRequest,
    window: &ReportWindow,
) -> TrackerResult<BillReport> {
    let selection = &request.categories.bill;
    let fetch = |range: DateRange| -> TrackerResult<Vec<Bill>> {
        let mut bills = storage.bills.find(
            owner,
            &BillFilter::new().due_range(range),
            SortOrder::Ascending,
        )?;
        bills.retain(|b| allowed(selection, b.category));
        Ok(bills)
    };

    let current = fetch(window.current)?;
    let previous = fetch(window.previous)?;

    let current_total: Money = current.iter().map(|b| b.amount).sum();
    let previous_total: Money = previous.iter().map(|b| b.amount).sum();

    let monthly = match request.period {
        PeriodMode::Monthly => {
            let this_year = fetch(year_range(request.year)?)?;
            let last_year = fetch(year_range(request.year - 1)?)?;
            Some(monthly_comparison(
                &month_totals(this_year.iter().map(|b| (b.due_date, b.amount))),
                &month_totals(last_year.iter().map(|b| (b.due_date, b.amount))),
            ))
        }
        PeriodMode::Yearly => None,
    };

    let yearly = match request.period {
        PeriodMode::Yearly => {
            let all = fetch(DateRange::default())?;
            Some(yearly_comparison(&yearly_totals(
                all.iter().map(|b| (b.due_date, b.amount)),
            )))
        }
        PeriodMode::Monthly => None,
    };

    Ok(BillReport {
        category_breakdown: bill_breakdown(&current),
        monthly_comparison: monthly,
        yearly_comparison: yearly,
        totals: calculate_trend_with(current_total, previous_total, request.trend_threshold),
        status_breakdown: status_breakdown(&current),
        bill_count: current.len(),
        average_bill: current_total.average(current.len()),
    })
}

fn year_range(year: i32) -> TrackerResult<DateRange> {
    DateRange::year(year).ok_or_else(|| TrackerError::Validation(format!("Invalid year {}", year)))
}

fn fmt_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn push_totals(out: &mut String, totals: &TrendSummary, currency: &str) {
    out.push_str(&format!(
        "Current: {}   Previous: {}   Change: {} ({:+.1}%, {})\n",
        totals.current.format_with_symbol(currency),
        totals.previous.format_with_symbol(currency),
        totals.growth.format_with_symbol(currency),
        totals.growth_percentage,
        totals.trend
    ));
}

fn push_category_header(out: &mut String) {
    out.push_str(&format!(
        "{:<20} {:>12} {:>6} {:>12} {:>7}\n",
        "Category", "Total", "Count", "Average", "%"
    ));
    out.push_str(&"-".repeat(72));
    out.push('\n');
}

fn push_category_row<C: Category>(out: &mut String, row: &CategoryStat<C>, currency: &str) {
    out.push_str(&format!(
        "{:<20} {:>12} {:>6} {:>12} {:>6.1}%\n",
        row.category.title(),
        row.total.format_with_symbol(currency),
        row.count,
        row.average.format_with_symbol(currency),
        row.percentage
    ));
}

fn push_series(
    out: &mut String,
    monthly: &Option<Vec<MonthlyComparison>>,
    yearly: &Option<Vec<YearlyComparison>>,
    currency: &str,
) {
    if let Some(rows) = monthly {
        out.push_str(&format!(
            "\n{:<6} {:>14} {:>14} {:>9}\n",
            "Month", "This year", "Last year", "Change"
        ));
        for row in rows {
            out.push_str(&format!(
                "{:<6} {:>14} {:>14} {:>+8.1}%\n",
                row.month,
                row.current_year.format_with_symbol(currency),
                row.previous_year.format_with_symbol(currency),
                row.growth_percentage
            ));
        }
    }
    if let Some(rows) = yearly {
        out.push_str(&format!("\n{:<6} {:>14} {:>14} {:>9}\n", "Year", "Total", "Growth", "Change"));
        for row in rows {
            out.push_str(&format!(
                "{:<6} {:>14} {:>14} {:>+8.1}%\n",
                row.year,
                row.total.format_with_symbol(currency),
                row.growth.format_with_symbol(currency),
                row.growth_percentage
            ));
        }
    }
}
