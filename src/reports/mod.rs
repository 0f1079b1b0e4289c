//! Reports module for spendtrack
//!
//! The aggregation engine and trend calculator are pure functions; the
//! ledger report, expense statistics and dashboard read the store and
//! package their results.

pub mod aggregation;
pub mod dashboard;
pub mod ledger;
pub mod stats;
pub mod trend;

pub use aggregation::{
    bill_breakdown, category_breakdown, BillCategoryStat, CategoryStat, MonthlyComparison,
    StatusBreakdown, YearlyComparison,
};
pub use dashboard::DashboardSummary;
pub use ledger::{
    BillReport, CategorySelection, ExpenseReport, LedgerReport, PeriodMode, ReportRequest,
    ReportType, ReportWindow,
};
pub use stats::ExpenseStats;
pub use trend::{calculate_trend, Trend, TrendSummary};
