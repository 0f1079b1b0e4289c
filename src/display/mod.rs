//! Display formatting for terminal output
//!
//! Provides utilities for formatting ledger entries for terminal display:
//! entry tables, detail views, due-date hints and report helpers.

pub mod bill;
pub mod expense;
pub mod report;

pub use bill::{format_bill_details, format_bill_list, format_bill_page, format_upcoming};
pub use expense::{format_expense_details, format_expense_list};
pub use report::{format_audit_log, format_bar, format_percentage, format_trend_line, truncate};
