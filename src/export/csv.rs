//! CSV Export functionality
//!
//! Exports an owner's expenses or bills to CSV, one row per entry.

use std::io::Write;

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{TrackerError, TrackerResult};
use crate::models::{BillFilter, Expense, ExpenseFilter, OwnerId};
use crate::services::{BillService, ExpenseService};
use crate::storage::Storage;

pub const EXPENSE_CSV_HEADERS: [&str; 5] = ["Date", "Category", "Amount", "Note", "Created At"];

pub const BILL_CSV_HEADERS: [&str; 9] = [
    "Title",
    "Amount",
    "Due Date",
    "Category",
    "Status",
    "Description",
    "Is Recurring",
    "Recurring Period",
    "Created At",
];

fn export_err(e: csv::Error) -> TrackerError {
    TrackerError::Export(e.to_string())
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Write expenses as CSV, in the order given
pub fn write_expenses_csv<W: Write>(expenses: &[Expense], writer: W) -> TrackerResult<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(EXPENSE_CSV_HEADERS).map_err(export_err)?;

    for expense in expenses {
        csv.write_record([
            expense.date.format("%Y-%m-%d").to_string(),
            expense.category.to_string(),
            format!("{:.2}", expense.amount.as_decimal()),
            expense.note.clone().unwrap_or_default(),
            timestamp(expense.created_at),
        ])
        .map_err(export_err)?;
    }

    csv.flush().map_err(|e| TrackerError::Export(e.to_string()))?;
    Ok(())
}

/// Export the owner's matching expenses, newest first
pub fn export_expenses_csv<W: Write>(
    storage: &Storage,
    owner: &OwnerId,
    filter: &ExpenseFilter,
    writer: W,
) -> TrackerResult<usize> {
    let expenses = ExpenseService::new(storage).list(owner, filter)?;
    write_expenses_csv(&expenses, writer)?;
    Ok(expenses.len())
}

/// Export the owner's matching bills by due date
///
/// Statuses are normalized for `today` first, so the Status column never
/// shows a stale pending bill.
pub fn export_bills_csv<W: Write>(
    storage: &Storage,
    owner: &OwnerId,
    filter: &BillFilter,
    today: NaiveDate,
    writer: W,
) -> TrackerResult<usize> {
    let bills = BillService::new(storage).list(owner, filter, today)?;

    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(BILL_CSV_HEADERS).map_err(export_err)?;

    for bill in &bills {
        csv.write_record([
            bill.title.clone(),
            format!("{:.2}", bill.amount.as_decimal()),
            bill.due_date.format("%Y-%m-%d").to_string(),
            bill.category.to_string(),
            bill.status.to_string(),
            bill.description.clone().unwrap_or_default(),
            if bill.recurring { "Yes" } else { "No" }.to_string(),
            bill.recurring_period
                .map(|p| p.to_string())
                .unwrap_or_default(),
            timestamp(bill.created_at),
        ])
        .map_err(export_err)?;
    }

    csv.flush().map_err(|e| TrackerError::Export(e.to_string()))?;
    Ok(bills.len())
}
