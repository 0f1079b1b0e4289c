//! JSON Export functionality
//!
//! Exports an owner's whole ledger, or any report, as JSON.

use std::io::Write;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{TrackerError, TrackerResult};
use crate::models::{Bill, BillFilter, Expense, ExpenseFilter, OwnerId};
use crate::services::{BillService, ExpenseService};
use crate::storage::Storage;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// One owner's expenses and bills
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: String,

    pub owner: OwnerId,

    pub expenses: Vec<Expense>,

    pub bills: Vec<Bill>,

    pub metadata: ExportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub expense_count: usize,
    pub bill_count: usize,
    pub earliest_expense: Option<NaiveDate>,
    pub latest_expense: Option<NaiveDate>,
}

impl LedgerExport {
    /// Collect the owner's ledger, with bill statuses normalized for `today`
    pub fn from_storage(storage: &Storage, owner: &OwnerId, today: NaiveDate) -> TrackerResult<Self> {
        let expenses = ExpenseService::new(storage).list(owner, &ExpenseFilter::new())?;
        let bills = BillService::new(storage).list(owner, &BillFilter::new(), today)?;

        let metadata = ExportMetadata {
            expense_count: expenses.len(),
            bill_count: bills.len(),
            earliest_expense: expenses.iter().map(|e| e.date).min(),
            latest_expense: expenses.iter().map(|e| e.date).max(),
        };

        Ok(Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            owner: owner.clone(),
            expenses,
            bills,
            metadata,
        })
    }

    /// Check the export is readable by this version and belongs to one owner
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version != EXPORT_SCHEMA_VERSION {
            return Err(format!(
                "Schema version mismatch: expected {}, got {}",
                EXPORT_SCHEMA_VERSION, self.schema_version
            ));
        }

        if let Some(e) = self.expenses.iter().find(|e| e.owner != self.owner) {
            return Err(format!("Expense {} belongs to another owner", e.id));
        }
        if let Some(b) = self.bills.iter().find(|b| b.owner != self.owner) {
            return Err(format!("Bill {} belongs to another owner", b.id));
        }

        Ok(())
    }
}

/// Serialize any report (or export) as JSON
pub fn write_json<T: Serialize, W: Write>(value: &T, writer: W, pretty: bool) -> TrackerResult<()> {
    if pretty {
        serde_json::to_writer_pretty(writer, value)
    } else {
        serde_json::to_writer(writer, value)
    }
    .map_err(|e| TrackerError::Export(e.to_string()))
}

/// Export the owner's full ledger to JSON
pub fn export_ledger_json<W: Write>(
    storage: &Storage,
    owner: &OwnerId,
    today: NaiveDate,
    writer: W,
    pretty: bool,
) -> TrackerResult<()> {
    let export = LedgerExport::from_storage(storage, owner, today)?;
    write_json(&export, writer, pretty)
}
