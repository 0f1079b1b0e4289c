//! YAML Export functionality
//!
//! Human-readable rendering of the ledger export and of reports.

use std::io::Write;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{TrackerError, TrackerResult};
use crate::export::json::LedgerExport;
use crate::models::OwnerId;
use crate::storage::Storage;

/// Serialize any report (or export) as YAML
pub fn write_yaml<T: Serialize, W: Write>(value: &T, writer: W) -> TrackerResult<()> {
    serde_yaml::to_writer(writer, value).map_err(|e| TrackerError::Export(e.to_string()))
}

/// Export the owner's full ledger to YAML
pub fn export_ledger_yaml<W: Write>(
    storage: &Storage,
    owner: &OwnerId,
    today: NaiveDate,
    writer: &mut W,
) -> TrackerResult<()> {
    let export = LedgerExport::from_storage(storage, owner, today)?;

    let header = format!(
        "# spendtrack ledger export for {}\n# Generated: {}\n\n",
        export.owner, export.exported_at
    );
    writer
        .write_all(header.as_bytes())
        .map_err(|e| TrackerError::Export(e.to_string()))?;

    write_yaml(&export, writer)
}

/// Read a YAML ledger export back
pub fn import_from_yaml(yaml_str: &str) -> TrackerResult<LedgerExport> {
    let export: LedgerExport =
        serde_yaml::from_str(yaml_str).map_err(|e| TrackerError::Validation(e.to_string()))?;
    export.validate().map_err(TrackerError::Validation)?;
    Ok(export)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::TrackerPaths;
    use crate::models::{Expense, ExpenseCategory, Money};
    use tempfile::TempDir;

    #[test]
    fn test_yaml_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let storage =
            Storage::open(TrackerPaths::with_base_dir(temp_dir.path().to_path_buf())).unwrap();
        let owner = OwnerId::new("alice").unwrap();
        let on = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        storage
            .expenses
            .upsert(Expense::new(owner.clone(), ExpenseCategory::Education, Money::from_cents(4200), on))
            .unwrap();

        let mut buf = Vec::new();
        export_ledger_yaml(&storage, &owner, on, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.starts_with("# spendtrack ledger export for alice"));
        assert!(text.contains("category: education"));

        let parsed = import_from_yaml(&text).unwrap();
        assert_eq!(parsed.expenses.len(), 1);
        assert_eq!(parsed.expenses[0].amount.cents(), 4200);
    }
}
