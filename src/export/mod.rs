//! Export module for spendtrack
//!
//! - CSV: expense and bill rows (spreadsheet-compatible), report category rows
//! - JSON: full ledger export and nested reports
//! - YAML: the same, human-readable

pub mod csv;
pub mod json;
pub mod yaml;

use crate::models::labels::labeled_enum;

pub use self::csv::{export_bills_csv, export_expenses_csv, write_expenses_csv};
pub use json::{export_ledger_json, write_json, LedgerExport, EXPORT_SCHEMA_VERSION};
pub use yaml::{export_ledger_yaml, import_from_yaml, write_yaml};

labeled_enum! {
    /// Output format for exports and reports
    pub enum ExportFormat as "format" {
        Csv => "csv" / "CSV",
        Json => "json" / "JSON",
        Yaml => "yaml" / "YAML" | "yml",
    }
}

impl ExportFormat {
    /// Guess the format from a file name's extension
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}
