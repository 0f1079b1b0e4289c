//! CLI command handlers
//!
//! This module contains the implementation of CLI commands, bridging the
//! clap argument parsing with the service layer. Handlers own input parsing:
//! a malformed date, amount or label becomes a validation error here, before
//! any service is called.

pub mod bill;
pub mod expense;
pub mod export;
pub mod report;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use chrono::{Local, NaiveDate};

use crate::config::settings::Settings;
use crate::error::{TrackerError, TrackerResult};
use crate::models::{parse_label_list, Money, OwnerId, ParseLabelError};

pub use bill::{handle_bill_command, BillCommands};
pub use expense::{handle_expense_command, ExpenseCommands};
pub use export::{handle_export_command, ExportCommands};
pub use report::{handle_dashboard_command, handle_report_command, handle_stats_command, ReportArgs, StatsArgs};

/// Environment variable naming the acting owner
pub const OWNER_ENV: &str = "SPENDTRACK_OWNER";

/// Per-invocation context shared by every handler
pub struct CommandContext<'a> {
    pub settings: &'a Settings,
    pub owner: OwnerId,
    /// Date bill statuses are evaluated against
    pub today: NaiveDate,
}

impl CommandContext<'_> {
    pub fn currency(&self) -> &str {
        &self.settings.currency_symbol
    }
}

/// Resolve the acting owner
///
/// `explicit` carries `--owner` (or `SPENDTRACK_OWNER`, which clap folds
/// into the same flag); the settings' `default_owner` is the fallback.
pub fn resolve_owner(explicit: Option<&str>, settings: &Settings) -> TrackerResult<OwnerId> {
    explicit
        .and_then(OwnerId::new)
        .or_else(|| settings.default_owner.as_deref().and_then(OwnerId::new))
        .ok_or_else(|| {
            TrackerError::Validation(format!(
                "No owner given: pass --owner, set {} or set default_owner in the config",
                OWNER_ENV
            ))
        })
}

/// The local calendar date
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a date in ISO form or in the configured date format
pub fn parse_date(input: &str, settings: &Settings) -> TrackerResult<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(input, &settings.date_format))
        .map_err(|_| {
            TrackerError::Validation(format!(
                "Invalid date '{}'. Use YYYY-MM-DD",
                input
            ))
        })
}

pub fn parse_optional_date(
    input: Option<&str>,
    settings: &Settings,
) -> TrackerResult<Option<NaiveDate>> {
    input.map(|s| parse_date(s, settings)).transpose()
}

/// Parse a money amount, rejecting zero and negative values
pub fn parse_amount(input: &str) -> TrackerResult<Money> {
    let amount = Money::parse(input)
        .map_err(|e| TrackerError::Validation(format!("Invalid amount '{}': {}", input, e)))?;
    if !amount.is_positive() {
        return Err(TrackerError::Validation(format!(
            "Amount must be greater than 0 (got {})",
            amount
        )));
    }
    Ok(amount)
}

/// Parse one enumeration label
pub fn parse_label<T>(input: &str) -> TrackerResult<T>
where
    T: FromStr<Err = ParseLabelError>,
{
    input
        .parse()
        .map_err(|e: ParseLabelError| TrackerError::Validation(e.to_string()))
}

/// Parse a comma-separated label list
pub fn parse_labels<T>(input: &str) -> TrackerResult<Vec<T>>
where
    T: FromStr<Err = ParseLabelError> + PartialEq,
{
    parse_label_list(input).map_err(|e| TrackerError::Validation(e.to_string()))
}

/// Open the output target: a file when a path is given, stdout otherwise
pub fn open_output(path: Option<&Path>) -> TrackerResult<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                TrackerError::Export(format!("Failed to create {}: {}", path.display(), e))
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

/// Flush an output target
pub fn finish_output(mut writer: Box<dyn Write>) -> TrackerResult<()> {
    writer
        .flush()
        .map_err(|e| TrackerError::Export(e.to_string()))
}
