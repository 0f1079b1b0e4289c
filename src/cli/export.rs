//! CLI commands for data export
//!
//! Provides commands for exporting an owner's ledger in various formats.

use std::path::PathBuf;

use clap::Subcommand;

use crate::error::TrackerResult;
use crate::export::{
    export_bills_csv, export_expenses_csv, export_ledger_json, export_ledger_yaml, ExportFormat,
    LedgerExport,
};
use crate::models::{BillCategory, BillFilter, BillStatus, DateRange, ExpenseCategory, ExpenseFilter};
use crate::storage::Storage;

use super::{finish_output, open_output, parse_labels, parse_optional_date, CommandContext};

/// Export subcommands
#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Export expenses to CSV
    Expenses {
        /// Output file path (stdout when omitted)
        output: Option<PathBuf>,
        /// Comma-separated categories
        #[arg(short, long)]
        category: Option<String>,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },

    /// Export bills to CSV
    Bills {
        /// Output file path (stdout when omitted)
        output: Option<PathBuf>,
        /// Comma-separated statuses
        #[arg(short, long)]
        status: Option<String>,
        /// Comma-separated categories
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Export every expense and bill
    All {
        /// Output file path
        output: PathBuf,

        /// Export format (json, yaml)
        #[arg(short, long, default_value = "json")]
        format: ExportFormat,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Show what an export would contain without writing files
    Info,
}

/// Handle export commands
pub fn handle_export_command(
    storage: &Storage,
    ctx: &CommandContext,
    cmd: ExportCommands,
) -> TrackerResult<()> {
    let owner = &ctx.owner;

    match cmd {
        ExportCommands::Expenses {
            output,
            category,
            from,
            to,
        } => {
            let mut filter = ExpenseFilter::new().date_range(DateRange {
                start: parse_optional_date(from.as_deref(), ctx.settings)?,
                end: parse_optional_date(to.as_deref(), ctx.settings)?,
            });
            if let Some(category) = category {
                filter = filter.categories(parse_labels::<ExpenseCategory>(&category)?);
            }

            let mut writer = open_output(output.as_deref())?;
            let count = export_expenses_csv(storage, owner, &filter, &mut writer)?;
            finish_output(writer)?;
            if let Some(path) = output {
                println!("Exported {} expenses to: {}", count, path.display());
            }
        }

        ExportCommands::Bills {
            output,
            status,
            category,
        } => {
            let mut filter = BillFilter::new();
            if let Some(status) = status {
                filter = filter.statuses(parse_labels::<BillStatus>(&status)?);
            }
            if let Some(category) = category {
                filter = filter.categories(parse_labels::<BillCategory>(&category)?);
            }

            let mut writer = open_output(output.as_deref())?;
            let count = export_bills_csv(storage, owner, &filter, ctx.today, &mut writer)?;
            finish_output(writer)?;
            if let Some(path) = output {
                println!("Exported {} bills to: {}", count, path.display());
            }
        }

        ExportCommands::All {
            output,
            format,
            pretty,
        } => {
            let mut writer = open_output(Some(&output))?;
            match format {
                ExportFormat::Csv => {
                    export_expenses_csv(storage, owner, &ExpenseFilter::new(), &mut writer)?;
                    println!("Note: CSV exports expenses only. Use `export bills` for bills, or JSON/YAML for everything.");
                }
                ExportFormat::Json => export_ledger_json(storage, owner, ctx.today, &mut writer, pretty)?,
                ExportFormat::Yaml => export_ledger_yaml(storage, owner, ctx.today, &mut writer)?,
            }
            finish_output(writer)?;
            println!("Ledger exported to: {}", output.display());
        }

        ExportCommands::Info => {
            let export = LedgerExport::from_storage(storage, owner, ctx.today)?;

            println!("Export Information");
            println!("==================\n");
            println!("Owner:          {}", export.owner);
            println!("Schema Version: {}", export.schema_version);
            println!("App Version:    {}", export.app_version);
            println!();
            println!("Expenses: {}", export.metadata.expense_count);
            println!("Bills:    {}", export.metadata.bill_count);
            if let (Some(first), Some(last)) =
                (export.metadata.earliest_expense, export.metadata.latest_expense)
            {
                println!("Expense dates: {} to {}", first, last);
            }
        }
    }

    Ok(())
}
