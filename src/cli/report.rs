//! CLI commands for reports
//!
//! The ledger report, expense statistics and the dashboard. Reports print to
//! the terminal by default; `--format` or `--output` switches to CSV, JSON or
//! YAML.

use std::io::Write;
use std::path::PathBuf;

use chrono::Datelike;
use clap::Args;

use crate::error::{TrackerError, TrackerResult};
use crate::export::{write_json, write_yaml, ExportFormat};
use crate::reports::{
    CategorySelection, DashboardSummary, ExpenseStats, LedgerReport, PeriodMode, ReportRequest,
    ReportType,
};
use crate::storage::Storage;

use super::{finish_output, open_output, parse_label, parse_optional_date, CommandContext};

/// Arguments of `spendtrack report`
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Which ledger to report on (expenses, bills, both)
    #[arg(short = 't', long = "type", default_value = "expenses")]
    pub report_type: String,

    /// Report granularity (monthly, yearly)
    #[arg(short, long, default_value = "monthly")]
    pub period: String,

    /// Calendar year (default: the current year)
    #[arg(short, long)]
    pub year: Option<i32>,

    /// Month 1-12; without it a monthly report covers the whole year
    #[arg(short, long)]
    pub month: Option<u32>,

    /// Comma-separated categories to include
    #[arg(short, long)]
    pub categories: Option<String>,

    /// Explicit window start (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,

    /// Explicit window end (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<String>,

    /// Output format (csv, json, yaml); terminal text when omitted
    #[arg(short, long)]
    pub format: Option<ExportFormat>,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments of `spendtrack stats`
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// First date to include (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,

    /// Last date to include (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<String>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl ReportArgs {
    /// Build the report request
    pub fn to_request(&self, ctx: &CommandContext) -> TrackerResult<ReportRequest> {
        let categories = match &self.categories {
            Some(list) => CategorySelection::parse(list)?,
            None => CategorySelection::all(),
        };

        Ok(ReportRequest {
            report_type: parse_label::<ReportType>(&self.report_type)?,
            period: parse_label::<PeriodMode>(&self.period)?,
            year: self.year.unwrap_or_else(|| ctx.today.year()),
            month: self.month,
            categories,
            start: parse_optional_date(self.start.as_deref(), ctx.settings)?,
            end: parse_optional_date(self.end.as_deref(), ctx.settings)?,
            trend_threshold: ctx.settings.trend_threshold_percent,
        })
    }

    /// The output format, inferred from the output file when not given
    fn resolved_format(&self) -> Option<ExportFormat> {
        self.format.or_else(|| {
            self.output
                .as_deref()
                .map(|path| ExportFormat::from_path(path).unwrap_or(ExportFormat::Json))
        })
    }
}

/// Handle `spendtrack report`
pub fn handle_report_command(
    storage: &Storage,
    ctx: &CommandContext,
    args: ReportArgs,
) -> TrackerResult<()> {
    let request = args.to_request(ctx)?;
    let report = LedgerReport::generate(storage, &ctx.owner, &request, ctx.today)?;

    let Some(format) = args.resolved_format() else {
        print!("{}", report.format_terminal(ctx.currency()));
        return Ok(());
    };

    let mut writer = open_output(args.output.as_deref())?;
    match format {
        ExportFormat::Csv => report.export_csv(&mut writer)?,
        ExportFormat::Json => {
            write_json(&report, &mut writer, true)?;
            writer
                .write_all(b"\n")
                .map_err(|e| TrackerError::Export(e.to_string()))?;
        }
        ExportFormat::Yaml => write_yaml(&report, &mut writer)?,
    }
    finish_output(writer)?;

    if let Some(path) = &args.output {
        eprintln!("Report written to {}", path.display());
    }
    Ok(())
}

/// Handle `spendtrack stats`
pub fn handle_stats_command(
    storage: &Storage,
    ctx: &CommandContext,
    args: StatsArgs,
) -> TrackerResult<()> {
    let stats = ExpenseStats::generate(
        storage,
        &ctx.owner,
        parse_optional_date(args.start.as_deref(), ctx.settings)?,
        parse_optional_date(args.end.as_deref(), ctx.settings)?,
    )?;

    if args.json {
        let mut writer = open_output(None)?;
        write_json(&stats, &mut writer, true)?;
        writer
            .write_all(b"\n")
            .map_err(|e| TrackerError::Export(e.to_string()))?;
        finish_output(writer)
    } else {
        print!("{}", stats.format_terminal(ctx.currency()));
        Ok(())
    }
}

/// Handle `spendtrack dashboard`
pub fn handle_dashboard_command(
    storage: &Storage,
    ctx: &CommandContext,
    json: bool,
) -> TrackerResult<()> {
    let summary = DashboardSummary::generate(storage, &ctx.owner, ctx.today)?;

    if json {
        let mut writer = open_output(None)?;
        write_json(&summary, &mut writer, true)?;
        writer
            .write_all(b"\n")
            .map_err(|e| TrackerError::Export(e.to_string()))?;
        finish_output(writer)
    } else {
        print!("{}", summary.format_terminal(ctx.currency()));
        Ok(())
    }
}
