use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use spendtrack::cli::{
    handle_bill_command, handle_dashboard_command, handle_expense_command, handle_export_command,
    handle_report_command, handle_stats_command, local_today, parse_date, resolve_owner,
    BillCommands, CommandContext, ExpenseCommands, ExportCommands, ReportArgs, StatsArgs,
};
use spendtrack::config::{paths::TrackerPaths, settings::Settings};
use spendtrack::display::format_audit_log;
use spendtrack::error::TrackerError;
use spendtrack::storage::{init::initialize_storage, Storage};

#[derive(Parser)]
#[command(
    name = "spendtrack",
    version,
    about = "Personal expense and bill tracker",
    long_about = "spendtrack records expenses and bills, tracks bill due dates \
                  (pending, paid, overdue) and produces category breakdowns and \
                  period-over-period trend reports."
)]
struct Cli {
    /// Owner of the ledger entries to work with
    #[arg(long, global = true, env = "SPENDTRACK_OWNER")]
    owner: Option<String>,

    /// Evaluate bill due dates as of this date (YYYY-MM-DD, default today)
    #[arg(long, global = true, env = "SPENDTRACK_TODAY")]
    as_of: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Expense commands
    #[command(subcommand, alias = "exp")]
    Expense(ExpenseCommands),

    /// Bill commands
    #[command(subcommand)]
    Bill(BillCommands),

    /// Category breakdown and trend report
    Report(ReportArgs),

    /// Expense statistics by category and month
    Stats(StatsArgs),

    /// This month at a glance
    Dashboard {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Export ledger data
    #[command(subcommand)]
    Export(ExportCommands),

    /// Show recent audit log entries
    Audit {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },

    /// Create the data directory, settings and empty ledgers
    Init,

    /// Show current configuration and paths
    Config,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let kind = err
                .downcast_ref::<TrackerError>()
                .map(TrackerError::kind)
                .unwrap_or("error");
            eprintln!("Error [{}]: {}", kind, err);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = TrackerPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    let Some(command) = cli.command else {
        println!("spendtrack - personal expense and bill tracker");
        println!();
        println!("Run 'spendtrack --help' for usage information.");
        return Ok(());
    };

    match command {
        Commands::Init => {
            println!("Initializing spendtrack at: {}", paths.data_dir().display());
            if initialize_storage(&paths, &settings)? {
                println!("Initialization complete!");
            } else {
                println!("Already initialized; nothing changed.");
            }
            return Ok(());
        }
        Commands::Config => {
            println!("spendtrack Configuration");
            println!("========================");
            println!("Base directory:  {}", paths.base_dir().display());
            println!("Data directory:  {}", paths.data_dir().display());
            println!("Settings file:   {}", paths.settings_file().display());
            println!("Audit log:       {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Currency symbol:   {}", settings.currency_symbol);
            println!("  Date format:       {}", settings.date_format);
            println!(
                "  Default owner:     {}",
                settings.default_owner.as_deref().unwrap_or("(none)")
            );
            println!("  Trend threshold:   {}%", settings.trend_threshold_percent);
            println!("  Upcoming window:   {} days", settings.upcoming_window_days);
            println!("  Upcoming limit:    {}", settings.upcoming_limit);
            println!("  Page size:         {}", settings.page_size);
            return Ok(());
        }
        _ => {}
    }

    let owner = resolve_owner(cli.owner.as_deref(), &settings)?;
    let today = match cli.as_of.as_deref() {
        Some(date) => parse_date(date, &settings)?,
        None => local_today(),
    };
    let ctx = CommandContext {
        settings: &settings,
        owner,
        today,
    };

    // Initialize storage
    let storage = Storage::open(paths)?;

    match command {
        Commands::Expense(cmd) => handle_expense_command(&storage, &ctx, cmd)?,
        Commands::Bill(cmd) => handle_bill_command(&storage, &ctx, cmd)?,
        Commands::Report(args) => handle_report_command(&storage, &ctx, args)?,
        Commands::Stats(args) => handle_stats_command(&storage, &ctx, args)?,
        Commands::Dashboard { json } => handle_dashboard_command(&storage, &ctx, json)?,
        Commands::Export(cmd) => handle_export_command(&storage, &ctx, cmd)?,
        Commands::Audit { limit } => {
            let entries = storage.audit().read_recent(&ctx.owner, limit)?;
            print!("{}", format_audit_log(&entries));
        }
        Commands::Init | Commands::Config => {}
    }

    Ok(())
}
