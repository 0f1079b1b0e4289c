//! CLI commands for bills
//!
//! Every command that shows bills passes the invocation's date down so the
//! services can sweep stale pending bills to overdue before reading.

use clap::Subcommand;

use crate::display::{format_bill_details, format_bill_list, format_bill_page, format_upcoming};
use crate::error::TrackerResult;
use crate::models::{BillCategory, BillFilter, BillStatus, DateRange, RecurrencePeriod};
use crate::services::{BillPatch, BillService, CreateBillInput};
use crate::storage::Storage;

use super::{parse_amount, parse_date, parse_label, parse_labels, parse_optional_date, CommandContext};

/// Bill subcommands
#[derive(Subcommand, Debug)]
pub enum BillCommands {
    /// Add a bill
    Add {
        title: String,
        /// Amount due (e.g. 89.99)
        amount: String,
        /// Due date (YYYY-MM-DD)
        due: String,
        /// Category (utilities, rent, insurance, subscriptions, loan, other)
        #[arg(short, long, default_value = "other")]
        category: String,
        #[arg(short, long)]
        description: Option<String>,
        /// Make the bill recurring (monthly, quarterly, yearly)
        #[arg(short = 'r', long = "every")]
        every: Option<String>,
    },

    /// List bills by due date, one page at a time
    #[command(alias = "ls")]
    List {
        /// Comma-separated statuses (pending, paid, overdue)
        #[arg(short, long)]
        status: Option<String>,
        /// Comma-separated categories
        #[arg(short, long)]
        category: Option<String>,
        /// First due date to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// Last due date to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
        /// Text to look for in titles and descriptions
        #[arg(long)]
        search: Option<String>,
        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: usize,
        /// Bills per page (default from config)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Overdue bills and bills due soon
    Upcoming {
        /// Days ahead to look (default from config)
        #[arg(short, long)]
        days: Option<u32>,
        /// Maximum bills to show (default from config)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show one bill
    Show {
        /// Bill ID (bill-xxxxxxxx, full UUID or prefix)
        id: String,
    },

    /// Change a bill
    Edit {
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        amount: Option<String>,
        #[arg(long)]
        due: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long, conflicts_with = "clear_description")]
        description: Option<String>,
        #[arg(long)]
        clear_description: bool,
        /// Make the bill recurring with this period
        #[arg(short = 'r', long = "every", conflicts_with = "once")]
        every: Option<String>,
        /// Make the bill non-recurring
        #[arg(long)]
        once: bool,
        /// Set the status (pending, paid, or overdue once past due)
        #[arg(short, long)]
        status: Option<String>,
    },

    /// Mark a bill as paid
    Pay { id: String },

    /// Mark a paid bill as pending again
    Reopen { id: String },

    /// Delete a bill
    #[command(alias = "rm")]
    Delete { id: String },

    /// Mark every stale pending bill as overdue
    Sweep,
}

/// Handle bill commands
pub fn handle_bill_command(
    storage: &Storage,
    ctx: &CommandContext,
    cmd: BillCommands,
) -> TrackerResult<()> {
    let service = BillService::new(storage);
    let owner = &ctx.owner;
    let today = ctx.today;
    let currency = ctx.currency();

    match cmd {
        BillCommands::Add {
            title,
            amount,
            due,
            category,
            description,
            every,
        } => {
            let recurring_period = every
                .as_deref()
                .map(parse_label::<RecurrencePeriod>)
                .transpose()?;
            let input = CreateBillInput {
                title,
                amount: parse_amount(&amount)?,
                due_date: parse_date(&due, ctx.settings)?,
                category: parse_label::<BillCategory>(&category)?,
                description,
                recurring: recurring_period.is_some(),
                recurring_period,
            };
            let bill = service.create(owner, input, today)?;
            println!(
                "Added bill '{}' for {} due {} [{}] ({})",
                bill.title,
                bill.amount.format_with_symbol(currency),
                bill.due_date.format("%Y-%m-%d"),
                bill.status,
                bill.id
            );
        }

        BillCommands::List {
            status,
            category,
            from,
            to,
            search,
            page,
            limit,
        } => {
            let mut filter = BillFilter::new().due_range(DateRange {
                start: parse_optional_date(from.as_deref(), ctx.settings)?,
                end: parse_optional_date(to.as_deref(), ctx.settings)?,
            });
            if let Some(status) = status {
                filter = filter.statuses(parse_labels::<BillStatus>(&status)?);
            }
            if let Some(category) = category {
                filter = filter.categories(parse_labels::<BillCategory>(&category)?);
            }
            if let Some(search) = search {
                filter = filter.search(search);
            }

            let limit = limit.unwrap_or(ctx.settings.page_size);
            let bill_page = service.list_page(owner, &filter, page, limit, today)?;
            print!("{}", format_bill_page(&bill_page, currency, today));
        }

        BillCommands::Upcoming { days, limit } => {
            let upcoming = service.upcoming(
                owner,
                days.unwrap_or(ctx.settings.upcoming_window_days),
                limit.unwrap_or(ctx.settings.upcoming_limit),
                today,
            )?;
            print!("{}", format_upcoming(&upcoming, currency, today));
        }

        BillCommands::Show { id } => {
            let bill = service.find(owner, &id, today)?;
            print!("{}", format_bill_details(&bill, currency, today));
        }

        BillCommands::Edit {
            id,
            title,
            amount,
            due,
            category,
            description,
            clear_description,
            every,
            once,
            status,
        } => {
            let bill = service.find(owner, &id, today)?;
            let recurring_period = every
                .as_deref()
                .map(parse_label::<RecurrencePeriod>)
                .transpose()?;
            let patch = BillPatch {
                title,
                amount: amount.as_deref().map(parse_amount).transpose()?,
                due_date: due
                    .as_deref()
                    .map(|d| parse_date(d, ctx.settings))
                    .transpose()?,
                category: category
                    .as_deref()
                    .map(parse_label::<BillCategory>)
                    .transpose()?,
                description: if clear_description {
                    Some(None)
                } else {
                    description.map(Some)
                },
                recurring: if once {
                    Some(false)
                } else {
                    recurring_period.map(|_| true)
                },
                recurring_period,
                status: status
                    .as_deref()
                    .map(parse_label::<BillStatus>)
                    .transpose()?,
            };

            if patch.is_empty() {
                println!("Nothing to change.");
                return Ok(());
            }

            let updated = service.update(owner, bill.id, patch, today)?;
            println!("Updated bill {}", updated.id);
            print!("{}", format_bill_details(&updated, currency, today));
        }

        BillCommands::Pay { id } => {
            let bill = service.find(owner, &id, today)?;
            let paid = service.mark_paid(owner, bill.id, today)?;
            println!(
                "Paid '{}' ({})",
                paid.title,
                paid.amount.format_with_symbol(currency)
            );
        }

        BillCommands::Reopen { id } => {
            let bill = service.find(owner, &id, today)?;
            let reopened = service.mark_pending(owner, bill.id, today)?;
            println!("Reopened '{}' [{}]", reopened.title, reopened.status);
        }

        BillCommands::Delete { id } => {
            let bill = service.find(owner, &id, today)?;
            let deleted = service.delete(owner, bill.id)?;
            println!("Deleted bill '{}' ({})", deleted.title, deleted.id);
        }

        BillCommands::Sweep => {
            let changed = service.normalize_overdue(owner, today)?;
            if changed == 0 {
                println!("No bills became overdue.");
            } else {
                println!("Marked {} bill(s) overdue.", changed);
                let overdue =
                    service.list(owner, &BillFilter::new().status(BillStatus::Overdue), today)?;
                print!("{}", format_bill_list(&overdue, currency, today));
            }
        }
    }

    Ok(())
}
