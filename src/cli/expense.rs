//! CLI commands for expenses

use clap::Subcommand;

use crate::display::{format_expense_details, format_expense_list};
use crate::error::TrackerResult;
use crate::models::{DateRange, ExpenseCategory, ExpenseFilter};
use crate::services::{CreateExpenseInput, ExpensePatch, ExpenseService};
use crate::storage::Storage;

use super::{parse_amount, parse_date, parse_label, parse_labels, parse_optional_date, CommandContext};

/// Expense subcommands
#[derive(Subcommand, Debug)]
pub enum ExpenseCommands {
    /// Record an expense
    Add {
        /// Amount (e.g. 12.50)
        amount: String,
        /// Category (food, transportation, utilities, entertainment,
        /// healthcare, shopping, education, other)
        category: String,
        /// Date of the spend (YYYY-MM-DD, default today)
        #[arg(short, long)]
        date: Option<String>,
        /// Free-text note
        #[arg(short, long)]
        note: Option<String>,
    },

    /// List expenses, newest first
    #[command(alias = "ls")]
    List {
        /// Comma-separated categories
        #[arg(short, long)]
        category: Option<String>,
        /// First date to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// Last date to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
        /// Text to look for in notes
        #[arg(short, long)]
        search: Option<String>,
        /// Show at most this many expenses
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show one expense
    Show {
        /// Expense ID (exp-xxxxxxxx, full UUID or prefix)
        id: String,
    },

    /// Change an expense
    Edit {
        id: String,
        #[arg(short, long)]
        amount: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long)]
        date: Option<String>,
        #[arg(short, long, conflicts_with = "clear_note")]
        note: Option<String>,
        /// Remove the note
        #[arg(long)]
        clear_note: bool,
    },

    /// Delete an expense
    #[command(alias = "rm")]
    Delete { id: String },
}

/// Handle expense commands
pub fn handle_expense_command(
    storage: &Storage,
    ctx: &CommandContext,
    cmd: ExpenseCommands,
) -> TrackerResult<()> {
    let service = ExpenseService::new(storage);
    let owner = &ctx.owner;

    match cmd {
        ExpenseCommands::Add {
            amount,
            category,
            date,
            note,
        } => {
            let input = CreateExpenseInput {
                category: parse_label::<ExpenseCategory>(&category)?,
                amount: parse_amount(&amount)?,
                date: parse_optional_date(date.as_deref(), ctx.settings)?.unwrap_or(ctx.today),
                note,
            };
            let expense = service.create(owner, input)?;
            println!(
                "Recorded {} {} on {} ({})",
                expense.category.title(),
                expense.amount.format_with_symbol(ctx.currency()),
                expense.date.format("%Y-%m-%d"),
                expense.id
            );
        }

        ExpenseCommands::List {
            category,
            from,
            to,
            search,
            limit,
        } => {
            let mut filter = ExpenseFilter::new().date_range(DateRange {
                start: parse_optional_date(from.as_deref(), ctx.settings)?,
                end: parse_optional_date(to.as_deref(), ctx.settings)?,
            });
            if let Some(category) = category {
                filter = filter.categories(parse_labels::<ExpenseCategory>(&category)?);
            }
            if let Some(search) = search {
                filter = filter.search(search);
            }

            let mut expenses = service.list(owner, &filter)?;
            if let Some(limit) = limit {
                expenses.truncate(limit);
            }
            print!("{}", format_expense_list(&expenses, ctx.currency()));
        }

        ExpenseCommands::Show { id } => {
            let expense = service.find(owner, &id)?;
            print!("{}", format_expense_details(&expense, ctx.currency()));
        }

        ExpenseCommands::Edit {
            id,
            amount,
            category,
            date,
            note,
            clear_note,
        } => {
            let expense = service.find(owner, &id)?;
            let patch = ExpensePatch {
                category: category
                    .as_deref()
                    .map(parse_label::<ExpenseCategory>)
                    .transpose()?,
                amount: amount.as_deref().map(parse_amount).transpose()?,
                date: date
                    .as_deref()
                    .map(|d| parse_date(d, ctx.settings))
                    .transpose()?,
                note: if clear_note { Some(None) } else { note.map(Some) },
            };

            if patch.is_empty() {
                println!("Nothing to change.");
                return Ok(());
            }

            let updated = service.update(owner, expense.id, patch)?;
            println!("Updated expense {}", updated.id);
            print!("{}", format_expense_details(&updated, ctx.currency()));
        }

        ExpenseCommands::Delete { id } => {
            let expense = service.find(owner, &id)?;
            let deleted = service.delete(owner, expense.id)?;
            println!("Deleted expense {} ({})", deleted.id, deleted);
        }
    }

    Ok(())
}
