//! Expense display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{Expense, Money};

use super::report::truncate;

#[derive(Tabled)]
struct ExpenseRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Category")]
    category: &'static str,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Note")]
    note: String,
}

/// Format expenses as a table, with a total line
pub fn format_expense_list(expenses: &[Expense], currency: &str) -> String {
    if expenses.is_empty() {
        return "No expenses found.\n".to_string();
    }

    let rows = expenses.iter().map(|e| ExpenseRow {
        id: e.id.to_string(),
        date: e.date.format("%Y-%m-%d").to_string(),
        category: e.category.title(),
        amount: e.amount.format_with_symbol(currency),
        note: truncate(e.note.as_deref().unwrap_or(""), 30),
    });

    let total: Money = expenses.iter().map(|e| e.amount).sum();
    let mut table = Table::new(rows);
    table.with(Style::psql());

    format!(
        "{}\n{} expense(s), total {}\n",
        table,
        expenses.len(),
        total.format_with_symbol(currency)
    )
}

/// Format expense details for display
pub fn format_expense_details(expense: &Expense, currency: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Expense:  {}\n", expense.id));
    output.push_str(&format!("Date:     {}\n", expense.date.format("%Y-%m-%d")));
    output.push_str(&format!("Category: {}\n", expense.category.title()));
    output.push_str(&format!(
        "Amount:   {}\n",
        expense.amount.format_with_symbol(currency)
    ));
    if let Some(note) = &expense.note {
        output.push_str(&format!("Note:     {}\n", note));
    }
    output.push_str(&format!(
        "Created:  {}\n",
        expense.created_at.format("%Y-%m-%d %H:%M:%S")
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExpenseCategory, OwnerId};
    use chrono::NaiveDate;

    fn expense() -> Expense {
        Expense::new(
            OwnerId::new("alice").unwrap(),
            ExpenseCategory::Transportation,
            Money::from_cents(2350),
            NaiveDate::from_ymd_opt(2025, 5, 4).unwrap(),
        )
        .with_note("train")
    }

    #[test]
    fn test_list() {
        let output = format_expense_list(&[expense()], "$");
        assert!(output.contains("Transportation"));
        assert!(output.contains("$23.50"));
        assert!(output.contains("1 expense(s), total $23.50"));
        assert_eq!(format_expense_list(&[], "$"), "No expenses found.\n");
    }

    #[test]
    fn test_details() {
        let output = format_expense_details(&expense(), "€");
        assert!(output.contains("Amount:   €23.50"));
        assert!(output.contains("Note:     train"));
    }
}
