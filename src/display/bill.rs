//! Bill display formatting
//!
//! Bill tables, the paged listing footer and the upcoming-bills view. Due
//! dates are shown relative to `today` so overdue bills stand out.

use chrono::NaiveDate;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{Bill, BillStatus};
use crate::services::{BillPage, UpcomingBills};

use super::report::truncate;

#[derive(Tabled)]
struct BillRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Category")]
    category: &'static str,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn status_icon(status: BillStatus) -> &'static str {
    match status {
        BillStatus::Pending => "○",
        BillStatus::Paid => "✓",
        BillStatus::Overdue => "!",
    }
}

/// Human description of a due date relative to today
pub fn describe_due(bill: &Bill, today: NaiveDate) -> String {
    if bill.is_paid() {
        return String::new();
    }
    match bill.days_until_due(today) {
        0 => "due today".to_string(),
        1 => "due tomorrow".to_string(),
        d if d > 1 => format!("in {} days", d),
        -1 => "1 day late".to_string(),
        d => format!("{} days late", -d),
    }
}

fn bill_table(bills: &[Bill], currency: &str, today: NaiveDate) -> String {
    let rows = bills.iter().map(|b| {
        let relative = describe_due(b, today);
        BillRow {
            id: b.id.to_string(),
            due: if relative.is_empty() {
                b.due_date.format("%Y-%m-%d").to_string()
            } else {
                format!("{} ({})", b.due_date.format("%Y-%m-%d"), relative)
            },
            title: if b.recurring {
                format!("{} ↻", truncate(&b.title, 24))
            } else {
                truncate(&b.title, 26)
            },
            category: b.category.title(),
            amount: b.amount.format_with_symbol(currency),
            status: format!("{} {}", status_icon(b.status), b.status),
        }
    });

    let mut table = Table::new(rows);
    table.with(Style::psql());
    table.to_string()
}

/// Format bills as a table
pub fn format_bill_list(bills: &[Bill], currency: &str, today: NaiveDate) -> String {
    if bills.is_empty() {
        return "No bills found.\n".to_string();
    }
    format!("{}\n", bill_table(bills, currency, today))
}

/// Format one page of bills with its pagination and status totals
pub fn format_bill_page(page: &BillPage, currency: &str, today: NaiveDate) -> String {
    let mut output = format_bill_list(&page.bills, currency, today);

    let p = &page.pagination;
    output.push_str(&format!(
        "Page {} of {} ({} matching, {} per page)\n",
        p.current,
        p.total_pages.max(1),
        p.count,
        p.limit
    ));

    for status in BillStatus::ALL {
        let tally = page.summary.get(*status);
        output.push_str(&format!(
            "  {:<8} {:>3}  {}\n",
            status.title(),
            tally.count,
            tally.total_amount.format_with_symbol(currency)
        ));
    }

    output
}

/// Format the upcoming-bills view
pub fn format_upcoming(upcoming: &UpcomingBills, currency: &str, today: NaiveDate) -> String {
    let c = &upcoming.counts;
    let mut output = format!(
        "Overdue: {}   Due today: {}   Due soon: {}\n",
        c.overdue, c.due_today, c.due_soon
    );

    if upcoming.bills.is_empty() {
        output.push_str("Nothing due.\n");
    } else {
        output.push_str(&bill_table(&upcoming.bills, currency, today));
        output.push('\n');
    }
    output
}

/// Format bill details for display
pub fn format_bill_details(bill: &Bill, currency: &str, today: NaiveDate) -> String {
    let mut output = String::new();

    output.push_str(&format!("Bill:      {}\n", bill.id));
    output.push_str(&format!("Title:     {}\n", bill.title));
    output.push_str(&format!(
        "Amount:    {}\n",
        bill.amount.format_with_symbol(currency)
    ));
    output.push_str(&format!("Due:       {}", bill.due_date.format("%Y-%m-%d")));
    let relative = describe_due(bill, today);
    if !relative.is_empty() {
        output.push_str(&format!(" ({})", relative));
    }
    output.push('\n');
    output.push_str(&format!("Category:  {}\n", bill.category.title()));
    output.push_str(&format!("Status:    {}\n", bill.status.title()));

    if let Some(period) = bill.recurring_period.filter(|_| bill.recurring) {
        output.push_str(&format!("Recurring: {}\n", period.title()));
    }
    if let Some(description) = &bill.description {
        output.push_str(&format!("Notes:     {}\n", description));
    }

    output
}
