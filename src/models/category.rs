//! Expense and bill categories
//!
//! The two fixed category sets. Aggregation works on any `Category`, so the
//! same engine groups expenses and bills.

use std::hash::Hash;

use super::labels::labeled_enum;

labeled_enum! {
    /// What an expense was spent on
    pub enum ExpenseCategory as "expense category" {
        Food => "food" / "Food",
        Transportation => "transportation" / "Transportation" | "transport",
        Utilities => "utilities" / "Utilities",
        Entertainment => "entertainment" / "Entertainment",
        Healthcare => "healthcare" / "Healthcare",
        Shopping => "shopping" / "Shopping",
        Education => "education" / "Education",
        Other => "other" / "Other",
    }
}

labeled_enum! {
    /// What kind of obligation a bill is
    pub enum BillCategory as "bill category" {
        Utilities => "utilities" / "Utilities",
        Rent => "rent" / "Rent",
        Insurance => "insurance" / "Insurance",
        Subscriptions => "subscriptions" / "Subscriptions",
        Loan => "loan" / "Loan",
        Other => "other" / "Other",
    }
}

/// A category usable as an aggregation key
pub trait Category: Copy + Eq + Hash {
    fn label(&self) -> &'static str;
    fn title(&self) -> &'static str;
}

impl Category for ExpenseCategory {
    fn label(&self) -> &'static str {
        self.as_str()
    }

    fn title(&self) -> &'static str {
        ExpenseCategory::title(self)
    }
}

impl Category for BillCategory {
    fn label(&self) -> &'static str {
        self.as_str()
    }

    fn title(&self) -> &'static str {
        BillCategory::title(self)
    }
}
