//! Core data models for spendtrack
//!
//! This module contains the ledger domain: expenses, bills, their category
//! and status enumerations, money, ids and typed query filters.

pub mod bill;
pub mod category;
pub mod expense;
pub mod filter;
pub mod ids;
pub mod labels;
pub mod money;

pub use bill::{Bill, BillStatus, RecurrencePeriod};
pub use category::{BillCategory, Category, ExpenseCategory};
pub use expense::Expense;
pub use filter::{BillFilter, DateRange, ExpenseFilter};
pub use ids::{BillId, ExpenseId, OwnerId};
pub use labels::{parse_label_list, ParseLabelError};
pub use money::Money;
