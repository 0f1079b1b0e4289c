//! Service layer for spendtrack
//!
//! Services sit on top of the storage layer: they scope every operation to
//! one owner, validate input, run the bill lifecycle and write the audit log.

pub mod bill;
pub mod expense;

pub use bill::{
    BillPage, BillPatch, BillService, CreateBillInput, Pagination, StatusSummary, StatusTally,
    UpcomingBills, UpcomingCounts,
};
pub use expense::{CreateExpenseInput, ExpensePatch, ExpenseService};
