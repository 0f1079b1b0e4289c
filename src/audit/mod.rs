//! Audit trail for ledger changes
//!
//! Every create, update and delete of an expense or bill, including the
//! automatic pending-to-overdue transitions, is appended to `audit.log` as
//! one JSON line. Entries carry the owner so `spendtrack audit` only ever
//! shows a user their own history.

mod diff;
mod entry;
mod logger;

pub use diff::summarize_changes;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
