//! Storage layer for spendtrack
//!
//! JSON ledger files with atomic writes, owner-indexed repositories, and the
//! audit trail that records every change made through the services.

pub mod bills;
pub mod expenses;
pub mod file_io;
pub mod init;

pub use bills::BillRepository;
pub use expenses::ExpenseRepository;
pub use file_io::{read_entries, write_entries};
pub use init::initialize_storage;

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;

use crate::audit::{summarize_changes, AuditEntry, AuditLogger, EntityType};
use crate::config::paths::TrackerPaths;
use crate::error::TrackerError;
use crate::models::{Bill, Expense, OwnerId};

/// Date ordering for repository queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

pub(crate) fn read_guard<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, TrackerError> {
    lock.read()
        .map_err(|e| TrackerError::Storage(format!("Failed to acquire read lock: {}", e)))
}

pub(crate) fn write_guard<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, TrackerError> {
    lock.write()
        .map_err(|e| TrackerError::Storage(format!("Failed to acquire write lock: {}", e)))
}

/// A ledger entry that can be written to the audit trail
pub trait Audited: Serialize {
    const ENTITY: EntityType;

    fn owner(&self) -> &OwnerId;
    fn audit_id(&self) -> String;
    fn audit_label(&self) -> Option<String>;
}

impl Audited for Expense {
    const ENTITY: EntityType = EntityType::Expense;

    fn owner(&self) -> &OwnerId {
        &self.owner
    }

    fn audit_id(&self) -> String {
        self.id.to_string()
    }

    fn audit_label(&self) -> Option<String> {
        Some(format!("{} {}", self.category, self.amount))
    }
}

impl Audited for Bill {
    const ENTITY: EntityType = EntityType::Bill;

    fn owner(&self) -> &OwnerId {
        &self.owner
    }

    fn audit_id(&self) -> String {
        self.id.to_string()
    }

    fn audit_label(&self) -> Option<String> {
        Some(self.title.clone())
    }
}

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: TrackerPaths,
    pub expenses: ExpenseRepository,
    pub bills: BillRepository,
    audit: AuditLogger,
}

impl Storage {
    /// Create a new Storage instance, creating directories as needed
    pub fn new(paths: TrackerPaths) -> Result<Self, TrackerError> {
        paths.ensure_directories()?;

        Ok(Self {
            expenses: ExpenseRepository::new(paths.expenses_file()),
            bills: BillRepository::new(paths.bills_file()),
            audit: AuditLogger::new(paths.audit_log()),
            paths,
        })
    }

    /// Open storage and load every ledger from disk
    pub fn open(paths: TrackerPaths) -> Result<Self, TrackerError> {
        let storage = Self::new(paths)?;
        storage.load_all()?;
        Ok(storage)
    }

    pub fn paths(&self) -> &TrackerPaths {
        &self.paths
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    pub fn load_all(&self) -> Result<(), TrackerError> {
        self.expenses.load()?;
        self.bills.load()?;
        Ok(())
    }

    pub fn save_all(&self) -> Result<(), TrackerError> {
        self.expenses.save()?;
        self.bills.save()?;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }

    pub fn log_create<T: Audited>(&self, entity: &T) -> Result<(), TrackerError> {
        self.audit.log(&AuditEntry::create(
            entity.owner(),
            T::ENTITY,
            entity.audit_id(),
            entity.audit_label(),
            entity,
        ))
    }

    /// Log an update; a no-op when nothing but bookkeeping fields changed
    pub fn log_update<T: Audited>(&self, before: &T, after: &T) -> Result<(), TrackerError> {
        match update_entry(before, after) {
            Some(entry) => self.audit.log(&entry),
            None => Ok(()),
        }
    }

    /// Log many updates with one flush
    pub fn log_updates<T: Audited>(&self, changes: &[(T, T)]) -> Result<(), TrackerError> {
        let entries: Vec<_> = changes
            .iter()
            .filter_map(|(before, after)| update_entry(before, after))
            .collect();
        self.audit.log_batch(&entries)
    }

    pub fn log_delete<T: Audited>(&self, entity: &T) -> Result<(), TrackerError> {
        self.audit.log(&AuditEntry::delete(
            entity.owner(),
            T::ENTITY,
            entity.audit_id(),
            entity.audit_label(),
            entity,
        ))
    }
}

fn update_entry<T: Audited>(before: &T, after: &T) -> Option<AuditEntry> {
    let changes = match (serde_json::to_value(before), serde_json::to_value(after)) {
        (Ok(b), Ok(a)) => summarize_changes(&b, &a)?,
        _ => return None,
    };

    Some(AuditEntry::update(
        after.owner(),
        T::ENTITY,
        after.audit_id(),
        after.audit_label(),
        before,
        after,
        Some(changes),
    ))
}
