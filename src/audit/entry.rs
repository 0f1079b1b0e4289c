//! Audit entry data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::OwnerId;

/// Kind of change recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Create => write!(f, "CREATE"),
            Operation::Update => write!(f, "UPDATE"),
            Operation::Delete => write!(f, "DELETE"),
        }
    }
}

/// Ledger entry kinds that show up in the audit trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Expense,
    Bill,
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityType::Expense => write!(f, "Expense"),
            EntityType::Bill => write!(f, "Bill"),
        }
    }
}

/// One line of the audit log
///
/// `before` is present for updates and deletes, `after` for creates and
/// updates. Both are JSON snapshots of the entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,

    pub operation: Operation,

    /// Whose ledger changed
    pub owner: OwnerId,

    pub entity_type: EntityType,

    /// Short display id (`exp-1a2b3c4d`)
    pub entity_id: String,

    /// Human label: bill title, or expense category and amount
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<serde_json::Value>,

    /// Field-level summary for updates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changes: Option<String>,
}

impl AuditEntry {
    fn base(
        operation: Operation,
        owner: &OwnerId,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        label: Option<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            owner: owner.clone(),
            entity_type,
            entity_id: entity_id.into(),
            label,
            before: None,
            after: None,
            changes: None,
        }
    }

    pub fn create<T: Serialize>(
        owner: &OwnerId,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        label: Option<String>,
        entity: &T,
    ) -> Self {
        Self {
            after: serde_json::to_value(entity).ok(),
            ..Self::base(Operation::Create, owner, entity_type, entity_id, label)
        }
    }

    pub fn update<T: Serialize>(
        owner: &OwnerId,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        label: Option<String>,
        before: &T,
        after: &T,
        changes: Option<String>,
    ) -> Self {
        Self {
            before: serde_json::to_value(before).ok(),
            after: serde_json::to_value(after).ok(),
            changes,
            ..Self::base(Operation::Update, owner, entity_type, entity_id, label)
        }
    }

    pub fn delete<T: Serialize>(
        owner: &OwnerId,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        label: Option<String>,
        entity: &T,
    ) -> Self {
        Self {
            before: serde_json::to_value(entity).ok(),
            ..Self::base(Operation::Delete, owner, entity_type, entity_id, label)
        }
    }

    /// One-line rendering for `spendtrack audit`, with changes on a second line
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.entity_type,
            self.entity_id
        );

        if let Some(label) = &self.label {
            output.push_str(&format!(" ({})", label));
        }

        if let Some(changes) = &self.changes {
            output.push_str(&format!("\n  Changes: {}", changes));
        }

        output
    }
}
