//! Transaction model for storage and API.

use serde::{Deserialize, Serialize};

/// Whether a transaction adds to or draws from the user's balance.
/// Budget evaluation only ever considers expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

/// A single income or expense entry, owned by exactly one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// UUID v4 (also used as document ID)
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Positive amount
    pub amount: f64,
    pub kind: TransactionKind,
    /// Optional category reference; dangling references are read as
    /// "uncategorized" since category deletion does not cascade
    #[serde(default)]
    pub category_id: Option<String>,
    /// When the transaction happened (RFC3339 UTC)
    pub date: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Recurrence tag ("weekly", "monthly", ...). Stored and returned as-is;
    /// no scheduler ever materializes recurring entries
    #[serde(default)]
    pub recurrence: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Transaction {
    pub fn is_expense(&self) -> bool {
        matches!(self.kind, TransactionKind::Expense)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TransactionKind::Expense).unwrap(),
            "\"expense\""
        );
        assert_eq!(
            serde_json::to_string(&TransactionKind::Income).unwrap(),
            "\"income\""
        );
    }

    #[test]
    fn test_optional_fields_default_on_deserialize() {
        let raw = r#"{
            "id": "t1",
            "user_id": "u1",
            "amount": 42.5,
            "kind": "expense",
            "date": "2024-05-15T10:30:00Z",
            "created_at": "2024-05-15T10:31:00Z",
            "updated_at": "2024-05-15T10:31:00Z"
        }"#;

        let tx: Transaction = serde_json::from_str(raw).unwrap();
        assert!(tx.category_id.is_none());
        assert!(tx.description.is_none());
        assert!(tx.recurrence.is_none());
        assert!(tx.is_expense());
    }
}
