// SPDX-License-Identifier: MIT

//! Export encoding: render users and transactions as CSV.
//!
//! JSON export reuses the regular response envelope; only CSV needs
//! dedicated encoding. Credential fields never appear in either format.

use crate::error::AppError;
use crate::models::{Transaction, TransactionKind, User};

/// Render user accounts as CSV (public fields only).
pub fn users_to_csv(users: &[User]) -> Result<String, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record([
            "id",
            "name",
            "email",
            "role",
            "is_active",
            "activated_at",
            "expires_at",
            "created_at",
        ])
        .map_err(|e| AppError::Internal(anyhow::anyhow!("CSV encoding failed: {}", e)))?;

    for user in users {
        let profile = user.profile();
        writer
            .write_record([
                profile.id.as_str(),
                profile.name.as_str(),
                profile.email.as_str(),
                if user.is_admin() { "admin" } else { "user" },
                if profile.is_active { "true" } else { "false" },
                profile.activated_at.as_deref().unwrap_or(""),
                profile.expires_at.as_deref().unwrap_or(""),
                profile.created_at.as_str(),
            ])
            .map_err(|e| AppError::Internal(anyhow::anyhow!("CSV encoding failed: {}", e)))?;
    }

    finish(writer)
}

/// Render transactions as CSV.
pub fn transactions_to_csv(transactions: &[Transaction]) -> Result<String, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record([
            "id",
            "user_id",
            "amount",
            "kind",
            "category_id",
            "date",
            "description",
            "created_at",
        ])
        .map_err(|e| AppError::Internal(anyhow::anyhow!("CSV encoding failed: {}", e)))?;

    for transaction in transactions {
        let kind = match transaction.kind {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        };
        writer
            .write_record([
                transaction.id.as_str(),
                transaction.user_id.as_str(),
                &transaction.amount.to_string(),
                kind,
                transaction.category_id.as_deref().unwrap_or(""),
                transaction.date.as_str(),
                transaction.description.as_deref().unwrap_or(""),
                transaction.created_at.as_str(),
            ])
            .map_err(|e| AppError::Internal(anyhow::anyhow!("CSV encoding failed: {}", e)))?;
    }

    finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, AppError> {
    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("CSV encoding failed: {}", e)))?;

    String::from_utf8(bytes)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("CSV encoding produced invalid UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn make_user() -> User {
        User {
            id: "u1".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "$2b$10$secret".to_string(),
            role: Role::User,
            is_active: true,
            activated_at: Some("2024-01-01T00:00:00Z".to_string()),
            expires_at: Some("2024-01-31T00:00:00Z".to_string()),
            refresh_token_hash: Some("deadbeef".to_string()),
            created_at: "2023-12-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_users_csv_excludes_credentials() {
        let csv = users_to_csv(&[make_user()]).unwrap();

        assert!(csv.starts_with("id,name,email,role,is_active"));
        assert!(csv.contains("ada@example.com"));
        assert!(!csv.contains("$2b$10$secret"));
        assert!(!csv.contains("deadbeef"));
    }

    #[test]
    fn test_transactions_csv_quotes_commas() {
        let transaction = Transaction {
            id: "t1".to_string(),
            user_id: "u1".to_string(),
            amount: 12.5,
            kind: TransactionKind::Expense,
            category_id: None,
            date: "2024-05-15T10:30:00Z".to_string(),
            description: Some("coffee, pastry".to_string()),
            recurrence: None,
            created_at: "2024-05-15T10:31:00Z".to_string(),
            updated_at: "2024-05-15T10:31:00Z".to_string(),
        };

        let csv = transactions_to_csv(&[transaction]).unwrap();

        assert!(csv.contains("\"coffee, pastry\""));
        assert!(csv.contains("expense"));
        assert_eq!(csv.lines().count(), 2);
    }

    #[test]
    fn test_empty_export_is_header_only() {
        let csv = transactions_to_csv(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }
}
