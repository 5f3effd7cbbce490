// SPDX-License-Identifier: MIT

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (accounts, subscription state, refresh-token hashes)
//! - Transactions (per-user entries with month-window queries)
//! - Categories (per-user, name-unique by convention)
//! - Budgets (keyed by `{user_id}_{month}`)
//! - Goals (savings targets)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{Budget, Category, Goal, Transaction, TransactionKind, User};

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Filters for listing a user's transactions.
#[derive(Debug, Default, Clone)]
pub struct TransactionFilter {
    /// Month window `[start, end)` as RFC3339 strings
    pub date_window: Option<(String, String)>,
    /// Restrict to a single category
    pub category_id: Option<String>,
    /// Restrict to income or expense entries
    pub kind: Option<TransactionKind>,
}

fn kind_value(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Income => "income",
        TransactionKind::Expense => "expense",
    }
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // Use ExternalJwtFunctionSource to provide a dummy token without needing async-trait
        // or a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by document ID.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Look up a user by login email.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let email = email.to_string();
        let mut users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.field("email").eq(email.clone()))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(users.pop())
    }

    /// Whether any user exists at all (first-signup admin grant).
    pub async fn has_any_user(&self) -> Result<bool, AppError> {
        let users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(!users.is_empty())
    }

    /// Create or update a user.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// List every user account (admin surface and export).
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Ascending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Transaction Operations ──────────────────────────────────

    /// Get a transaction by document ID.
    pub async fn get_transaction(&self, transaction_id: &str) -> Result<Option<Transaction>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::TRANSACTIONS)
            .obj()
            .one(transaction_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a transaction.
    pub async fn upsert_transaction(&self, transaction: &Transaction) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::TRANSACTIONS)
            .document_id(&transaction.id)
            .object(transaction)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a transaction.
    pub async fn delete_transaction(&self, transaction_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::TRANSACTIONS)
            .document_id(transaction_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// List a user's transactions with optional filters, newest first.
    pub async fn list_transactions(
        &self,
        user_id: &str,
        filter: &TransactionFilter,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Transaction>, AppError> {
        let user_id = user_id.to_string();
        let filter = filter.clone();

        self.get_client()?
            .fluent()
            .select()
            .from(collections::TRANSACTIONS)
            .filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id.clone()),
                    filter
                        .kind
                        .and_then(|kind| q.field("kind").eq(kind_value(kind))),
                    filter
                        .category_id
                        .clone()
                        .and_then(|category| q.field("category_id").eq(category)),
                    filter
                        .date_window
                        .clone()
                        .and_then(|(start, _)| q.field("date").greater_than_or_equal(start)),
                    filter
                        .date_window
                        .clone()
                        .and_then(|(_, end)| q.field("date").less_than(end)),
                ])
            })
            .order_by([("date", firestore::FirestoreQueryDirection::Descending)])
            .limit(limit)
            .offset(offset)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Sum of a user's expense amounts inside a month window, optionally
    /// restricted to one category.
    ///
    /// Firestore has no server-side aggregation in this client, so matching
    /// documents are queried and folded here.
    pub async fn sum_expense_amounts(
        &self,
        user_id: &str,
        window: &(String, String),
        category_id: Option<&str>,
    ) -> Result<f64, AppError> {
        let user_id = user_id.to_string();
        let (start, end) = window.clone();
        let category_id = category_id.map(|c| c.to_string());

        let expenses: Vec<Transaction> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::TRANSACTIONS)
            .filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id.clone()),
                    q.field("kind").eq("expense"),
                    q.field("date").greater_than_or_equal(start.clone()),
                    q.field("date").less_than(end.clone()),
                    category_id
                        .clone()
                        .and_then(|category| q.field("category_id").eq(category)),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(expenses.iter().map(|t| t.amount).sum())
    }

    /// All transactions for one user, unpaged (deletion sweep and export).
    pub async fn list_transactions_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<Transaction>, AppError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::TRANSACTIONS)
            .filter(move |q| q.field("user_id").eq(user_id.clone()))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Every transaction in the store (admin export).
    pub async fn list_all_transactions(&self) -> Result<Vec<Transaction>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::TRANSACTIONS)
            .order_by([("date", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Category Operations ─────────────────────────────────────

    /// Get a category by document ID.
    pub async fn get_category(&self, category_id: &str) -> Result<Option<Category>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::CATEGORIES)
            .obj()
            .one(category_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user's category by name (per-user uniqueness check).
    pub async fn find_category_by_name(
        &self,
        user_id: &str,
        name: &str,
    ) -> Result<Option<Category>, AppError> {
        let user_id = user_id.to_string();
        let name = name.to_string();
        let mut categories: Vec<Category> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::CATEGORIES)
            .filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id.clone()),
                    q.field("name").eq(name.clone()),
                ])
            })
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(categories.pop())
    }

    /// List a user's categories.
    pub async fn list_categories(&self, user_id: &str) -> Result<Vec<Category>, AppError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::CATEGORIES)
            .filter(move |q| q.field("user_id").eq(user_id.clone()))
            .order_by([("name", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a category.
    pub async fn upsert_category(&self, category: &Category) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::CATEGORIES)
            .document_id(&category.id)
            .object(category)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a category. Referencing transactions and budget entries are
    /// left untouched (no cascade).
    pub async fn delete_category(&self, category_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::CATEGORIES)
            .document_id(category_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Budget Operations ───────────────────────────────────────

    /// Get a user's budget for a `YYYY-MM` month.
    pub async fn get_budget(&self, user_id: &str, month: &str) -> Result<Option<Budget>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::BUDGETS)
            .obj()
            .one(&Budget::doc_id(user_id, month))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or replace a budget. The composite document ID makes this an
    /// upsert keyed by `(user, month)`.
    pub async fn upsert_budget(&self, budget: &Budget) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::BUDGETS)
            .document_id(&Budget::doc_id(&budget.user_id, &budget.month))
            .object(budget)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// All budgets for one user (deletion sweep).
    pub async fn list_budgets_for_user(&self, user_id: &str) -> Result<Vec<Budget>, AppError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::BUDGETS)
            .filter(move |q| q.field("user_id").eq(user_id.clone()))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Goal Operations ─────────────────────────────────────────

    /// Get a goal by document ID.
    pub async fn get_goal(&self, goal_id: &str) -> Result<Option<Goal>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::GOALS)
            .obj()
            .one(goal_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List a user's goals.
    pub async fn list_goals(&self, user_id: &str) -> Result<Vec<Goal>, AppError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::GOALS)
            .filter(move |q| q.field("user_id").eq(user_id.clone()))
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Ascending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a goal.
    pub async fn upsert_goal(&self, goal: &Goal) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::GOALS)
            .document_id(&goal.id)
            .object(goal)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a goal.
    pub async fn delete_goal(&self, goal_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::GOALS)
            .document_id(goal_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Helper Methods ────────────────────────────────────────────

    /// Helper to batch delete documents using transactions.
    async fn batch_delete<T, F>(
        &self,
        items: &[T],
        collection: &str,
        id_extractor: F,
    ) -> Result<(), AppError>
    where
        F: Fn(&T) -> String,
    {
        let client = self.get_client()?;

        for chunk in items.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for item in chunk {
                let doc_id = id_extractor(item);
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(&doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }

    // ─── User Data Deletion ────────────────────────────────────────

    /// Delete ALL data for a user.
    ///
    /// Deletes from all collections:
    /// - `transactions` (query by user_id)
    /// - `categories` (query by user_id)
    /// - `budgets` (query by user_id)
    /// - `goals` (query by user_id)
    /// - `users/{user_id}`
    ///
    /// Returns the number of documents deleted.
    pub async fn delete_user_data(&self, user_id: &str) -> Result<usize, AppError> {
        let (transactions, categories, budgets, goals) = futures_util::try_join!(
            self.list_transactions_for_user(user_id),
            self.list_categories(user_id),
            self.list_budgets_for_user(user_id),
            self.list_goals(user_id),
        )?;

        let mut deleted_count = 0;

        self.batch_delete(&transactions, collections::TRANSACTIONS, |t: &Transaction| {
            t.id.clone()
        })
        .await?;
        deleted_count += transactions.len();
        tracing::debug!(user_id, count = transactions.len(), "Deleted transactions");

        self.batch_delete(&categories, collections::CATEGORIES, |c: &Category| {
            c.id.clone()
        })
        .await?;
        deleted_count += categories.len();
        tracing::debug!(user_id, count = categories.len(), "Deleted categories");

        self.batch_delete(&budgets, collections::BUDGETS, |b: &Budget| {
            Budget::doc_id(&b.user_id, &b.month)
        })
        .await?;
        deleted_count += budgets.len();
        tracing::debug!(user_id, count = budgets.len(), "Deleted budgets");

        self.batch_delete(&goals, collections::GOALS, |g: &Goal| g.id.clone())
            .await?;
        deleted_count += goals.len();
        tracing::debug!(user_id, count = goals.len(), "Deleted goals");

        self.get_client()?
            .fluent()
            .delete()
            .from(collections::USERS)
            .document_id(user_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        deleted_count += 1;
        tracing::debug!(user_id, "Deleted user account");

        tracing::info!(user_id, deleted_count, "User data deletion complete");

        Ok(deleted_count)
    }
}
