// SPDX-License-Identifier: MIT

//! Transaction CRUD routes.
//!
//! Every create and update hands the written transaction to the budget
//! threshold evaluator afterwards; evaluation failures never surface here.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::db::firestore::TransactionFilter;
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::{Transaction, TransactionKind};
use crate::response::{ApiResponse, PageMeta};
use crate::time_utils::{format_utc_rfc3339, month_bounds};
use crate::AppState;

const MAX_PER_PAGE: u32 = 100;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route(
            "/transactions/{id}",
            get(get_transaction)
                .put(update_transaction)
                .delete(delete_transaction),
        )
}

// ─── Payloads ────────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct TransactionPayload {
    #[validate(range(exclusive_min = 0.0, message = "amount must be positive"))]
    amount: f64,
    kind: TransactionKind,
    #[serde(default)]
    category_id: Option<String>,
    /// RFC3339; defaults to the current time when omitted
    #[serde(default)]
    date: Option<String>,
    #[validate(length(max = 500, message = "description must be at most 500 characters"))]
    #[serde(default)]
    description: Option<String>,
    /// Recurrence tag; recorded on the entry but never acted on
    #[validate(length(max = 20, message = "recurrence must be at most 20 characters"))]
    #[serde(default)]
    recurrence: Option<String>,
}

impl TransactionPayload {
    /// Normalize the payload date to a stored RFC3339 UTC string.
    fn normalized_date(&self) -> Result<String> {
        match &self.date {
            None => Ok(format_utc_rfc3339(chrono::Utc::now())),
            Some(raw) => chrono::DateTime::parse_from_rfc3339(raw)
                .map(|dt| format_utc_rfc3339(dt.with_timezone(&chrono::Utc)))
                .map_err(|_| {
                    AppError::Validation("date must be an RFC3339 datetime".to_string())
                }),
        }
    }
}

/// Reject category references that don't resolve to one of the caller's own
/// categories.
async fn check_category_ownership(
    state: &AppState,
    user_id: &str,
    category_id: &Option<String>,
) -> Result<()> {
    if let Some(category_id) = category_id {
        let owned = state
            .db
            .get_category(category_id)
            .await?
            .is_some_and(|category| category.user_id == user_id);

        if !owned {
            return Err(AppError::Validation("Unknown category".to_string()));
        }
    }
    Ok(())
}

// ─── List ────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct TransactionsQuery {
    /// Filter by month, `YYYY-MM`
    month: Option<String>,
    /// Filter by category ID
    category: Option<String>,
    /// Filter by kind (`income` or `expense`)
    kind: Option<TransactionKind>,
    /// Pagination: page number (1-indexed)
    #[serde(default = "default_page")]
    page: u32,
    /// Pagination: items per page
    #[serde(default = "default_per_page")]
    per_page: u32,
}

fn default_page() -> u32 {
    1
}
fn default_per_page() -> u32 {
    50
}

/// List the caller's transactions, newest first.
async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<TransactionsQuery>,
) -> Result<impl IntoResponse> {
    if query.page == 0 || query.per_page == 0 || query.per_page > MAX_PER_PAGE {
        return Err(AppError::Validation(format!(
            "page must be >= 1 and per_page between 1 and {MAX_PER_PAGE}"
        )));
    }

    let date_window = match &query.month {
        None => None,
        Some(month) => Some(month_bounds(month).ok_or_else(|| {
            AppError::Validation("month must use the YYYY-MM format".to_string())
        })?),
    };

    let filter = TransactionFilter {
        date_window,
        category_id: query.category.clone(),
        kind: query.kind,
    };

    let offset = (query.page - 1) * query.per_page;
    let transactions = state
        .db
        .list_transactions(&user.0.id, &filter, query.per_page, offset)
        .await?;

    let meta = PageMeta {
        page: query.page,
        per_page: query.per_page,
        count: transactions.len(),
    };

    Ok(Json(ApiResponse::paginated(
        "Transactions fetched",
        transactions,
        meta,
    )))
}

// ─── Create ──────────────────────────────────────────────────────

async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<TransactionPayload>,
) -> Result<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    check_category_ownership(&state, &user.0.id, &payload.category_id).await?;

    let now = format_utc_rfc3339(chrono::Utc::now());
    let transaction = Transaction {
        id: Uuid::new_v4().to_string(),
        user_id: user.0.id.clone(),
        amount: payload.amount,
        kind: payload.kind,
        category_id: payload.category_id.clone(),
        date: payload.normalized_date()?,
        description: payload.description.clone(),
        recurrence: payload.recurrence.clone(),
        created_at: now.clone(),
        updated_at: now,
    };

    state.db.upsert_transaction(&transaction).await?;

    // Observational side effect; swallows its own failures
    state.budget_alerts.evaluate(&transaction).await;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Transaction created", transaction)),
    ))
}

// ─── Get / Update / Delete ───────────────────────────────────────

/// Load a transaction and verify it belongs to the caller. Foreign
/// transactions read as 404 rather than 403.
async fn load_owned_transaction(
    state: &AppState,
    user_id: &str,
    transaction_id: &str,
) -> Result<Transaction> {
    state
        .db
        .get_transaction(transaction_id)
        .await?
        .filter(|t| t.user_id == user_id)
        .ok_or_else(|| AppError::NotFound(format!("transaction {transaction_id}")))
}

async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let transaction = load_owned_transaction(&state, &user.0.id, &id).await?;
    Ok(Json(ApiResponse::ok("Transaction fetched", transaction)))
}

async fn update_transaction(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<TransactionPayload>,
) -> Result<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    check_category_ownership(&state, &user.0.id, &payload.category_id).await?;

    let mut transaction = load_owned_transaction(&state, &user.0.id, &id).await?;

    transaction.amount = payload.amount;
    transaction.kind = payload.kind;
    transaction.category_id = payload.category_id.clone();
    transaction.date = payload.normalized_date()?;
    transaction.description = payload.description.clone();
    transaction.recurrence = payload.recurrence.clone();
    transaction.updated_at = format_utc_rfc3339(chrono::Utc::now());

    state.db.upsert_transaction(&transaction).await?;

    state.budget_alerts.evaluate(&transaction).await;

    Ok(Json(ApiResponse::ok("Transaction updated", transaction)))
}

async fn delete_transaction(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let transaction = load_owned_transaction(&state, &user.0.id, &id).await?;
    state.db.delete_transaction(&transaction.id).await?;

    Ok(Json(ApiResponse::message("Transaction deleted")))
}
