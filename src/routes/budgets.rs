// SPDX-License-Identifier: MIT

//! Budget routes: fetch by month, upsert.
//!
//! The budget document ID is `{user_id}_{month}`, so an upsert for an
//! existing month replaces it and `(user, month)` stays unique. The
//! threshold evaluator only ever reads these documents.

use axum::{
    extract::{Extension, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::{Budget, CategoryBudget};
use crate::response::ApiResponse;
use crate::time_utils::{format_utc_rfc3339, month_bounds};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/budgets", get(get_budget).post(upsert_budget))
}

#[derive(Deserialize)]
struct BudgetQuery {
    /// Month key, `YYYY-MM`
    month: String,
}

/// Fetch the caller's budget for a month. `data` is null when no budget has
/// been configured.
async fn get_budget(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<BudgetQuery>,
) -> Result<impl IntoResponse> {
    if month_bounds(&query.month).is_none() {
        return Err(AppError::Validation(
            "month must use the YYYY-MM format".to_string(),
        ));
    }

    let budget = state.db.get_budget(&user.0.id, &query.month).await?;

    Ok(Json(ApiResponse::ok("Budget fetched", budget)))
}

#[derive(Deserialize, Validate)]
pub struct BudgetPayload {
    month: String,
    #[validate(range(min = 0.0, message = "total_budget must not be negative"))]
    total_budget: f64,
    #[serde(default)]
    #[validate(nested)]
    category_budgets: Vec<CategoryBudgetPayload>,
}

#[derive(Deserialize, Validate)]
pub struct CategoryBudgetPayload {
    #[validate(length(min = 1, message = "category_id is required"))]
    category_id: String,
    #[validate(range(min = 0.0, message = "amount must not be negative"))]
    amount: f64,
}

/// Create or replace the caller's budget for a month.
async fn upsert_budget(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<BudgetPayload>,
) -> Result<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    if month_bounds(&payload.month).is_none() {
        return Err(AppError::Validation(
            "month must use the YYYY-MM format".to_string(),
        ));
    }

    let budget = Budget {
        user_id: user.0.id.clone(),
        month: payload.month.clone(),
        total_budget: payload.total_budget,
        category_budgets: payload
            .category_budgets
            .iter()
            .map(|entry| CategoryBudget {
                category_id: entry.category_id.clone(),
                amount: entry.amount,
            })
            .collect(),
        updated_at: format_utc_rfc3339(chrono::Utc::now()),
    };

    state.db.upsert_budget(&budget).await?;

    Ok(Json(ApiResponse::ok("Budget saved", budget)))
}
