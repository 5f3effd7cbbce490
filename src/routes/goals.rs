// SPDX-License-Identifier: MIT

//! Savings goal routes.
//!
//! Contributing to a goal bumps `current_amount` and records a synthetic
//! expense transaction so the money shows up in spending history. The two
//! writes are sequential, not transactional, and the synthetic expense does
//! not go through budget evaluation.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::{Goal, Transaction, TransactionKind};
use crate::response::ApiResponse;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/goals", get(list_goals).post(create_goal))
        .route(
            "/goals/{id}",
            axum::routing::put(update_goal).delete(delete_goal),
        )
        .route("/goals/{id}/contribute", post(contribute))
}

#[derive(Deserialize, Validate)]
pub struct GoalPayload {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    name: String,
    #[validate(range(exclusive_min = 0.0, message = "target_amount must be positive"))]
    target_amount: f64,
    /// RFC3339 target date
    #[serde(default)]
    deadline: Option<String>,
}

impl GoalPayload {
    fn normalized_deadline(&self) -> Result<Option<String>> {
        self.deadline
            .as_deref()
            .map(|raw| {
                chrono::DateTime::parse_from_rfc3339(raw)
                    .map(|dt| format_utc_rfc3339(dt.with_timezone(&chrono::Utc)))
                    .map_err(|_| {
                        AppError::Validation("deadline must be an RFC3339 datetime".to_string())
                    })
            })
            .transpose()
    }
}

async fn list_goals(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse> {
    let goals = state.db.list_goals(&user.0.id).await?;
    Ok(Json(ApiResponse::ok("Goals fetched", goals)))
}

async fn create_goal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<GoalPayload>,
) -> Result<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let goal = Goal {
        id: Uuid::new_v4().to_string(),
        user_id: user.0.id.clone(),
        name: payload.name.trim().to_string(),
        target_amount: payload.target_amount,
        current_amount: 0.0,
        deadline: payload.normalized_deadline()?,
        created_at: format_utc_rfc3339(chrono::Utc::now()),
    };

    state.db.upsert_goal(&goal).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Goal created", goal)),
    ))
}

async fn load_owned_goal(state: &AppState, user_id: &str, goal_id: &str) -> Result<Goal> {
    state
        .db
        .get_goal(goal_id)
        .await?
        .filter(|g| g.user_id == user_id)
        .ok_or_else(|| AppError::NotFound(format!("goal {goal_id}")))
}

async fn update_goal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<GoalPayload>,
) -> Result<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let mut goal = load_owned_goal(&state, &user.0.id, &id).await?;

    goal.name = payload.name.trim().to_string();
    goal.target_amount = payload.target_amount;
    goal.deadline = payload.normalized_deadline()?;

    state.db.upsert_goal(&goal).await?;

    Ok(Json(ApiResponse::ok("Goal updated", goal)))
}

async fn delete_goal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let goal = load_owned_goal(&state, &user.0.id, &id).await?;
    state.db.delete_goal(&goal.id).await?;

    Ok(Json(ApiResponse::message("Goal deleted")))
}

// ─── Contributions ───────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct ContributionPayload {
    #[validate(range(exclusive_min = 0.0, message = "amount must be positive"))]
    amount: f64,
}

/// Add to a goal and mirror the contribution as an expense transaction.
async fn contribute(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<ContributionPayload>,
) -> Result<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let mut goal = load_owned_goal(&state, &user.0.id, &id).await?;

    goal.current_amount += payload.amount;
    state.db.upsert_goal(&goal).await?;

    let now = format_utc_rfc3339(chrono::Utc::now());
    let transaction = Transaction {
        id: Uuid::new_v4().to_string(),
        user_id: user.0.id.clone(),
        amount: payload.amount,
        kind: TransactionKind::Expense,
        category_id: None,
        date: now.clone(),
        description: Some(format!("Contribution to goal \"{}\"", goal.name)),
        recurrence: None,
        created_at: now.clone(),
        updated_at: now,
    };
    state.db.upsert_transaction(&transaction).await?;

    tracing::info!(
        goal_id = %goal.id,
        amount = payload.amount,
        reached = goal.is_reached(),
        "Goal contribution recorded"
    );

    Ok(Json(ApiResponse::ok("Contribution recorded", goal)))
}
