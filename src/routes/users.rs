// SPDX-License-Identifier: MIT

//! Admin user management routes.
//!
//! Activation opens a 30-day subscription window; expiry is checked lazily
//! on each authorized request, never by a background sweep. Deleting a user
//! removes every document they own across all collections.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::{Role, User, UserProfile};
use crate::response::ApiResponse;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;

/// Length of the subscription window granted by activation.
const SUBSCRIPTION_WINDOW_DAYS: i64 = 30;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(list_users))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/users/{id}/activate", post(activate_user))
        .route("/users/{id}/deactivate", post(deactivate_user))
}

async fn load_user(state: &AppState, user_id: &str) -> Result<User> {
    state
        .db
        .get_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {user_id}")))
}

async fn list_users(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse> {
    let profiles: Vec<UserProfile> = state
        .db
        .list_users()
        .await?
        .iter()
        .map(User::profile)
        .collect();

    Ok(Json(ApiResponse::ok("Users fetched", profiles)))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let user = load_user(&state, &id).await?;
    Ok(Json(ApiResponse::ok("User fetched", user.profile())))
}

#[derive(Deserialize, Validate)]
pub struct UpdateUserPayload {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    role: Option<Role>,
}

async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let mut user = load_user(&state, &id).await?;

    if let Some(name) = &payload.name {
        user.name = name.trim().to_string();
    }
    if let Some(role) = payload.role {
        user.role = role;
    }

    state.db.upsert_user(&user).await?;

    Ok(Json(ApiResponse::ok("User updated", user.profile())))
}

async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let user = load_user(&state, &id).await?;

    let deleted_count = state.db.delete_user_data(&user.id).await?;
    tracing::info!(user_id = %user.id, deleted_count, "Admin deleted user");

    Ok(Json(ApiResponse::message("User and all owned data deleted")))
}

/// Activate a subscription: 30 days from the activation timestamp.
async fn activate_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let mut user = load_user(&state, &id).await?;

    let now = chrono::Utc::now();
    user.is_active = true;
    user.activated_at = Some(format_utc_rfc3339(now));
    user.expires_at = Some(format_utc_rfc3339(
        now + chrono::Duration::days(SUBSCRIPTION_WINDOW_DAYS),
    ));

    state.db.upsert_user(&user).await?;

    tracing::info!(user_id = %user.id, expires_at = ?user.expires_at, "User activated");

    Ok(Json(ApiResponse::ok("User activated", user.profile())))
}

/// Deactivate a subscription immediately. The expiry window is left in
/// place; `is_active` alone blocks gated routes.
async fn deactivate_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let mut user = load_user(&state, &id).await?;

    user.is_active = false;
    state.db.upsert_user(&user).await?;

    tracing::info!(user_id = %user.id, "User deactivated");

    Ok(Json(ApiResponse::ok("User deactivated", user.profile())))
}
