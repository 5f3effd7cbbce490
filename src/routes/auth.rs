// SPDX-License-Identifier: MIT

//! Authentication routes: signup, login, refresh rotation, logout, profile.

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::{Role, User};
use crate::response::ApiResponse;
use crate::services::session::{self, REFRESH_COOKIE};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
}

/// Routes layered with `require_auth` in routes/mod.rs. Deliberately not
/// subscription-gated: a blocked user must still be able to read their own
/// profile and see why they are blocked.
pub fn me_routes() -> Router<Arc<AppState>> {
    Router::new().route("/auth/me", get(me))
}

// ─── Signup ──────────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct SignupPayload {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    name: String,
    #[validate(email(message = "invalid email address"))]
    email: String,
    #[validate(length(min = 8, max = 128, message = "password must be 8-128 characters"))]
    password: String,
}

/// Register a new account. Accounts start inactive regardless of input;
/// an admin activates them later. The very first account becomes the admin.
async fn signup(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SignupPayload>,
) -> Result<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let email = payload.email.trim().to_lowercase();

    if state.db.get_user_by_email(&email).await?.is_some() {
        return Err(AppError::Validation("Email already registered".to_string()));
    }

    let is_first_user = !state.db.has_any_user().await?;

    let user = User {
        id: Uuid::new_v4().to_string(),
        name: payload.name.trim().to_string(),
        email,
        password_hash: session::hash_password(&payload.password)?,
        role: if is_first_user { Role::Admin } else { Role::User },
        is_active: false,
        activated_at: None,
        expires_at: None,
        refresh_token_hash: None,
        created_at: format_utc_rfc3339(chrono::Utc::now()),
    };

    state.db.upsert_user(&user).await?;

    tracing::info!(user_id = %user.id, admin = is_first_user, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Account created", user.profile())),
    ))
}

// ─── Login ───────────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct LoginPayload {
    #[validate(email(message = "invalid email address"))]
    email: String,
    #[validate(length(min = 1, message = "password is required"))]
    password: String,
}

/// Authenticate with email + password and start a session.
///
/// The same error is returned for an unknown email and a wrong password.
/// Login succeeds for inactive accounts; subscription gating is a separate
/// concern handled per route.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let invalid_credentials = || AppError::Unauthorized("Invalid credentials".to_string());

    let email = payload.email.trim().to_lowercase();
    let mut user = state
        .db
        .get_user_by_email(&email)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !session::verify_password(&payload.password, &user.password_hash)? {
        return Err(invalid_credentials());
    }

    let pair = session::mint_token_pair(&user.id, &state.config)?;

    // Rotation invariant: the new refresh token replaces any prior one
    user.refresh_token_hash = Some(session::hash_refresh_token(&pair.refresh_token));
    state.db.upsert_user(&user).await?;

    tracing::info!(user_id = %user.id, "User logged in");

    let jar = jar
        .add(session::access_cookie(&pair.access_token, &state.config))
        .add(session::refresh_cookie(&pair.refresh_token, &state.config));

    Ok((jar, Json(ApiResponse::ok("Logged in", user.profile()))))
}

// ─── Refresh ─────────────────────────────────────────────────────

/// Rotate the session: verify the refresh cookie, compare it against the
/// stored hash (rejecting superseded tokens), then issue and store a brand
/// new pair.
async fn refresh(State(state): State<Arc<AppState>>, jar: CookieJar) -> Result<impl IntoResponse> {
    let token = jar
        .get(REFRESH_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or_else(|| AppError::Unauthorized("Refresh token required".to_string()))?;

    let invalid_token = || AppError::Unauthorized("Invalid or expired refresh token".to_string());

    let claims =
        session::verify_token(&token, &state.config.jwt_refresh_secret).ok_or_else(invalid_token)?;

    let mut user = state
        .db
        .get_user(&claims.sub)
        .await?
        .ok_or_else(invalid_token)?;

    let presented_hash = session::hash_refresh_token(&token);
    if user.refresh_token_hash.as_deref() != Some(presented_hash.as_str()) {
        // A superseded token was replayed; only the most recent one rotates
        tracing::warn!(user_id = %user.id, "Refresh token mismatch");
        return Err(AppError::Unauthorized("Refresh token mismatch".to_string()));
    }

    let pair = session::mint_token_pair(&user.id, &state.config)?;
    user.refresh_token_hash = Some(session::hash_refresh_token(&pair.refresh_token));
    state.db.upsert_user(&user).await?;

    let jar = jar
        .add(session::access_cookie(&pair.access_token, &state.config))
        .add(session::refresh_cookie(&pair.refresh_token, &state.config));

    Ok((jar, Json(ApiResponse::ok("Session refreshed", user.profile()))))
}

// ─── Logout ──────────────────────────────────────────────────────

/// End the session. Best-effort: the stored refresh-token hash is cleared
/// when the cookie still resolves to a user, and both cookies are cleared
/// regardless. Never fails, even with no or garbage cookies.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    if let Some(cookie) = jar.get(REFRESH_COOKIE) {
        if let Some(claims) = session::verify_token(cookie.value(), &state.config.jwt_refresh_secret)
        {
            match state.db.get_user(&claims.sub).await {
                Ok(Some(mut user)) => {
                    user.refresh_token_hash = None;
                    if let Err(e) = state.db.upsert_user(&user).await {
                        tracing::warn!(error = %e, "Failed to clear stored refresh token");
                    }
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "Failed to load user during logout"),
            }
        }
    }

    let jar = jar
        .add(session::clear_access_cookie(&state.config))
        .add(session::clear_refresh_cookie(&state.config));

    (jar, Json(ApiResponse::message("Logged out")))
}

// ─── Profile ─────────────────────────────────────────────────────

/// Current user profile, including subscription state.
async fn me(Extension(user): Extension<CurrentUser>) -> Json<ApiResponse<crate::models::UserProfile>> {
    Json(ApiResponse::ok("Profile fetched", user.0.profile()))
}
