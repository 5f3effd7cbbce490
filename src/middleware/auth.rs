// SPDX-License-Identifier: MIT

//! JWT authentication and authorization middleware.
//!
//! Three gates, layered per route group:
//! - [`require_auth`] resolves the access token to a user. It does not look
//!   at subscription state, so `/auth/me` stays reachable for blocked users.
//! - [`require_subscription`] rejects non-admins whose account is inactive
//!   or whose subscription window has lapsed (checked lazily per request).
//! - [`require_admin`] restricts the admin surface.

use crate::error::AppError;
use crate::models::User;
use crate::services::session::{self, ACCESS_COOKIE};
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// Authenticated user attached to request extensions.
///
/// Credential material (password hash, stored refresh-token hash) is
/// stripped before the user reaches any handler.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Middleware that requires a valid access token.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Try cookie first, then header
    let token = if let Some(cookie) = jar.get(ACCESS_COOKIE) {
        cookie.value().to_string()
    } else {
        let auth_header = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        match auth_header {
            Some(h) if h.starts_with("Bearer ") => h[7..].to_string(),
            _ => return Err(AppError::Unauthorized("Access token required".to_string())),
        }
    };

    let claims = session::verify_token(&token, &state.config.jwt_access_secret)
        .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".to_string()))?;

    let mut user = state
        .db
        .get_user(&claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".to_string()))?;

    user.password_hash = String::new();
    user.refresh_token_hash = None;

    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}

/// Middleware that requires an active subscription. Must be layered inside
/// [`require_auth`]. Admins always pass.
pub async fn require_subscription(request: Request, next: Next) -> Result<Response, AppError> {
    let user = current_user(&request)?;

    if !user.is_admin() && !has_active_subscription(user, chrono::Utc::now()) {
        return Err(AppError::SubscriptionRequired);
    }

    Ok(next.run(request).await)
}

/// Middleware that requires the admin role. Must be layered inside
/// [`require_auth`].
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    let user = current_user(&request)?;

    if !user.is_admin() {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }

    Ok(next.run(request).await)
}

fn current_user(request: &Request) -> Result<&User, AppError> {
    request
        .extensions()
        .get::<CurrentUser>()
        .map(|current| &current.0)
        .ok_or_else(|| AppError::Unauthorized("Access token required".to_string()))
}

/// Whether a non-admin account may use subscription-gated routes right now.
///
/// An unparseable `expires_at` counts as expired rather than as a free pass.
fn has_active_subscription(user: &User, now: chrono::DateTime<chrono::Utc>) -> bool {
    if !user.is_active {
        return false;
    }

    match &user.expires_at {
        None => true,
        Some(expires_at) => chrono::DateTime::parse_from_rfc3339(expires_at)
            .map(|dt| dt.with_timezone(&chrono::Utc) > now)
            .unwrap_or(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use chrono::TimeZone;

    fn make_user(is_active: bool, expires_at: Option<&str>) -> User {
        User {
            id: "u1".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: String::new(),
            role: Role::User,
            is_active,
            activated_at: None,
            expires_at: expires_at.map(String::from),
            refresh_token_hash: None,
            created_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_inactive_user_is_blocked() {
        let now = chrono::Utc.with_ymd_and_hms(2024, 5, 15, 0, 0, 0).unwrap();
        assert!(!has_active_subscription(&make_user(false, None), now));
    }

    #[test]
    fn test_active_user_without_window_passes() {
        let now = chrono::Utc.with_ymd_and_hms(2024, 5, 15, 0, 0, 0).unwrap();
        assert!(has_active_subscription(&make_user(true, None), now));
    }

    #[test]
    fn test_lapsed_window_is_blocked() {
        let now = chrono::Utc.with_ymd_and_hms(2024, 5, 15, 0, 0, 0).unwrap();
        let user = make_user(true, Some("2024-05-14T23:59:59Z"));
        assert!(!has_active_subscription(&user, now));
    }

    #[test]
    fn test_future_window_passes() {
        let now = chrono::Utc.with_ymd_and_hms(2024, 5, 15, 0, 0, 0).unwrap();
        let user = make_user(true, Some("2024-06-14T00:00:00Z"));
        assert!(has_active_subscription(&user, now));
    }

    #[test]
    fn test_unparseable_window_is_blocked() {
        let now = chrono::Utc.with_ymd_and_hms(2024, 5, 15, 0, 0, 0).unwrap();
        let user = make_user(true, Some("not-a-date"));
        assert!(!has_active_subscription(&user, now));
    }
}
