// SPDX-License-Identifier: MIT

//! HTTP route handlers.

pub mod auth;
pub mod budgets;
pub mod categories;
pub mod export;
pub mod goals;
pub mod transactions;
pub mod users;

use crate::middleware::auth::{require_admin, require_auth, require_subscription};
use crate::AppState;
use axum::http::{header, Method};
use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub build_id: String,
}

/// Health check response
async fn health_check() -> Json<HealthResponse> {
    let build_id = option_env!("BUILD_ID").unwrap_or("unknown").to_string();
    Json(HealthResponse {
        status: "ok".to_string(),
        build_id,
    })
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS layer - allow requests from frontend URL and localhost (for dev)
    let frontend_url = state.config.frontend_url.clone();
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::AllowOrigin::predicate(
            move |origin: &axum::http::HeaderValue, _request_parts: &axum::http::request::Parts| {
                let origin_str = origin.to_str().unwrap_or("");
                origin_str == frontend_url
                    || origin_str.starts_with("http://localhost")
                    || origin_str.starts_with("http://127.0.0.1")
            },
        ))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    // Public auth routes (signup/login/refresh/logout)
    let public_routes = auth::routes();

    // /auth/me needs a session but deliberately no subscription, so an
    // inactive user can see why they are blocked
    let profile_routes = auth::me_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // Resource routes: session + active subscription
    let resource_routes = Router::new()
        .merge(transactions::routes())
        .merge(categories::routes())
        .merge(budgets::routes())
        .merge(goals::routes())
        .route_layer(middleware::from_fn(require_subscription))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // Admin routes: session + admin role
    let admin_routes = Router::new()
        .merge(users::routes())
        .merge(export::routes())
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let api_v1 = Router::new()
        .merge(public_routes)
        .merge(profile_routes)
        .merge(resource_routes)
        .merge(admin_routes);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_v1)
        .layer(middleware::from_fn(
            crate::middleware::security::add_security_headers,
        ))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
