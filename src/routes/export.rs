// SPDX-License-Identifier: MIT

//! Admin data export routes (CSV or JSON).

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::Result;
use crate::models::{User, UserProfile};
use crate::response::ApiResponse;
use crate::services::export;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/export/users", get(export_users))
        .route("/export/transactions", get(export_transactions))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ExportFormat {
    Csv,
    Json,
}

#[derive(Deserialize)]
struct ExportQuery {
    #[serde(default = "default_format")]
    format: ExportFormat,
}

fn default_format() -> ExportFormat {
    ExportFormat::Json
}

fn csv_response(filename: &str, body: String) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
}

async fn export_users(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExportQuery>,
) -> Result<axum::response::Response> {
    let users = state.db.list_users().await?;

    let response = match query.format {
        ExportFormat::Csv => {
            csv_response("users.csv", export::users_to_csv(&users)?).into_response()
        }
        ExportFormat::Json => {
            let profiles: Vec<UserProfile> = users.iter().map(User::profile).collect();
            Json(ApiResponse::ok("Users exported", profiles)).into_response()
        }
    };

    Ok(response)
}

async fn export_transactions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExportQuery>,
) -> Result<axum::response::Response> {
    let transactions = state.db.list_all_transactions().await?;

    let response = match query.format {
        ExportFormat::Csv => {
            csv_response("transactions.csv", export::transactions_to_csv(&transactions)?)
                .into_response()
        }
        ExportFormat::Json => {
            Json(ApiResponse::ok("Transactions exported", transactions)).into_response()
        }
    };

    Ok(response)
}
