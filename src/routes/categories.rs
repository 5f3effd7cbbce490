// SPDX-License-Identifier: MIT

//! Category CRUD routes.
//!
//! Names are unique per user, enforced with a lookup before create/rename.
//! Deleting a category does not cascade: transactions and budget entries
//! keep their now-dangling references and read as "uncategorized".

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::Category;
use crate::response::ApiResponse;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            axum::routing::put(update_category).delete(delete_category),
        )
}

#[derive(Deserialize, Validate)]
pub struct CategoryPayload {
    #[validate(length(min = 1, max = 50, message = "name must be 1-50 characters"))]
    name: String,
}

async fn list_categories(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse> {
    let categories = state.db.list_categories(&user.0.id).await?;
    Ok(Json(ApiResponse::ok("Categories fetched", categories)))
}

async fn create_category(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CategoryPayload>,
) -> Result<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let name = payload.name.trim().to_string();
    if state
        .db
        .find_category_by_name(&user.0.id, &name)
        .await?
        .is_some()
    {
        return Err(AppError::Validation(format!(
            "Category \"{name}\" already exists"
        )));
    }

    let category = Category {
        id: Uuid::new_v4().to_string(),
        user_id: user.0.id.clone(),
        name,
        created_at: format_utc_rfc3339(chrono::Utc::now()),
    };

    state.db.upsert_category(&category).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Category created", category)),
    ))
}

async fn load_owned_category(
    state: &AppState,
    user_id: &str,
    category_id: &str,
) -> Result<Category> {
    state
        .db
        .get_category(category_id)
        .await?
        .filter(|c| c.user_id == user_id)
        .ok_or_else(|| AppError::NotFound(format!("category {category_id}")))
}

async fn update_category(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<CategoryPayload>,
) -> Result<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let mut category = load_owned_category(&state, &user.0.id, &id).await?;

    let name = payload.name.trim().to_string();
    let duplicate = state
        .db
        .find_category_by_name(&user.0.id, &name)
        .await?
        .is_some_and(|existing| existing.id != category.id);
    if duplicate {
        return Err(AppError::Validation(format!(
            "Category \"{name}\" already exists"
        )));
    }

    category.name = name;
    state.db.upsert_category(&category).await?;

    Ok(Json(ApiResponse::ok("Category updated", category)))
}

async fn delete_category(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let category = load_owned_category(&state, &user.0.id, &id).await?;
    state.db.delete_category(&category.id).await?;

    Ok(Json(ApiResponse::message("Category deleted")))
}
