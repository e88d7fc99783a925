use ahat_core::{Category, Stats};
use axum::{extract::State, Json};
use serde::Serialize;

use super::{map_db_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct CategoryList {
    success: bool,
    data: Vec<Category>,
    total: usize,
}

pub(super) async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<CategoryList>, ApiError> {
    let data = state
        .store
        .list_categories()
        .await
        .map_err(|e| map_db_error("Failed to fetch categories", &e))?;

    Ok(Json(CategoryList {
        success: true,
        total: data.len(),
        data,
    }))
}

pub(super) async fn get_stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Stats>>, ApiError> {
    let stats = state
        .store
        .compute_stats()
        .await
        .map_err(|e| map_db_error("Failed to calculate stats", &e))?;

    Ok(ApiResponse::ok(stats))
}
