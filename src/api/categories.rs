use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use super::auth::require_role;
use super::{ApiError, ApiResponse, AppState, CategoryDto, MessageDto};
use crate::models::Role;
use crate::services::Claim;

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
}

pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<CategoryDto>>>, ApiError> {
    let categories = state.store().list_categories().await?;
    Ok(Json(ApiResponse::success(
        categories.into_iter().map(Into::into).collect(),
    )))
}

pub async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CategoryDto>>, ApiError> {
    let category = state.store().get_category(id).await?;
    Ok(Json(ApiResponse::success(category.into())))
}

pub async fn create_category(
    State(state): State<Arc<AppState>>,
    claim: Claim,
    Json(payload): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryDto>>), ApiError> {
    require_role(&claim, &[Role::Admin])?;

    if payload.name.is_empty() {
        return Err(ApiError::validation("Category name is required"));
    }

    let category = state.store().create_category(&payload.name).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(category.into())),
    ))
}

pub async fn update_category(
    State(state): State<Arc<AppState>>,
    claim: Claim,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryRequest>,
) -> Result<Json<ApiResponse<CategoryDto>>, ApiError> {
    require_role(&claim, &[Role::Admin])?;

    if payload.name.is_empty() {
        return Err(ApiError::validation("Category name is required"));
    }

    let category = state.store().update_category(id, &payload.name).await?;
    Ok(Json(ApiResponse::success(category.into())))
}

pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    claim: Claim,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageDto>>, ApiError> {
    require_role(&claim, &[Role::Admin])?;

    state.store().delete_category(id).await?;
    Ok(Json(ApiResponse::success(MessageDto {
        message: "Category deleted".to_string(),
    })))
}
