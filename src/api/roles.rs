use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::require_role;
use super::{ApiError, ApiResponse, AppState, MessageDto, RoleDto};
use crate::models::Role;
use crate::services::Claim;

#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

pub async fn list_roles(
    State(state): State<Arc<AppState>>,
    claim: Claim,
) -> Result<Json<ApiResponse<Vec<RoleDto>>>, ApiError> {
    require_role(&claim, &[Role::Admin])?;

    let roles = state.store().list_roles().await?;
    Ok(Json(ApiResponse::success(
        roles.into_iter().map(Into::into).collect(),
    )))
}

pub async fn get_role(
    State(state): State<Arc<AppState>>,
    claim: Claim,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<RoleDto>>, ApiError> {
    require_role(&claim, &[Role::Admin])?;

    let role = state.store().get_role(id).await?;
    Ok(Json(ApiResponse::success(role.into())))
}

pub async fn create_role(
    State(state): State<Arc<AppState>>,
    claim: Claim,
    Json(payload): Json<CreateRoleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RoleDto>>), ApiError> {
    require_role(&claim, &[Role::Admin])?;

    if payload.name.trim().is_empty() {
        return Err(ApiError::validation("Role name is required"));
    }

    let role = state
        .store()
        .create_role(&payload.name, payload.description)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(role.into())),
    ))
}

pub async fn update_role(
    State(state): State<Arc<AppState>>,
    claim: Claim,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<Json<ApiResponse<RoleDto>>, ApiError> {
    require_role(&claim, &[Role::Admin])?;

    if let Some(name) = &payload.name {
        if name.trim().is_empty() {
            return Err(ApiError::validation("Role name is required"));
        }
    }

    let role = state
        .store()
        .update_role(id, payload.name, payload.description)
        .await?;

    Ok(Json(ApiResponse::success(role.into())))
}

pub async fn delete_role(
    State(state): State<Arc<AppState>>,
    claim: Claim,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageDto>>, ApiError> {
    require_role(&claim, &[Role::Admin])?;

    state.store().delete_role(id).await?;
    Ok(Json(ApiResponse::success(MessageDto {
        message: "Role deleted".to_string(),
    })))
}
