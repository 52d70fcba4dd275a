use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use super::auth::require_role;
use super::{ApiError, ApiResponse, AppState, MessageDto, UserDto};
use crate::db::{NewUser, UserUpdate};
use crate::models::Role;
use crate::services::Claim;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role_id: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub role_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub password: Option<String>,
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    claim: Claim,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    require_role(&claim, &[Role::Admin])?;

    let users = state.store().list_users().await?;
    Ok(Json(ApiResponse::success(
        users.into_iter().map(Into::into).collect(),
    )))
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    claim: Claim,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserDto>>), ApiError> {
    require_role(&claim, &[Role::Admin])?;

    if payload.email.trim().is_empty() || !payload.email.contains('@') {
        return Err(ApiError::validation("A valid email address is required"));
    }
    if payload.password.len() < 6 {
        return Err(ApiError::validation(
            "Password must be at least 6 characters long",
        ));
    }

    let security = { state.config().read().await.security.clone() };
    let user = state
        .store()
        .create_user(
            NewUser {
                email: payload.email,
                password: payload.password,
                full_name: payload.full_name,
                role_id: payload.role_id,
            },
            &security,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(user.into())),
    ))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    claim: Claim,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    require_role(&claim, &[Role::Admin])?;

    let user = state.store().get_user(id).await?;
    Ok(Json(ApiResponse::success(user.into())))
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    claim: Claim,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    require_role(&claim, &[Role::Admin])?;

    if let Some(password) = &payload.password {
        if password.len() < 6 {
            return Err(ApiError::validation(
                "Password must be at least 6 characters long",
            ));
        }
    }

    let security = { state.config().read().await.security.clone() };
    let user = state
        .store()
        .update_user(
            id,
            UserUpdate {
                email: payload.email,
                password: payload.password,
                full_name: payload.full_name,
                role_id: payload.role_id,
            },
            &security,
        )
        .await?;

    Ok(Json(ApiResponse::success(user.into())))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    claim: Claim,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageDto>>, ApiError> {
    require_role(&claim, &[Role::Admin])?;

    state.store().delete_user(id).await?;
    Ok(Json(ApiResponse::success(MessageDto {
        message: "User deleted".to_string(),
    })))
}

pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    claim: Claim,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state.store().get_user(claim.subject_id).await?;
    Ok(Json(ApiResponse::success(user.into())))
}

/// Self-service profile update. Email and role stay fixed here; only an
/// admin can change those through the user management endpoints.
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    claim: Claim,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    if let Some(password) = &payload.password {
        if password.len() < 6 {
            return Err(ApiError::validation(
                "Password must be at least 6 characters long",
            ));
        }
    }

    let security = { state.config().read().await.security.clone() };
    let user = state
        .store()
        .update_user(
            claim.subject_id,
            UserUpdate {
                full_name: payload.full_name,
                password: payload.password,
                ..Default::default()
            },
            &security,
        )
        .await?;

    Ok(Json(ApiResponse::success(user.into())))
}
