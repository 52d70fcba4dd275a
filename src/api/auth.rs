use axum::{
    Json,
    extract::{FromRequestParts, State},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, AuthDto, UserDto};
use crate::models::Role;
use crate::services::Claim;

/// Bearer-token authentication. Any handler that takes a [`Claim`] argument
/// rejects unauthenticated requests with 401 before any other check runs.
impl FromRequestParts<Arc<AppState>> for Claim {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;

        let claim = state
            .tokens()
            .verify(token)
            .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;

        tracing::Span::current().record("user_id", claim.subject_id.to_string());

        Ok(claim)
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Role gate. Runs after authentication, before any resource lookup.
pub fn require_role(claim: &Claim, allowed: &[Role]) -> Result<(), ApiError> {
    if allowed.contains(&claim.role) {
        Ok(())
    } else {
        Err(ApiError::forbidden(
            "You do not have permission to perform this action",
        ))
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    /// Role name, defaults to "student". Admin accounts cannot be
    /// self-registered.
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthDto>>), ApiError> {
    if payload.email.trim().is_empty() || !payload.email.contains('@') {
        return Err(ApiError::validation("A valid email address is required"));
    }
    if payload.password.len() < 6 {
        return Err(ApiError::validation(
            "Password must be at least 6 characters long",
        ));
    }
    if payload.full_name.trim().is_empty() {
        return Err(ApiError::validation("Full name is required"));
    }

    let role_name = payload.role.as_deref().unwrap_or("student");
    let role = role_name
        .parse::<Role>()
        .map_err(|_| ApiError::validation(format!("Unknown role: {role_name}")))?;
    if role.is_admin() {
        return Err(ApiError::forbidden("Admin accounts cannot be registered"));
    }

    let role_row = state
        .store()
        .get_role_by_name(role.as_str())
        .await?
        .ok_or_else(|| ApiError::internal(format!("Role '{role}' is not seeded")))?;

    let security = { state.config().read().await.security.clone() };
    let user = state
        .store()
        .create_user(
            crate::db::NewUser {
                email: payload.email,
                password: payload.password,
                full_name: payload.full_name,
                role_id: role_row.id,
            },
            &security,
        )
        .await?;

    let access_token = state.tokens().issue(user.id, &user.email, role)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(AuthDto {
            user: user.into(),
            access_token,
        })),
    ))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthDto>>, ApiError> {
    let user = state
        .store()
        .verify_credentials(&payload.email, &payload.password)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    let role = user
        .role
        .parse::<Role>()
        .map_err(|e| ApiError::internal(format!("User has an unsupported role: {e}")))?;

    let access_token = state.tokens().issue(user.id, &user.email, role)?;

    Ok(Json(ApiResponse::success(AuthDto {
        user: user.into(),
        access_token,
    })))
}

pub async fn me(
    State(state): State<Arc<AppState>>,
    claim: Claim,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state.store().get_user(claim.subject_id).await?;
    Ok(Json(ApiResponse::success(user.into())))
}
