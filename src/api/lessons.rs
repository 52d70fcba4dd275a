use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use super::auth::require_role;
use super::courses::ensure_course_owner;
use super::{ApiError, ApiResponse, AppState, LessonDto, MessageDto};
use crate::db::{LessonUpdate, NewLesson};
use crate::models::Role;
use crate::services::Claim;

#[derive(Debug, Deserialize)]
pub struct CreateLessonRequest {
    pub title: String,
    pub content: Option<String>,
    pub video_url: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    pub course_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct UpdateLessonRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub video_url: Option<String>,
    pub sort_order: Option<i32>,
    pub course_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct LessonFilter {
    pub course_id: Option<Uuid>,
}

pub async fn list_lessons(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<LessonFilter>,
) -> Result<Json<ApiResponse<Vec<LessonDto>>>, ApiError> {
    let lessons = state.store().list_lessons(filter.course_id).await?;
    Ok(Json(ApiResponse::success(
        lessons.into_iter().map(Into::into).collect(),
    )))
}

pub async fn get_lesson(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<LessonDto>>, ApiError> {
    let lesson = state.store().get_lesson(id).await?;
    Ok(Json(ApiResponse::success(lesson.into())))
}

pub async fn create_lesson(
    State(state): State<Arc<AppState>>,
    claim: Claim,
    Json(payload): Json<CreateLessonRequest>,
) -> Result<(StatusCode, Json<ApiResponse<LessonDto>>), ApiError> {
    require_role(&claim, &[Role::Instructor, Role::Admin])?;

    if payload.title.trim().is_empty() {
        return Err(ApiError::validation("Lesson title is required"));
    }

    ensure_course_owner(&state, &claim, payload.course_id).await?;

    let lesson = state
        .store()
        .create_lesson(NewLesson {
            title: payload.title,
            content: payload.content,
            video_url: payload.video_url,
            sort_order: payload.sort_order,
            course_id: payload.course_id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(lesson.into())),
    ))
}

pub async fn update_lesson(
    State(state): State<Arc<AppState>>,
    claim: Claim,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLessonRequest>,
) -> Result<Json<ApiResponse<LessonDto>>, ApiError> {
    require_role(&claim, &[Role::Instructor, Role::Admin])?;

    let lesson = state.store().get_lesson(id).await?;
    ensure_course_owner(&state, &claim, lesson.course_id).await?;

    // Moving a lesson needs ownership of the destination course as well
    if let Some(course_id) = payload.course_id {
        if course_id != lesson.course_id {
            ensure_course_owner(&state, &claim, course_id).await?;
        }
    }

    let lesson = state
        .store()
        .update_lesson(
            id,
            LessonUpdate {
                title: payload.title,
                content: payload.content,
                video_url: payload.video_url,
                sort_order: payload.sort_order,
                course_id: payload.course_id,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(lesson.into())))
}

pub async fn delete_lesson(
    State(state): State<Arc<AppState>>,
    claim: Claim,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageDto>>, ApiError> {
    require_role(&claim, &[Role::Instructor, Role::Admin])?;

    let lesson = state.store().get_lesson(id).await?;
    ensure_course_owner(&state, &claim, lesson.course_id).await?;

    state.store().delete_lesson(id).await?;
    Ok(Json(ApiResponse::success(MessageDto {
        message: "Lesson deleted".to_string(),
    })))
}
