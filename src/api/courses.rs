use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use super::auth::require_role;
use super::{ApiError, ApiResponse, AppState, CourseDto, MessageDto};
use crate::db::{CourseUpdate, NewCourse};
use crate::models::Role;
use crate::services::Claim;
use crate::services::image::ImageError;

#[derive(Debug, Deserialize)]
pub struct CreateCourseRequest {
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub category_ids: Vec<Uuid>,
}

/// Partial update. A present `category_ids` replaces the whole set, even
/// when empty; an absent one leaves the set alone.
#[derive(Debug, Deserialize)]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category_ids: Option<Vec<Uuid>>,
}

/// Resolves the course first so a missing course is a 404 even for callers
/// who would not have been allowed to touch it. Admins bypass the
/// instructor-of-record check.
pub(super) async fn ensure_course_owner(
    state: &AppState,
    claim: &Claim,
    course_id: Uuid,
) -> Result<(), ApiError> {
    let course = state.store().get_course_row(course_id).await?;

    if claim.role.is_admin() || course.instructor_id == claim.subject_id {
        Ok(())
    } else {
        Err(ApiError::forbidden(
            "You can only modify your own courses",
        ))
    }
}

pub async fn list_courses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<CourseDto>>>, ApiError> {
    let courses = state.store().list_courses().await?;
    Ok(Json(ApiResponse::success(
        courses.into_iter().map(Into::into).collect(),
    )))
}

pub async fn get_course(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CourseDto>>, ApiError> {
    let course = state.store().get_course(id).await?;
    Ok(Json(ApiResponse::success(course.into())))
}

pub async fn create_course(
    State(state): State<Arc<AppState>>,
    claim: Claim,
    Json(payload): Json<CreateCourseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CourseDto>>), ApiError> {
    require_role(&claim, &[Role::Instructor, Role::Admin])?;

    if payload.title.trim().is_empty() {
        return Err(ApiError::validation("Course title is required"));
    }
    if payload.price < 0.0 {
        return Err(ApiError::validation("Price cannot be negative"));
    }

    // The caller becomes the instructor of record; this never changes later
    let course = state
        .store()
        .create_course(NewCourse {
            title: payload.title,
            description: payload.description,
            price: payload.price,
            category_ids: payload.category_ids,
            instructor_id: claim.subject_id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(course.into())),
    ))
}

pub async fn update_course(
    State(state): State<Arc<AppState>>,
    claim: Claim,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCourseRequest>,
) -> Result<Json<ApiResponse<CourseDto>>, ApiError> {
    require_role(&claim, &[Role::Instructor, Role::Admin])?;
    ensure_course_owner(&state, &claim, id).await?;

    if let Some(price) = payload.price {
        if price < 0.0 {
            return Err(ApiError::validation("Price cannot be negative"));
        }
    }

    let course = state
        .store()
        .update_course(
            id,
            CourseUpdate {
                title: payload.title,
                description: payload.description,
                price: payload.price,
                category_ids: payload.category_ids,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(course.into())))
}

pub async fn delete_course(
    State(state): State<Arc<AppState>>,
    claim: Claim,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageDto>>, ApiError> {
    require_role(&claim, &[Role::Instructor, Role::Admin])?;
    ensure_course_owner(&state, &claim, id).await?;

    state.store().delete_course(id).await?;
    Ok(Json(ApiResponse::success(MessageDto {
        message: "Course deleted".to_string(),
    })))
}

pub async fn enroll(
    State(state): State<Arc<AppState>>,
    claim: Claim,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<ApiResponse<CourseDto>>), ApiError> {
    let course = state
        .store()
        .enroll_student(id, claim.subject_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(course.into())),
    ))
}

pub async fn unenroll(
    State(state): State<Arc<AppState>>,
    claim: Claim,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageDto>>, ApiError> {
    state.store().unenroll_student(id, claim.subject_id).await?;

    Ok(Json(ApiResponse::success(MessageDto {
        message: "Enrollment removed".to_string(),
    })))
}

pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    claim: Claim,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<CourseDto>>, ApiError> {
    require_role(&claim, &[Role::Instructor, Role::Admin])?;
    ensure_course_owner(&state, &claim, id).await?;

    let field = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Invalid multipart body: {e}")))?
        .ok_or_else(|| ApiError::validation("Expected an image file field"))?;

    let content_type = field
        .content_type()
        .ok_or_else(|| ApiError::validation("Image field is missing a content type"))?
        .to_string();
    let bytes = field
        .bytes()
        .await
        .map_err(|e| ApiError::validation(format!("Failed to read image data: {e}")))?;

    let image_url = state
        .images()
        .save(&content_type, &bytes)
        .await
        .map_err(|e| match e {
            ImageError::UnsupportedType(_) | ImageError::TooLarge(_) => {
                ApiError::validation(e.to_string())
            }
            ImageError::Io(io) => ApiError::internal(io.to_string()),
        })?;

    let course = state.store().set_course_image(id, &image_url).await?;
    Ok(Json(ApiResponse::success(course.into())))
}
