use serde::Serialize;
use uuid::Uuid;

use crate::db::{CourseDetail, User};
use crate::entities::{categories, lessons, roles};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub created_at: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthDto {
    pub user: UserDto,
    pub access_token: String,
}

#[derive(Debug, Serialize)]
pub struct RoleDto {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
}

impl From<roles::Model> for RoleDto {
    fn from(role: roles::Model) -> Self {
        Self {
            id: role.id,
            name: role.name,
            description: role.description,
            created_at: role.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryDto {
    pub id: Uuid,
    pub name: String,
}

impl From<categories::Model> for CategoryDto {
    fn from(category: categories::Model) -> Self {
        Self {
            id: category.id,
            name: category.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LessonDto {
    pub id: Uuid,
    pub title: String,
    pub content: Option<String>,
    pub video_url: Option<String>,
    pub sort_order: i32,
    pub course_id: Uuid,
    pub created_at: String,
}

impl From<lessons::Model> for LessonDto {
    fn from(lesson: lessons::Model) -> Self {
        Self {
            id: lesson.id,
            title: lesson.title,
            content: lesson.content,
            video_url: lesson.video_url,
            sort_order: lesson.sort_order,
            course_id: lesson.course_id,
            created_at: lesson.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CourseDto {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub image_url: Option<String>,
    pub created_at: String,
    pub instructor: UserDto,
    pub categories: Vec<CategoryDto>,
    pub lessons: Vec<LessonDto>,
    pub enrolled_students: Vec<UserDto>,
}

impl From<CourseDetail> for CourseDto {
    fn from(detail: CourseDetail) -> Self {
        Self {
            id: detail.course.id,
            title: detail.course.title,
            description: detail.course.description,
            price: detail.course.price,
            image_url: detail.course.image_url,
            created_at: detail.course.created_at,
            instructor: detail.instructor.into(),
            categories: detail.categories.into_iter().map(Into::into).collect(),
            lessons: detail.lessons.into_iter().map(Into::into).collect(),
            enrolled_students: detail
                .enrolled_students
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageDto {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthDto {
    pub status: String,
    pub uptime_seconds: u64,
    pub database: String,
}
