use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::StoreError;
use crate::entities::prelude::*;
use crate::entities::lessons;

#[derive(Debug, Clone)]
pub struct NewLesson {
    pub title: String,
    pub content: Option<String>,
    pub video_url: Option<String>,
    pub sort_order: i32,
    pub course_id: Uuid,
}

#[derive(Debug, Clone, Default)]
pub struct LessonUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub video_url: Option<String>,
    pub sort_order: Option<i32>,
    pub course_id: Option<Uuid>,
}

pub struct LessonRepository {
    conn: DatabaseConnection,
}

impl LessonRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, lesson: NewLesson) -> Result<lessons::Model, StoreError> {
        self.require_course(lesson.course_id).await?;

        let model = lessons::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(lesson.title),
            content: Set(lesson.content),
            video_url: Set(lesson.video_url),
            sort_order: Set(lesson.sort_order),
            course_id: Set(lesson.course_id),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };
        let inserted = model.insert(&self.conn).await?;
        Ok(inserted)
    }

    /// Lessons come back ordered by `sort_order`; ties stay in creation
    /// order.
    pub async fn list(&self, course_id: Option<Uuid>) -> Result<Vec<lessons::Model>, StoreError> {
        let mut query = Lessons::find();
        if let Some(course_id) = course_id {
            query = query.filter(lessons::Column::CourseId.eq(course_id));
        }

        let rows = query
            .order_by_asc(lessons::Column::SortOrder)
            .order_by_asc(lessons::Column::CreatedAt)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }

    pub async fn get(&self, id: Uuid) -> Result<lessons::Model, StoreError> {
        Lessons::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| StoreError::not_found(format!("Lesson with ID {id} not found")))
    }

    pub async fn update(&self, id: Uuid, update: LessonUpdate) -> Result<lessons::Model, StoreError> {
        let lesson = self.get(id).await?;

        if let Some(course_id) = update.course_id {
            self.require_course(course_id).await?;
        }

        let mut active: lessons::ActiveModel = lesson.into();
        if let Some(title) = update.title {
            active.title = Set(title);
        }
        if let Some(content) = update.content {
            active.content = Set(Some(content));
        }
        if let Some(video_url) = update.video_url {
            active.video_url = Set(Some(video_url));
        }
        if let Some(sort_order) = update.sort_order {
            active.sort_order = Set(sort_order);
        }
        if let Some(course_id) = update.course_id {
            active.course_id = Set(course_id);
        }
        let updated = active.update(&self.conn).await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let lesson = self.get(id).await?;

        let active: lessons::ActiveModel = lesson.into();
        active.delete(&self.conn).await?;
        Ok(())
    }

    async fn require_course(&self, course_id: Uuid) -> Result<(), StoreError> {
        Courses::find_by_id(course_id)
            .one(&self.conn)
            .await?
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(format!("Course with ID {course_id} not found")))
    }
}
