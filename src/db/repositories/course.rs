use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use super::StoreError;
use super::user::User;
use crate::entities::prelude::*;
use crate::entities::{categories, course_categories, courses, enrollments, lessons};

/// A course with every relation the API exposes resolved.
#[derive(Debug, Clone)]
pub struct CourseDetail {
    pub course: courses::Model,
    pub instructor: User,
    pub categories: Vec<categories::Model>,
    pub lessons: Vec<lessons::Model>,
    pub enrolled_students: Vec<User>,
}

#[derive(Debug, Clone)]
pub struct NewCourse {
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub category_ids: Vec<Uuid>,
    pub instructor_id: Uuid,
}

/// Partial update. `category_ids: Some(..)` replaces the whole category set
/// (an empty vec clears it); `None` leaves the existing set untouched.
#[derive(Debug, Clone, Default)]
pub struct CourseUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category_ids: Option<Vec<Uuid>>,
}

pub struct CourseRepository {
    conn: DatabaseConnection,
}

impl CourseRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, course: NewCourse) -> Result<CourseDetail, StoreError> {
        if Users::find_by_id(course.instructor_id)
            .one(&self.conn)
            .await?
            .is_none()
        {
            return Err(StoreError::not_found(format!(
                "User with ID {} not found",
                course.instructor_id
            )));
        }

        let id = Uuid::new_v4();
        let txn = self.conn.begin().await?;

        let model = courses::ActiveModel {
            id: Set(id),
            title: Set(course.title),
            description: Set(course.description),
            price: Set(course.price),
            image_url: Set(None),
            instructor_id: Set(course.instructor_id),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };
        model.insert(&txn).await?;

        replace_categories(&txn, id, &course.category_ids).await?;

        txn.commit().await?;

        self.get(id).await
    }

    pub async fn list(&self) -> Result<Vec<CourseDetail>, StoreError> {
        let rows = Courses::find()
            .order_by_asc(courses::Column::CreatedAt)
            .all(&self.conn)
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(assemble(&self.conn, row).await?);
        }
        Ok(out)
    }

    pub async fn get(&self, id: Uuid) -> Result<CourseDetail, StoreError> {
        let row = self.get_row(id).await?;
        assemble(&self.conn, row).await
    }

    pub async fn get_row(&self, id: Uuid) -> Result<courses::Model, StoreError> {
        Courses::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| StoreError::not_found(format!("Course with ID {id} not found")))
    }

    pub async fn update(&self, id: Uuid, update: CourseUpdate) -> Result<CourseDetail, StoreError> {
        let row = self.get_row(id).await?;

        let txn = self.conn.begin().await?;

        let mut active: courses::ActiveModel = row.into();
        if let Some(title) = update.title {
            active.title = Set(title);
        }
        if let Some(description) = update.description {
            active.description = Set(Some(description));
        }
        if let Some(price) = update.price {
            active.price = Set(price);
        }
        active.update(&txn).await?;

        if let Some(category_ids) = update.category_ids {
            CourseCategories::delete_many()
                .filter(course_categories::Column::CourseId.eq(id))
                .exec(&txn)
                .await?;
            replace_categories(&txn, id, &category_ids).await?;
        }

        txn.commit().await?;

        self.get(id).await
    }

    /// Removes the course together with its lessons, category links and
    /// enrollment rows, all in one transaction.
    pub async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.get_row(id).await?;

        let txn = self.conn.begin().await?;

        Lessons::delete_many()
            .filter(lessons::Column::CourseId.eq(id))
            .exec(&txn)
            .await?;
        CourseCategories::delete_many()
            .filter(course_categories::Column::CourseId.eq(id))
            .exec(&txn)
            .await?;
        Enrollments::delete_many()
            .filter(enrollments::Column::CourseId.eq(id))
            .exec(&txn)
            .await?;
        Courses::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    pub async fn set_image(&self, id: Uuid, image_url: &str) -> Result<CourseDetail, StoreError> {
        let row = self.get_row(id).await?;

        let mut active: courses::ActiveModel = row.into();
        active.image_url = Set(Some(image_url.to_string()));
        active.update(&self.conn).await?;

        self.get(id).await
    }

    /// Enroll a student. Not idempotent: enrolling twice is a conflict, as is
    /// an instructor enrolling in their own course. The composite primary key
    /// on `enrollments` backstops the duplicate check under concurrency.
    pub async fn enroll(
        &self,
        course_id: Uuid,
        student_id: Uuid,
    ) -> Result<CourseDetail, StoreError> {
        let course = self.get_row(course_id).await?;

        if Users::find_by_id(student_id).one(&self.conn).await?.is_none() {
            return Err(StoreError::not_found(format!(
                "User with ID {student_id} not found"
            )));
        }

        if course.instructor_id == student_id {
            return Err(StoreError::conflict(
                "You cannot enroll in your own course",
            ));
        }

        let already = Enrollments::find_by_id((course_id, student_id))
            .count(&self.conn)
            .await?;
        if already > 0 {
            return Err(StoreError::conflict(
                "You are already enrolled in this course",
            ));
        }

        let model = enrollments::ActiveModel {
            course_id: Set(course_id),
            student_id: Set(student_id),
            enrolled_at: Set(chrono::Utc::now().to_rfc3339()),
        };
        if let Err(e) = model.insert(&self.conn).await {
            // Two racing enrolls both pass the pre-check; the primary key
            // rejects the loser and we report it as the same conflict.
            return match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Err(StoreError::conflict(
                    "You are already enrolled in this course",
                )),
                _ => Err(e.into()),
            };
        }

        self.get(course_id).await
    }

    pub async fn unenroll(&self, course_id: Uuid, student_id: Uuid) -> Result<(), StoreError> {
        self.get_row(course_id).await?;

        if Users::find_by_id(student_id).one(&self.conn).await?.is_none() {
            return Err(StoreError::not_found(format!(
                "User with ID {student_id} not found"
            )));
        }

        let result = Enrollments::delete_by_id((course_id, student_id))
            .exec(&self.conn)
            .await?;
        if result.rows_affected == 0 {
            return Err(StoreError::not_found(
                "You are not enrolled in this course",
            ));
        }

        Ok(())
    }
}

/// Attach the given categories to a course. Unknown IDs are silently
/// dropped rather than rejected, matching the permissive create/update
/// contract.
async fn replace_categories<C: ConnectionTrait>(
    conn: &C,
    course_id: Uuid,
    category_ids: &[Uuid],
) -> Result<(), StoreError> {
    if category_ids.is_empty() {
        return Ok(());
    }

    let resolved = Categories::find()
        .filter(categories::Column::Id.is_in(category_ids.iter().copied()))
        .all(conn)
        .await?;

    if resolved.is_empty() {
        return Ok(());
    }

    let links = resolved.into_iter().map(|cat| course_categories::ActiveModel {
        course_id: Set(course_id),
        category_id: Set(cat.id),
    });
    CourseCategories::insert_many(links).exec(conn).await?;

    Ok(())
}

async fn assemble<C: ConnectionTrait>(
    conn: &C,
    course: courses::Model,
) -> Result<CourseDetail, StoreError> {
    let instructor = Users::find_by_id(course.instructor_id)
        .find_also_related(Roles)
        .one(conn)
        .await?
        .map(|(user, role)| User::from_joined(user, role))
        .ok_or_else(|| {
            StoreError::not_found(format!(
                "User with ID {} not found",
                course.instructor_id
            ))
        })?;

    let category_ids: Vec<Uuid> = CourseCategories::find()
        .filter(course_categories::Column::CourseId.eq(course.id))
        .all(conn)
        .await?
        .into_iter()
        .map(|link| link.category_id)
        .collect();
    let categories = if category_ids.is_empty() {
        Vec::new()
    } else {
        Categories::find()
            .filter(categories::Column::Id.is_in(category_ids))
            .order_by_asc(categories::Column::Name)
            .all(conn)
            .await?
    };

    let lessons = Lessons::find()
        .filter(lessons::Column::CourseId.eq(course.id))
        .order_by_asc(lessons::Column::SortOrder)
        .order_by_asc(lessons::Column::CreatedAt)
        .all(conn)
        .await?;

    let student_ids: Vec<Uuid> = Enrollments::find()
        .filter(enrollments::Column::CourseId.eq(course.id))
        .order_by_asc(enrollments::Column::EnrolledAt)
        .all(conn)
        .await?
        .into_iter()
        .map(|row| row.student_id)
        .collect();
    let enrolled_students = if student_ids.is_empty() {
        Vec::new()
    } else {
        Users::find()
            .filter(crate::entities::users::Column::Id.is_in(student_ids))
            .find_also_related(Roles)
            .all(conn)
            .await?
            .into_iter()
            .map(|(user, role)| User::from_joined(user, role))
            .collect()
    };

    Ok(CourseDetail {
        course,
        instructor,
        categories,
        lessons,
        enrolled_students,
    })
}
