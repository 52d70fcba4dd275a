use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::entities::{categories, lessons, roles};

pub mod migrator;
pub mod repositories;

pub use repositories::StoreError;
pub use repositories::course::{CourseDetail, CourseUpdate, NewCourse};
pub use repositories::lesson::{LessonUpdate, NewLesson};
pub use repositories::user::{NewUser, User, UserUpdate};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        // A pooled in-memory sqlite would give every connection its own
        // empty database, so pin it to a single connection.
        let max_connections = if db_url.contains(":memory:") {
            1
        } else {
            max_connections
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn role_repo(&self) -> repositories::role::RoleRepository {
        repositories::role::RoleRepository::new(self.conn.clone())
    }

    fn category_repo(&self) -> repositories::category::CategoryRepository {
        repositories::category::CategoryRepository::new(self.conn.clone())
    }

    fn course_repo(&self) -> repositories::course::CourseRepository {
        repositories::course::CourseRepository::new(self.conn.clone())
    }

    fn lesson_repo(&self) -> repositories::lesson::LessonRepository {
        repositories::lesson::LessonRepository::new(self.conn.clone())
    }

    // ========== Users ==========

    pub async fn create_user(
        &self,
        user: NewUser,
        security: &SecurityConfig,
    ) -> Result<User, StoreError> {
        self.user_repo().create(user, security).await
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, StoreError> {
        self.user_repo().get(id).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        self.user_repo().list().await
    }

    pub async fn update_user(
        &self,
        id: Uuid,
        update: UserUpdate,
        security: &SecurityConfig,
    ) -> Result<User, StoreError> {
        self.user_repo().update(id, update, security).await
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<(), StoreError> {
        self.user_repo().delete(id).await
    }

    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, StoreError> {
        self.user_repo().verify_credentials(email, password).await
    }

    // ========== Roles ==========

    pub async fn list_roles(&self) -> Result<Vec<roles::Model>, StoreError> {
        self.role_repo().list().await
    }

    pub async fn get_role(&self, id: i32) -> Result<roles::Model, StoreError> {
        self.role_repo().get(id).await
    }

    pub async fn get_role_by_name(&self, name: &str) -> Result<Option<roles::Model>, StoreError> {
        self.role_repo().get_by_name(name).await
    }

    pub async fn create_role(
        &self,
        name: &str,
        description: Option<String>,
    ) -> Result<roles::Model, StoreError> {
        self.role_repo().create(name, description).await
    }

    pub async fn update_role(
        &self,
        id: i32,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<roles::Model, StoreError> {
        self.role_repo().update(id, name, description).await
    }

    pub async fn delete_role(&self, id: i32) -> Result<(), StoreError> {
        self.role_repo().delete(id).await
    }

    // ========== Categories ==========

    pub async fn list_categories(&self) -> Result<Vec<categories::Model>, StoreError> {
        self.category_repo().list().await
    }

    pub async fn get_category(&self, id: Uuid) -> Result<categories::Model, StoreError> {
        self.category_repo().get(id).await
    }

    pub async fn create_category(&self, name: &str) -> Result<categories::Model, StoreError> {
        self.category_repo().create(name).await
    }

    pub async fn update_category(
        &self,
        id: Uuid,
        name: &str,
    ) -> Result<categories::Model, StoreError> {
        self.category_repo().update(id, name).await
    }

    pub async fn delete_category(&self, id: Uuid) -> Result<(), StoreError> {
        self.category_repo().delete(id).await
    }

    // ========== Courses ==========

    pub async fn create_course(&self, course: NewCourse) -> Result<CourseDetail, StoreError> {
        self.course_repo().create(course).await
    }

    pub async fn list_courses(&self) -> Result<Vec<CourseDetail>, StoreError> {
        self.course_repo().list().await
    }

    pub async fn get_course(&self, id: Uuid) -> Result<CourseDetail, StoreError> {
        self.course_repo().get(id).await
    }

    /// Raw course row, used by ownership checks before any mutation.
    pub async fn get_course_row(
        &self,
        id: Uuid,
    ) -> Result<crate::entities::courses::Model, StoreError> {
        self.course_repo().get_row(id).await
    }

    pub async fn update_course(
        &self,
        id: Uuid,
        update: CourseUpdate,
    ) -> Result<CourseDetail, StoreError> {
        self.course_repo().update(id, update).await
    }

    pub async fn delete_course(&self, id: Uuid) -> Result<(), StoreError> {
        self.course_repo().delete(id).await
    }

    pub async fn set_course_image(
        &self,
        id: Uuid,
        image_url: &str,
    ) -> Result<CourseDetail, StoreError> {
        self.course_repo().set_image(id, image_url).await
    }

    pub async fn enroll_student(
        &self,
        course_id: Uuid,
        student_id: Uuid,
    ) -> Result<CourseDetail, StoreError> {
        self.course_repo().enroll(course_id, student_id).await
    }

    pub async fn unenroll_student(
        &self,
        course_id: Uuid,
        student_id: Uuid,
    ) -> Result<(), StoreError> {
        self.course_repo().unenroll(course_id, student_id).await
    }

    // ========== Lessons ==========

    pub async fn create_lesson(&self, lesson: NewLesson) -> Result<lessons::Model, StoreError> {
        self.lesson_repo().create(lesson).await
    }

    pub async fn list_lessons(
        &self,
        course_id: Option<Uuid>,
    ) -> Result<Vec<lessons::Model>, StoreError> {
        self.lesson_repo().list(course_id).await
    }

    pub async fn get_lesson(&self, id: Uuid) -> Result<lessons::Model, StoreError> {
        self.lesson_repo().get(id).await
    }

    pub async fn update_lesson(
        &self,
        id: Uuid,
        update: LessonUpdate,
    ) -> Result<lessons::Model, StoreError> {
        self.lesson_repo().update(id, update).await
    }

    pub async fn delete_lesson(&self, id: Uuid) -> Result<(), StoreError> {
        self.lesson_repo().delete(id).await
    }
}
