use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;
use uuid::Uuid;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Bootstrap admin account. Change the password after first login.
const DEFAULT_ADMIN_EMAIL: &str = "admin@ocms.local";
const DEFAULT_ADMIN_PASSWORD: &[u8] = b"admin123";

/// Hash the default admin password using Argon2id
fn hash_default_password() -> String {
    use argon2::{
        Argon2,
        password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
    };

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(DEFAULT_ADMIN_PASSWORD, &salt)
        .expect("Failed to hash default admin password")
        .to_string()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Roles)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Users)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Categories)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Courses)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Lessons)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(CourseCategories)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Enrollments)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        let now = chrono::Utc::now().to_rfc3339();

        // Seed the closed role set
        for (name, description) in [
            ("admin", "Administrator with full access"),
            ("instructor", "Can create and manage courses"),
            ("student", "Can enroll in and access courses"),
        ] {
            let insert = sea_orm_migration::sea_query::Query::insert()
                .into_table(Roles)
                .columns([
                    crate::entities::roles::Column::Name,
                    crate::entities::roles::Column::Description,
                    crate::entities::roles::Column::CreatedAt,
                ])
                .values_panic([name.into(), description.into(), now.clone().into()])
                .to_owned();

            manager.exec_stmt(insert).await?;
        }

        // Seed the bootstrap admin user (role id 1 = admin, seeded above)
        let password_hash = hash_default_password();

        let insert = sea_orm_migration::sea_query::Query::insert()
            .into_table(Users)
            .columns([
                crate::entities::users::Column::Id,
                crate::entities::users::Column::Email,
                crate::entities::users::Column::PasswordHash,
                crate::entities::users::Column::FullName,
                crate::entities::users::Column::RoleId,
                crate::entities::users::Column::CreatedAt,
            ])
            .values_panic([
                Uuid::new_v4().into(),
                DEFAULT_ADMIN_EMAIL.into(),
                password_hash.into(),
                "Administrator".into(),
                1.into(),
                now.into(),
            ])
            .to_owned();

        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Enrollments).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CourseCategories).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Lessons).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Courses).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Roles).to_owned())
            .await?;

        Ok(())
    }
}
