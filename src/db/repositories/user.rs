use anyhow::{Context, anyhow};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set, TransactionTrait,
};
use tokio::task;
use uuid::Uuid;

use super::StoreError;
use crate::config::SecurityConfig;
use crate::entities::prelude::*;
use crate::entities::{courses, enrollments, users};

/// User data returned from the repository (without the password hash).
/// `role` is the resolved role name, joined at query time.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role_id: i32,
    pub role: String,
    pub created_at: String,
}

impl User {
    pub(crate) fn from_joined(
        user: users::Model,
        role: Option<crate::entities::roles::Model>,
    ) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            role_id: user.role_id,
            role: role.map(|r| r.name).unwrap_or_default(),
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role_id: i32,
}

#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub role_id: Option<i32>,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(
        &self,
        user: NewUser,
        security: &SecurityConfig,
    ) -> Result<User, StoreError> {
        let existing = Users::find()
            .filter(users::Column::Email.eq(user.email.as_str()))
            .count(&self.conn)
            .await?;
        if existing > 0 {
            return Err(StoreError::conflict("Email already in use"));
        }

        if Roles::find_by_id(user.role_id).one(&self.conn).await?.is_none() {
            return Err(StoreError::not_found(format!(
                "Role with ID {} not found",
                user.role_id
            )));
        }

        let password_hash = hash_password_blocking(user.password, security).await?;

        let model = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(user.email),
            password_hash: Set(password_hash),
            full_name: Set(user.full_name),
            role_id: Set(user.role_id),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };
        let inserted = model.insert(&self.conn).await?;

        self.get(inserted.id).await
    }

    pub async fn get(&self, id: Uuid) -> Result<User, StoreError> {
        let found = Users::find_by_id(id)
            .find_also_related(Roles)
            .one(&self.conn)
            .await?;

        found
            .map(|(user, role)| User::from_joined(user, role))
            .ok_or_else(|| StoreError::not_found(format!("User with ID {id} not found")))
    }

    pub async fn list(&self) -> Result<Vec<User>, StoreError> {
        let rows = Users::find().find_also_related(Roles).all(&self.conn).await?;

        Ok(rows
            .into_iter()
            .map(|(user, role)| User::from_joined(user, role))
            .collect())
    }

    pub async fn update(
        &self,
        id: Uuid,
        update: UserUpdate,
        security: &SecurityConfig,
    ) -> Result<User, StoreError> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| StoreError::not_found(format!("User with ID {id} not found")))?;

        if let Some(email) = &update.email {
            let taken = Users::find()
                .filter(users::Column::Email.eq(email.as_str()))
                .filter(users::Column::Id.ne(id))
                .count(&self.conn)
                .await?;
            if taken > 0 {
                return Err(StoreError::conflict("Email already in use"));
            }
        }

        if let Some(role_id) = update.role_id {
            if Roles::find_by_id(role_id).one(&self.conn).await?.is_none() {
                return Err(StoreError::not_found(format!(
                    "Role with ID {role_id} not found"
                )));
            }
        }

        let mut active: users::ActiveModel = user.into();
        if let Some(email) = update.email {
            active.email = Set(email);
        }
        if let Some(full_name) = update.full_name {
            active.full_name = Set(full_name);
        }
        if let Some(role_id) = update.role_id {
            active.role_id = Set(role_id);
        }
        if let Some(password) = update.password {
            active.password_hash = Set(hash_password_blocking(password, security).await?);
        }
        active.update(&self.conn).await?;

        self.get(id).await
    }

    /// Deleting a user removes their enrollment rows. A user who is the
    /// instructor of record for any course cannot be deleted until those
    /// courses are reassigned or removed.
    pub async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| StoreError::not_found(format!("User with ID {id} not found")))?;

        let instructs = Courses::find()
            .filter(courses::Column::InstructorId.eq(id))
            .count(&self.conn)
            .await?;
        if instructs > 0 {
            return Err(StoreError::conflict(
                "Cannot delete a user who is the instructor of existing courses",
            ));
        }

        let txn = self.conn.begin().await?;

        Enrollments::delete_many()
            .filter(enrollments::Column::StudentId.eq(id))
            .exec(&txn)
            .await?;

        let active: users::ActiveModel = user.into();
        active.delete(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    /// Look up a user by email and verify the password. Returns `None` both
    /// for unknown emails and wrong passwords so callers can emit a single
    /// indistinguishable "invalid credentials" response.
    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, StoreError> {
        let found = Users::find()
            .filter(users::Column::Email.eq(email))
            .find_also_related(Roles)
            .one(&self.conn)
            .await?;

        let Some((user, role)) = found else {
            return Ok(None);
        };

        let password_hash = user.password_hash.clone();
        let password = password.to_string();

        // Argon2 verification is CPU-bound, keep it off the async runtime
        let is_valid = task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow!("Invalid password hash format: {e}"))?;

            let argon2 = Argon2::default();
            Ok::<bool, anyhow::Error>(
                argon2
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await
        .context("Password verification task panicked")
        .map_err(StoreError::Internal)?
        .map_err(StoreError::Internal)?;

        if is_valid {
            Ok(Some(User::from_joined(user, role)))
        } else {
            Ok(None)
        }
    }
}

async fn hash_password_blocking(
    password: String,
    security: &SecurityConfig,
) -> Result<String, StoreError> {
    let security = security.clone();

    task::spawn_blocking(move || hash_password(&password, &security))
        .await
        .context("Password hashing task panicked")
        .map_err(StoreError::Internal)?
        .map_err(StoreError::Internal)
}

/// Hash a password using Argon2id with the configured cost parameters.
pub fn hash_password(password: &str, config: &SecurityConfig) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow!("Invalid Argon2 params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}
