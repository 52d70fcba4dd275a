pub mod category;
pub mod course;
pub mod lesson;
pub mod role;
pub mod user;

use sea_orm::DbErr;

/// Typed storage error. `NotFound` and `Conflict` carry user-facing
/// messages; everything else is surfaced as an internal database error.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

impl StoreError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
