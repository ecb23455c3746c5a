//! Persistence error type.

/// Errors from the durable snapshot store. Callers treat every variant as
/// a cache miss; nothing here is fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("persisted record is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

pub type DbResult<T> = Result<T, DbError>;
