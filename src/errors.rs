//! Centralized error handling.
//!
//! Two error types live here: `StartupError` for failures that must stop the
//! process before it serves anything, and `AppError` for everything a caller
//! can handle locally.

use redis::RedisError;
use sea_orm::DbErr;
use thiserror::Error;

/// Failures while establishing the process-wide store handles.
///
/// None of these are recoverable in-process; the binary exits on them.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to connect to database: {0}")]
    Database(#[from] DbErr),

    #[error("Failed to connect to redis: {0}")]
    Cache(#[from] RedisError),
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Resource errors
    #[error("Resource not found")]
    NotFound,

    // Validation
    #[error("{0}")]
    Validation(String),

    // Registry
    #[error("Service construction failed: {0}")]
    Construction(String),

    // Unit of work panicked instead of returning
    #[error("Unit of work aborted: {0}")]
    Aborted(String),

    // External service errors
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Cache error: {0}")]
    Cache(#[from] RedisError),

    #[error(transparent)]
    Startup(#[from] StartupError),

    // Internal
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error means "no matching record".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::NotFound | AppError::Database(DbErr::RecordNotFound(_))
        )
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Collapse a not-found error into absence.
///
/// Every other error is handed back untouched, so its variant, message and
/// source chain survive.
pub fn normalize_not_found(err: Option<AppError>) -> Option<AppError> {
    match err {
        Some(e) if e.is_not_found() => None,
        other => other,
    }
}

/// Extension trait for read paths where a missing row is not a failure.
pub trait NotFoundExt<T> {
    fn optional(self) -> AppResult<Option<T>>;
}

impl<T> NotFoundExt<T> for AppResult<T> {
    fn optional(self) -> AppResult<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(e) => match normalize_not_found(Some(e)) {
                None => Ok(None),
                Some(e) => Err(e),
            },
        }
    }
}

/// Convenience constructors
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn construction(msg: impl Into<String>) -> Self {
        AppError::Construction(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_none_is_none() {
        assert!(normalize_not_found(None).is_none());
    }

    #[test]
    fn test_normalize_swallows_not_found() {
        assert!(normalize_not_found(Some(AppError::NotFound)).is_none());
        let db_not_found = AppError::Database(DbErr::RecordNotFound("project 7".into()));
        assert!(normalize_not_found(Some(db_not_found)).is_none());
    }

    #[test]
    fn test_normalize_keeps_other_errors() {
        let err = normalize_not_found(Some(AppError::validation("name is required")))
            .expect("validation errors pass through");
        assert!(matches!(err, AppError::Validation(ref msg) if msg == "name is required"));

        let err = normalize_not_found(Some(AppError::Database(DbErr::Custom("boom".into()))))
            .expect("database errors pass through");
        assert!(matches!(err, AppError::Database(DbErr::Custom(ref msg)) if msg == "boom"));
    }

    #[test]
    fn test_optional_on_results() {
        let found: AppResult<u32> = Ok(3);
        assert_eq!(found.optional().unwrap(), Some(3));

        let missing: AppResult<u32> = Err(AppError::NotFound);
        assert_eq!(missing.optional().unwrap(), None);

        let failed: AppResult<u32> = Err(AppError::internal("disk full"));
        assert!(matches!(failed.optional(), Err(AppError::Internal(_))));
    }

    #[test]
    fn test_validation_message_is_verbatim() {
        assert_eq!(AppError::validation("validation failed").to_string(), "validation failed");
    }
}
