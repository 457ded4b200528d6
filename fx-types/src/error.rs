//! Error types for the FX synchronization service.

use fx_directory::DirectoryError;

use crate::ports::FetchError;

/// Domain-level errors (invalid values).
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Repository-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Entity not found")]
    NotFound,
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    #[error("Fetch timed out: {0}")]
    FetchTimeout(String),

    #[error("Source unavailable: {0}")]
    FetchUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable kind, used as the `kind` field of error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "bad_request",
            AppError::NotFound(_) => "not_found",
            AppError::InvalidRange(_) => "invalid_range",
            AppError::FetchTimeout(_) => "fetch_timeout",
            AppError::FetchUnavailable(_) => "fetch_unavailable",
            AppError::Internal(_) => "internal",
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidRange(msg) => AppError::InvalidRange(msg),
            DomainError::Validation(msg) => AppError::BadRequest(msg),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Domain(e) => e.into(),
            RepoError::NotFound => AppError::NotFound("Resource not found".into()),
            RepoError::Database(e) => AppError::Internal(e),
            RepoError::DuplicateKey(e) => AppError::Internal(format!("duplicate key: {}", e)),
        }
    }
}

impl From<DirectoryError> for AppError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::NotFound(name) => {
                AppError::NotFound(format!("Unknown country or currency: {}", name))
            }
            DirectoryError::InvalidMap(msg) => AppError::Internal(msg),
        }
    }
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Timeout(_) => AppError::FetchTimeout(err.to_string()),
            FetchError::Unavailable(_) | FetchError::InvalidPayload(_) => {
                AppError::FetchUnavailable(err.to_string())
            }
        }
    }
}
