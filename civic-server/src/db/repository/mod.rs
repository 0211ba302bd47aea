//! Repository Module
//!
//! Typed CRUD over the document store, one repository per entity.

pub mod incident;
pub mod message;
pub mod password_reset;
pub mod ticket;
pub mod user;

// Re-exports
pub use incident::IncidentRepository;
pub use message::MessageRepository;
pub use password_reset::PasswordResetRepository;
pub use ticket::TicketRepository;
pub use user::{UserDirectory, UserRepository};

use super::storage::StorageError;
use shared::AppError;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database error: {0}")]
    Database(String),
}

impl From<StorageError> for RepoError {
    fn from(err: StorageError) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Database(msg) => {
                tracing::error!(error = %msg, "Database operation failed");
                AppError::database(msg)
            }
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ErrorCode;

    #[test]
    fn test_storage_failure_maps_to_database_error() {
        let io = std::io::Error::other("disk full");
        let err: AppError = RepoError::from(StorageError::from(io)).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.http_status(), http::StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.message.contains("disk full"));
    }
}
