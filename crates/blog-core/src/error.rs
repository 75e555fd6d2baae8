//! Domain-level error types.

use thiserror::Error;

use crate::pagination::PaginationError;
use crate::ports::MailError;

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} {key}")]
    NotFound {
        entity_type: &'static str,
        key: String,
    },

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error(transparent)]
    Repository(#[from] RepoError),

    #[error(transparent)]
    Mail(#[from] MailError),
}

impl From<PaginationError> for DomainError {
    fn from(err: PaginationError) -> Self {
        Self::NotFound {
            entity_type: "Page",
            key: err.to_string(),
        }
    }
}

impl DomainError {
    pub fn post_not_found(id: i64) -> Self {
        Self::NotFound {
            entity_type: "Post",
            key: id.to_string(),
        }
    }

    pub fn tag_not_found(slug: &str) -> Self {
        Self::NotFound {
            entity_type: "Tag",
            key: slug.to_string(),
        }
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}
