//! Error handling middleware - RFC 7807 compliant responses.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use blog_core::error::DomainError;
use blog_shared::ErrorResponse;

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Problem document for this error, without request details.
    pub fn problem(&self) -> ErrorResponse {
        match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::Conflict(detail) => ErrorResponse::conflict(detail),
            AppError::Internal(_) => ErrorResponse::internal_error(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Internal(detail) = self {
            tracing::error!("Internal error: {}", detail);
        }
        HttpResponse::build(self.status_code()).json(self.problem())
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, key } => {
                AppError::NotFound(format!("{} {} not found", entity_type, key))
            }
            DomainError::Duplicate(msg) => AppError::Conflict(msg),
            DomainError::Repository(e) => AppError::Internal(format!("Database error: {}", e)),
            DomainError::Mail(e) => AppError::Internal(format!("Mail error: {}", e)),
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use blog_core::error::RepoError;
    use blog_core::ports::MailError;

    use super::*;

    #[test]
    fn maps_domain_errors_to_status_codes() {
        let cases = [
            (DomainError::post_not_found(3), StatusCode::NOT_FOUND),
            (DomainError::Duplicate("slug".into()), StatusCode::CONFLICT),
            (
                DomainError::Repository(RepoError::Query("boom".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                DomainError::Mail(MailError::Transport("refused".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status_code(), status);
        }
    }

    #[test]
    fn internal_details_stay_out_of_the_problem_document() {
        let problem = AppError::Internal("password=hunter2".into()).problem();
        assert_eq!(problem.status, 500);
        assert!(problem.detail.is_none());
    }

    #[test]
    fn not_found_names_the_entity() {
        let problem = AppError::from(DomainError::tag_not_found("rust")).problem();
        assert_eq!(problem.detail.as_deref(), Some("Tag rust not found"));
    }
}
