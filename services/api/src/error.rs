//! Custom error types for the API service
//!
//! Every error response carries a stable machine-readable `code` and a
//! human-readable `message`. Store-layer failures are logged with their
//! cause and surfaced as an opaque internal error.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::session::SessionError;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed or missing input
    #[error("{0}")]
    Validation(String),

    /// Username/password pair did not match a user
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Cart quantities must stay at or above one; zero goes through removal
    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    /// Order placement with no lines
    #[error("Order must contain at least one item")]
    EmptyOrder,

    /// Status outside the order status enum
    #[error("Invalid order status: {0}")]
    InvalidStatus(String),

    /// Book reference is malformed or does not resolve
    #[error("Book not found")]
    InvalidBookId,

    /// Cart operation on a book with no cart line
    #[error("Book is not in cart")]
    NotInCart,

    /// Missing, expired, or invalid session
    #[error(transparent)]
    Authentication(#[from] SessionError),

    /// Valid session, insufficient role
    #[error("You do not have admin access")]
    Forbidden,

    /// Referenced entity absent
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Duplicate username or email
    #[error("{0}")]
    Conflict(String),

    /// Store unreachable or unexpected failure; cause is logged, never sent
    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    /// Stable machine-readable code for the client
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION",
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::InvalidQuantity => "INVALID_QUANTITY",
            ApiError::EmptyOrder => "EMPTY_ORDER",
            ApiError::InvalidStatus(_) => "INVALID_STATUS",
            ApiError::InvalidBookId => "INVALID_BOOK_ID",
            ApiError::NotInCart => "NOT_IN_CART",
            ApiError::Authentication(SessionError::NoToken) => "AUTH_MISSING",
            ApiError::Authentication(SessionError::Expired) => "AUTH_EXPIRED",
            ApiError::Authentication(SessionError::Invalid) => "AUTH_INVALID",
            ApiError::Forbidden => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Internal(_) => "INTERNAL",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::InvalidCredentials
            | ApiError::InvalidQuantity
            | ApiError::EmptyOrder
            | ApiError::InvalidStatus(_) => StatusCode::BAD_REQUEST,
            ApiError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::InvalidBookId | ApiError::NotInCart | ApiError::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(cause) = &self {
            tracing::error!("internal error: {cause:#}");
        }

        let body = Json(json!({
            "code": self.code(),
            "message": self.to_string(),
        }));

        (self.status(), body).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                // unique_violation: duplicate username/email
                Some("23505") => {
                    let message = match db_err.constraint() {
                        Some("users_username_key") => "Username already exists",
                        Some("users_email_key") => "Email already exists",
                        _ => "Resource already exists",
                    };
                    return ApiError::Conflict(message.to_string());
                }
                // foreign_key_violation: a book reference that does not resolve
                Some("23503") => return ApiError::InvalidBookId,
                _ => {}
            }
        }
        ApiError::Internal(err.into())
    }
}

impl From<common::error::DatabaseError> for ApiError {
    fn from(err: common::error::DatabaseError) -> Self {
        ApiError::Internal(err.into())
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_and_invalid_sessions_use_distinct_codes() {
        let expired = ApiError::Authentication(SessionError::Expired);
        let invalid = ApiError::Authentication(SessionError::Invalid);
        assert_eq!(expired.code(), "AUTH_EXPIRED");
        assert_eq!(invalid.code(), "AUTH_INVALID");
        assert_ne!(expired.code(), invalid.code());
    }

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(
            ApiError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::InvalidQuantity.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::EmptyOrder.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Authentication(SessionError::NoToken).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound("order").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Conflict("dup".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_errors_do_not_leak_their_cause() {
        let err = ApiError::Internal(anyhow::anyhow!("connection refused at 10.0.0.3"));
        assert_eq!(err.to_string(), "Internal server error");
    }
}
