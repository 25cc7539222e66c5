//! Service-wide error type.
//!
//! Every handler returns `AppResult`; actix turns the error into a JSON body
//! of the form `{"message": "..."}` with the matching status code.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Access denied")]
    Forbidden,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("Already clocked in")]
    AlreadyClockedIn,

    #[error("Not clocked in")]
    NotClockedIn,

    #[error("Insufficient leave balance: {requested} day(s) requested, {available} available")]
    InsufficientBalance { requested: i32, available: i32 },

    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("Invalid or expired token")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Internal server error")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Forbidden => "FORBIDDEN",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::AlreadyClockedIn => "ALREADY_CLOCKED_IN",
            AppError::NotClockedIn => "NOT_CLOCKED_IN",
            AppError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Jwt(_) => "AUTH_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message shown to clients; internal details are logged, not returned.
    fn user_message(&self) -> String {
        match self {
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                "Internal Server Error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                "Internal Server Error".to_string()
            }
            AppError::Jwt(e) => {
                tracing::debug!(error = %e, "Token rejected");
                self.to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::InvalidCredentials | AppError::Jwt(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_)
            | AppError::AlreadyClockedIn
            | AppError::NotClockedIn
            | AppError::InsufficientBalance { .. } => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "message": self.user_message(),
            "code": self.code(),
        }))
    }
}

/// MySQL reports unique and foreign key violations with SQLSTATE 23000.
pub fn is_constraint_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23000"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn domain_errors_are_client_errors() {
        assert_eq!(AppError::AlreadyClockedIn.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NotClockedIn.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::InsufficientBalance { requested: 3, available: 1 }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::NotFound("Leave request").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Forbidden.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn insufficient_balance_message_names_both_amounts() {
        let err = AppError::InsufficientBalance { requested: 3, available: 1 };
        assert_eq!(
            err.to_string(),
            "Insufficient leave balance: 3 day(s) requested, 1 available"
        );
    }

    #[actix_web::test]
    async fn internal_details_are_hidden_from_the_body() {
        let resp = AppError::internal("pool exhausted").error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Internal Server Error");
        assert_eq!(json["code"], "INTERNAL_ERROR");
    }

    #[actix_web::test]
    async fn not_found_body_names_the_entity() {
        let resp = AppError::NotFound("Leave request").error_response();
        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Leave request not found");
    }
}
