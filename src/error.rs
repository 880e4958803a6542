//! Error types shared by handlers.
//!
//! Page handlers degrade to inline messages and never surface these
//! directly; the JSON endpoints return them through `AppError`, which
//! renders `{"success": false, "message": ...}` with a matching status.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::models::AuthResponse;

/// Field name to message, e.g. `"email" => "Email is required"`.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("invalid {name} fixture: {source}")]
    Parse {
        name: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("text extraction failed: {0}")]
    Extract(String),

    #[error("extraction task failed: {0}")]
    Task(String),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Please correct the highlighted fields.")]
    Validation(FieldErrors),

    #[error("Email already registered")]
    EmailTaken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Too many failed attempts. Try again in a moment.")]
    RateLimited,

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("could not create session")]
    Session,
}

impl AuthError {
    pub fn field(name: &str, message: &str) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(name.to_string(), message.to_string());
        Self::Validation(errors)
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("Invalid request: {}", .0.body_text())]
    Payload(#[from] JsonRejection),

    #[error("{0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Auth(AuthError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Auth(AuthError::EmailTaken) => StatusCode::BAD_REQUEST,
            AppError::Auth(AuthError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            AppError::Auth(AuthError::UserNotFound) => StatusCode::NOT_FOUND,
            AppError::Auth(AuthError::RateLimited) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Auth(AuthError::Hash(_) | AuthError::Session) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Document(_) => StatusCode::BAD_GATEWAY,
            AppError::Payload(rejection) => rejection.status(),
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let errors = match &self {
            AppError::Auth(AuthError::Validation(fields)) => Some(fields.clone()),
            _ => None,
        };
        let body = AuthResponse {
            success: false,
            message: Some(self.to_string()),
            errors,
            ..Default::default()
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::from(AuthError::field("email", "Email is required")).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(AppError::from(AuthError::EmailTaken).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::from(AuthError::InvalidCredentials).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(DocumentError::Extract("bad xref".into())).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_messages_are_user_facing() {
        assert_eq!(AppError::from(AuthError::UserNotFound).to_string(), "User not found");
        assert_eq!(
            AppError::NotFound("no such page".into()).to_string(),
            "no such page"
        );
    }
}
