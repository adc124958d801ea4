use std::fmt;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

/// Fields guarded by a uniqueness constraint in the identity store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
    AccessToken,
}

impl UniqueField {
    pub fn as_str(self) -> &'static str {
        match self {
            UniqueField::Username => "username",
            UniqueField::Email => "email",
            UniqueField::AccessToken => "accessToken",
        }
    }
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure kinds a store adapter may report. Adapters translate driver errors into
/// these so callers never look at driver internals.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate value for {0}")]
    Duplicate(UniqueField),

    #[error("constraint violated: {0}")]
    Constraint(String),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Error taxonomy surfaced by the account and thought services.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("a user with that {0} already exists")]
    DuplicateKey(UniqueField),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("invalid password")]
    InvalidCredential,

    #[error(transparent)]
    Server(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(vec![msg.into()])
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateKey(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) | AppError::InvalidCredential => StatusCode::UNAUTHORIZED,
            AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate(field) => AppError::DuplicateKey(field),
            StoreError::Constraint(msg) => AppError::Validation(vec![msg]),
            StoreError::Backend(e) => AppError::Server(e),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(vec![rejection.body_text()])
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::Validation(errors) => ErrorBody {
                success: false,
                message: "Invalid input".into(),
                errors: Some(errors),
            },
            AppError::Server(e) => {
                error!(error = ?e, "internal error");
                ErrorBody {
                    success: false,
                    message: "Unexpected server error.".into(),
                    errors: None,
                }
            }
            other => ErrorBody {
                success: false,
                message: other.to_string(),
                errors: None,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let res = err.into_response();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn store_errors_map_onto_taxonomy() {
        assert!(matches!(
            AppError::from(StoreError::Duplicate(UniqueField::Email)),
            AppError::DuplicateKey(UniqueField::Email)
        ));
        assert!(matches!(
            AppError::from(StoreError::Constraint("too long".into())),
            AppError::Validation(_)
        ));
        assert!(matches!(
            AppError::from(StoreError::Backend(anyhow::anyhow!("pool closed"))),
            AppError::Server(_)
        ));
    }

    #[tokio::test]
    async fn server_error_body_is_sanitized() {
        let (status, json) =
            body_json(AppError::Server(anyhow::anyhow!("connection refused at 10.0.0.3"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Unexpected server error.");
        assert!(!json.to_string().contains("10.0.0.3"));
    }

    #[tokio::test]
    async fn validation_lists_field_messages() {
        let (status, json) = body_json(AppError::Validation(vec![
            "username is required".into(),
            "password is required".into(),
        ]))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["errors"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn duplicate_names_the_field() {
        let (status, json) = body_json(AppError::DuplicateKey(UniqueField::Username)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["message"], "a user with that username already exists");
        assert!(json.get("errors").is_none());
    }
}
