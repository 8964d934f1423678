use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::error::DbErr;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

/// Standard error payload returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "error": "Bad Request",
    "message": "Validation error: product payload is missing required field 'id'",
    "details": null,
    "timestamp": "2025-06-09T10:30:00.000Z"
}))]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Bad Request", "Unauthorized")
    pub error: String,
    /// Human-readable error description
    pub message: String,
    /// Raw diagnostic detail for manual-retry decisions (upstream/storage errors only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// ISO 8601 timestamp when the error occurred
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Malformed or incomplete input record. Always local to one
    /// record/request; never corrupts committed state.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Missing/invalid credentials or webhook signature. Rejected with no
    /// partial effect; never retried.
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// The storefront or warehouse API errored or was unreachable. The
    /// message is pre-classified into user-actionable remediation text.
    #[error("Upstream error: {0}")]
    UpstreamError(String),

    /// The persistence layer rejected an operation.
    #[error("Storage error: {0}")]
    StorageError(#[from] DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::SerializationError(err.to_string())
    }
}

impl ServiceError {
    /// Single source of truth for the error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationError(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::AuthError(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::UpstreamError(_)
            | Self::StorageError(_)
            | Self::SerializationError(_)
            | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message suitable for HTTP responses. Storage internals are collapsed
    /// to a generic message; the raw detail travels in `details` instead.
    pub fn response_message(&self) -> String {
        match self {
            Self::StorageError(_) => "Storage error".to_string(),
            Self::SerializationError(_) | Self::InternalError(_) => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Raw diagnostic detail carried alongside the generic message so the
    /// caller can decide on manual retry. None for user-facing errors whose
    /// message already says everything.
    pub fn response_details(&self) -> Option<String> {
        match self {
            Self::StorageError(err) => Some(err.to_string()),
            Self::UpstreamError(msg) => Some(msg.clone()),
            _ => None,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let err = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            details: self.response_details(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(err)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::to_bytes, http::StatusCode};

    #[test]
    fn status_code_mapping() {
        assert_eq!(
            ServiceError::ValidationError("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::AuthError("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ServiceError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::UpstreamError("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ServiceError::StorageError(DbErr::Custom("x".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn storage_errors_hide_internals_but_carry_details() {
        let err = ServiceError::StorageError(DbErr::Custom("UNIQUE constraint failed".into()));
        assert_eq!(err.response_message(), "Storage error");
        assert!(err
            .response_details()
            .unwrap()
            .contains("UNIQUE constraint failed"));
    }

    #[test]
    fn validation_errors_keep_their_message() {
        let err = ServiceError::ValidationError("missing field 'id'".into());
        assert_eq!(
            err.response_message(),
            "Validation error: missing field 'id'"
        );
        assert_eq!(err.response_details(), None);
    }

    #[tokio::test]
    async fn error_response_body_shape() {
        let response = ServiceError::AuthError("invalid webhook signature".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload.error, "Unauthorized");
        assert!(payload.message.contains("invalid webhook signature"));
    }
}
