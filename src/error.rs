//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid {key}='{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("invalid database url: {0}")]
    InvalidUrl(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),
    #[error("database: {0}")]
    Store(#[from] StoreError),
    /// Create failures are reported with 200 and an error body.
    #[error("create failed: {0}")]
    CreateFailed(String),
    /// Update counts other than the matched/unchanged and matched/changed pairs.
    #[error("unexpected outcome: {message}")]
    UnexpectedOutcome {
        message: String,
        affected_rows: u64,
        changed_rows: u64,
    },
}

impl AppError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            AppError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large"),
            AppError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            AppError::CreateFailed(_) => (StatusCode::OK, "create_failed"),
            AppError::UnexpectedOutcome { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "unexpected_outcome"),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::UnexpectedOutcome {
                affected_rows,
                changed_rows,
                ..
            } => Some(serde_json::json!({
                "affectedRows": affected_rows,
                "changedRows": changed_rows
            })),
            _ => None,
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
                details: self.details(),
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_omits_details_when_absent() {
        let err = AppError::Conflict("this taxId is already registered".into());
        let (status, code) = err.status_and_code();
        let body = serde_json::to_value(ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: err.to_string(),
                details: err.details(),
            },
        })
        .unwrap();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            body,
            json!({"error": {"code": "conflict", "message": "conflict: this taxId is already registered"}})
        );
    }

    #[test]
    fn unexpected_outcome_carries_row_counts() {
        let err = AppError::UnexpectedOutcome {
            message: "update of product 1 matched 2 rows and changed 1".into(),
            affected_rows: 2,
            changed_rows: 1,
        };
        assert_eq!(err.status_and_code(), (StatusCode::INTERNAL_SERVER_ERROR, "unexpected_outcome"));
        assert_eq!(err.details(), Some(json!({"affectedRows": 2, "changedRows": 1})));
    }
}
