//! API response types
//!
//! Standard response structures shared by all feature routes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Standard success response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new success response
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
            meta: None,
        }
    }

    /// Create a success response with metadata
    pub fn success_with_meta(data: T, meta: serde_json::Value) -> Self {
        Self {
            success: true,
            data,
            meta: Some(meta),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Standard error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

/// 400 with a VALIDATION_ERROR body
pub fn validation_error(message: impl std::fmt::Display) -> Response {
    let error = ErrorResponse::new("VALIDATION_ERROR", message.to_string());
    (StatusCode::BAD_REQUEST, Json(error)).into_response()
}

/// 404 with a NOT_FOUND body
pub fn not_found(message: impl std::fmt::Display) -> Response {
    let error = ErrorResponse::new("NOT_FOUND", message.to_string());
    (StatusCode::NOT_FOUND, Json(error)).into_response()
}

/// 409 with a CONFLICT body
pub fn conflict(message: impl std::fmt::Display) -> Response {
    let error = ErrorResponse::new("CONFLICT", message.to_string());
    (StatusCode::CONFLICT, Json(error)).into_response()
}

/// 500 with a generic body; the underlying error is logged, never returned.
pub fn internal_error() -> Response {
    let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
    (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_wrapper_shape() {
        let body = serde_json::to_value(ApiResponse::success(vec![1, 2, 3])).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], serde_json::json!([1, 2, 3]));
        assert!(body.get("meta").is_none());
    }

    #[test]
    fn test_error_wrapper_shape() {
        let body = serde_json::to_value(ErrorResponse::new("NOT_FOUND", "Hospital not found"))
            .unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert_eq!(body["error"]["message"], "Hospital not found");
    }
}
