// Response envelope shared by every JSON API endpoint
//
// Success: {"success": true, "data": {...}, "error": null}
// Failure: {"success": false, "data": null, "error": {"message": "...", "code": "..."}}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Machine-readable error details
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Human-readable message, safe to show to clients
    pub message: String,
    /// Machine-readable error code (e.g. "VALIDATION_ERROR")
    pub code: String,
}

/// JSON envelope wrapping every API payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ErrorDetail>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn failure(code: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorDetail {
                message: message.into(),
                code: code.to_string(),
            }),
        }
    }

    /// Pair a failure envelope with its status code
    pub fn failure_response(status: StatusCode, code: &str, message: impl Into<String>) -> Response {
        (status, Json(Self::failure(code, message))).into_response()
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope_shape() {
        let value = serde_json::to_value(ApiResponse::ok(json!({"message": "hi"}))).unwrap();
        assert_eq!(
            value,
            json!({"success": true, "data": {"message": "hi"}, "error": null})
        );
    }

    #[test]
    fn test_failure_envelope_shape() {
        let value = serde_json::to_value(ApiResponse::failure("NOT_AUTHENTICATED", "Not authenticated")).unwrap();
        assert_eq!(
            value,
            json!({
                "success": false,
                "data": null,
                "error": {"message": "Not authenticated", "code": "NOT_AUTHENTICATED"}
            })
        );
    }
}
