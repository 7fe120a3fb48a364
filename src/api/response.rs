//! Response types for the Finance Suite API.
//!
//! This module defines the error response structures and error handling
//! for the HTTP API.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates an error for a path parameter that failed to parse.
    pub fn invalid_path(message: impl Into<String>) -> Self {
        Self::new("INVALID_PATH", message)
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 response carrying `error`.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(self.error),
        )
            .into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::InvalidConfig { .. } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            },
            EngineError::UnknownWageGroup { code } => ApiErrorResponse::bad_request(
                ApiError::with_details(
                    "UNKNOWN_WAGE_GROUP",
                    message,
                    format!("The wage group '{}' is not part of the wage table", code),
                ),
            ),
            EngineError::UnknownStep { group, .. } => ApiErrorResponse::bad_request(
                ApiError::with_details(
                    "UNKNOWN_STEP",
                    message,
                    format!("See the wage table for the steps of {}", group),
                ),
            ),
            EngineError::UnknownFederalState { .. } => ApiErrorResponse::bad_request(
                ApiError::with_details(
                    "UNKNOWN_FEDERAL_STATE",
                    message,
                    "Use a two-letter state code such as NW or BY",
                ),
            ),
            EngineError::InvalidDirection { .. } => {
                ApiErrorResponse::bad_request(ApiError::new("INVALID_DIRECTION", message))
            }
            EngineError::InvalidInput { .. } => {
                ApiErrorResponse::bad_request(ApiError::validation_error(message))
            }
            EngineError::Storage(_)
            | EngineError::Payload(_)
            | EngineError::Migration { .. }
            | EngineError::StorageUnavailable { .. } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details("STORAGE_ERROR", "Storage operation failed", message),
            },
            EngineError::TaskQueueClosed | EngineError::TaskQueueFull => ApiErrorResponse {
                status: StatusCode::SERVICE_UNAVAILABLE,
                error: ApiError::new("SERVICE_UNAVAILABLE", message),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_api_error_with_details_serialization() {
        let error = ApiError::with_details("TEST_ERROR", "Test message", "Some details");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"details\":\"Some details\""));
    }

    #[test]
    fn test_unknown_wage_group_is_bad_request() {
        let response: ApiErrorResponse = EngineError::UnknownWageGroup {
            code: "EG 99".to_string(),
        }
        .into();
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error.code, "UNKNOWN_WAGE_GROUP");
        assert_eq!(response.error.message, "Unknown wage group: EG 99");
    }

    #[test]
    fn test_invalid_direction_is_bad_request() {
        let response: ApiErrorResponse = EngineError::InvalidDirection {
            direction: "sideways".to_string(),
        }
        .into();
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error.code, "INVALID_DIRECTION");
    }

    #[test]
    fn test_invalid_input_is_validation_error() {
        let response: ApiErrorResponse =
            EngineError::invalid_input("gross", "must not be negative").into();
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error.code, "VALIDATION_ERROR");
    }

    #[test]
    fn test_closed_queue_is_service_unavailable() {
        let response: ApiErrorResponse = EngineError::TaskQueueClosed.into();
        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);

        let response: ApiErrorResponse = EngineError::TaskQueueFull.into();
        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_storage_errors_are_internal() {
        let response: ApiErrorResponse = EngineError::Storage(sqlx::Error::PoolClosed).into();
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.error.code, "STORAGE_ERROR");
    }
}
