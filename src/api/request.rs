//! Request extraction for the Finance Suite API.
//!
//! Bodies deserialize straight into the model types; this module turns
//! axum's extractor rejections into [`ApiError`] bodies.

use axum::extract::rejection::{JsonRejection, PathRejection};

use super::response::ApiError;

/// Converts a rejected JSON body into an API error.
///
/// Missing or mistyped fields are validation errors; anything that is not
/// valid JSON is malformed.
pub(crate) fn json_rejection(rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            if body_text.contains("missing field") || body_text.contains("invalid type") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    }
}

/// Converts a rejected path parameter into an API error.
pub(crate) fn path_rejection(rejection: PathRejection) -> ApiError {
    ApiError::invalid_path(rejection.body_text())
}
