//! # API Error Type
//!
//! Unified error type for label server handlers.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Label Server                       │
//! │                                                                         │
//! │  Handler                                                                │
//! │  Result<T, ApiError>                                                    │
//! │         │                                                               │
//! │         ├── ClaimsError ───────────────────────► VALIDATION_ERROR   400 │
//! │         ├── JsonRejection (bad body) ──────────► VALIDATION_ERROR   400 │
//! │         ├── PipelineError::Encoding (fixable) ─► ENCODING_ERROR     422 │
//! │         ├── PipelineError::InvalidProduct ─────► VALIDATION_ERROR   400 │
//! │         ├── PipelineError::Layout ─────────────► VALIDATION_ERROR   400 │
//! │         ├── DispatchError (popup, closed, ─────► SURFACE_UNAVAILABLE 409│
//! │         │   timeout)                                                    │
//! │         └── anything else ─────────────────────► INTERNAL           500 │
//! │                                                                         │
//! │  Body: { "code": "ENCODING_ERROR", "message": "Label for ... " }        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use saree_core::ClaimsError;
use saree_labels::{DispatchError, PipelineError};
use serde::Serialize;

/// API error returned from handlers.
///
/// ## Serialization
/// ```json
/// {
///   "code": "SURFACE_UNAVAILABLE",
///   "message": "Print window could not be opened. Allow pop-ups and try again."
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// A label payload cannot be encoded (422)
    EncodingError,

    /// Input validation failed (400)
    ValidationError,

    /// No print surface could be used (409)
    SurfaceUnavailable,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::EncodingError => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::SurfaceUnavailable => StatusCode::CONFLICT,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl From<ClaimsError> for ApiError {
    fn from(err: ClaimsError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Bodies that are not JSON or do not match the request shape.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

/// Converts pipeline errors to API errors.
impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match &err {
            PipelineError::Encoding { .. } if err.is_user_correctable() => {
                ApiError::new(ErrorCode::EncodingError, err.to_string())
            }
            PipelineError::Encoding { .. } => {
                tracing::error!("Label generation failed: {}", err);
                ApiError::internal("Label image could not be generated")
            }
            PipelineError::InvalidProduct { .. } | PipelineError::Layout(_) => {
                ApiError::validation(err.to_string())
            }
        }
    }
}

/// Converts dispatch errors to API errors.
impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::PopupBlocked
            | DispatchError::SurfaceClosed
            | DispatchError::LoadTimeout { .. } => {
                ApiError::new(ErrorCode::SurfaceUnavailable, err.to_string())
            }
            DispatchError::Io(_) | DispatchError::Write(_) => {
                tracing::error!("Print dispatch failed: {}", err);
                ApiError::internal("Print job could not be written")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use saree_labels::EncodingError;

    #[test]
    fn test_pipeline_error_mapping() {
        let err: ApiError = PipelineError::Encoding {
            identifier: "id-1".into(),
            source: EncodingError::UnsupportedCharacter { ch: 'é', position: 3 },
        }
        .into();
        assert_eq!(err.code, ErrorCode::EncodingError);
        assert_eq!(err.code.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let err: ApiError = PipelineError::Encoding {
            identifier: "id-1".into(),
            source: EncodingError::Raster("png".into()),
        }
        .into();
        assert_eq!(err.code, ErrorCode::Internal);

        let err: ApiError = PipelineError::InvalidProduct {
            identifier: "id-2".into(),
            reason: "name is required".into(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("id-2"));
    }

    #[test]
    fn test_dispatch_error_mapping() {
        let err: ApiError = DispatchError::PopupBlocked.into();
        assert_eq!(err.code, ErrorCode::SurfaceUnavailable);
        assert_eq!(err.code.status(), StatusCode::CONFLICT);

        let err: ApiError = DispatchError::Io("disk full".into()).into();
        assert_eq!(err.code, ErrorCode::Internal);
        assert!(!err.message.contains("disk full"));
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(ApiError::validation("bad sku")).unwrap();
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["message"], "bad sku");
    }
}
