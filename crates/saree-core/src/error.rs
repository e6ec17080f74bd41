//! # Error Types
//!
//! Domain-specific error types for saree-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  saree-core errors (this file)                                         │
//! │  ├── CoreError        - General domain errors                          │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── ClaimsError      - Session token could not be read for display    │
//! │                                                                         │
//! │  saree-labels errors (separate crate)                                  │
//! │  ├── EncodingError    - Payload cannot be rasterized                   │
//! │  ├── LayoutError      - Profile yields an impossible grid              │
//! │  └── DispatchError    - Print surface refused / closed                 │
//! │                                                                         │
//! │  label-server errors (in app)                                          │
//! │  └── ApiError         - What the dashboard sees (serialized)           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Dashboard notice       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (SKU, field, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A catalog record cannot become a printable label.
    ///
    /// ## When This Occurs
    /// - Product has neither a SKU nor an identifier to encode
    /// - Product name is blank
    #[error("Product {identifier} cannot be printed: {reason}")]
    NotPrintable { identifier: String, reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Session token could not be decoded for display.
    #[error("Session display error: {0}")]
    Claims(#[from] ClaimsError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before any image is generated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., unsupported paper width, bad amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Claims Error
// =============================================================================

/// Failures while reading a session token for display purposes.
///
/// None of these are security decisions; the backend API performs the real
/// authorization check.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClaimsError {
    /// No token was supplied.
    #[error("Session token is empty")]
    Empty,

    /// Token is not a readable JWT (wrong segment count, bad base64, bad JSON).
    #[error("Session token is malformed: {0}")]
    Malformed(String),
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::NotPrintable {
            identifier: "64f1c0ffee".to_string(),
            reason: "name is required".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Product 64f1c0ffee cannot be printed: name is required"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "sku".to_string(),
        };
        assert_eq!(err.to_string(), "sku is required");

        let err = ValidationError::OutOfRange {
            field: "columns".to_string(),
            min: 1,
            max: 12,
        };
        assert_eq!(err.to_string(), "columns must be between 1 and 12");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));

        let core_err: CoreError = ClaimsError::Empty.into();
        assert!(matches!(core_err, CoreError::Claims(ClaimsError::Empty)));
    }
}
