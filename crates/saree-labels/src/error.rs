//! # Label Pipeline Error Types
//!
//! Error types for generation, layout, dispatch and configuration.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Label Pipeline Error Categories                     │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │   Generation    │  │     Layout      │  │       Dispatch          │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  EmptyPayload   │  │  InvalidProfile │  │  PopupBlocked           │ │
//! │  │  Unsupported    │  │  Degenerate     │  │  SurfaceClosed          │ │
//! │  │   Character     │  │   Label         │  │  LoadTimeout            │ │
//! │  │  Capacity       │  │                 │  │  Io / Write             │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  LabelError is one item's failure: EncodingError or a rejected product.│
//! │  PipelineError wraps it, or a layout error, for a whole batch.         │
//! │  Nothing here is retried automatically; the user re-triggers a print.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use saree_core::ValidationError;
use thiserror::Error;

/// Result type alias for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Encoding Error
// =============================================================================

/// A payload could not be turned into a barcode or QR image.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodingError {
    /// Nothing to encode.
    #[error("Payload is empty")]
    EmptyPayload,

    /// Character outside the symbology's character set.
    #[error("Character {ch:?} at position {position} cannot be encoded")]
    UnsupportedCharacter { ch: char, position: usize },

    /// Payload longer than the symbology can hold.
    #[error("Payload of {len} bytes exceeds symbology capacity")]
    CapacityExceeded { len: usize },

    /// Generator options that cannot produce an image (zero widths, etc.).
    #[error("Invalid barcode options: {0}")]
    InvalidOptions(String),

    /// PNG encoding failed.
    #[error("Rasterization failed: {0}")]
    Raster(String),
}

impl EncodingError {
    /// Returns true when fixing the product record (SKU, name) resolves it.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            EncodingError::EmptyPayload
                | EncodingError::UnsupportedCharacter { .. }
                | EncodingError::CapacityExceeded { .. }
        )
    }
}

// =============================================================================
// Label Error
// =============================================================================

/// Why a single item in a batch produced no label.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LabelError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// The catalog record failed validation before encoding.
    #[error("Product rejected: {0}")]
    InvalidProduct(String),
}

impl LabelError {
    pub fn is_user_correctable(&self) -> bool {
        match self {
            LabelError::Encoding(err) => err.is_user_correctable(),
            LabelError::InvalidProduct(_) => true,
        }
    }
}

// =============================================================================
// Layout Error
// =============================================================================

/// A print profile that cannot be laid out.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// Profile fields out of range.
    #[error("Invalid print profile: {0}")]
    InvalidProfile(#[from] ValidationError),

    /// The grid leaves no room for a label.
    #[error("Label would be {width_mm:.2} x {height_mm:.2} mm")]
    DegenerateLabel { width_mm: f64, height_mm: f64 },
}

// =============================================================================
// Pipeline Error
// =============================================================================

/// A batch could not be prepared.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The first failing item, in input order, under abort-on-first-error.
    #[error("Label for {identifier} could not be generated: {source}")]
    Encoding {
        identifier: String,
        #[source]
        source: EncodingError,
    },

    /// The first product, in input order, that failed validation.
    #[error("Product {identifier} rejected: {reason}")]
    InvalidProduct { identifier: String, reason: String },

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

impl PipelineError {
    pub fn is_user_correctable(&self) -> bool {
        match self {
            PipelineError::Encoding { source, .. } => source.is_user_correctable(),
            PipelineError::InvalidProduct { .. } => true,
            PipelineError::Layout(LayoutError::InvalidProfile(_)) => true,
            PipelineError::Layout(LayoutError::DegenerateLabel { .. }) => true,
        }
    }
}

// =============================================================================
// Dispatch Error
// =============================================================================

/// The print surface failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    /// The host refused to open a surface (popup blocker, all slots busy).
    #[error("Print window could not be opened. Allow pop-ups and try again.")]
    PopupBlocked,

    /// The surface went away before every image reported.
    #[error("Print window was closed before the labels finished loading")]
    SurfaceClosed,

    /// Images did not settle before the configured watchdog.
    #[error("Timed out after {waited_ms} ms with {pending} image(s) still loading")]
    LoadTimeout { waited_ms: u64, pending: usize },

    /// Underlying I/O failure on the surface.
    #[error("Print surface I/O error: {0}")]
    Io(String),

    /// The document could not be written to the surface.
    #[error("Could not write document: {0}")]
    Write(String),
}

impl DispatchError {
    /// Returns true when the user can fix it (allow pop-ups, keep the window open).
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, DispatchError::PopupBlocked | DispatchError::SurfaceClosed)
    }
}

impl From<std::io::Error> for DispatchError {
    fn from(err: std::io::Error) -> Self {
        DispatchError::Io(err.to_string())
    }
}

// =============================================================================
// Config Error
// =============================================================================

/// Configuration could not be loaded, saved or validated.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    LoadFailed(String),

    #[error("Failed to save config: {0}")]
    SaveFailed(String),

    #[error("Invalid label configuration: {0}")]
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::LoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::LoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::SaveFailed(err.to_string())
    }
}

impl From<ValidationError> for ConfigError {
    fn from(err: ValidationError) -> Self {
        ConfigError::Invalid(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_correctable() {
        assert!(EncodingError::UnsupportedCharacter { ch: 'é', position: 3 }.is_user_correctable());
        assert!(!EncodingError::Raster("png".into()).is_user_correctable());
        assert!(DispatchError::PopupBlocked.is_user_correctable());
        assert!(!DispatchError::Io("disk full".into()).is_user_correctable());
        assert!(!PipelineError::Encoding {
            identifier: "id-1".into(),
            source: EncodingError::Raster("png".into()),
        }
        .is_user_correctable());
        assert!(LabelError::InvalidProduct("name is required".into()).is_user_correctable());
        assert!(!LabelError::from(EncodingError::Raster("png".into())).is_user_correctable());
    }

    #[test]
    fn test_error_display() {
        let err = PipelineError::Encoding {
            identifier: "64f1c0ffee".into(),
            source: EncodingError::UnsupportedCharacter { ch: 'é', position: 3 },
        };
        assert!(err.to_string().contains("64f1c0ffee"));
        assert!(err.to_string().contains("position 3"));

        let err = DispatchError::LoadTimeout {
            waited_ms: 10_000,
            pending: 2,
        };
        assert_eq!(
            err.to_string(),
            "Timed out after 10000 ms with 2 image(s) still loading"
        );
    }
}
