//! # Validation Module
//!
//! Input validation for print requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Dashboard (TypeScript)                                       │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: label-server (Rust)                                          │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: product + profile rules                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Generator / layout                                           │
//! │  ├── Symbology character set and capacity                              │
//! │  └── Positive label dimensions                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use saree_core::validation::{validate_sku, validate_profile};
//! use saree_core::PrintProfile;
//!
//! validate_sku("SAR-KAN-0042").unwrap();
//! validate_profile(&PrintProfile::Normal { columns: 4, labels_per_page: 24 }).unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{CatalogProduct, PrintProfile};
use crate::{MAX_LABELS_PER_PAGE, MAX_PROFILE_COLUMNS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a SKU.
///
/// ## Rules
/// - Must not be empty
/// - At most 64 characters
///
/// Which characters are allowed depends on the symbology, so the barcode
/// generator checks them when the label is encoded.
///
/// ## Example
/// ```rust
/// use saree_core::validation::validate_sku;
///
/// assert!(validate_sku("SAR-KAN-0042").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("SAR 001.A").is_ok());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.chars().count() > 64 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 64,
        });
    }

    Ok(())
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters (labels truncate far earlier)
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a catalog identifier.
pub fn validate_identifier(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price.
///
/// Zero is allowed (free samples get tags too); negative is not.
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a print profile's numeric fields.
///
/// ## Rules
/// - Thermal profiles are always valid (paper width is a closed enum)
/// - Normal profiles: 1..=12 columns, 1..=200 labels per page
///
/// Dimension checks (no zero-size labels) happen when the grid is computed.
pub fn validate_profile(profile: &PrintProfile) -> ValidationResult<()> {
    match profile {
        PrintProfile::Thermal { .. } => Ok(()),
        PrintProfile::Normal {
            columns,
            labels_per_page,
        } => {
            if *columns < 1 || *columns > MAX_PROFILE_COLUMNS {
                return Err(ValidationError::OutOfRange {
                    field: "columns".to_string(),
                    min: 1,
                    max: MAX_PROFILE_COLUMNS as i64,
                });
            }
            if *labels_per_page < 1 || *labels_per_page > MAX_LABELS_PER_PAGE {
                return Err(ValidationError::OutOfRange {
                    field: "labelsPerPage".to_string(),
                    min: 1,
                    max: MAX_LABELS_PER_PAGE as i64,
                });
            }
            Ok(())
        }
    }
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates a catalog record before it is turned into a label.
///
/// A missing SKU is fine (the identifier is encoded instead); a present but
/// overlong SKU is not.
pub fn validate_product(product: &CatalogProduct) -> ValidationResult<()> {
    validate_identifier(&product.id)?;
    validate_product_name(&product.name)?;
    if let Some(sku) = product.sku.as_deref().filter(|s| !s.trim().is_empty()) {
        validate_sku(sku)?;
    }
    validate_price("sellingPrice", product.selling_price)?;
    if let Some(mrp) = product.mrp {
        validate_price("mrp", mrp)?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("SAR-KAN-0042").is_ok());
        assert!(validate_sku("BLOUSE_12/XL").is_ok());

        assert!(validate_sku("").is_err());
        assert!(validate_sku("   ").is_err());
        assert!(validate_sku(&"A".repeat(65)).is_err());

        // encodability is left to the generator
        assert!(validate_sku("SAR 001.A").is_ok());
        assert!(validate_sku("SARÉE-02").is_ok());
        assert!(validate_sku("साड़ी").is_ok());
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Kanjivaram Silk Saree").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price("mrp", Money::zero()).is_ok());
        assert!(validate_price("mrp", Money::from_paise(149_900)).is_ok());
        assert_eq!(
            validate_price("mrp", Money::from_paise(-1)),
            Err(ValidationError::MustBePositive {
                field: "mrp".to_string()
            })
        );
    }

    #[test]
    fn test_validate_profile() {
        assert!(validate_profile(&PrintProfile::default()).is_ok());
        assert!(validate_profile(&PrintProfile::Normal {
            columns: 4,
            labels_per_page: 24
        })
        .is_ok());

        assert!(validate_profile(&PrintProfile::Normal {
            columns: 0,
            labels_per_page: 24
        })
        .is_err());
        assert!(validate_profile(&PrintProfile::Normal {
            columns: 13,
            labels_per_page: 24
        })
        .is_err());
        assert!(validate_profile(&PrintProfile::Normal {
            columns: 4,
            labels_per_page: 0
        })
        .is_err());
    }

    #[test]
    fn test_validate_product() {
        let mut product = CatalogProduct {
            id: "64f1".to_string(),
            name: "Georgette Saree".to_string(),
            sku: None,
            selling_price: Money::from_paise(79_900),
            mrp: Some(Money::from_paise(99_900)),
        };
        assert!(validate_product(&product).is_ok());

        product.sku = Some("SAR 001.A".to_string());
        assert!(validate_product(&product).is_ok());

        product.sku = Some("X".repeat(65));
        assert!(validate_product(&product).is_err());

        product.sku = Some("SAR-GEO-0003".to_string());
        product.mrp = Some(Money::from_paise(-5));
        assert!(validate_product(&product).is_err());
    }
}
