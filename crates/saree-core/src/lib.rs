//! # saree-core: Pure Business Logic for Saree POS
//!
//! This crate holds the domain types and rules the label pipeline and the
//! dashboard service share. Everything here is a pure function of its inputs.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Saree POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Dashboard (React)                            │   │
//! │  │    Products ──► Select for printing ──► Print labels            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP (JSON)                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    label-server (axum)                          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    saree-labels                                 │   │
//! │  │        barcode ─► layout ─► template ─► dispatch                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ saree-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  claims   │  │  scanner  │  │   │
//! │  │   │ Printable │  │   Money   │  │ Display   │  │ Debounce  │  │   │
//! │  │   │  Profile  │  │  (paise)  │  │  Claims   │  │  machine  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Catalog products, printable items, print profiles
//! - [`money`] - Money type with integer arithmetic (paise, no floating point)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//! - [`claims`] - Display-only decoding of session tokens
//! - [`scanner`] - Scan debounce state machine
//!
//! ## Example Usage
//!
//! ```rust
//! use saree_core::money::Money;
//! use saree_core::types::{CatalogProduct, PayloadKind, PrintableItem};
//!
//! let product = CatalogProduct {
//!     id: "64f1c0ffee".to_string(),
//!     name: "Kanjivaram Silk Saree".to_string(),
//!     sku: Some("SAR-KAN-0042".to_string()),
//!     selling_price: Money::from_paise(1_249_900),
//!     mrp: Some(Money::from_paise(1_499_900)),
//! };
//!
//! let item = PrintableItem::from_product(&product, PayloadKind::Sku).unwrap();
//! assert_eq!(item.encodable_payload(), "SAR-KAN-0042");
//! assert_eq!(item.label_price().label_amount(), "14999");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod claims;
pub mod error;
pub mod money;
pub mod scanner;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use saree_core::Money` instead of
// `use saree_core::money::Money`

pub use claims::{decode_display_claims, DisplayClaims, Role};
pub use error::{ClaimsError, CoreError, ValidationError};
pub use money::Money;
pub use scanner::{IgnoreReason, ScanDebouncer, ScanDecision, ScanState};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Currency symbol printed on every label.
pub const CURRENCY_SYMBOL: &str = "₹";

/// Maximum number of columns a full-page profile may request.
///
/// ## Business Reason
/// Anything wider produces labels too narrow for a scanner to read on A4.
pub const MAX_PROFILE_COLUMNS: u32 = 12;

/// Maximum labels a single full-page sheet may carry.
pub const MAX_LABELS_PER_PAGE: u32 = 200;
