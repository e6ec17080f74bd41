//! # Domain Types
//!
//! Types shared by the label pipeline and the dashboard service.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   from_product   ┌──────────────────────┐         │
//! │  │ CatalogProduct  │ ───────────────► │   PrintableItem      │         │
//! │  │  ─────────────  │                  │  ──────────────────  │         │
//! │  │  _id / id       │                  │  identifier          │         │
//! │  │  name           │                  │  display_name        │         │
//! │  │  sku?           │                  │  encodable_payload   │         │
//! │  │  sellingPrice   │                  │  price               │         │
//! │  │  mrp?           │                  │  reference_price?    │         │
//! │  └─────────────────┘                  └──────────────────────┘         │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  PrintProfile   │   │   Symbology     │   │  PayloadKind    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Thermal(58|80) │   │  Code128        │   │  Sku            │       │
//! │  │  Normal(c × n)  │   │  Qr             │   │  Json           │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Payload Fallback
//! The string rasterized into the barcode is the SKU. Products created before
//! SKU generation existed have none, so the catalog identifier is encoded
//! instead.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, ValidationError};
use crate::money::Money;

// =============================================================================
// Catalog Product
// =============================================================================

/// A product record as returned by the catalog API.
///
/// The catalog is backed by MongoDB, so the identifier arrives as `_id`;
/// the dashboard sometimes forwards it as `id`. Both are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CatalogProduct {
    /// Catalog identifier.
    #[serde(alias = "_id")]
    pub id: String,

    /// Product name shown on the label.
    pub name: String,

    /// Stock Keeping Unit; absent on legacy products.
    #[serde(default)]
    pub sku: Option<String>,

    /// Price the shop actually charges.
    #[ts(type = "number")]
    pub selling_price: Money,

    /// Maximum retail price, when printed on the tag.
    #[serde(default)]
    #[ts(type = "number | null")]
    pub mrp: Option<Money>,
}

// =============================================================================
// Payload Kind
// =============================================================================

/// What gets rasterized into the barcode or QR code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum PayloadKind {
    /// The SKU (or the identifier when no SKU exists).
    #[default]
    Sku,

    /// A compact JSON object with id, name, sku and price (QR labels).
    Json,
}

impl FromStr for PayloadKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sku" => Ok(PayloadKind::Sku),
            "json" => Ok(PayloadKind::Json),
            other => Err(ValidationError::InvalidFormat {
                field: "payload".to_string(),
                reason: format!("unknown payload kind '{}', expected sku or json", other),
            }),
        }
    }
}

/// Shape of the JSON payload. Field order is fixed so output is stable.
#[derive(Serialize)]
struct JsonPayload<'a> {
    id: &'a str,
    name: &'a str,
    sku: Option<&'a str>,
    price: Money,
}

// =============================================================================
// Printable Item
// =============================================================================

/// One product prepared for label printing.
///
/// Immutable once constructed; a fresh list is built for every print request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintableItem {
    identifier: String,
    display_name: String,
    encodable_payload: String,
    price: Money,
    reference_price: Option<Money>,
}

impl PrintableItem {
    /// Creates a printable item.
    ///
    /// The payload is not checked here; whether it can be encoded depends on
    /// the symbology and is reported by the generator as an encoding error.
    pub fn new(
        identifier: impl Into<String>,
        display_name: impl Into<String>,
        encodable_payload: impl Into<String>,
        price: Money,
        reference_price: Option<Money>,
    ) -> Result<Self, CoreError> {
        let identifier = identifier.into();
        let display_name = display_name.into();

        if identifier.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "id".to_string(),
            }
            .into());
        }
        if display_name.trim().is_empty() {
            return Err(CoreError::NotPrintable {
                identifier,
                reason: "name is required".to_string(),
            });
        }
        if price.is_negative() || reference_price.map(|m| m.is_negative()).unwrap_or(false) {
            return Err(CoreError::NotPrintable {
                identifier,
                reason: "prices must not be negative".to_string(),
            });
        }

        Ok(PrintableItem {
            identifier,
            display_name,
            encodable_payload: encodable_payload.into(),
            price,
            reference_price,
        })
    }

    /// Builds a printable item from a catalog record.
    ///
    /// ## Example
    /// ```rust
    /// use saree_core::money::Money;
    /// use saree_core::types::{CatalogProduct, PayloadKind, PrintableItem};
    ///
    /// let legacy = CatalogProduct {
    ///     id: "64f1c0ffee".to_string(),
    ///     name: "Cotton Saree".to_string(),
    ///     sku: None,
    ///     selling_price: Money::from_paise(89_900),
    ///     mrp: None,
    /// };
    /// let item = PrintableItem::from_product(&legacy, PayloadKind::Sku).unwrap();
    /// assert_eq!(item.encodable_payload(), "64f1c0ffee");
    /// ```
    pub fn from_product(product: &CatalogProduct, kind: PayloadKind) -> Result<Self, CoreError> {
        let sku = product
            .sku
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let payload = match kind {
            PayloadKind::Sku => sku.unwrap_or(product.id.as_str()).to_string(),
            PayloadKind::Json => serde_json::to_string(&JsonPayload {
                id: &product.id,
                name: &product.name,
                sku,
                price: product.selling_price,
            })
            .map_err(|e| CoreError::NotPrintable {
                identifier: product.id.clone(),
                reason: format!("payload could not be serialized: {}", e),
            })?,
        };

        PrintableItem::new(
            product.id.clone(),
            product.name.clone(),
            payload,
            product.selling_price,
            product.mrp,
        )
    }

    /// Catalog identifier.
    #[inline]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Full, untruncated product name.
    #[inline]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// The exact string rasterized into the barcode.
    #[inline]
    pub fn encodable_payload(&self) -> &str {
        &self.encodable_payload
    }

    /// Selling price.
    #[inline]
    pub fn price(&self) -> Money {
        self.price
    }

    /// MRP, when known.
    #[inline]
    pub fn reference_price(&self) -> Option<Money> {
        self.reference_price
    }

    /// The amount printed after `MRP:`: the MRP, or the selling price when
    /// the product has no MRP.
    pub fn label_price(&self) -> Money {
        self.reference_price.unwrap_or(self.price)
    }

    /// The selling price, when it undercuts the MRP.
    pub fn offer_price(&self) -> Option<Money> {
        match self.reference_price {
            Some(mrp) if self.price < mrp => Some(self.price),
            _ => None,
        }
    }
}

// =============================================================================
// Symbology
// =============================================================================

/// Encoding scheme used to turn a payload into a scannable image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Symbology {
    /// Linear Code 128 barcode (character set B).
    #[default]
    Code128,

    /// 2D QR code.
    Qr,
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbology::Code128 => write!(f, "code128"),
            Symbology::Qr => write!(f, "qr"),
        }
    }
}

impl FromStr for Symbology {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "code128" | "barcode" | "linear" => Ok(Symbology::Code128),
            "qr" | "qrcode" => Ok(Symbology::Qr),
            other => Err(ValidationError::InvalidFormat {
                field: "symbology".to_string(),
                reason: format!("unknown symbology '{}', expected code128 or qr", other),
            }),
        }
    }
}

// =============================================================================
// Paper Width
// =============================================================================

/// Thermal roll widths the shop's printers accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PaperWidth {
    /// 58 mm roll, two labels across.
    #[default]
    #[serde(rename = "58mm")]
    Mm58,

    /// 80 mm roll, three labels across.
    #[serde(rename = "80mm")]
    Mm80,
}

impl PaperWidth {
    /// Labels printed side by side on this roll.
    pub const fn columns(&self) -> u32 {
        match self {
            PaperWidth::Mm58 => 2,
            PaperWidth::Mm80 => 3,
        }
    }

    /// Physical roll width.
    pub const fn millimetres(&self) -> f64 {
        match self {
            PaperWidth::Mm58 => 58.0,
            PaperWidth::Mm80 => 80.0,
        }
    }
}

impl fmt::Display for PaperWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaperWidth::Mm58 => write!(f, "58mm"),
            PaperWidth::Mm80 => write!(f, "80mm"),
        }
    }
}

impl FromStr for PaperWidth {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().trim_end_matches("mm") {
            "58" => Ok(PaperWidth::Mm58),
            "80" => Ok(PaperWidth::Mm80),
            _ => Err(ValidationError::InvalidFormat {
                field: "paperWidth".to_string(),
                reason: format!("unsupported paper width '{}', expected 58mm or 80mm", s),
            }),
        }
    }
}

// =============================================================================
// Print Profile
// =============================================================================

/// The target medium and its layout constraints.
///
/// ## Wire Format
/// ```json
/// { "kind": "thermal", "paperWidth": "58mm" }
/// { "kind": "normal", "columns": 4, "labelsPerPage": 24 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "lowercase")]
#[ts(export)]
pub enum PrintProfile {
    /// Thermal roll printer.
    Thermal {
        #[serde(rename = "paperWidth")]
        paper_width: PaperWidth,
    },

    /// Full-page (A4) sheet printer.
    Normal {
        columns: u32,
        #[serde(rename = "labelsPerPage")]
        labels_per_page: u32,
    },
}

impl PrintProfile {
    /// Longest product name printed before it is cut with an ellipsis.
    pub const fn name_budget(&self) -> usize {
        match self {
            PrintProfile::Thermal { .. } => 20,
            PrintProfile::Normal { .. } => 30,
        }
    }

    /// Labels printed side by side.
    pub const fn columns(&self) -> u32 {
        match self {
            PrintProfile::Thermal { paper_width } => paper_width.columns(),
            PrintProfile::Normal { columns, .. } => *columns,
        }
    }

    /// Returns true for thermal roll profiles.
    pub const fn is_thermal(&self) -> bool {
        matches!(self, PrintProfile::Thermal { .. })
    }
}

impl Default for PrintProfile {
    fn default() -> Self {
        PrintProfile::Thermal {
            paper_width: PaperWidth::default(),
        }
    }
}

impl fmt::Display for PrintProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrintProfile::Thermal { paper_width } => write!(f, "thermal {}", paper_width),
            PrintProfile::Normal {
                columns,
                labels_per_page,
            } => write!(f, "normal {}x{}", columns, labels_per_page),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
