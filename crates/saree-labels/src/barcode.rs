//! # Barcode & QR Generation
//!
//! Turns a payload string into a PNG image embedded as a data URI.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Image Generation                                  │
//! │                                                                         │
//! │  payload ──► validate ──► modules ──► GrayImage ──► PNG ──► data URI   │
//! │              (charset,    (barcoders   (image,       (image   (base64)  │
//! │               capacity)    / qrcode)    1 module =    png)              │
//! │                                         N px)                           │
//! │                                                                         │
//! │  Code128:  charset B only (ASCII 0x20..=0x7E)                          │
//! │            width  = (modules + 2·quiet_zone) · module_width            │
//! │            height = bar_height                                         │
//! │                                                                         │
//! │  QR:       EC level M, byte mode, 4-module quiet zone                  │
//! │            side   = (modules + 8) · module_width                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Output is a pure function of `(payload, symbology, options)`: the same
//! inputs give byte-identical data URIs.

use barcoders::sym::code128::Code128;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use qrcode::types::QrError;
use qrcode::{Color, EcLevel, QrCode};
use saree_core::Symbology;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use tracing::debug;

use crate::error::EncodingError;

/// Longest Code128 payload accepted. Anything longer no longer fits a
/// 26 mm label at a scannable bar width.
pub const MAX_CODE128_LEN: usize = 80;

/// Quiet zone around a QR symbol, in modules.
pub const QR_QUIET_ZONE: u32 = 4;

/// Upper bounds for configured options. They keep every raster within a
/// few megapixels.
pub const MAX_MODULE_WIDTH: u32 = 20;
pub const MAX_BAR_HEIGHT: u32 = 600;
pub const MAX_QUIET_ZONE: u32 = 100;

const DATA_URI_PREFIX: &str = "data:image/png;base64,";

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

// =============================================================================
// Options
// =============================================================================

/// Generator rendering options.
///
/// QR codes reuse `module_width` as the side of one module and ignore
/// `bar_height`, `quiet_zone` and `display_value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarcodeOptions {
    /// Pixels per module (narrowest bar).
    #[serde(default = "default_module_width")]
    pub module_width: u32,

    /// Bar height in pixels.
    #[serde(default = "default_bar_height")]
    pub bar_height: u32,

    /// Print the payload as text beneath the bars.
    #[serde(default = "default_display_value")]
    pub display_value: bool,

    /// Blank modules on each side of the bars.
    #[serde(default = "default_quiet_zone")]
    pub quiet_zone: u32,
}

fn default_module_width() -> u32 {
    2
}

fn default_bar_height() -> u32 {
    50
}

fn default_display_value() -> bool {
    true
}

fn default_quiet_zone() -> u32 {
    10
}

impl Default for BarcodeOptions {
    fn default() -> Self {
        BarcodeOptions {
            module_width: default_module_width(),
            bar_height: default_bar_height(),
            display_value: default_display_value(),
            quiet_zone: default_quiet_zone(),
        }
    }
}

impl BarcodeOptions {
    /// Rejects options that cannot produce a visible image or that would
    /// blow up the raster size.
    pub fn validate(&self) -> Result<(), EncodingError> {
        if self.module_width == 0 {
            return Err(EncodingError::InvalidOptions(
                "module_width must be greater than 0".into(),
            ));
        }
        if self.bar_height == 0 {
            return Err(EncodingError::InvalidOptions(
                "bar_height must be greater than 0".into(),
            ));
        }
        if self.module_width > MAX_MODULE_WIDTH {
            return Err(EncodingError::InvalidOptions(format!(
                "module_width must be at most {}",
                MAX_MODULE_WIDTH
            )));
        }
        if self.bar_height > MAX_BAR_HEIGHT {
            return Err(EncodingError::InvalidOptions(format!(
                "bar_height must be at most {}",
                MAX_BAR_HEIGHT
            )));
        }
        if self.quiet_zone > MAX_QUIET_ZONE {
            return Err(EncodingError::InvalidOptions(format!(
                "quiet_zone must be at most {}",
                MAX_QUIET_ZONE
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Label Image
// =============================================================================

/// A rasterized barcode or QR code, ready to inline into HTML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelImage {
    /// `data:image/png;base64,…`
    pub data_uri: String,
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
    /// Human-readable text printed beneath a linear barcode.
    pub caption: Option<String>,
}

// =============================================================================
// Generation
// =============================================================================

/// Generates a scannable image for `payload`.
///
/// ## Example
/// ```rust
/// use saree_core::Symbology;
/// use saree_labels::barcode::{generate_image, BarcodeOptions};
///
/// let img = generate_image("SAR-KAN-0042", Symbology::Code128, &BarcodeOptions::default()).unwrap();
/// assert!(img.data_uri.starts_with("data:image/png;base64,"));
/// assert_eq!(img.caption.as_deref(), Some("SAR-KAN-0042"));
/// ```
pub fn generate_image(
    payload: &str,
    symbology: Symbology,
    options: &BarcodeOptions,
) -> Result<LabelImage, EncodingError> {
    options.validate()?;
    if payload.is_empty() {
        return Err(EncodingError::EmptyPayload);
    }

    let (raster, caption) = match symbology {
        Symbology::Code128 => {
            let modules = code128_modules(payload)?;
            let caption = options.display_value.then(|| payload.to_string());
            (rasterize_linear(&modules, options), caption)
        }
        Symbology::Qr => (rasterize_qr(payload, options)?, None),
    };

    let (width, height) = raster.dimensions();
    let png = encode_png(raster)?;
    debug!(
        %symbology,
        payload_len = payload.len(),
        width,
        height,
        png_bytes = png.len(),
        "Generated label image"
    );

    Ok(LabelImage {
        data_uri: to_data_uri(&png),
        width,
        height,
        caption,
    })
}

/// Code128 module pattern (1 = bar, 0 = space) for a charset-B payload.
fn code128_modules(payload: &str) -> Result<Vec<u8>, EncodingError> {
    if let Some((position, ch)) = payload
        .chars()
        .enumerate()
        .find(|(_, c)| !(' '..='~').contains(c))
    {
        return Err(EncodingError::UnsupportedCharacter { ch, position });
    }
    if payload.len() > MAX_CODE128_LEN {
        return Err(EncodingError::CapacityExceeded { len: payload.len() });
    }

    // 'Ɓ' selects character set B.
    let barcode = Code128::new(format!("Ɓ{}", payload))
        .map_err(|e| EncodingError::InvalidOptions(e.to_string()))?;
    Ok(barcode.encode())
}

fn rasterize_linear(modules: &[u8], options: &BarcodeOptions) -> GrayImage {
    let mw = options.module_width;
    let width = (modules.len() as u32 + 2 * options.quiet_zone) * mw;
    let mut img = GrayImage::from_pixel(width, options.bar_height, LIGHT);

    for (i, _) in modules.iter().enumerate().filter(|(_, m)| **m == 1) {
        let x0 = (options.quiet_zone + i as u32) * mw;
        for x in x0..x0 + mw {
            for y in 0..options.bar_height {
                img.put_pixel(x, y, DARK);
            }
        }
    }
    img
}

fn rasterize_qr(payload: &str, options: &BarcodeOptions) -> Result<GrayImage, EncodingError> {
    let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::M).map_err(
        |e| match e {
            QrError::DataTooLong => EncodingError::CapacityExceeded { len: payload.len() },
            other => EncodingError::InvalidOptions(other.to_string()),
        },
    )?;

    let count = code.width() as u32;
    let scale = options.module_width;
    let side = (count + 2 * QR_QUIET_ZONE) * scale;
    let mut img = GrayImage::from_pixel(side, side, LIGHT);

    for (i, color) in code.to_colors().iter().enumerate() {
        if *color != Color::Dark {
            continue;
        }
        let mx = (i as u32 % count + QR_QUIET_ZONE) * scale;
        let my = (i as u32 / count + QR_QUIET_ZONE) * scale;
        for dy in 0..scale {
            for dx in 0..scale {
                img.put_pixel(mx + dx, my + dy, DARK);
            }
        }
    }
    Ok(img)
}

fn encode_png(img: GrayImage) -> Result<Vec<u8>, EncodingError> {
    let mut bytes = Vec::new();
    DynamicImage::ImageLuma8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| EncodingError::Raster(e.to_string()))?;
    Ok(bytes)
}

fn to_data_uri(png: &[u8]) -> String {
    format!("{}{}", DATA_URI_PREFIX, STANDARD.encode(png))
}

/// Decodes an inline PNG data URI back to its pixel dimensions.
///
/// Used by print hosts to confirm each embedded image actually loads.
pub fn decode_data_uri(uri: &str) -> Result<(u32, u32), EncodingError> {
    let encoded = uri
        .strip_prefix(DATA_URI_PREFIX)
        .ok_or_else(|| EncodingError::Raster("not a PNG data URI".into()))?;
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| EncodingError::Raster(e.to_string()))?;
    let img = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
        .map_err(|e| EncodingError::Raster(e.to_string()))?;
    Ok((img.width(), img.height()))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> BarcodeOptions {
        BarcodeOptions::default()
    }

    #[test]
    fn test_code128_image_geometry() {
        let img = generate_image("SAR-KAN-0042", Symbology::Code128, &opts()).unwrap();
        assert!(img.data_uri.starts_with(DATA_URI_PREFIX));
        assert_eq!(img.height, 50);

        let modules = code128_modules("SAR-KAN-0042").unwrap();
        // start + 12 data + checksum, 11 modules each, then the stop pattern
        assert!(modules.len() >= 14 * 11);
        assert_eq!(img.width, (modules.len() as u32 + 2 * 10) * 2);
        assert_eq!(decode_data_uri(&img.data_uri).unwrap(), (img.width, img.height));
    }

    #[test]
    fn test_generation_is_deterministic() {
        for symbology in [Symbology::Code128, Symbology::Qr] {
            let a = generate_image("SAR-BAN-0007", symbology, &opts()).unwrap();
            let b = generate_image("SAR-BAN-0007", symbology, &opts()).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_caption_follows_display_value() {
        let hidden = BarcodeOptions {
            display_value: false,
            ..opts()
        };
        assert_eq!(
            generate_image("SKU1", Symbology::Code128, &hidden).unwrap().caption,
            None
        );
        assert_eq!(
            generate_image("SKU1", Symbology::Qr, &opts()).unwrap().caption,
            None
        );
    }

    #[test]
    fn test_qr_is_square_with_quiet_zone() {
        let img = generate_image("SAR-KAN-0042", Symbology::Qr, &opts()).unwrap();
        assert_eq!(img.width, img.height);
        // version 1 is 21 modules
        assert_eq!(img.width, (21 + 8) * 2);
    }

    #[test]
    fn test_qr_accepts_json_and_unicode() {
        let payload = r#"{"id":"64f1","name":"साड़ी","price":1499}"#;
        assert!(generate_image(payload, Symbology::Qr, &opts()).is_ok());
    }

    #[test]
    fn test_code128_rejects_unsupported_characters() {
        assert_eq!(
            generate_image("SARÉE-1", Symbology::Code128, &opts()),
            Err(EncodingError::UnsupportedCharacter { ch: 'É', position: 3 })
        );
        assert!(matches!(
            generate_image("A\tB", Symbology::Code128, &opts()),
            Err(EncodingError::UnsupportedCharacter { ch: '\t', position: 1 })
        ));
    }

    #[test]
    fn test_empty_and_oversized_payloads() {
        assert_eq!(
            generate_image("", Symbology::Code128, &opts()),
            Err(EncodingError::EmptyPayload)
        );
        assert_eq!(
            generate_image("", Symbology::Qr, &opts()),
            Err(EncodingError::EmptyPayload)
        );
        assert_eq!(
            generate_image(&"A".repeat(81), Symbology::Code128, &opts()),
            Err(EncodingError::CapacityExceeded { len: 81 })
        );
        assert_eq!(
            generate_image(&"A".repeat(5000), Symbology::Qr, &opts()),
            Err(EncodingError::CapacityExceeded { len: 5000 })
        );
    }

    #[test]
    fn test_zero_width_options_rejected() {
        let bad = BarcodeOptions {
            module_width: 0,
            ..opts()
        };
        assert!(matches!(
            generate_image("SKU1", Symbology::Code128, &bad),
            Err(EncodingError::InvalidOptions(_))
        ));
        let bad = BarcodeOptions {
            bar_height: 0,
            ..opts()
        };
        assert!(matches!(
            generate_image("SKU1", Symbology::Code128, &bad),
            Err(EncodingError::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_oversized_options_rejected() {
        for bad in [
            BarcodeOptions {
                module_width: u32::MAX,
                ..opts()
            },
            BarcodeOptions {
                bar_height: u32::MAX,
                ..opts()
            },
            BarcodeOptions {
                quiet_zone: u32::MAX / 2,
                ..opts()
            },
        ] {
            assert!(matches!(
                generate_image("SKU1", Symbology::Code128, &bad),
                Err(EncodingError::InvalidOptions(_))
            ));
            assert!(matches!(
                generate_image("SKU1", Symbology::Qr, &bad),
                Err(EncodingError::InvalidOptions(_))
            ));
        }

        let widest = BarcodeOptions {
            module_width: MAX_MODULE_WIDTH,
            bar_height: MAX_BAR_HEIGHT,
            quiet_zone: MAX_QUIET_ZONE,
            display_value: true,
        };
        let img = generate_image(&"A".repeat(MAX_CODE128_LEN), Symbology::Code128, &widest).unwrap();
        assert_eq!(img.height, MAX_BAR_HEIGHT);
    }

    #[test]
    fn test_decode_rejects_foreign_uri() {
        assert!(decode_data_uri("https://cdn.example.com/a.png").is_err());
        assert!(decode_data_uri("data:image/png;base64,!!!").is_err());
    }
}
