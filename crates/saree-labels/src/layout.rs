//! # Label Layout
//!
//! Computes the label grid for a print profile and partitions rendered
//! labels into pages.
//!
//! ## Grid Geometry
//! ```text
//! ┌──────────────────────── page_width_mm ─────────────────────────┐
//! │ margin                                                         │
//! │   ┌────────┐ gap ┌────────┐ gap ┌────────┐ gap ┌────────┐      │
//! │   │ label  │     │        │     │        │     │        │  ▲   │
//! │   │ w × h  │     │        │     │        │     │        │  │   │
//! │   └────────┘     └────────┘     └────────┘     └────────┘  │   │
//! │      gap                                                   rows│
//! │   ┌────────┐     ┌────────┐     ┌────────┐     ┌────────┐  │   │
//! │   │        │     │        │     │        │     │        │  ▼   │
//! │   └────────┘     └────────┘     └────────┘     └────────┘      │
//! │                                                        margin  │
//! └────────────────────────────────────────────────────────────────┘
//!
//!  Thermal (fixed box):  h = 25 mm, rows = ⌊(150 − 2·2 + 2) / (25 + 2)⌋ = 5
//!                        58 mm → 2 × 26 mm,  80 mm → 3 × 24 mm
//!
//!  Normal / A4:          rows = ⌈labels_per_page / columns⌉
//!                        h    = (297 − 2·10 − (rows − 1)·2) / rows
//!                        so rows·h + (rows − 1)·gap fills the page exactly
//! ```
//!
//! Building a document is a pure function: the same labels and profile
//! always give the same pages, in input order.

use saree_core::validation::validate_profile;
use saree_core::{PrintProfile, PrintableItem, CURRENCY_SYMBOL};
use serde::Serialize;

use crate::barcode::LabelImage;
use crate::error::LayoutError;

// =============================================================================
// Medium Constants
// =============================================================================

/// Thermal roll margin on every side.
pub const THERMAL_MARGIN_MM: f64 = 2.0;
/// Gap between thermal labels, both directions.
pub const THERMAL_GAP_MM: f64 = 2.0;
/// Fixed thermal label height.
pub const THERMAL_LABEL_HEIGHT_MM: f64 = 25.0;
/// Length of roll treated as one page.
pub const THERMAL_SEGMENT_MM: f64 = 150.0;

/// A4 sheet.
pub const A4_WIDTH_MM: f64 = 210.0;
pub const A4_HEIGHT_MM: f64 = 297.0;
/// A4 margin on every side.
pub const SHEET_MARGIN_MM: f64 = 10.0;
/// Gap between sheet labels, both directions.
pub const SHEET_GAP_MM: f64 = 2.0;

const ELLIPSIS: &str = "...";

// =============================================================================
// Grid Layout
// =============================================================================

/// Physical grid derived from a print profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridLayout {
    pub columns: u32,
    pub rows_per_page: u32,
    /// Labels placed on one page before a page break.
    pub page_capacity: usize,
    pub page_width_mm: f64,
    pub page_height_mm: f64,
    pub margin_mm: f64,
    pub column_gap_mm: f64,
    pub row_gap_mm: f64,
    pub label_width_mm: f64,
    pub label_height_mm: f64,
    /// Longest name printed in full.
    pub name_budget: usize,
}

impl GridLayout {
    /// Derives the grid for `profile`.
    ///
    /// ## Example
    /// ```rust
    /// use saree_core::PrintProfile;
    /// use saree_labels::layout::GridLayout;
    ///
    /// let grid = GridLayout::for_profile(&PrintProfile::Normal { columns: 4, labels_per_page: 24 }).unwrap();
    /// assert_eq!(grid.rows_per_page, 6);
    /// assert_eq!(grid.page_capacity, 24);
    /// ```
    pub fn for_profile(profile: &PrintProfile) -> Result<Self, LayoutError> {
        validate_profile(profile)?;

        let grid = match *profile {
            PrintProfile::Thermal { paper_width } => {
                let columns = paper_width.columns();
                let rows = ((THERMAL_SEGMENT_MM - 2.0 * THERMAL_MARGIN_MM + THERMAL_GAP_MM)
                    / (THERMAL_LABEL_HEIGHT_MM + THERMAL_GAP_MM))
                    .floor() as u32;
                GridLayout {
                    columns,
                    rows_per_page: rows,
                    page_capacity: (columns * rows) as usize,
                    page_width_mm: paper_width.millimetres(),
                    page_height_mm: THERMAL_SEGMENT_MM,
                    margin_mm: THERMAL_MARGIN_MM,
                    column_gap_mm: THERMAL_GAP_MM,
                    row_gap_mm: THERMAL_GAP_MM,
                    label_width_mm: span(paper_width.millimetres(), THERMAL_MARGIN_MM, THERMAL_GAP_MM, columns),
                    label_height_mm: THERMAL_LABEL_HEIGHT_MM,
                    name_budget: profile.name_budget(),
                }
            }
            PrintProfile::Normal {
                columns,
                labels_per_page,
            } => {
                let rows = labels_per_page.div_ceil(columns);
                GridLayout {
                    columns,
                    rows_per_page: rows,
                    page_capacity: labels_per_page as usize,
                    page_width_mm: A4_WIDTH_MM,
                    page_height_mm: A4_HEIGHT_MM,
                    margin_mm: SHEET_MARGIN_MM,
                    column_gap_mm: SHEET_GAP_MM,
                    row_gap_mm: SHEET_GAP_MM,
                    label_width_mm: span(A4_WIDTH_MM, SHEET_MARGIN_MM, SHEET_GAP_MM, columns),
                    label_height_mm: span(A4_HEIGHT_MM, SHEET_MARGIN_MM, SHEET_GAP_MM, rows),
                    name_budget: profile.name_budget(),
                }
            }
        };

        if grid.label_width_mm <= 0.0 || grid.label_height_mm <= 0.0 || grid.page_capacity == 0 {
            return Err(LayoutError::DegenerateLabel {
                width_mm: grid.label_width_mm,
                height_mm: grid.label_height_mm,
            });
        }
        Ok(grid)
    }

    /// Printable height inside the margins.
    pub fn usable_height_mm(&self) -> f64 {
        self.page_height_mm - 2.0 * self.margin_mm
    }

    /// Height the grid actually occupies.
    pub fn grid_height_mm(&self) -> f64 {
        self.label_height_mm * self.rows_per_page as f64
            + self.row_gap_mm * (self.rows_per_page.saturating_sub(1)) as f64
    }
}

/// Size of one of `count` equal cells across `total` after margins and gaps.
fn span(total: f64, margin: f64, gap: f64, count: u32) -> f64 {
    let count = count.max(1) as f64;
    (total - 2.0 * margin - (count - 1.0) * gap) / count
}

/// Cuts `name` to `budget` characters, ending in `...` when shortened.
///
/// ```rust
/// use saree_labels::layout::truncate_name;
///
/// assert_eq!(truncate_name("Kanjivaram Silk", 20), "Kanjivaram Silk");
/// assert_eq!(truncate_name("Kanjivaram Pure Silk Saree", 20), "Kanjivaram Pure S...");
/// ```
pub fn truncate_name(name: &str, budget: usize) -> String {
    if name.chars().count() <= budget {
        return name.to_string();
    }
    let mut cut: String = name.chars().take(budget.saturating_sub(ELLIPSIS.len())).collect();
    cut.push_str(ELLIPSIS);
    cut
}

// =============================================================================
// Document Model
// =============================================================================

/// A printable item together with its generated image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedLabel {
    pub item: PrintableItem,
    pub image: LabelImage,
}

/// One label as it appears on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelCell {
    pub item: PrintableItem,
    /// Name after truncation.
    pub display_name: String,
    pub image: LabelImage,
    /// `MRP: ₹<amount>`
    pub price_text: String,
    /// `Price: ₹<amount>` when the selling price undercuts the MRP.
    pub offer_text: Option<String>,
}

impl LabelCell {
    fn new(label: RenderedLabel, name_budget: usize) -> Self {
        let RenderedLabel { item, image } = label;
        let price_text = format!(
            "MRP: {}{}",
            CURRENCY_SYMBOL,
            item.label_price().label_amount()
        );
        let offer_text = item
            .offer_price()
            .map(|p| format!("Price: {}{}", CURRENCY_SYMBOL, p.label_amount()));
        LabelCell {
            display_name: truncate_name(item.display_name(), name_budget),
            item,
            image,
            price_text,
            offer_text,
        }
    }
}

/// One physical page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    /// 1-based page number.
    pub number: usize,
    pub cells: Vec<LabelCell>,
}

/// Labels arranged into pages for one profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintDocument {
    pub profile: PrintProfile,
    pub layout: GridLayout,
    pub pages: Vec<Page>,
}

impl PrintDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn label_count(&self) -> usize {
        self.pages.iter().map(|p| p.cells.len()).sum()
    }

    /// Embedded images; one per label.
    pub fn image_count(&self) -> usize {
        self.label_count()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Items in print order.
    pub fn iter_items(&self) -> impl Iterator<Item = &PrintableItem> + '_ {
        self.pages
            .iter()
            .flat_map(|p| p.cells.iter())
            .map(|c| &c.item)
    }
}

/// Arranges `labels` into pages for `profile`, preserving order.
pub fn build_document(
    labels: Vec<RenderedLabel>,
    profile: &PrintProfile,
) -> Result<PrintDocument, LayoutError> {
    let layout = GridLayout::for_profile(profile)?;

    let mut pages: Vec<Page> = Vec::with_capacity(labels.len().div_ceil(layout.page_capacity));
    for label in labels {
        let needs_page = pages
            .last()
            .map(|p| p.cells.len() >= layout.page_capacity)
            .unwrap_or(true);
        if needs_page {
            pages.push(Page {
                number: pages.len() + 1,
                cells: Vec::with_capacity(layout.page_capacity),
            });
        }
        if let Some(page) = pages.last_mut() {
            page.cells.push(LabelCell::new(label, layout.name_budget));
        }
    }

    Ok(PrintDocument {
        profile: *profile,
        layout,
        pages,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
