//! # saree-labels: Label Printing Pipeline for Saree POS
//!
//! Turns printable items into one self-contained HTML document of barcode
//! or QR labels and hands it to a print surface once every image is ready.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Label Printing Pipeline                          │
//! │                                                                         │
//! │  Vec<PrintableItem> + PrintProfile + Symbology                          │
//! │          │                                                              │
//! │          ▼                                                              │
//! │  ┌────────────────┐   one blocking task per item, joined in order       │
//! │  │    barcode     │   payload ──► Code128 / QR ──► PNG data URI         │
//! │  └───────┬────────┘                                                     │
//! │          ▼                                                              │
//! │  ┌────────────────┐   columns, label size, pages                        │
//! │  │     layout     │   names truncated, prices formatted                 │
//! │  └───────┬────────┘                                                     │
//! │          ▼                                                              │
//! │  ┌────────────────┐   inline styles, inline images,                     │
//! │  │    template    │   print script with load barrier                    │
//! │  └───────┬────────┘                                                     │
//! │          ▼                                                              │
//! │  ┌────────────────┐   open surface ──► write ──► wait for every         │
//! │  │    dispatch    │   image load/error ──► print exactly once           │
//! │  └───────┬────────┘                                                     │
//! │          ▼                                                              │
//! │  ┌────────────────┐                                                     │
//! │  │     spool      │   file-backed print surface                         │
//! │  └────────────────┘                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`barcode`] - Code128 and QR rasterization to PNG data URIs
//! - [`layout`] - Grid geometry, pagination, label cells
//! - [`template`] - HTML document and embedded print script
//! - [`pipeline`] - Concurrent generation and batch failure policy
//! - [`dispatch`] - Print host abstraction and image load barrier
//! - [`spool`] - Spool-directory print host
//! - [`config`] - Label configuration (TOML + environment)
//! - [`error`] - Error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use saree_labels::{Dispatcher, LabelConfig, LabelRequest};
//!
//! let config = LabelConfig::load_or_default(None);
//! let batch = config.pipeline().prepare(LabelRequest {
//!     items,
//!     profile: config.print.profile,
//!     symbology: config.print.symbology,
//! }).await?;
//!
//! let dispatcher = Dispatcher::new(config.spool_host(), config.dispatch_options());
//! let receipt = dispatcher.dispatch(&batch.html).await?;
//! println!("Spooled {} labels as {}", batch.document.label_count(), receipt.job_id);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod barcode;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod layout;
pub mod pipeline;
pub mod spool;
pub mod template;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use barcode::{generate_image, BarcodeOptions, LabelImage};
pub use config::{DispatchSettings, LabelConfig, PrintSettings};
pub use dispatch::{
    Dispatcher, DispatchOptions, ImageLoadEvent, LoadBarrier, LoadOutcome, LoadSummary,
    PrintHost, PrintReceipt, PrintSurface,
};
pub use error::{
    ConfigError, DispatchError, EncodingError, LabelError, LayoutError, PipelineError,
};
pub use layout::{build_document, GridLayout, LabelCell, Page, PrintDocument, RenderedLabel};
pub use pipeline::{
    generate_labels, BatchPolicy, CatalogRequest, LabelFailure, LabelPipeline, LabelRequest,
    PreparedBatch,
};
pub use spool::{SpoolHost, SpoolSurface};
pub use template::{render_html, RenderedHtml, TemplateOptions};
