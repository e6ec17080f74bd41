//! # Label Pipeline
//!
//! Generates every label image concurrently, applies the batch failure
//! policy, then lays out and renders the document.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              prepare(request) / prepare_catalog(request)                │
//! │                                                                         │
//! │  products ── validate_product ── from_product ──► rejected products    │
//! │                     │                             keep their slot       │
//! │                     ▼                                                   │
//! │  items[0] ──spawn_blocking──► Result ─┐                                 │
//! │  items[1] ──spawn_blocking──► Result ─┤  join_all                       │
//! │  items[2] ──spawn_blocking──► Result ─┼──────────► Vec<Result> (input   │
//! │     …                                 │            order kept)          │
//! │  items[n] ──spawn_blocking──► Result ─┘                 │               │
//! │                                                         ▼               │
//! │                                   BatchPolicy ── AbortOnFirstError ──►  │
//! │                                       │            Err(first failure)   │
//! │                                       └─ SkipFailed ──► successes +     │
//! │                                                         skipped list    │
//! │                                                         │               │
//! │                                       build_document ◄──┘               │
//! │                                       render_html ──► PreparedBatch     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Tasks share no state. The barrier waits for all of them; there is no race
//! and no early exit, so failures are always reported in input order. A
//! product rejected by validation counts as a failure at its own position,
//! under the same policy as an encoding failure.

use futures_util::future::join_all;
use saree_core::validation::validate_product;
use saree_core::{
    CatalogProduct, PayloadKind, PrintProfile, PrintableItem, Symbology, ValidationError,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::barcode::{generate_image, BarcodeOptions};
use crate::error::{EncodingError, LabelError, PipelineError};
use crate::layout::{build_document, GridLayout, PrintDocument, RenderedLabel};
use crate::template::{render_html, RenderedHtml, TemplateOptions};

// =============================================================================
// Batch Policy
// =============================================================================

/// What to do when some labels in a batch cannot be generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPolicy {
    /// Fail the whole batch on the first failing item.
    #[default]
    AbortOnFirstError,

    /// Print the labels that succeeded and report the rest.
    SkipFailed,
}

impl fmt::Display for BatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchPolicy::AbortOnFirstError => write!(f, "abort_on_first_error"),
            BatchPolicy::SkipFailed => write!(f, "skip_failed"),
        }
    }
}

impl FromStr for BatchPolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "abort_on_first_error" | "abort" => Ok(BatchPolicy::AbortOnFirstError),
            "skip_failed" | "skip" => Ok(BatchPolicy::SkipFailed),
            other => Err(ValidationError::InvalidFormat {
                field: "batchPolicy".to_string(),
                reason: format!(
                    "unknown batch policy '{}', expected abort_on_first_error or skip_failed",
                    other
                ),
            }),
        }
    }
}

// =============================================================================
// Request / Result Types
// =============================================================================

/// A label that could not be generated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelFailure {
    pub identifier: String,
    #[serde(serialize_with = "serialize_error")]
    pub error: LabelError,
}

impl LabelFailure {
    fn into_pipeline_error(self) -> PipelineError {
        match self.error {
            LabelError::Encoding(source) => PipelineError::Encoding {
                identifier: self.identifier,
                source,
            },
            LabelError::InvalidProduct(reason) => PipelineError::InvalidProduct {
                identifier: self.identifier,
                reason,
            },
        }
    }
}

fn serialize_error<S: serde::Serializer>(err: &LabelError, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&err.to_string())
}

/// Items to print and how.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelRequest {
    pub items: Vec<PrintableItem>,
    pub profile: PrintProfile,
    pub symbology: Symbology,
}

/// Catalog records to print; each is validated and converted on the way in.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRequest {
    pub products: Vec<CatalogProduct>,
    pub payload: PayloadKind,
    pub profile: PrintProfile,
    pub symbology: Symbology,
}

/// A document ready to dispatch.
#[derive(Debug, Clone)]
pub struct PreparedBatch {
    pub document: PrintDocument,
    pub html: RenderedHtml,
    /// Items left out under [`BatchPolicy::SkipFailed`], in input order.
    pub skipped: Vec<LabelFailure>,
}

// =============================================================================
// Generation
// =============================================================================

/// Generates one image per item, concurrently, keeping input order.
pub async fn generate_labels(
    items: Vec<PrintableItem>,
    symbology: Symbology,
    options: BarcodeOptions,
) -> Vec<Result<RenderedLabel, LabelFailure>> {
    let tasks = items.into_iter().map(|item| async move {
        let identifier = item.identifier().to_string();
        let handle = tokio::task::spawn_blocking(move || {
            generate_image(item.encodable_payload(), symbology, &options)
                .map(|image| RenderedLabel { item, image })
        });
        match handle.await {
            Ok(Ok(label)) => {
                debug!(identifier = %identifier, "Label generated");
                Ok(label)
            }
            Ok(Err(error)) => Err(LabelFailure {
                identifier,
                error: error.into(),
            }),
            Err(join_err) => Err(LabelFailure {
                identifier,
                error: EncodingError::Raster(format!("generation task failed: {}", join_err))
                    .into(),
            }),
        }
    });

    join_all(tasks).await
}

// =============================================================================
// Pipeline
// =============================================================================

/// Generation, layout and rendering with one set of options.
#[derive(Debug, Clone, Default)]
pub struct LabelPipeline {
    barcode: BarcodeOptions,
    template: TemplateOptions,
    policy: BatchPolicy,
}

impl LabelPipeline {
    pub fn new(barcode: BarcodeOptions, template: TemplateOptions, policy: BatchPolicy) -> Self {
        Self {
            barcode,
            template,
            policy,
        }
    }

    /// Same pipeline with a different batch policy.
    pub fn with_policy(mut self, policy: BatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> BatchPolicy {
        self.policy
    }

    pub fn barcode_options(&self) -> &BarcodeOptions {
        &self.barcode
    }

    pub fn template_options(&self) -> &TemplateOptions {
        &self.template
    }

    /// Builds the print-ready document for `request`.
    ///
    /// The profile is checked before any image is generated.
    pub async fn prepare(&self, request: LabelRequest) -> Result<PreparedBatch, PipelineError> {
        let LabelRequest {
            items,
            profile,
            symbology,
        } = request;

        self.run(items.into_iter().map(Ok).collect(), profile, symbology)
            .await
    }

    /// Builds the document straight from catalog records.
    ///
    /// A product that fails validation is a per-item failure: it aborts the
    /// batch or is skipped, exactly like a payload the symbology rejects.
    pub async fn prepare_catalog(
        &self,
        request: CatalogRequest,
    ) -> Result<PreparedBatch, PipelineError> {
        let CatalogRequest {
            products,
            payload,
            profile,
            symbology,
        } = request;

        let candidates = products
            .iter()
            .map(|product| admit(product, payload))
            .collect();
        self.run(candidates, profile, symbology).await
    }

    async fn run(
        &self,
        candidates: Vec<Result<PrintableItem, LabelFailure>>,
        profile: PrintProfile,
        symbology: Symbology,
    ) -> Result<PreparedBatch, PipelineError> {
        GridLayout::for_profile(&profile)?;

        let requested = candidates.len();
        let mut items = Vec::with_capacity(requested);
        let slots: Vec<Option<LabelFailure>> = candidates
            .into_iter()
            .map(|candidate| match candidate {
                Ok(item) => {
                    items.push(item);
                    None
                }
                Err(failure) => Some(failure),
            })
            .collect();

        // Rejected products go back into their input position
        let mut generated = generate_labels(items, symbology, self.barcode)
            .await
            .into_iter();
        let results = slots.into_iter().filter_map(|slot| match slot {
            Some(failure) => Some(Err(failure)),
            None => generated.next(),
        });

        let mut labels = Vec::with_capacity(requested);
        let mut skipped = Vec::new();
        for result in results {
            match result {
                Ok(label) => labels.push(label),
                Err(failure) => match self.policy {
                    BatchPolicy::AbortOnFirstError => {
                        warn!(
                            identifier = %failure.identifier,
                            error = %failure.error,
                            "Label generation failed, aborting batch"
                        );
                        return Err(failure.into_pipeline_error());
                    }
                    BatchPolicy::SkipFailed => {
                        warn!(
                            identifier = %failure.identifier,
                            error = %failure.error,
                            "Skipping label that could not be generated"
                        );
                        skipped.push(failure);
                    }
                },
            }
        }

        let document = build_document(labels, &profile)?;
        let html = render_html(&document, &self.template);

        info!(
            %profile,
            %symbology,
            requested,
            printed = document.label_count(),
            skipped = skipped.len(),
            pages = document.page_count(),
            "Label batch prepared"
        );

        Ok(PreparedBatch {
            document,
            html,
            skipped,
        })
    }
}

/// Validates one catalog record and turns it into a printable item.
fn admit(product: &CatalogProduct, payload: PayloadKind) -> Result<PrintableItem, LabelFailure> {
    validate_product(product)
        .map_err(|e| e.to_string())
        .and_then(|()| PrintableItem::from_product(product, payload).map_err(|e| e.to_string()))
        .map_err(|reason| {
            debug!(identifier = %product.id, reason = %reason, "Product rejected");
            LabelFailure {
                identifier: product.id.clone(),
                error: LabelError::InvalidProduct(reason),
            }
        })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use saree_core::{Money, PaperWidth};

    fn item(i: usize, payload: &str) -> PrintableItem {
        PrintableItem::new(
            format!("id-{}", i),
            format!("Saree {}", i),
            payload,
            Money::from_paise(149_900),
            None,
        )
        .unwrap()
    }

    fn items(n: usize) -> Vec<PrintableItem> {
        (0..n).map(|i| item(i, &format!("SAR-{:04}", i))).collect()
    }

    fn request(items: Vec<PrintableItem>) -> LabelRequest {
        LabelRequest {
            items,
            profile: PrintProfile::Thermal {
                paper_width: PaperWidth::Mm58,
            },
            symbology: Symbology::Code128,
        }
    }

    #[tokio::test]
    async fn test_generate_keeps_input_order() {
        let input = items(25);
        let results = generate_labels(input.clone(), Symbology::Qr, BarcodeOptions::default()).await;
        assert_eq!(results.len(), 25);
        for (result, expected) in results.into_iter().zip(input) {
            assert_eq!(result.unwrap().item, expected);
        }
    }

    #[tokio::test]
    async fn test_abort_reports_first_failure_in_input_order() {
        let mut input = items(8);
        input[2] = item(2, "SARÉE-2");
        input[5] = item(5, "");

        let err = LabelPipeline::default()
            .prepare(request(input))
            .await
            .unwrap_err();
        match err {
            PipelineError::Encoding { identifier, source } => {
                assert_eq!(identifier, "id-2");
                assert_eq!(
                    source,
                    EncodingError::UnsupportedCharacter { ch: 'É', position: 3 }
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_skip_failed_prints_the_rest() {
        let mut input = items(8);
        input[2] = item(2, "SARÉE-2");
        input[5] = item(5, "");

        let batch = LabelPipeline::default()
            .with_policy(BatchPolicy::SkipFailed)
            .prepare(request(input))
            .await
            .unwrap();

        let skipped: Vec<_> = batch.skipped.iter().map(|f| f.identifier.as_str()).collect();
        assert_eq!(skipped, vec!["id-2", "id-5"]);
        assert_eq!(
            batch.skipped[1].error,
            LabelError::Encoding(EncodingError::EmptyPayload)
        );

        let printed: Vec<_> = batch.document.iter_items().map(|i| i.identifier().to_string()).collect();
        assert_eq!(printed, vec!["id-0", "id-1", "id-3", "id-4", "id-6", "id-7"]);
        assert_eq!(batch.html.image_count, 6);
    }

    fn product(i: usize, name: &str, sku: &str) -> CatalogProduct {
        CatalogProduct {
            id: format!("p-{}", i),
            name: name.to_string(),
            sku: Some(sku.to_string()),
            selling_price: Money::from_paise(1_249_900),
            mrp: Some(Money::from_paise(1_499_900)),
        }
    }

    fn catalog(products: Vec<CatalogProduct>) -> CatalogRequest {
        CatalogRequest {
            products,
            payload: PayloadKind::Sku,
            profile: PrintProfile::Thermal {
                paper_width: PaperWidth::Mm58,
            },
            symbology: Symbology::Code128,
        }
    }

    #[tokio::test]
    async fn test_catalog_skip_failed_keeps_printable_products() {
        let products = vec![
            product(0, "Banarasi Silk Saree", "SAR-001"),
            product(1, "Kanjivaram Saree", "SARÉE-02"),
            product(2, "", "SAR-003"),
            product(3, "Chiffon Saree", "SAR 001.A"),
        ];

        let batch = LabelPipeline::default()
            .with_policy(BatchPolicy::SkipFailed)
            .prepare_catalog(catalog(products))
            .await
            .unwrap();

        let printed: Vec<_> = batch.document.iter_items().map(|i| i.identifier().to_string()).collect();
        assert_eq!(printed, vec!["p-0", "p-3"]);

        assert_eq!(batch.skipped.len(), 2);
        assert_eq!(batch.skipped[0].identifier, "p-1");
        assert_eq!(
            batch.skipped[0].error,
            LabelError::Encoding(EncodingError::UnsupportedCharacter { ch: 'É', position: 3 })
        );
        assert_eq!(batch.skipped[1].identifier, "p-2");
        assert!(matches!(batch.skipped[1].error, LabelError::InvalidProduct(_)));
    }

    #[tokio::test]
    async fn test_catalog_abort_reports_first_failure_of_either_kind() {
        let products = vec![
            product(0, "Banarasi Silk Saree", "SAR-001"),
            product(1, "", "SAR-002"),
            product(2, "Kanjivaram Saree", "SARÉE-03"),
        ];
        let err = LabelPipeline::default()
            .prepare_catalog(catalog(products))
            .await
            .unwrap_err();
        match err {
            PipelineError::InvalidProduct { identifier, reason } => {
                assert_eq!(identifier, "p-1");
                assert!(reason.contains("name"));
            }
            other => panic!("unexpected error: {other}"),
        }

        let products = vec![
            product(0, "Banarasi Silk Saree", "SARÉE-01"),
            product(1, "", "SAR-002"),
        ];
        let err = LabelPipeline::default()
            .prepare_catalog(catalog(products))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Encoding { ref identifier, .. } if identifier == "p-0"));
    }

    #[tokio::test]
    async fn test_empty_request_yields_empty_document() {
        let batch = LabelPipeline::default().prepare(request(Vec::new())).await.unwrap();
        assert_eq!(batch.document.page_count(), 0);
        assert_eq!(batch.html.image_count, 0);
        assert!(batch.skipped.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_profile_fails_before_generation() {
        let mut req = request(vec![item(0, "SARÉE")]);
        req.profile = PrintProfile::Normal {
            columns: 0,
            labels_per_page: 24,
        };
        let err = LabelPipeline::default().prepare(req).await.unwrap_err();
        assert!(matches!(err, PipelineError::Layout(_)));
    }

    #[tokio::test]
    async fn test_prepare_is_deterministic() {
        let pipeline = LabelPipeline::default();
        let a = pipeline.prepare(request(items(12))).await.unwrap();
        let b = pipeline.prepare(request(items(12))).await.unwrap();
        assert_eq!(a.document, b.document);
        assert_eq!(a.html, b.html);
    }

    #[test]
    fn test_batch_policy_parsing() {
        assert_eq!("skip".parse::<BatchPolicy>().unwrap(), BatchPolicy::SkipFailed);
        assert_eq!(
            "abort-on-first-error".parse::<BatchPolicy>().unwrap(),
            BatchPolicy::AbortOnFirstError
        );
        assert!("retry".parse::<BatchPolicy>().is_err());
        assert_eq!(BatchPolicy::default(), BatchPolicy::AbortOnFirstError);
    }
}
