//! # Label Routes
//!
//! HTTP handlers for the dashboard's print flow.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Label Request Flow                              │
//! │                                                                         │
//! │  Dashboard selects products ──► POST /api/labels/{preview,html,print}  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  malformed JSON ──► 400 VALIDATION_ERROR                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  LabelPipeline::prepare_catalog  (profile/symbology/policy from        │
//! │       │                           request, else from labels.toml)       │
//! │       │   rejected products follow the batch policy like encoding      │
//! │       │   failures: abort ──► 400, skip ──► listed in `skipped`        │
//! │       ├──► preview: layout metrics + page contents (JSON)              │
//! │       ├──► html:    self-contained document, prints itself on load     │
//! │       └──► print:   Dispatcher<SpoolHost> ──► PrintReceipt (JSON)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::Json;
use chrono::Utc;
use saree_core::{
    decode_display_claims, CatalogProduct, DisplayClaims, PayloadKind, PrintProfile, Symbology,
};
use saree_labels::{
    BatchPolicy, CatalogRequest, GridLayout, LabelFailure, PreparedBatch, PrintReceipt,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Request / Response DTOs
// =============================================================================

/// Body of every `/api/labels/*` request. Absent fields use labels.toml.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelsRequest {
    pub products: Vec<CatalogProduct>,
    #[serde(default)]
    pub profile: Option<PrintProfile>,
    #[serde(default)]
    pub symbology: Option<Symbology>,
    #[serde(default)]
    pub payload: Option<PayloadKind>,
    #[serde(default)]
    pub batch_policy: Option<BatchPolicy>,
}

/// One label as the preview shows it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelPreview {
    pub identifier: String,
    pub display_name: String,
    pub price_text: String,
    pub offer_text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagePreview {
    pub number: usize,
    pub labels: Vec<LabelPreview>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    pub profile: PrintProfile,
    pub layout: GridLayout,
    pub page_count: usize,
    pub label_count: usize,
    pub pages: Vec<PagePreview>,
    pub skipped: Vec<LabelFailure>,
}

impl From<PreparedBatch> for PreviewResponse {
    fn from(batch: PreparedBatch) -> Self {
        let document = batch.document;
        let page_count = document.page_count();
        let label_count = document.label_count();
        let pages = document
            .pages
            .into_iter()
            .map(|page| PagePreview {
                number: page.number,
                labels: page
                    .cells
                    .into_iter()
                    .map(|cell| LabelPreview {
                        identifier: cell.item.identifier().to_string(),
                        display_name: cell.display_name,
                        price_text: cell.price_text,
                        offer_text: cell.offer_text,
                    })
                    .collect(),
            })
            .collect();

        PreviewResponse {
            profile: document.profile,
            layout: document.layout,
            page_count,
            label_count,
            pages,
            skipped: batch.skipped,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintResponse {
    #[serde(flatten)]
    pub receipt: PrintReceipt,
    pub label_count: usize,
    pub skipped: Vec<LabelFailure>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClaimsRequest {
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimsResponse {
    #[serde(flatten)]
    pub claims: DisplayClaims,
    pub display_name: String,
    pub role_label: Option<String>,
    pub expired: bool,
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    "OK"
}

/// Layout summary without rendering anything to a surface.
pub async fn preview(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LabelsRequest>, JsonRejection>,
) -> Result<Json<PreviewResponse>, ApiError> {
    let Json(request) = payload?;
    let batch = prepare(&state, request).await?;
    Ok(Json(batch.into()))
}

/// The printable document itself; the browser opens it and it prints once
/// its images are in.
pub async fn html(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LabelsRequest>, JsonRejection>,
) -> Result<Html<String>, ApiError> {
    let Json(request) = payload?;
    let batch = prepare(&state, request).await?;
    Ok(Html(batch.html.html))
}

/// Renders and sends the document to the spool.
pub async fn print(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LabelsRequest>, JsonRejection>,
) -> Result<Json<PrintResponse>, ApiError> {
    let Json(request) = payload?;
    let batch = prepare(&state, request).await?;
    let receipt = state.dispatcher.dispatch(&batch.html).await?;

    info!(
        job_id = %receipt.job_id,
        labels = batch.document.label_count(),
        skipped = batch.skipped.len(),
        "Labels printed"
    );
    Ok(Json(PrintResponse {
        receipt,
        label_count: batch.document.label_count(),
        skipped: batch.skipped,
    }))
}

/// Who is signed in, for display only.
pub async fn session_claims(
    payload: Result<Json<ClaimsRequest>, JsonRejection>,
) -> Result<Json<ClaimsResponse>, ApiError> {
    let Json(request) = payload?;
    let claims = decode_display_claims(&request.token)?;
    debug!(subject = ?claims.subject, "Session claims decoded");

    Ok(Json(ClaimsResponse {
        display_name: claims.display_name().to_string(),
        role_label: claims.role.as_ref().map(|r| r.display_label().to_string()),
        expired: claims.is_expired(Utc::now()),
        claims,
    }))
}

// =============================================================================
// Helpers
// =============================================================================

/// Runs the pipeline over the products with request overrides.
async fn prepare(state: &AppState, request: LabelsRequest) -> Result<PreparedBatch, ApiError> {
    let defaults = &state.labels.print;

    let pipeline = match request.batch_policy {
        Some(policy) => state.pipeline.clone().with_policy(policy),
        None => state.pipeline.clone(),
    };

    let batch = pipeline
        .prepare_catalog(CatalogRequest {
            products: request.products,
            payload: request.payload.unwrap_or(defaults.payload),
            profile: request.profile.unwrap_or(defaults.profile),
            symbology: request.symbology.unwrap_or(defaults.symbology),
        })
        .await?;

    Ok(batch)
}
