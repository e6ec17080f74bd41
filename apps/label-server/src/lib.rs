//! # Saree Label Server
//!
//! HTTP API through which the dashboard previews, renders and prints labels.
//!
//! ## Routes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Label Server Routes                             │
//! │                                                                         │
//! │  GET  /health               ──► "OK"                                    │
//! │  POST /api/labels/preview   ──► layout + page contents (JSON)           │
//! │  POST /api/labels/html      ──► text/html print document                │
//! │  POST /api/labels/print     ──► spooled PrintReceipt (JSON)             │
//! │  POST /api/session/claims   ──► DisplayClaims (JSON, display only)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `LABEL_SERVER_BIND` - Interface to bind (default: 0.0.0.0)
//! - `LABEL_SERVER_PORT` - HTTP port (default: 8787)
//! - `SAREE_LABEL_CONFIG` - Path of labels.toml
//! - `SAREE_LABEL_*` - Label overrides, see [`saree_labels::config`]

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

// Re-exports
pub use config::ServerConfig;
pub use error::{ApiError, ErrorCode};
pub use state::AppState;

/// Builds the application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    // The dashboard is served from a different origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health))
        .route("/api/labels/preview", post(routes::preview))
        .route("/api/labels/html", post(routes::html))
        .route("/api/labels/print", post(routes::print))
        .route("/api/session/claims", post(routes::session_claims))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use saree_labels::LabelConfig;
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn app(spool: &TempDir) -> Router {
        let mut labels = LabelConfig::default();
        labels.dispatch.spool_dir = spool.path().to_path_buf();
        build_router(Arc::new(AppState::new(labels)))
    }

    fn products(n: usize) -> Value {
        Value::Array(
            (0..n)
                .map(|i| {
                    json!({
                        "_id": format!("64f1c0ffee{:02}", i),
                        "name": "Banarasi Silk Saree with Zari Border",
                        "sku": format!("SAR-BAN-{:04}", i),
                        "sellingPrice": 12499.0,
                        "mrp": 14999.0
                    })
                })
                .collect(),
        )
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let spool = TempDir::new().unwrap();
        let response = app(&spool)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_preview_thermal_defaults() {
        let spool = TempDir::new().unwrap();
        let response = app(&spool)
            .oneshot(post_json("/api/labels/preview", json!({ "products": products(5) })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["pageCount"], 1);
        assert_eq!(body["labelCount"], 5);
        assert_eq!(body["layout"]["columns"], 2);
        let first = &body["pages"][0]["labels"][0];
        assert_eq!(first["displayName"], "Banarasi Silk Sar...");
        assert_eq!(first["priceText"], "MRP: ₹14999");
    }

    #[tokio::test]
    async fn test_preview_normal_profile_paginates() {
        let spool = TempDir::new().unwrap();
        let response = app(&spool)
            .oneshot(post_json(
                "/api/labels/preview",
                json!({
                    "products": products(30),
                    "profile": { "kind": "normal", "columns": 4, "labelsPerPage": 24 },
                    "symbology": "qr"
                }),
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["pageCount"], 2);
        assert_eq!(body["pages"][0]["labels"].as_array().unwrap().len(), 24);
        assert_eq!(body["pages"][1]["labels"].as_array().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_html_document() {
        let spool = TempDir::new().unwrap();
        let response = app(&spool)
            .oneshot(post_json("/api/labels/html", json!({ "products": products(3) })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html"));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert_eq!(html.matches("data:image/png;base64,").count(), 3);
        assert!(html.contains("window.print()"));
    }

    #[tokio::test]
    async fn test_unencodable_sku_is_422() {
        let spool = TempDir::new().unwrap();
        let mut list = products(3);
        list[1]["sku"] = json!("SARÉE-02");
        let response = app(&spool)
            .oneshot(post_json("/api/labels/html", json!({ "products": list })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["code"], "ENCODING_ERROR");
        assert!(body["message"].as_str().unwrap().contains("64f1c0ffee01"));
    }

    #[tokio::test]
    async fn test_unencodable_identifier_is_422() {
        let spool = TempDir::new().unwrap();
        let mut list = products(2);
        // legacy product: no SKU, so the identifier is encoded
        list[1]["sku"] = Value::Null;
        list[1]["_id"] = json!("SARÉE-01");
        let response = app(&spool)
            .oneshot(post_json("/api/labels/html", json!({ "products": list })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(response).await["code"], "ENCODING_ERROR");
    }

    #[tokio::test]
    async fn test_qr_accepts_any_printable_sku() {
        let spool = TempDir::new().unwrap();
        let mut list = products(1);
        list[0]["sku"] = json!("SAR 001.A");
        let response = app(&spool)
            .oneshot(post_json(
                "/api/labels/preview",
                json!({ "products": list, "symbology": "qr" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["labelCount"], 1);
    }

    #[tokio::test]
    async fn test_skip_policy_reports_skipped() {
        let spool = TempDir::new().unwrap();
        let mut list = products(3);
        list[0]["sku"] = json!("SAR-001");
        list[1]["sku"] = json!("SARÉE-02");
        list[2]["sku"] = json!("SAR-003");
        let response = app(&spool)
            .oneshot(post_json(
                "/api/labels/preview",
                json!({ "products": list, "batchPolicy": "skip_failed" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["labelCount"], 2);
        assert_eq!(body["skipped"].as_array().unwrap().len(), 1);
        assert_eq!(body["skipped"][0]["identifier"], "64f1c0ffee01");
    }

    #[tokio::test]
    async fn test_skip_policy_skips_invalid_product() {
        let spool = TempDir::new().unwrap();
        let mut list = products(3);
        list[2]["name"] = json!("");
        let response = app(&spool)
            .oneshot(post_json(
                "/api/labels/preview",
                json!({ "products": list, "batchPolicy": "skip_failed" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["labelCount"], 2);
        assert_eq!(body["skipped"][0]["identifier"], "64f1c0ffee02");
        assert!(body["skipped"][0]["error"]
            .as_str()
            .unwrap()
            .contains("name is required"));
    }

    #[tokio::test]
    async fn test_invalid_product_is_400() {
        let spool = TempDir::new().unwrap();
        let mut list = products(1);
        list[0]["name"] = json!("");
        let response = app(&spool)
            .oneshot(post_json("/api/labels/preview", json!({ "products": list })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_malformed_body_is_400_json() {
        let spool = TempDir::new().unwrap();

        let response = app(&spool)
            .oneshot(post_json("/api/labels/preview", json!({ "products": 5 })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

        let request = Request::builder()
            .method("POST")
            .uri("/api/labels/print")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"products\": ["))
            .unwrap();
        let response = app(&spool).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

        let response = app(&spool)
            .oneshot(post_json("/api/session/claims", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_print_spools_job() {
        let spool = TempDir::new().unwrap();
        let response = app(&spool)
            .oneshot(post_json("/api/labels/print", json!({ "products": products(4) })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["labelCount"], 4);
        assert_eq!(body["imageCount"], 4);
        let job_id = body["jobId"].as_str().unwrap();
        assert!(spool.path().join(format!("{}.html", job_id)).exists());
    }

    #[tokio::test]
    async fn test_session_claims() {
        let spool = TempDir::new().unwrap();
        // {"alg":"HS256","typ":"JWT"} . {"sub":"u1","name":"Priya","role":"admin"} . sig
        let token = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.\
                     eyJzdWIiOiJ1MSIsIm5hbWUiOiJQcml5YSIsInJvbGUiOiJhZG1pbiJ9.\
                     c2lnbmF0dXJl";
        let response = app(&spool)
            .oneshot(post_json("/api/session/claims", json!({ "token": token })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["displayName"], "Priya");
        assert_eq!(body["role"], "admin");
        assert_eq!(body["expired"], false);
    }

    #[tokio::test]
    async fn test_malformed_token_is_400() {
        let spool = TempDir::new().unwrap();
        let response = app(&spool)
            .oneshot(post_json("/api/session/claims", json!({ "token": "not-a-jwt" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
