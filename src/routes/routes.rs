//! Defines routes for the signed link service.
//!
//! ## Structure
//! - `GET  /files` — list every object in the configured bucket
//! - `POST /generate-signed-url` — mint a time-limited download URL and
//!   record the grant
//! - `GET  /active-links` — grants whose expiry is still in the future
//!
//! Plus `/healthz` and `/readyz` probes mounted at the root.

use crate::{
    handlers::{
        health_handlers::{healthz, readyz},
        link_handlers::{active_links, generate_signed_url, list_files},
    },
    services::link_service::LinkService,
};
use axum::{
    Router,
    routing::{get, post},
};

/// Build and return the router for the full HTTP surface.
///
/// The router carries shared state (`LinkService`) to all handlers.
pub fn routes() -> Router<LinkService> {
    Router::new()
        // health endpoints
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // link endpoints
        .route("/files", get(list_files))
        .route("/generate-signed-url", post(generate_signed_url))
        .route("/active-links", get(active_links))
}

#[cfg(test)]
mod tests {
    use super::routes;
    use crate::services::link_service::LinkService;
    use crate::test_helpers::{grant_count, insert_grant, test_service};
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
    };
    use chrono::{DateTime, Utc};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    fn app(service: LinkService) -> Router {
        routes().with_state(service)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    /// Assert a JSON string field parses as RFC 3339 and carries the UTC
    /// marker.
    fn assert_utc_timestamp(value: &Value) {
        let raw = value.as_str().expect("timestamp should be a string");
        assert!(raw.ends_with('Z'), "expected Z suffix, got {raw}");
        DateTime::parse_from_rfc3339(raw).expect("timestamp should be RFC 3339");
    }

    #[tokio::test]
    async fn healthz_is_ok() {
        let (service, _db) = test_service(&[]).await;

        let response = app(service).oneshot(get("/healthz")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn files_lists_objects_with_utc_timestamps() {
        let (service, _db) = test_service(&["report.pdf", "notes/today.txt"]).await;

        let response = app(service).oneshot(get("/files")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let entries = body.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        for entry in entries {
            assert!(entry["name"].is_string());
            assert_utc_timestamp(&entry["updated"]);
        }
    }

    #[tokio::test]
    async fn files_without_bucket_reports_configuration_error() {
        let (mut service, _db) = test_service(&["report.pdf"]).await;
        service.bucket = None;

        let response = app(service).oneshot(get("/files")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("not configured"));
    }

    #[tokio::test]
    async fn generate_without_file_name_is_rejected_before_any_store_call() {
        let (service, db) = test_service(&["report.pdf"]).await;

        let response = app(service)
            .oneshot(post_json("/generate-signed-url", "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert!(body["error"].is_string());
        assert_eq!(grant_count(&db).await, 0);
    }

    #[tokio::test]
    async fn generate_for_unknown_file_is_404_with_no_side_effects() {
        let (service, db) = test_service(&["report.pdf"]).await;

        let response = app(service)
            .oneshot(post_json(
                "/generate-signed-url",
                r#"{"fileName": "missing.pdf"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(grant_count(&db).await, 0);
    }

    #[tokio::test]
    async fn generate_then_active_links_round_trip() {
        let (service, _db) = test_service(&["report.pdf"]).await;
        let router = app(service);

        let response = router
            .clone()
            .oneshot(post_json(
                "/generate-signed-url",
                r#"{"fileName": "report.pdf", "expiration": 1}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let issued = body_json(response).await;
        let signed_url = issued["signed_url"].as_str().unwrap();
        assert!(!signed_url.is_empty());
        let id = issued["id"].as_str().unwrap().to_string();

        let response = router.oneshot(get("/active-links")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let links = body_json(response).await;
        let links = links.as_array().unwrap();
        assert_eq!(links.len(), 1);

        let grant = &links[0];
        assert_eq!(grant["id"].as_str().unwrap(), id);
        assert_eq!(grant["file_name"].as_str().unwrap(), "report.pdf");
        assert_eq!(grant["is_active"].as_bool(), Some(true));
        assert!(grant["accessed_at"].is_null());
        assert_utc_timestamp(&grant["created_at"]);
        assert_utc_timestamp(&grant["expires_at"]);
        // The response never echoes the URL back from storage, only its hash.
        assert_ne!(grant["signed_url_hash"].as_str().unwrap(), signed_url);
    }

    #[tokio::test]
    async fn active_links_omits_expired_grants() {
        let (service, db) = test_service(&[]).await;
        insert_grant(&db, "old.pdf", Utc::now() - chrono::Duration::minutes(2), true).await;

        let response = app(service).oneshot(get("/active-links")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let links = body_json(response).await;
        assert_eq!(links.as_array().unwrap().len(), 0);

        // The underlying row still exists; it is only filtered out.
        assert_eq!(grant_count(&db).await, 1);
    }

    #[tokio::test]
    async fn readyz_reports_missing_object_store() {
        let (mut service, _db) = test_service(&[]).await;
        service.object_store = None;

        let response = app(service).oneshot(get("/readyz")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = body_json(response).await;
        assert_eq!(body["status"].as_str(), Some("error"));
        assert_eq!(body["checks"]["database"]["ok"].as_bool(), Some(true));
        assert_eq!(body["checks"]["object_store"]["ok"].as_bool(), Some(false));
    }
}
