//! Health & readiness handlers.
//!
//! - GET /healthz  -> simple liveness ("ok")
//! - GET /readyz   -> readiness that probes the grant DB and the object store

use crate::services::link_service::LinkService;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::collections::HashMap;

/// `GET /healthz`
///
/// Very small liveness probe — always returns 200 OK with a plain JSON body.
/// This endpoint should be cheap and never perform I/O.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
        }),
    )
}

/// `GET /readyz`
///
/// Readiness probe that:
/// 1. Runs a lightweight query against the grant database (`SELECT 1`).
/// 2. Heads the configured bucket through the object store client.
///
/// An unconfigured dependency counts as a failed check. Returns JSON
/// describing each check; HTTP 200 when all checks pass, HTTP 503 when any
/// check fails.
pub async fn readyz(State(service): State<LinkService>) -> impl IntoResponse {
    // 1) Grant DB check
    let db_check = match service.db.as_deref() {
        Some(pool) => match sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(pool).await {
            Ok(1) => (true, None::<String>),
            Ok(v) => (false, Some(format!("unexpected result: {}", v))),
            Err(e) => (false, Some(format!("error: {}", e))),
        },
        None => (false, Some("not configured".to_string())),
    };

    // 2) Object store check
    let store_check = match (service.object_store.as_deref(), service.bucket.as_deref()) {
        (Some(store), Some(bucket)) => match store.check_bucket(bucket).await {
            Ok(()) => (true, None::<String>),
            Err(e) => (false, Some(format!("error: {}", e))),
        },
        _ => (false, Some("not configured".to_string())),
    };

    // Build response JSON
    let db_ok = db_check.0;
    let store_ok = store_check.0;
    let overall_ok = db_ok && store_ok;

    let mut checks = HashMap::new();
    checks.insert(
        "database",
        CheckStatus {
            ok: db_ok,
            error: db_check.1,
        },
    );
    checks.insert(
        "object_store",
        CheckStatus {
            ok: store_ok,
            error: store_check.1,
        },
    );

    let body = ReadyResponse {
        status: if overall_ok {
            "ok".into()
        } else {
            "error".into()
        },
        checks,
    };

    let status = if overall_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: String,
    checks: HashMap<&'static str, CheckStatus>,
}

#[derive(Serialize)]
struct CheckStatus {
    ok: bool,
    error: Option<String>,
}
