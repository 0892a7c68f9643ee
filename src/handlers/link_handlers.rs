//! HTTP handlers for the link operations.
//! Request/response shaping only; all store work lives in `LinkService`.

use crate::{
    errors::AppError,
    models::{file_entry::FileEntry, grant::LinkGrant},
    services::link_service::{DEFAULT_EXPIRATION_MINUTES, LinkService},
};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request body for `POST /generate-signed-url`.
#[derive(Debug, Deserialize)]
pub struct GenerateSignedUrlReq {
    #[serde(rename = "fileName")]
    pub file_name: String,
    /// Link lifetime in minutes; defaults to 15 when absent.
    pub expiration: Option<i64>,
}

/// Response body for `POST /generate-signed-url`.
#[derive(Debug, Serialize)]
pub struct SignedUrlResponse {
    pub signed_url: String,
    pub id: Uuid,
}

/// GET `/files` — every object in the configured bucket.
pub async fn list_files(
    State(service): State<LinkService>,
) -> Result<Json<Vec<FileEntry>>, AppError> {
    let files = service.list_files().await?;
    Ok(Json(files))
}

/// POST `/generate-signed-url` — mint a presigned URL and record the grant.
///
/// A body that is missing, not JSON, or missing `fileName` is rejected
/// before any store call happens.
pub async fn generate_signed_url(
    State(service): State<LinkService>,
    payload: Result<Json<GenerateSignedUrlReq>, JsonRejection>,
) -> Result<Json<SignedUrlResponse>, AppError> {
    let Json(req) = payload
        .map_err(|rejection| AppError::new(StatusCode::BAD_REQUEST, rejection.body_text()))?;

    let expiration = req.expiration.unwrap_or(DEFAULT_EXPIRATION_MINUTES);
    let issued = service.issue_link(&req.file_name, expiration).await?;

    Ok(Json(SignedUrlResponse {
        signed_url: issued.signed_url,
        id: issued.grant.id,
    }))
}

/// GET `/active-links` — grants whose expiry is still in the future.
pub async fn active_links(
    State(service): State<LinkService>,
) -> Result<Json<Vec<LinkGrant>>, AppError> {
    let links = service.active_links().await?;
    Ok(Json(links))
}
