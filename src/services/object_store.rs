//! Object store client seam.
//!
//! The service needs exactly three things from the backing store: enumerate
//! the objects in a bucket, check that one object exists, and mint a
//! presigned download URL. They are expressed as a trait so the S3 client
//! can be swapped for an in-memory store in tests.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("presigning configuration rejected: {0}")]
    Presign(String),
    #[error("object store request failed: {0}")]
    Request(String),
}

pub type ObjectStoreResult<T> = Result<T, ObjectStoreError>;

/// Metadata for one stored object, as reported by the listing call.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub key: String,
    pub last_modified: DateTime<Utc>,
}

/// Minimal contract against the bucket-like external store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Enumerate every object in `bucket`, in the store's own order.
    async fn list_objects(&self, bucket: &str) -> ObjectStoreResult<Vec<StoredObject>>;

    /// Whether `key` currently exists in `bucket`.
    async fn object_exists(&self, bucket: &str, key: &str) -> ObjectStoreResult<bool>;

    /// Mint a presigned GET URL for `key`, valid for `expires_in`.
    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> ObjectStoreResult<String>;

    /// Reachability probe used by the readiness endpoint.
    async fn check_bucket(&self, bucket: &str) -> ObjectStoreResult<()>;
}

/// S3 implementation backed by `aws-sdk-s3`. Presigned URLs carry the SDK's
/// SigV4 query signature with the requested expiry.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    /// Build a client from the default AWS environment chain.
    ///
    /// Fails when no region can be resolved so the caller can leave the
    /// handle empty and keep serving configuration errors instead of
    /// crashing at startup.
    pub async fn from_env() -> ObjectStoreResult<Self> {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        if config.region().is_none() {
            return Err(ObjectStoreError::Request("no AWS region configured".into()));
        }
        Ok(Self {
            client: Client::new(&config),
        })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list_objects(&self, bucket: &str) -> ObjectStoreResult<Vec<StoredObject>> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .into_paginator()
            .send();

        let mut objects = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page
                .map_err(|err| ObjectStoreError::Request(DisplayErrorContext(&err).to_string()))?;
            for obj in page.contents() {
                let Some(key) = obj.key() else { continue };
                let last_modified = obj
                    .last_modified()
                    .and_then(|ts| DateTime::from_timestamp(ts.secs(), ts.subsec_nanos()))
                    .unwrap_or_default();
                objects.push(StoredObject {
                    key: key.to_string(),
                    last_modified,
                });
            }
        }
        Ok(objects)
    }

    async fn object_exists(&self, bucket: &str, key: &str) -> ObjectStoreResult<bool> {
        match self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) => {
                if err
                    .as_service_error()
                    .map(|e| e.is_not_found())
                    .unwrap_or(false)
                {
                    Ok(false)
                } else {
                    Err(ObjectStoreError::Request(
                        DisplayErrorContext(&err).to_string(),
                    ))
                }
            }
        }
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> ObjectStoreResult<String> {
        let presigning = PresigningConfig::builder()
            .expires_in(expires_in)
            .build()
            .map_err(|err| ObjectStoreError::Presign(err.to_string()))?;

        let request = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|err| ObjectStoreError::Request(DisplayErrorContext(&err).to_string()))?;

        Ok(request.uri().to_string())
    }

    async fn check_bucket(&self, bucket: &str) -> ObjectStoreResult<()> {
        self.client
            .head_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|err| ObjectStoreError::Request(DisplayErrorContext(&err).to_string()))?;
        Ok(())
    }
}
