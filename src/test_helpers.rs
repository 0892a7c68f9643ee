//! Shared helpers for the service and router tests: an in-memory object
//! store and an in-memory grant database with the real migration applied.

use crate::services::link_service::LinkService;
use crate::services::object_store::{ObjectStore, ObjectStoreResult, StoredObject};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

const SCHEMA: &str = include_str!("../migrations/0001_init.sql");

/// In-memory stand-in for the S3 client. Lists in key order and mints
/// deterministic fake URLs.
pub struct MemoryObjectStore {
    objects: BTreeMap<String, DateTime<Utc>>,
}

impl MemoryObjectStore {
    pub fn with_keys(keys: &[&str]) -> Self {
        Self {
            objects: keys.iter().map(|k| (k.to_string(), Utc::now())).collect(),
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn list_objects(&self, _bucket: &str) -> ObjectStoreResult<Vec<StoredObject>> {
        Ok(self
            .objects
            .iter()
            .map(|(key, ts)| StoredObject {
                key: key.clone(),
                last_modified: *ts,
            })
            .collect())
    }

    async fn object_exists(&self, _bucket: &str, key: &str) -> ObjectStoreResult<bool> {
        Ok(self.objects.contains_key(key))
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> ObjectStoreResult<String> {
        Ok(format!(
            "https://{bucket}.example.test/{key}?X-Amz-Expires={}",
            expires_in.as_secs()
        ))
    }

    async fn check_bucket(&self, _bucket: &str) -> ObjectStoreResult<()> {
        Ok(())
    }
}

/// Fresh in-memory grant database with the migration file applied.
pub async fn memory_db() -> Arc<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite should connect");

    for stmt in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        sqlx::query(stmt)
            .execute(&pool)
            .await
            .expect("migration statement should apply");
    }

    Arc::new(pool)
}

/// A fully wired service over an in-memory store holding `keys`, plus the
/// database handle for direct assertions.
pub async fn test_service(keys: &[&str]) -> (LinkService, Arc<SqlitePool>) {
    let db = memory_db().await;
    let service = LinkService::new(
        Some(Arc::new(MemoryObjectStore::with_keys(keys))),
        Some(db.clone()),
        Some("files".to_string()),
    );
    (service, db)
}

/// Seed one grant row directly, bypassing issuance.
pub async fn insert_grant(
    db: &SqlitePool,
    file_name: &str,
    expires_at: DateTime<Utc>,
    is_active: bool,
) {
    sqlx::query(
        "INSERT INTO link_grants (id, file_name, signed_url_hash, created_at, expires_at, is_active, accessed_at)
         VALUES (?, ?, ?, ?, ?, ?, NULL)",
    )
    .bind(Uuid::new_v4())
    .bind(file_name)
    .bind(format!("{:x}", md5::compute(file_name.as_bytes())))
    .bind(Utc::now())
    .bind(expires_at)
    .bind(is_active)
    .execute(db)
    .await
    .expect("seed grant should insert");
}

/// Total rows in `link_grants`, active or not.
pub async fn grant_count(db: &SqlitePool) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM link_grants")
        .fetch_one(db)
        .await
        .expect("count query should run")
}
