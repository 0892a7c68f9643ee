//! LinkService — the three link operations backed by the object store
//! client and the SQLite grant table.
//!
//! The service holds no per-request state. Both external handles are
//! optional: a dependency that failed to initialize at startup leaves its
//! slot empty, and every operation checks the handles it needs before doing
//! any work, so a missing dependency surfaces as a configuration error
//! instead of a crash.

use crate::models::{file_entry::FileEntry, grant::LinkGrant};
use crate::services::object_store::{ObjectStore, ObjectStoreError};
use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Link lifetime applied when the request does not specify one.
pub const DEFAULT_EXPIRATION_MINUTES: i64 = 15;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
    #[error("expiration must be a positive number of minutes")]
    InvalidExpiration,
    #[error("file `{0}` not found")]
    FileNotFound(String),
    #[error(transparent)]
    ObjectStore(#[from] ObjectStoreError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type LinkResult<T> = Result<T, LinkError>;

/// Result of a successful issuance: the plaintext URL for the caller plus
/// the grant row that was recorded for it.
#[derive(Debug)]
pub struct IssuedLink {
    pub signed_url: String,
    pub grant: LinkGrant,
}

/// LinkService provides the service's three operations:
/// - List the objects in the configured bucket
/// - Issue a presigned download URL and record the grant
/// - List grants whose expiry is still in the future
#[derive(Clone)]
pub struct LinkService {
    /// Object store client, empty when initialization failed at startup.
    pub object_store: Option<Arc<dyn ObjectStore>>,

    /// Grant database pool, empty when the connection failed at startup.
    pub db: Option<Arc<SqlitePool>>,

    /// Bucket holding the downloadable files, empty when unconfigured.
    pub bucket: Option<String>,
}

impl LinkService {
    pub fn new(
        object_store: Option<Arc<dyn ObjectStore>>,
        db: Option<Arc<SqlitePool>>,
        bucket: Option<String>,
    ) -> Self {
        Self {
            object_store,
            db,
            bucket,
        }
    }

    fn bucket(&self) -> LinkResult<&str> {
        self.bucket
            .as_deref()
            .ok_or(LinkError::NotConfigured("bucket name"))
    }

    fn store(&self) -> LinkResult<&dyn ObjectStore> {
        self.object_store
            .as_deref()
            .ok_or(LinkError::NotConfigured("object store client"))
    }

    fn grant_db(&self) -> LinkResult<&SqlitePool> {
        self.db
            .as_deref()
            .ok_or(LinkError::NotConfigured("grant database"))
    }

    /// Enumerate every object in the configured bucket.
    ///
    /// Entries come back in the store's own enumeration order; no sorting is
    /// applied here.
    pub async fn list_files(&self) -> LinkResult<Vec<FileEntry>> {
        let bucket = self.bucket()?;
        let store = self.store()?;

        let objects = store.list_objects(bucket).await?;
        Ok(objects
            .into_iter()
            .map(|obj| FileEntry {
                name: obj.key,
                updated: obj.last_modified,
            })
            .collect())
    }

    /// Mint a presigned GET URL for `file_name` and record the grant.
    ///
    /// The existence check runs before any signing so an unknown file leaves
    /// no trace. The grant is persisted after a successful presign and
    /// before the response; if the insert fails the URL is discarded and the
    /// caller sees only the storage error.
    pub async fn issue_link(
        &self,
        file_name: &str,
        expiration_minutes: i64,
    ) -> LinkResult<IssuedLink> {
        let bucket = self.bucket()?;
        let store = self.store()?;
        let db = self.grant_db()?;

        if expiration_minutes <= 0 {
            return Err(LinkError::InvalidExpiration);
        }

        if !store.object_exists(bucket, file_name).await? {
            return Err(LinkError::FileNotFound(file_name.to_string()));
        }

        let signed_url = store
            .presign_get(
                bucket,
                file_name,
                std::time::Duration::from_secs(expiration_minutes as u64 * 60),
            )
            .await?;

        // Only the digest goes into the grant row; the URL itself is
        // returned to the caller and then forgotten.
        let url_hash = format!("{:x}", md5::compute(signed_url.as_bytes()));
        let expires_at = Utc::now() + Duration::minutes(expiration_minutes);

        let grant = sqlx::query_as::<_, LinkGrant>(
            r#"
            INSERT INTO link_grants (
                id, file_name, signed_url_hash, created_at, expires_at, is_active, accessed_at
            ) VALUES (?, ?, ?, datetime('now'), ?, 1, NULL)
            RETURNING id, file_name, signed_url_hash, created_at, expires_at, is_active, accessed_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(file_name)
        .bind(&url_hash)
        .bind(expires_at)
        .fetch_one(db)
        .await?;

        Ok(IssuedLink { signed_url, grant })
    }

    /// Grants whose expiry is still in the future, newest expiry first.
    ///
    /// "Active" is entirely this query predicate; rows never transition.
    pub async fn active_links(&self) -> LinkResult<Vec<LinkGrant>> {
        let db = self.grant_db()?;

        let grants = sqlx::query_as::<_, LinkGrant>(
            "SELECT id, file_name, signed_url_hash, created_at, expires_at, is_active, accessed_at
             FROM link_grants
             WHERE expires_at > ? AND is_active = 1
             ORDER BY expires_at DESC",
        )
        .bind(Utc::now())
        .fetch_all(db)
        .await?;

        Ok(grants)
    }
}
