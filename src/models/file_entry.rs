//! Represents one object in the configured bucket, as seen by `/files`.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single listing entry. Produced fresh from the object store on every
/// call; nothing about it is persisted.
#[derive(Serialize, Clone, Debug)]
pub struct FileEntry {
    /// Object key within the bucket.
    pub name: String,

    /// Last-modified instant reported by the store.
    #[serde(serialize_with = "super::iso8601::serialize")]
    pub updated: DateTime<Utc>,
}
