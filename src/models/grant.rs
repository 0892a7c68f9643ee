//! Represents one issued signed URL — metadata only, never the URL itself.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A persisted record of one signed-URL issuance.
///
/// Rows are written exactly once and never updated or deleted; whether a
/// grant is "active" is decided at query time from `is_active` and
/// `expires_at`, not by any stored state transition.
#[derive(Serialize, Clone, FromRow, Debug)]
pub struct LinkGrant {
    /// Store-assigned identifier, returned to the caller at issuance.
    pub id: Uuid,

    /// Object key the URL was minted for.
    pub file_name: String,

    /// Lowercase hex MD5 digest of the issued URL. The plaintext URL is
    /// never persisted.
    pub signed_url_hash: String,

    /// Server-assigned insertion time.
    #[serde(serialize_with = "super::iso8601::serialize")]
    pub created_at: DateTime<Utc>,

    /// Issuance time plus the requested TTL.
    #[serde(serialize_with = "super::iso8601::serialize")]
    pub expires_at: DateTime<Utc>,

    /// Always true at creation; no revocation path exists.
    pub is_active: bool,

    /// Reserved for download tracking; NULL at creation and never set here.
    #[serde(serialize_with = "super::iso8601::serialize_opt")]
    pub accessed_at: Option<DateTime<Utc>>,
}
