//! Core data models for the signed link service.
//!
//! `FileEntry` is derived fresh from the object store on every listing call
//! and is never persisted. `LinkGrant` maps to the `link_grants` table via
//! `sqlx::FromRow` and serializes naturally as JSON via `serde`.

pub mod file_entry;
pub mod grant;

/// Timestamp rendering shared by the JSON responses: ISO-8601 with
/// millisecond precision and a `Z` suffix, whatever offset the row was
/// stored with.
pub(crate) mod iso8601 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::Serializer;

    pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn serialize_opt<S>(ts: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match ts {
            Some(ts) => serialize(ts, serializer),
            None => serializer.serialize_none(),
        }
    }
}
