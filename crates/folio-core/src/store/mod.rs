//! Remote document store abstraction
//!
//! One document per record, one collection per entity type, plus singleton
//! documents in the `settings` collection. Typed helpers live in [`records`].

mod libsql_store;
mod memory;
mod migrations;
pub mod records;

use std::future::Future;

use serde_json::Value;

use crate::error::Result;
use crate::models::{Collection, OrderUpdate};

pub use libsql_store::LibSqlStore;
pub use memory::{MemoryStore, StoreOperation};

/// A raw document as held by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub data: Value,
}

/// Document database plus blob storage.
///
/// Every call is an async suspension point that may fail; callers decide how
/// failures are surfaced.
pub trait RemoteStore: Send + Sync + 'static {
    /// All documents of a collection in id order.
    fn list(&self, collection: Collection)
        -> impl Future<Output = Result<Vec<StoredDocument>>> + Send;

    fn get(
        &self,
        collection: Collection,
        id: &str,
    ) -> impl Future<Output = Result<Option<StoredDocument>>> + Send;

    /// Create or fully replace a document.
    fn set(
        &self,
        collection: Collection,
        id: &str,
        data: Value,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Merge top-level fields into an existing document.
    ///
    /// Fails with `NotFound` when the document does not exist.
    fn update(
        &self,
        collection: Collection,
        id: &str,
        data: Value,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Delete a document. Deleting a missing document succeeds.
    fn delete(&self, collection: Collection, id: &str) -> impl Future<Output = Result<()>> + Send;

    /// Set `order` on many documents at once, all-or-nothing.
    ///
    /// An unknown id fails the whole batch without writing anything.
    fn batch_update_orders(
        &self,
        collection: Collection,
        updates: &[OrderUpdate],
    ) -> impl Future<Output = Result<()>> + Send;

    /// Upload a media file and return its public url.
    fn upload_blob(
        &self,
        file_name: &str,
        bytes: &[u8],
        content_type: Option<&str>,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Uploads of one key tried before giving up.
pub(crate) const MAX_BLOB_KEY_ATTEMPTS: u32 = 16;

/// Object key for an uploaded file: `portfolio/<unix_ms>_<sanitized name>`.
pub fn blob_key(file_name: &str, timestamp_ms: i64) -> String {
    unique_blob_key(file_name, timestamp_ms, 0)
}

/// Key for the `attempt`-th try at storing a file; retries after the first
/// get a `-<attempt>` stamp suffix so a taken key is never overwritten.
pub fn unique_blob_key(file_name: &str, timestamp_ms: i64, attempt: u32) -> String {
    let sanitized = file_name
        .trim()
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '_') {
                ch
            } else {
                '_'
            }
        })
        .collect::<String>();
    let sanitized = sanitized.trim_matches('.');
    let name = if sanitized.is_empty() {
        "upload"
    } else {
        sanitized
    };
    if attempt == 0 {
        format!("portfolio/{timestamp_ms}_{name}")
    } else {
        format!("portfolio/{timestamp_ms}-{attempt}_{name}")
    }
}

/// Shallow-merge `patch` into `target` (top-level object fields only).
pub(crate) fn merge_fields(target: &mut Value, patch: Value) {
    match (target.as_object_mut(), patch) {
        (Some(target), Value::Object(patch)) => {
            for (key, value) in patch {
                target.insert(key, value);
            }
        }
        (_, patch) => *target = patch,
    }
}
