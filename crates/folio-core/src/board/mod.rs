//! Collection controllers: local lists kept in step with the store
//!
//! Boards mutate their list optimistically and reconcile with the store
//! result. Failed writes are rolled back and reported through the
//! notification channel.

mod projects;
mod records;

pub use projects::{ProjectBoard, ReorderBatch};
pub use records::{ManagedRecord, RecordBoard};

use crate::models::Document;

/// Case-insensitive substring match over `display_name`.
pub(crate) fn matches_search<D: Document>(record: &D, search: &str) -> bool {
    let search = search.trim().to_lowercase();
    search.is_empty() || record.display_name().to_lowercase().contains(&search)
}

/// Remove `id` from `items`, returning its index and value for rollback.
pub(crate) fn take_record<D: Document>(items: &mut Vec<D>, id: &str) -> Option<(usize, D)> {
    let index = items.iter().position(|item| item.id() == id)?;
    Some((index, items.remove(index)))
}

/// Put a removed record back where it was.
pub(crate) fn restore_record<D: Document>(items: &mut Vec<D>, index: usize, record: D) {
    if items.iter().any(|item| item.id() == record.id()) {
        return;
    }
    let index = index.min(items.len());
    items.insert(index, record);
}
