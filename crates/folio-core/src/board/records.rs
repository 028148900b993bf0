//! Unordered collections: experience timeline and client roster

use std::sync::{Arc, Mutex};

use super::{matches_search, restore_record, take_record};
use crate::confirm::{ConfirmationGate, ConfirmationRequest, Severity};
use crate::error::{Error, Result};
use crate::models::{Client, Document, Experience};
use crate::notify::NotificationChannel;
use crate::store::{records, RemoteStore};
use crate::util::lock;

/// Per-entity wording of board notifications and prompts.
pub trait ManagedRecord: Document {
    /// Notification after a successful save
    const SAVED: &'static str;

    /// Notification after a successful delete
    const REMOVED: &'static str;

    /// Title and message of the delete confirmation
    fn purge_prompt(&self) -> (String, String);
}

impl ManagedRecord for Experience {
    const SAVED: &'static str = "Timeline updated";
    const REMOVED: &'static str = "Milestone removed";

    fn purge_prompt(&self) -> (String, String) {
        (
            "Purge Career Milestone?".to_string(),
            format!(
                "You are about to permanently remove \"{}\" at {}. The public timeline updates immediately.",
                self.role, self.company
            ),
        )
    }
}

impl ManagedRecord for Client {
    const SAVED: &'static str = "Client partnership updated";
    const REMOVED: &'static str = "Partner record purged";

    fn purge_prompt(&self) -> (String, String) {
        (
            "Purge Partnership Record?".to_string(),
            format!(
                "This will permanently remove {} from your client roster.",
                self.display_name()
            ),
        )
    }
}

/// Newest-first list of records of one collection.
pub struct RecordBoard<S, D> {
    store: Arc<S>,
    notifier: NotificationChannel,
    items: Arc<Mutex<Vec<D>>>,
}

impl<S, D> Clone for RecordBoard<S, D> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            notifier: self.notifier.clone(),
            items: Arc::clone(&self.items),
        }
    }
}

impl<S: RemoteStore, D: ManagedRecord> RecordBoard<S, D> {
    pub fn new(store: Arc<S>, notifier: NotificationChannel) -> Self {
        Self {
            store,
            notifier,
            items: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Replace the local list with stored records, newest id first.
    pub async fn load(&self) -> Result<usize> {
        let mut loaded = records::list_records::<D>(self.store.as_ref()).await?;
        loaded.reverse();
        let count = loaded.len();
        *lock(&self.items) = loaded;
        tracing::info!("Loaded {count} {} records", D::COLLECTION);
        Ok(count)
    }

    pub fn items(&self) -> Vec<D> {
        lock(&self.items).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.items).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &str) -> Option<D> {
        lock(&self.items).iter().find(|item| item.id() == id).cloned()
    }

    pub fn filtered(&self, search: &str) -> Vec<D> {
        lock(&self.items)
            .iter()
            .filter(|item| matches_search(*item, search))
            .cloned()
            .collect()
    }

    /// Create or replace a record. New records go to the front of the list.
    pub async fn save(&self, record: D) -> Result<D> {
        let previous = {
            let mut items = lock(&self.items);
            match items.iter_mut().find(|item| item.id() == record.id()) {
                Some(slot) => Some(std::mem::replace(slot, record.clone())),
                None => {
                    items.insert(0, record.clone());
                    None
                }
            }
        };

        match records::put_record(self.store.as_ref(), &record).await {
            Ok(()) => {
                tracing::info!("Saved {} record {}", D::COLLECTION, record.id());
                self.notifier.success(D::SAVED);
                Ok(record)
            }
            Err(error) => {
                {
                    let mut items = lock(&self.items);
                    match previous {
                        Some(previous) => {
                            if let Some(slot) = items.iter_mut().find(|item| item.id() == record.id()) {
                                *slot = previous;
                            }
                        }
                        None => items.retain(|item| item.id() != record.id()),
                    }
                }
                self.notifier.error(format!("Save failed: {error}"));
                Err(error)
            }
        }
    }

    /// Remove a record optimistically, restoring it if the store rejects.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let removed = take_record(&mut lock(&self.items), id);
        let Some((index, record)) = removed else {
            return Err(Error::NotFound(id.to_string()));
        };

        match records::delete_record::<D>(self.store.as_ref(), id).await {
            Ok(()) => {
                tracing::info!("Deleted {} record {id}", D::COLLECTION);
                self.notifier.success(D::REMOVED);
                Ok(())
            }
            Err(error) => {
                restore_record(&mut lock(&self.items), index, record);
                tracing::warn!("Delete of {} record {id} failed, record restored", D::COLLECTION);
                self.notifier.error(format!("Delete failed: {error}"));
                Err(error)
            }
        }
    }

    /// Ask for confirmation before deleting `id`.
    pub fn request_delete(&self, gate: &ConfirmationGate, id: &str) -> Result<()> {
        let record = self
            .get(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        let (title, message) = record.purge_prompt();
        let board = self.clone();
        let id = record.id().to_string();
        gate.request(ConfirmationRequest::new(
            title,
            message,
            Severity::Danger,
            move || async move { board.delete(&id).await },
        ));
        Ok(())
    }
}
