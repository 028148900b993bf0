//! In-process document store with fault injection

use std::collections::{btree_map, BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;

use super::{merge_fields, unique_blob_key, RemoteStore, StoredDocument, MAX_BLOB_KEY_ATTEMPTS};
use crate::error::{Error, Result};
use crate::models::{Collection, Document, OrderUpdate};
use crate::util::{lock, unix_millis_now};

const MEMORY_MEDIA_BASE_URL: &str = "memory://media";

/// Store operations that can be observed or made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    List,
    Get,
    Set,
    Update,
    Delete,
    BatchUpdateOrders,
    UploadBlob,
}

#[derive(Default)]
struct MemoryState {
    collections: HashMap<Collection, BTreeMap<String, Value>>,
    blobs: BTreeMap<String, Vec<u8>>,
    faults: HashMap<StoreOperation, VecDeque<String>>,
    calls: Vec<StoreOperation>,
    batches: Vec<(Collection, Vec<OrderUpdate>)>,
}

/// `RemoteStore` kept entirely in memory.
///
/// Clones share state. Failures can be scheduled per operation and an
/// optional latency is applied before every call, so tests can observe
/// in-flight and out-of-order behavior.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    latency: Option<Duration>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency` (simulated network round trip).
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Insert records directly, bypassing the call log.
    pub fn seed<D: Document>(&self, records: &[D]) -> Result<()> {
        let mut state = lock(&self.state);
        let collection = state.collections.entry(D::COLLECTION).or_default();
        for record in records {
            collection.insert(record.id().to_string(), serde_json::to_value(record)?);
        }
        Ok(())
    }

    /// Make the next call of `operation` fail with `reason`.
    ///
    /// Multiple scheduled failures are consumed in order.
    pub fn fail_next(&self, operation: StoreOperation, reason: impl Into<String>) {
        lock(&self.state)
            .faults
            .entry(operation)
            .or_default()
            .push_back(reason.into());
    }

    /// Every operation issued so far, in call order.
    pub fn calls(&self) -> Vec<StoreOperation> {
        lock(&self.state).calls.clone()
    }

    pub fn call_count(&self, operation: StoreOperation) -> usize {
        lock(&self.state)
            .calls
            .iter()
            .filter(|call| **call == operation)
            .count()
    }

    /// Payloads of every batch order write that was attempted.
    pub fn batch_writes(&self) -> Vec<(Collection, Vec<OrderUpdate>)> {
        lock(&self.state).batches.clone()
    }

    /// The raw stored document, if present.
    pub fn document(&self, collection: Collection, id: &str) -> Option<Value> {
        lock(&self.state)
            .collections
            .get(&collection)
            .and_then(|documents| documents.get(id))
            .cloned()
    }

    pub fn blob(&self, key: &str) -> Option<Vec<u8>> {
        lock(&self.state).blobs.get(key).cloned()
    }

    async fn begin(&self, operation: StoreOperation) -> Result<()> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let mut state = lock(&self.state);
        state.calls.push(operation);
        match state
            .faults
            .get_mut(&operation)
            .and_then(VecDeque::pop_front)
        {
            Some(reason) => Err(Error::Storage(reason)),
            None => Ok(()),
        }
    }
}

impl RemoteStore for MemoryStore {
    async fn list(&self, collection: Collection) -> Result<Vec<StoredDocument>> {
        self.begin(StoreOperation::List).await?;
        let state = lock(&self.state);
        Ok(state
            .collections
            .get(&collection)
            .map(|documents| {
                documents
                    .iter()
                    .map(|(id, data)| StoredDocument {
                        id: id.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<StoredDocument>> {
        self.begin(StoreOperation::Get).await?;
        Ok(self.document(collection, id).map(|data| StoredDocument {
            id: id.to_string(),
            data,
        }))
    }

    async fn set(&self, collection: Collection, id: &str, data: Value) -> Result<()> {
        self.begin(StoreOperation::Set).await?;
        lock(&self.state)
            .collections
            .entry(collection)
            .or_default()
            .insert(id.to_string(), data);
        Ok(())
    }

    async fn update(&self, collection: Collection, id: &str, data: Value) -> Result<()> {
        self.begin(StoreOperation::Update).await?;
        let mut state = lock(&self.state);
        let document = state
            .collections
            .get_mut(&collection)
            .and_then(|documents| documents.get_mut(id))
            .ok_or_else(|| Error::NotFound(format!("{collection}/{id}")))?;
        merge_fields(document, data);
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<()> {
        self.begin(StoreOperation::Delete).await?;
        if let Some(documents) = lock(&self.state).collections.get_mut(&collection) {
            documents.remove(id);
        }
        Ok(())
    }

    async fn batch_update_orders(
        &self,
        collection: Collection,
        updates: &[OrderUpdate],
    ) -> Result<()> {
        {
            let mut state = lock(&self.state);
            state.batches.push((collection, updates.to_vec()));
        }
        self.begin(StoreOperation::BatchUpdateOrders).await?;

        let mut state = lock(&self.state);
        let documents = state.collections.entry(collection).or_default();
        if let Some(missing) = updates
            .iter()
            .find(|update| !documents.contains_key(&update.id))
        {
            return Err(Error::NotFound(format!("{collection}/{}", missing.id)));
        }
        for update in updates {
            if let Some(document) = documents.get_mut(&update.id) {
                merge_fields(document, serde_json::json!({ "order": update.order }));
            }
        }
        Ok(())
    }

    async fn upload_blob(
        &self,
        file_name: &str,
        bytes: &[u8],
        _content_type: Option<&str>,
    ) -> Result<String> {
        self.begin(StoreOperation::UploadBlob).await?;
        let timestamp = unix_millis_now();
        let mut state = lock(&self.state);
        for attempt in 0..MAX_BLOB_KEY_ATTEMPTS {
            let key = unique_blob_key(file_name, timestamp, attempt);
            if let btree_map::Entry::Vacant(slot) = state.blobs.entry(key.clone()) {
                slot.insert(bytes.to_vec());
                return Ok(format!("{MEMORY_MEDIA_BASE_URL}/{key}"));
            }
        }
        Err(Error::Storage(format!("no free media key for {file_name}")))
    }
}
