//! Typed record operations on top of a [`RemoteStore`]

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::{RemoteStore, StoredDocument};
use crate::error::{Error, Result};
use crate::models::{Collection, Document, OrderedRecord, Overview, SecuritySettings};

/// Decode a stored document, letting the document key win over any `id` field.
pub fn decode<D: Document>(document: StoredDocument) -> Result<D> {
    let StoredDocument { id, mut data } = document;
    if let Some(object) = data.as_object_mut() {
        object.insert("id".to_string(), Value::String(id));
    }
    Ok(serde_json::from_value(data)?)
}

/// List all records of a type in store order.
pub async fn list_records<D: Document>(store: &impl RemoteStore) -> Result<Vec<D>> {
    store
        .list(D::COLLECTION)
        .await?
        .into_iter()
        .map(decode)
        .collect()
}

/// List ordered records ascending by `order`; records without one sort last.
pub async fn list_ordered<D: OrderedRecord>(store: &impl RemoteStore) -> Result<Vec<D>> {
    let mut records = list_records::<D>(store).await?;
    sort_by_order(&mut records);
    Ok(records)
}

/// Stable sort by `order`, missing values last.
pub fn sort_by_order<D: OrderedRecord>(records: &mut [D]) {
    records.sort_by_key(|record| record.order().unwrap_or(i64::MAX));
}

/// Next free position: one past the highest existing order.
///
/// Records without an order count as 0; an empty collection yields 0.
pub fn next_order<D: OrderedRecord>(records: &[D]) -> i64 {
    records
        .iter()
        .map(|record| record.order().unwrap_or(0))
        .fold(-1, i64::max)
        + 1
}

/// Persist a new ordered record at the end of its collection.
pub async fn create_ordered<D: OrderedRecord>(store: &impl RemoteStore, mut record: D) -> Result<D> {
    let existing = list_records::<D>(store).await?;
    record.set_order(next_order(&existing));
    store
        .set(D::COLLECTION, record.id(), serde_json::to_value(&record)?)
        .await?;
    tracing::info!(
        "Created {} record {} at order {:?}",
        D::COLLECTION,
        record.id(),
        record.order()
    );
    Ok(record)
}

/// Create or replace a record.
pub async fn put_record<D: Document>(store: &impl RemoteStore, record: &D) -> Result<()> {
    store
        .set(D::COLLECTION, record.id(), serde_json::to_value(record)?)
        .await
}

/// Update an ordered record's content fields; fails with `NotFound` when it
/// was deleted remotely. The stored `order` is left to batched order writes.
pub async fn update_content<D: OrderedRecord>(store: &impl RemoteStore, record: &D) -> Result<()> {
    let mut data = serde_json::to_value(record)?;
    if let Some(object) = data.as_object_mut() {
        object.remove("order");
    }
    store.update(D::COLLECTION, record.id(), data).await
}

pub async fn delete_record<D: Document>(store: &impl RemoteStore, id: &str) -> Result<()> {
    store.delete(D::COLLECTION, id).await
}

/// Load a singleton settings document.
pub async fn load_setting<T: DeserializeOwned>(
    store: &impl RemoteStore,
    key: &str,
) -> Result<Option<T>> {
    match store.get(Collection::Settings, key).await? {
        Some(document) => Ok(Some(serde_json::from_value(document.data)?)),
        None => Ok(None),
    }
}

pub async fn save_setting<T: Serialize + Sync>(
    store: &impl RemoteStore,
    key: &str,
    value: &T,
) -> Result<()> {
    let key = key.trim();
    if key.is_empty() {
        return Err(Error::InvalidInput("settings key must not be empty".to_string()));
    }
    store
        .set(Collection::Settings, key, serde_json::to_value(value)?)
        .await
}

pub async fn load_overview(store: &impl RemoteStore) -> Result<Option<Overview>> {
    load_setting(store, Overview::SETTINGS_KEY).await
}

pub async fn save_overview(store: &impl RemoteStore, overview: &Overview) -> Result<()> {
    save_setting(store, Overview::SETTINGS_KEY, overview).await
}

pub async fn load_security(store: &impl RemoteStore) -> Result<SecuritySettings> {
    Ok(load_setting(store, SecuritySettings::SETTINGS_KEY)
        .await?
        .unwrap_or_default())
}

pub async fn save_security(store: &impl RemoteStore, settings: &SecuritySettings) -> Result<()> {
    save_setting(store, SecuritySettings::SETTINGS_KEY, settings).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Experience, Project};
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn ordered(id: &str, order: Option<i64>) -> Project {
        Project {
            order,
            ..Project::with_id(id)
        }
    }

    #[test]
    fn decode_prefers_document_key() {
        let document = StoredDocument {
            id: "exp_1".to_string(),
            data: json!({"id": "stale", "role": "Designer", "company": "Studio", "period": "2020"}),
        };
        let entry: Experience = decode(document).unwrap();
        assert_eq!(entry.id, "exp_1");
        assert_eq!(entry.role, "Designer");
    }

    #[test]
    fn sort_puts_missing_order_last() {
        let mut records = vec![
            ordered("x", None),
            ordered("b", Some(1)),
            ordered("a", Some(0)),
        ];
        sort_by_order(&mut records);
        let ids = records.iter().map(|p| p.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["a", "b", "x"]);
    }

    #[test]
    fn next_order_is_max_plus_one() {
        assert_eq!(next_order::<Project>(&[]), 0);
        assert_eq!(next_order(&[ordered("a", Some(0)), ordered("b", Some(4))]), 5);
        assert_eq!(next_order(&[ordered("a", None)]), 1);
    }

    #[tokio::test]
    async fn create_ordered_appends_after_existing() {
        let store = MemoryStore::new();
        store.seed(&[ordered("p1", Some(0)), ordered("p2", Some(1))]).unwrap();

        let created = create_ordered(&store, Project::with_id("p3")).await.unwrap();
        assert_eq!(created.order, Some(2));

        let listed = list_ordered::<Project>(&store).await.unwrap();
        let ids = listed.iter().map(|p| p.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["p1", "p2", "p3"]);
    }

    #[tokio::test]
    async fn update_content_leaves_stored_order() {
        let store = MemoryStore::new();
        store.seed(&[ordered("p1", Some(4))]).unwrap();

        let mut edited = ordered("p1", Some(0));
        edited.title = "Renamed".to_string();
        update_content(&store, &edited).await.unwrap();

        let stored = store.document(Collection::Projects, "p1").unwrap();
        assert_eq!(stored["title"], "Renamed");
        assert_eq!(stored["order"], 4);
    }

    #[tokio::test]
    async fn overview_round_trip_through_settings() {
        let store = MemoryStore::new();
        assert_eq!(load_overview(&store).await.unwrap(), None);

        let mut overview = Overview {
            title: "Creative Technologist".to_string(),
            ..Default::default()
        };
        overview.add_stat("Years", "8+");
        save_overview(&store, &overview).await.unwrap();

        assert_eq!(load_overview(&store).await.unwrap(), Some(overview));
    }

    #[tokio::test]
    async fn security_defaults_when_missing() {
        let store = MemoryStore::new();
        assert_eq!(
            load_security(&store).await.unwrap(),
            SecuritySettings::default()
        );
    }
}
