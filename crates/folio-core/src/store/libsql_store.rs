//! libSQL-backed document store

use std::path::Path;

use libsql::{Builder, Connection, Database};
use serde_json::Value;
use tokio::sync::Mutex;

use super::{
    merge_fields, migrations, unique_blob_key, RemoteStore, StoredDocument, MAX_BLOB_KEY_ATTEMPTS,
};
use crate::error::{Error, Result};
use crate::models::{Collection, OrderUpdate};
use crate::util::unix_millis_now;

const DEFAULT_MEDIA_BASE_URL: &str = "folio://media";

/// Document store on a local libSQL database.
///
/// One row per document with the JSON body in a text column. Statements on the
/// shared connection are serialized so transactions never interleave.
pub struct LibSqlStore {
    _db: Database,
    conn: Mutex<Connection>,
    media_base_url: String,
}

impl LibSqlStore {
    /// Open the store at the given path, creating it if it doesn't exist
    ///
    /// Runs migrations automatically.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let db = Builder::new_local(&path_str).build().await?;
        Self::from_database(db).await
    }

    /// Open an in-memory store (useful for testing)
    pub async fn open_in_memory() -> Result<Self> {
        let db = Builder::new_local(":memory:").build().await?;
        Self::from_database(db).await
    }

    async fn from_database(db: Database) -> Result<Self> {
        let conn = db.connect()?;
        configure(&conn).await?;
        migrations::run(&conn).await?;
        Ok(Self {
            _db: db,
            conn: Mutex::new(conn),
            media_base_url: DEFAULT_MEDIA_BASE_URL.to_string(),
        })
    }

    /// Prefix for the urls returned by blob uploads
    #[must_use]
    pub fn with_media_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.media_base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Read back an uploaded blob: `(content_type, bytes)`.
    pub async fn blob(&self, key: &str) -> Result<Option<(String, Vec<u8>)>> {
        let conn = self.conn.lock().await;
        let mut rows = conn
            .query("SELECT content_type, bytes FROM blobs WHERE key = ?", [key])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some((row.get(0)?, row.get(1)?))),
            None => Ok(None),
        }
    }
}

async fn configure(conn: &Connection) -> Result<()> {
    conn.execute("PRAGMA journal_mode = WAL;", ()).await.ok();
    conn.execute("PRAGMA synchronous = NORMAL;", ()).await.ok();
    conn.execute("PRAGMA busy_timeout = 5000;", ()).await.ok();
    Ok(())
}

async fn read_body(conn: &Connection, collection: Collection, id: &str) -> Result<Option<Value>> {
    let mut rows = conn
        .query(
            "SELECT body FROM documents WHERE collection = ? AND id = ?",
            [collection.as_str(), id],
        )
        .await?;
    match rows.next().await? {
        Some(row) => {
            let body: String = row.get(0)?;
            Ok(Some(parse_body(collection, id, &body)?))
        }
        None => Ok(None),
    }
}

fn parse_body(collection: Collection, id: &str, body: &str) -> Result<Value> {
    serde_json::from_str(body)
        .map_err(|e| Error::Database(format!("corrupt document {collection}/{id}: {e}")))
}

async fn write_body(conn: &Connection, collection: Collection, id: &str, body: &Value) -> Result<()> {
    conn.execute(
        "INSERT INTO documents (collection, id, body, updated_at) VALUES (?, ?, ?, ?)
         ON CONFLICT(collection, id) DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at",
        libsql::params![
            collection.as_str(),
            id,
            serde_json::to_string(body)?,
            unix_millis_now()
        ],
    )
    .await?;
    Ok(())
}

async fn apply_orders(conn: &Connection, collection: Collection, updates: &[OrderUpdate]) -> Result<()> {
    let now = unix_millis_now();
    for update in updates {
        let rows = conn
            .execute(
                "UPDATE documents SET body = json_set(body, '$.order', ?), updated_at = ?
                 WHERE collection = ? AND id = ?",
                libsql::params![update.order, now, collection.as_str(), update.id.as_str()],
            )
            .await?;
        if rows == 0 {
            return Err(Error::NotFound(format!("{collection}/{}", update.id)));
        }
    }
    Ok(())
}

impl RemoteStore for LibSqlStore {
    async fn list(&self, collection: Collection) -> Result<Vec<StoredDocument>> {
        let conn = self.conn.lock().await;
        let mut rows = conn
            .query(
                "SELECT id, body FROM documents WHERE collection = ? ORDER BY id",
                [collection.as_str()],
            )
            .await?;

        let mut documents = Vec::new();
        while let Some(row) = rows.next().await? {
            let id: String = row.get(0)?;
            let body: String = row.get(1)?;
            let data = parse_body(collection, &id, &body)?;
            documents.push(StoredDocument { id, data });
        }
        Ok(documents)
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<StoredDocument>> {
        let conn = self.conn.lock().await;
        Ok(read_body(&conn, collection, id)
            .await?
            .map(|data| StoredDocument {
                id: id.to_string(),
                data,
            }))
    }

    async fn set(&self, collection: Collection, id: &str, data: Value) -> Result<()> {
        let conn = self.conn.lock().await;
        write_body(&conn, collection, id, &data).await?;
        tracing::debug!("Stored {collection}/{id}");
        Ok(())
    }

    async fn update(&self, collection: Collection, id: &str, data: Value) -> Result<()> {
        let conn = self.conn.lock().await;
        let mut body = read_body(&conn, collection, id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("{collection}/{id}")))?;
        merge_fields(&mut body, data);
        write_body(&conn, collection, id, &body).await
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "DELETE FROM documents WHERE collection = ? AND id = ?",
            [collection.as_str(), id],
        )
        .await?;
        Ok(())
    }

    async fn batch_update_orders(
        &self,
        collection: Collection,
        updates: &[OrderUpdate],
    ) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute("BEGIN TRANSACTION", ()).await?;

        if let Err(e) = apply_orders(&conn, collection, updates).await {
            conn.execute("ROLLBACK", ()).await.ok();
            return Err(e);
        }
        if let Err(e) = conn.execute("COMMIT", ()).await {
            conn.execute("ROLLBACK", ()).await.ok();
            return Err(e.into());
        }

        tracing::debug!("Wrote {} order updates to {collection}", updates.len());
        Ok(())
    }

    async fn upload_blob(
        &self,
        file_name: &str,
        bytes: &[u8],
        content_type: Option<&str>,
    ) -> Result<String> {
        let timestamp = unix_millis_now();
        let size = i64::try_from(bytes.len())
            .map_err(|_| Error::InvalidInput("blob too large".to_string()))?;
        let content_type = content_type.unwrap_or("application/octet-stream");

        let conn = self.conn.lock().await;
        let mut stored = None;
        for attempt in 0..MAX_BLOB_KEY_ATTEMPTS {
            let key = unique_blob_key(file_name, timestamp, attempt);
            let inserted = conn
                .execute(
                    "INSERT INTO blobs (key, content_type, size_bytes, bytes, created_at)
                     VALUES (?, ?, ?, ?, ?)
                     ON CONFLICT(key) DO NOTHING",
                    libsql::params![key.as_str(), content_type, size, bytes.to_vec(), timestamp],
                )
                .await?;
            if inserted > 0 {
                stored = Some(key);
                break;
            }
        }
        let key = stored.ok_or_else(|| Error::Storage(format!("no free media key for {file_name}")))?;

        tracing::info!("Uploaded media {key} ({size} bytes)");
        Ok(format!("{}/{key}", self.media_base_url))
    }
}
