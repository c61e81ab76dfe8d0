use crate::{
    errors::StoreError,
    providers::db::storage::DocumentStore,
    types::{DocumentRecord, DocumentUpdate},
};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::{
    fmt::{self, Debug},
    sync::Arc,
};
use tokio::sync::Mutex;
use tracing::{debug, info};
use turso::{params, Connection, Database};

pub mod sql;

/// The table name used when none is configured.
pub const DEFAULT_TABLE_NAME: &str = "Documents";

/// A document store on a local SQLite database using Turso.
///
/// When cloned, it shares the same underlying database, so an in-memory store
/// can be handed to several owners in tests.
///
/// Writes from one process are serialized through `write_lock`, so concurrent
/// updates queue up instead of failing with a busy database. The last
/// update to commit wins for any field two updates both set.
#[derive(Clone)]
pub struct SqliteDocumentStore {
    /// The Turso database instance. It's cloneable and thread-safe.
    pub db: Database,
    table: String,
    write_lock: Arc<Mutex<()>>,
}

impl SqliteDocumentStore {
    /// Opens (or creates) the database at `db_path` and ensures the table exists.
    ///
    /// Use ":memory:" for an isolated in-memory database.
    pub async fn new(db_path: &str, table: &str) -> Result<Self, StoreError> {
        if !is_valid_table_name(table) {
            return Err(StoreError::InvalidTableName(table.to_string()));
        }

        let db = turso::Builder::new_local(db_path)
            .build()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let store = Self {
            db,
            table: table.to_string(),
            write_lock: Arc::new(Mutex::new(())),
        };
        store.initialize_schema().await?;
        info!(db_path, table, "Initialized document store (SQLite).");
        Ok(store)
    }

    /// Creates the documents table if it does not exist yet. Idempotent.
    pub async fn initialize_schema(&self) -> Result<(), StoreError> {
        let conn = self.connect()?;
        conn.execute(&sql::create_documents_table(&self.table), ())
            .await?;
        Ok(())
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        self.db
            .connect()
            .map_err(|e| StoreError::Connection(e.to_string()))
    }

    async fn read_attributes(
        &self,
        conn: &Connection,
        id: &str,
    ) -> Result<Option<Map<String, Value>>, StoreError> {
        let mut rows = conn
            .query(&sql::select_document(&self.table), params![id])
            .await?;
        let Some(row) = rows.next().await? else {
            return Ok(None);
        };
        let raw: String = row.get(0)?;
        match serde_json::from_str(&raw)? {
            Value::Object(attributes) => Ok(Some(attributes)),
            _ => Err(StoreError::CorruptRecord(id.to_string())),
        }
    }
}

impl Debug for SqliteDocumentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteDocumentStore")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

/// Table names are spliced into SQL, so only plain identifiers are allowed.
fn is_valid_table_name(table: &str) -> bool {
    let mut chars = table.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn into_record(id: &str, mut attributes: Map<String, Value>) -> Result<DocumentRecord, StoreError> {
    attributes.insert("id".to_string(), Value::String(id.to_string()));
    Ok(serde_json::from_value(Value::Object(attributes))?)
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    fn name(&self) -> &str {
        "SQLite"
    }

    async fn get_document(&self, id: &str) -> Result<Option<DocumentRecord>, StoreError> {
        let conn = self.connect()?;
        self.read_attributes(&conn, id)
            .await?
            .map(|attributes| into_record(id, attributes))
            .transpose()
    }

    async fn update_document(
        &self,
        id: &str,
        update: &DocumentUpdate,
    ) -> Result<DocumentRecord, StoreError> {
        let fields = update.to_fields()?;
        let _guard = self.write_lock.lock().await;
        let mut conn = self.connect()?;
        let tx = conn.transaction().await?;

        let mut attributes = self.read_attributes(&tx, id).await?.unwrap_or_default();
        debug!(id, fields = ?fields.keys().collect::<Vec<_>>(), "Applying partial update.");
        attributes.extend(fields);
        attributes.insert("id".to_string(), Value::String(id.to_string()));

        tx.execute(
            &sql::upsert_document(&self.table),
            params![id, serde_json::to_string(&attributes)?],
        )
        .await?;
        tx.commit().await?;

        into_record(id, attributes)
    }

    async fn put_document(&self, record: &DocumentRecord) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let conn = self.connect()?;
        let attributes = serde_json::to_string(record)?;
        conn.execute(
            &sql::upsert_document(&self.table),
            params![record.id.as_str(), attributes],
        )
        .await?;
        Ok(())
    }
}
