//! Client abstraction over the remote row/blob store.
//!
//! The portal keeps all of its data in a hosted service that exposes a
//! row API over named tables and a blob API over named buckets. Every
//! call is independently atomic on the remote side; nothing here adds
//! transactions on top.

pub mod rest;

#[cfg(test)]
pub mod memory;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One opaque row: column name to JSON value, captured and replayed
/// verbatim by the backup engine.
pub type Row = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectInfo {
    pub name: String,
    pub created_at: Option<String>,
    pub size: u64,
}

#[derive(Debug, Clone)]
pub enum Filter {
    Eq(&'static str, Value),
    Neq(&'static str, Value),
    In(&'static str, Vec<Value>),
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unexpected store response: {0}")]
    Decode(String),
}

/// Remote store operations consumed by the portal. An empty filter
/// slice selects every row of a table.
#[async_trait::async_trait]
pub trait StoreClient: Send + Sync {
    async fn select_rows(&self, table: &str, filters: &[Filter]) -> Result<Vec<Row>, StoreError>;

    async fn insert_rows(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>, StoreError>;

    async fn update_rows(
        &self,
        table: &str,
        filters: &[Filter],
        patch: Row,
    ) -> Result<Vec<Row>, StoreError>;

    /// Insert-or-replace by primary key.
    async fn upsert_rows(&self, table: &str, rows: Vec<Row>) -> Result<(), StoreError>;

    async fn delete_rows(&self, table: &str, filters: &[Filter]) -> Result<(), StoreError>;

    /// List bucket objects sorted by name descending, bounded by `limit`.
    async fn list_objects(&self, bucket: &str, limit: usize) -> Result<Vec<ObjectInfo>, StoreError>;

    async fn upload_object(
        &self,
        bucket: &str,
        name: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> Result<(), StoreError>;

    async fn download_object(&self, bucket: &str, name: &str) -> Result<Vec<u8>, StoreError>;

    /// One bulk delete call for all given names.
    async fn delete_objects(&self, bucket: &str, names: &[String]) -> Result<(), StoreError>;
}
