//! In-memory store used as the injected test double.
//!
//! Mutating calls are recorded in order so tests can assert the
//! sequence of table writes. Failures can be injected per table and
//! per blob operation.

use super::{Filter, ObjectInfo, Row, StoreClient, StoreError};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

struct StoredObject {
    bytes: Vec<u8>,
    created_at: String,
}

#[derive(Default)]
struct Inner {
    tables: HashMap<String, Vec<Row>>,
    objects: BTreeMap<String, StoredObject>,
    calls: Vec<String>,
    fail_reads: HashSet<String>,
    fail_writes: HashSet<String>,
    fail_uploads: bool,
    fail_listing: bool,
    fail_deletes: bool,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

fn injected(message: &str) -> StoreError {
    StoreError::Api {
        status: 500,
        message: message.to_string(),
    }
}

fn matches(row: &Row, filter: &Filter) -> bool {
    match filter {
        Filter::Eq(col, v) => row.get(*col) == Some(v),
        Filter::Neq(col, v) => row.get(*col) != Some(v),
        Filter::In(col, vs) => row.get(*col).is_some_and(|actual| vs.contains(actual)),
    }
}

fn matches_all(row: &Row, filters: &[Filter]) -> bool {
    filters.iter().all(|f| matches(row, f))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_table(&self, table: &str, rows: Vec<Row>) {
        self.inner.lock().unwrap().tables.insert(table.to_string(), rows);
    }

    pub fn seed_object(&self, name: &str, bytes: Vec<u8>) {
        self.inner.lock().unwrap().objects.insert(
            name.to_string(),
            StoredObject {
                bytes,
                created_at: "2020-01-01T00:00:00Z".into(),
            },
        );
    }

    pub fn table(&self, table: &str) -> Vec<Row> {
        self.inner
            .lock()
            .unwrap()
            .tables
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn object_names(&self) -> Vec<String> {
        self.inner.lock().unwrap().objects.keys().cloned().collect()
    }

    pub fn object(&self, name: &str) -> Option<Vec<u8>> {
        self.inner
            .lock()
            .unwrap()
            .objects
            .get(name)
            .map(|o| o.bytes.clone())
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn fail_reads_for(&self, table: &str) {
        self.inner.lock().unwrap().fail_reads.insert(table.to_string());
    }

    pub fn fail_writes_for(&self, table: &str) {
        self.inner.lock().unwrap().fail_writes.insert(table.to_string());
    }

    pub fn fail_uploads(&self) {
        self.inner.lock().unwrap().fail_uploads = true;
    }

    pub fn fail_listing(&self) {
        self.inner.lock().unwrap().fail_listing = true;
    }

    pub fn fail_deletes(&self) {
        self.inner.lock().unwrap().fail_deletes = true;
    }
}

#[async_trait::async_trait]
impl StoreClient for MemoryStore {
    async fn select_rows(&self, table: &str, filters: &[Filter]) -> Result<Vec<Row>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_reads.contains(table) {
            return Err(injected("injected read failure"));
        }
        inner.calls.push(format!("select:{}", table));
        Ok(inner
            .tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|r| matches_all(r, filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert_rows(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_writes.contains(table) {
            return Err(injected("injected write failure"));
        }
        inner.calls.push(format!("insert:{}", table));
        let stored = inner.tables.entry(table.to_string()).or_default();
        stored.extend(rows.iter().cloned());
        Ok(rows)
    }

    async fn update_rows(
        &self,
        table: &str,
        filters: &[Filter],
        patch: Row,
    ) -> Result<Vec<Row>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_writes.contains(table) {
            return Err(injected("injected write failure"));
        }
        inner.calls.push(format!("update:{}", table));
        let mut updated = Vec::new();
        if let Some(rows) = inner.tables.get_mut(table) {
            for row in rows.iter_mut().filter(|r| matches_all(r, filters)) {
                for (k, v) in &patch {
                    row.insert(k.clone(), v.clone());
                }
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn upsert_rows(&self, table: &str, rows: Vec<Row>) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_writes.contains(table) {
            return Err(injected("injected write failure"));
        }
        inner.calls.push(format!("upsert:{}", table));
        let stored = inner.tables.entry(table.to_string()).or_default();
        for row in rows {
            let existing = row
                .get("id")
                .and_then(|id| stored.iter().position(|r| r.get("id") == Some(id)));
            match existing {
                Some(i) => stored[i] = row,
                None => stored.push(row),
            }
        }
        Ok(())
    }

    async fn delete_rows(&self, table: &str, filters: &[Filter]) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_writes.contains(table) {
            return Err(injected("injected write failure"));
        }
        inner.calls.push(format!("delete:{}", table));
        if let Some(rows) = inner.tables.get_mut(table) {
            rows.retain(|r| !matches_all(r, filters));
        }
        Ok(())
    }

    async fn list_objects(&self, _bucket: &str, limit: usize) -> Result<Vec<ObjectInfo>, StoreError> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_listing {
            return Err(injected("injected listing failure"));
        }
        let mut infos: Vec<ObjectInfo> = inner
            .objects
            .iter()
            .map(|(name, obj)| ObjectInfo {
                name: name.clone(),
                created_at: Some(obj.created_at.clone()),
                size: obj.bytes.len() as u64,
            })
            .collect();
        infos.sort_by(|a, b| b.name.cmp(&a.name));
        infos.truncate(limit);
        Ok(infos)
    }

    async fn upload_object(
        &self,
        _bucket: &str,
        name: &str,
        bytes: Vec<u8>,
        _content_type: &str,
        upsert: bool,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_uploads {
            return Err(injected("injected upload failure"));
        }
        if !upsert && inner.objects.contains_key(name) {
            return Err(StoreError::Api {
                status: 409,
                message: "object already exists".into(),
            });
        }
        inner.calls.push(format!("upload:{}", name));
        inner.objects.insert(
            name.to_string(),
            StoredObject {
                bytes,
                created_at: "2020-01-01T00:00:00Z".into(),
            },
        );
        Ok(())
    }

    async fn download_object(&self, _bucket: &str, name: &str) -> Result<Vec<u8>, StoreError> {
        let inner = self.inner.lock().unwrap();
        inner
            .objects
            .get(name)
            .map(|o| o.bytes.clone())
            .ok_or(StoreError::Api {
                status: 404,
                message: "object not found".into(),
            })
    }

    async fn delete_objects(&self, _bucket: &str, names: &[String]) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_deletes {
            return Err(injected("injected delete failure"));
        }
        inner.calls.push(format!("delete-objects:{}", names.len()));
        for name in names {
            inner.objects.remove(name);
        }
        Ok(())
    }
}
