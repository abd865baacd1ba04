//! Whole-database backup, restore and snapshot retention.
//!
//! A snapshot is one JSON document holding every row of the five
//! portal tables, uploaded to the backup bucket under a name derived
//! from its timestamp. Restore replays the rows table by table in
//! foreign-key order. Retention collapses last week's snapshots to the
//! Sunday one on Mondays, last month's to the first-of-month one on
//! the 1st, and unconditionally drops anything older than 90 days.

use crate::store::{ObjectInfo, Row, StoreClient, StoreError};
use chrono::{DateTime, Datelike, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

pub const SNAPSHOT_PREFIX: &str = "backup-";
pub const BACKUP_VERSION: &str = "1.0";

/// Foreign-key dependency order. Restore must write earlier tables
/// before later ones reference them.
pub const TABLE_ORDER: [&str; 5] = ["agents", "providers", "customers", "practices", "reminders"];

const LIST_PAGE_SIZE: usize = 100;
const MAX_AGE_DAYS: i64 = 90;

#[derive(thiserror::Error, Debug)]
pub enum BackupError {
    #[error("backup export failed for table {table}: {source}")]
    TableRead {
        table: &'static str,
        source: StoreError,
    },

    #[error("snapshot upload failed: {0}")]
    Upload(StoreError),

    #[error("invalid backup format: {0}")]
    InvalidFormat(String),

    #[error("restore failed for table {table}: {source}")]
    Restore {
        table: &'static str,
        source: StoreError,
    },

    #[error("malformed snapshot name: {0}")]
    MalformedName(String),

    #[error("snapshot listing failed: {0}")]
    List(StoreError),

    #[error("snapshot download failed: {0}")]
    Download(StoreError),

    #[error("snapshot delete failed: {0}")]
    Delete(StoreError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupDocument {
    pub version: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "data")]
    pub tables: BTreeMap<String, Vec<Row>>,
}

/// Map an instant to its snapshot filename. Colons and the decimal
/// point are not valid in object keys, so they become hyphens; the
/// fixed-width layout keeps lexicographic order equal to
/// chronological order.
pub fn encode_snapshot_name(instant: DateTime<Utc>) -> String {
    let stamp = instant.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string();
    format!("{}{}.json", SNAPSHOT_PREFIX, stamp.replace([':', '.'], "-"))
}

/// Inverse of [`encode_snapshot_name`]. Files not produced by the
/// codec fail with `MalformedName`; scanning code skips those instead
/// of propagating.
pub fn decode_snapshot_name(name: &str) -> Result<DateTime<Utc>, BackupError> {
    let malformed = || BackupError::MalformedName(name.to_string());

    let stamp = name
        .strip_prefix(SNAPSHOT_PREFIX)
        .and_then(|s| s.strip_suffix(".json"))
        .ok_or_else(malformed)?;

    // backup-2024-05-06T12-30-45-123Z.json -> 2024-05-06T12:30:45.123Z
    if stamp.len() != 24 || !stamp.is_ascii() {
        return Err(malformed());
    }
    let mut bytes = stamp.as_bytes().to_vec();
    bytes[13] = b':';
    bytes[16] = b':';
    bytes[19] = b'.';
    let iso = String::from_utf8(bytes).map_err(|_| malformed())?;

    DateTime::parse_from_rfc3339(&iso)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| malformed())
}

/// Decide which snapshot names the retention policy removes at `now`.
///
/// Weekly and monthly collapse only fire on their calendar boundary
/// (Monday, first of the month); on the other days only the hard age
/// cutoff applies. That makes the policy a near no-op six days out of
/// seven, which is intentional: snapshots accumulate during the week
/// and are pruned when the week or month rolls over.
pub fn compute_files_to_delete(snapshots: &[ObjectInfo], now: DateTime<Utc>) -> BTreeSet<String> {
    let mut doomed = BTreeSet::new();

    for snapshot in snapshots {
        let Ok(taken_at) = decode_snapshot_name(&snapshot.name) else {
            continue;
        };
        let age_days = (now - taken_at).num_days();

        let weekly = now.weekday() == Weekday::Mon
            && age_days > 1
            && age_days <= 8
            && taken_at.weekday() != Weekday::Sun;

        let monthly = now.day() == 1
            && age_days > 1
            && age_days <= 31
            && taken_at.day() != 1;

        let expired = age_days > MAX_AGE_DAYS;

        if weekly || monthly || expired {
            doomed.insert(snapshot.name.clone());
        }
    }

    doomed
}

pub struct BackupService {
    store: Arc<dyn StoreClient>,
    bucket: String,
}

impl BackupService {
    pub fn new(store: Arc<dyn StoreClient>, bucket: String) -> Self {
        Self { store, bucket }
    }

    /// Full dump of all five tables, read sequentially in dependency
    /// order. All-or-nothing: a single failing read aborts the export.
    pub async fn export_snapshot(&self, now: DateTime<Utc>) -> Result<BackupDocument, BackupError> {
        let mut tables = BTreeMap::new();
        for table in TABLE_ORDER {
            let rows = self
                .store
                .select_rows(table, &[])
                .await
                .map_err(|source| BackupError::TableRead { table, source })?;
            tables.insert(table.to_string(), rows);
        }
        Ok(BackupDocument {
            version: BACKUP_VERSION.into(),
            timestamp: now,
            tables,
        })
    }

    /// Upload a document under its timestamp-derived name. Upsert
    /// semantics, so a retry for the same instant cannot collide.
    pub async fn write_snapshot_file(&self, doc: &BackupDocument) -> Result<String, BackupError> {
        let name = encode_snapshot_name(doc.timestamp);
        let body = serde_json::to_vec_pretty(doc)
            .map_err(|e| BackupError::InvalidFormat(e.to_string()))?;
        self.store
            .upload_object(&self.bucket, &name, body, "application/json", true)
            .await
            .map_err(BackupError::Upload)?;
        Ok(name)
    }

    pub fn parse_snapshot(bytes: &[u8]) -> Result<BackupDocument, BackupError> {
        serde_json::from_slice(bytes).map_err(|e| BackupError::InvalidFormat(e.to_string()))
    }

    /// Replay a document into the store, table by table in dependency
    /// order. Empty or absent tables are skipped. Not atomic across
    /// tables: a failure leaves earlier tables restored.
    pub async fn restore_snapshot(&self, doc: &BackupDocument) -> Result<(), BackupError> {
        for table in TABLE_ORDER {
            let rows = match doc.tables.get(table) {
                Some(rows) if !rows.is_empty() => rows.clone(),
                _ => continue,
            };
            self.store
                .upsert_rows(table, rows)
                .await
                .map_err(|source| BackupError::Restore { table, source })?;
        }
        Ok(())
    }

    /// Newest-first listing of the backup bucket, filtered to names
    /// this application owns. Unrelated objects sharing the bucket are
    /// not shown.
    pub async fn list_snapshots(&self) -> Result<Vec<ObjectInfo>, BackupError> {
        let objects = self
            .store
            .list_objects(&self.bucket, LIST_PAGE_SIZE)
            .await
            .map_err(BackupError::List)?;
        Ok(objects
            .into_iter()
            .filter(|o| o.name.starts_with(SNAPSHOT_PREFIX) && o.name.ends_with(".json"))
            .collect())
    }

    pub async fn download_snapshot(&self, name: &str) -> Result<Vec<u8>, BackupError> {
        self.store
            .download_object(&self.bucket, name)
            .await
            .map_err(BackupError::Download)
    }

    pub async fn delete_snapshots(&self, names: &[String]) -> Result<(), BackupError> {
        self.store
            .delete_objects(&self.bucket, names)
            .await
            .map_err(BackupError::Delete)
    }

    /// Best-effort prune. Every failure is logged and swallowed;
    /// retention must never take the application down.
    pub async fn run_retention_policy(&self, now: DateTime<Utc>) -> usize {
        let snapshots = match self.list_snapshots().await {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("Retention: listing snapshots failed: {}", e);
                return 0;
            }
        };

        let doomed = compute_files_to_delete(&snapshots, now);
        if doomed.is_empty() {
            return 0;
        }

        let names: Vec<String> = doomed.into_iter().collect();
        if let Err(e) = self.store.delete_objects(&self.bucket, &names).await {
            tracing::warn!("Retention: deleting {} snapshots failed: {}", names.len(), e);
            return 0;
        }

        tracing::info!(count = names.len(), "Retention: pruned old snapshots");
        names.len()
    }

    /// Unattended nightly run: at most one snapshot per calendar day,
    /// then retention. Nothing here propagates; a failed run is logged
    /// and the next night tries again.
    pub async fn run_scheduled_backup(&self, now: DateTime<Utc>) {
        let today = format!("{}{}", SNAPSHOT_PREFIX, now.format("%Y-%m-%d"));
        match self.list_snapshots().await {
            Ok(snapshots) if snapshots.iter().any(|s| s.name.starts_with(&today)) => {
                tracing::info!("Scheduled backup: today's snapshot already exists, skipping");
                return;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!("Scheduled backup: could not check existing snapshots: {}", e);
                return;
            }
        }

        let doc = match self.export_snapshot(now).await {
            Ok(doc) => doc,
            Err(e) => {
                tracing::error!("Scheduled backup: {}", e);
                return;
            }
        };
        let name = match self.write_snapshot_file(&doc).await {
            Ok(name) => name,
            Err(e) => {
                tracing::error!("Scheduled backup: {}", e);
                return;
            }
        };
        tracing::info!(%name, "Scheduled backup completed");

        self.run_retention_policy(now).await;
    }
}
