use super::{from_row, to_row};
use crate::store::{Filter, Row, StoreClient};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

pub const TABLE: &str = "practices";

/// Deal phases in their mandatory order. A practice enters at
/// `negotiation` and can only advance one step at a time.
pub const PHASES: [&str; 3] = ["negotiation", "credit", "order"];

pub const STATUSES: [&str; 3] = ["open", "won", "lost"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Practice {
    pub id: String,
    pub customer_id: String,
    pub agent_id: String,
    pub provider_id: Option<String>,
    pub vehicle: String,
    pub source: Option<String>,
    pub phase: String,
    pub status: String,
    #[serde(default)]
    pub fee: f64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreatePracticeRequest {
    pub customer_id: String,
    pub agent_id: String,
    pub provider_id: Option<String>,
    pub vehicle: String,
    pub source: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePracticeRequest {
    pub provider_id: Option<String>,
    pub vehicle: Option<String>,
    pub source: Option<String>,
    pub fee: Option<f64>,
}

pub fn next_phase(current: &str) -> Option<&'static str> {
    let idx = PHASES.iter().position(|p| *p == current)?;
    PHASES.get(idx + 1).copied()
}

pub async fn find_all(
    store: &dyn StoreClient,
    agent_id: Option<&str>,
    phase: Option<&str>,
    status: Option<&str>,
) -> anyhow::Result<Vec<Practice>> {
    let mut filters = Vec::new();
    if let Some(agent_id) = agent_id {
        filters.push(Filter::Eq("agent_id", json!(agent_id)));
    }
    if let Some(phase) = phase {
        filters.push(Filter::Eq("phase", json!(phase)));
    }
    if let Some(status) = status {
        filters.push(Filter::Eq("status", json!(status)));
    }
    let rows = store.select_rows(TABLE, &filters).await?;
    rows.into_iter().map(from_row).collect()
}

pub async fn find_by_id(store: &dyn StoreClient, id: &str) -> anyhow::Result<Option<Practice>> {
    let mut rows = store
        .select_rows(TABLE, &[Filter::Eq("id", json!(id))])
        .await?;
    rows.pop().map(from_row).transpose()
}

pub async fn create(
    store: &dyn StoreClient,
    data: &CreatePracticeRequest,
) -> anyhow::Result<Practice> {
    let now = chrono::Utc::now().to_rfc3339();
    let practice = Practice {
        id: Uuid::new_v4().to_string(),
        customer_id: data.customer_id.clone(),
        agent_id: data.agent_id.clone(),
        provider_id: data.provider_id.clone(),
        vehicle: data.vehicle.clone(),
        source: data.source.clone(),
        phase: "negotiation".into(),
        status: "open".into(),
        fee: 0.0,
        created_at: now.clone(),
        updated_at: now,
    };
    let mut returned = store.insert_rows(TABLE, vec![to_row(&practice)?]).await?;
    match returned.pop() {
        Some(row) => from_row(row),
        None => Ok(practice),
    }
}

pub async fn update(
    store: &dyn StoreClient,
    id: &str,
    data: &UpdatePracticeRequest,
) -> anyhow::Result<Option<Practice>> {
    let mut patch = Row::new();
    if let Some(ref provider_id) = data.provider_id {
        patch.insert("provider_id".into(), json!(provider_id));
    }
    if let Some(ref vehicle) = data.vehicle {
        patch.insert("vehicle".into(), json!(vehicle));
    }
    if let Some(ref source) = data.source {
        patch.insert("source".into(), json!(source));
    }
    if let Some(fee) = data.fee {
        patch.insert("fee".into(), json!(fee));
    }
    if patch.is_empty() {
        return find_by_id(store, id).await;
    }

    apply_patch(store, id, patch).await
}

pub async fn set_phase(
    store: &dyn StoreClient,
    id: &str,
    phase: &str,
) -> anyhow::Result<Option<Practice>> {
    let mut patch = Row::new();
    patch.insert("phase".into(), json!(phase));
    apply_patch(store, id, patch).await
}

pub async fn set_status(
    store: &dyn StoreClient,
    id: &str,
    status: &str,
    fee: Option<f64>,
) -> anyhow::Result<Option<Practice>> {
    let mut patch = Row::new();
    patch.insert("status".into(), json!(status));
    if let Some(fee) = fee {
        patch.insert("fee".into(), json!(fee));
    }
    apply_patch(store, id, patch).await
}

async fn apply_patch(
    store: &dyn StoreClient,
    id: &str,
    mut patch: Row,
) -> anyhow::Result<Option<Practice>> {
    patch.insert("updated_at".into(), json!(chrono::Utc::now().to_rfc3339()));
    let mut updated = store
        .update_rows(TABLE, &[Filter::Eq("id", json!(id))], patch)
        .await?;
    updated.pop().map(from_row).transpose()
}
