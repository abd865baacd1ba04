use super::{from_row, to_row};
use crate::store::{Filter, Row, StoreClient};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

pub const TABLE: &str = "agents";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub full_name: String,
    pub pin: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default = "default_active")]
    pub active: bool,
    pub created_at: String,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct CreateAgentRequest {
    pub full_name: String,
    pub pin: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAgentRequest {
    pub full_name: Option<String>,
    pub pin: Option<String>,
    pub is_admin: Option<bool>,
}

pub async fn find_all(store: &dyn StoreClient) -> anyhow::Result<Vec<Agent>> {
    let rows = store.select_rows(TABLE, &[]).await?;
    rows.into_iter().map(from_row).collect()
}

pub async fn find_by_id(store: &dyn StoreClient, id: &str) -> anyhow::Result<Option<Agent>> {
    let mut rows = store
        .select_rows(TABLE, &[Filter::Eq("id", json!(id))])
        .await?;
    rows.pop().map(from_row).transpose()
}

/// PIN login lookup. Only active agents can sign in.
pub async fn find_by_pin(store: &dyn StoreClient, pin: &str) -> anyhow::Result<Option<Agent>> {
    let mut rows = store
        .select_rows(
            TABLE,
            &[Filter::Eq("pin", json!(pin)), Filter::Eq("active", json!(true))],
        )
        .await?;
    rows.pop().map(from_row).transpose()
}

pub async fn create(store: &dyn StoreClient, data: &CreateAgentRequest) -> anyhow::Result<Agent> {
    let agent = Agent {
        id: Uuid::new_v4().to_string(),
        full_name: data.full_name.clone(),
        pin: data.pin.clone(),
        is_admin: data.is_admin,
        active: true,
        created_at: chrono::Utc::now().to_rfc3339(),
    };
    let mut returned = store.insert_rows(TABLE, vec![to_row(&agent)?]).await?;
    match returned.pop() {
        Some(row) => from_row(row),
        None => Ok(agent),
    }
}

pub async fn update(
    store: &dyn StoreClient,
    id: &str,
    data: &UpdateAgentRequest,
) -> anyhow::Result<Option<Agent>> {
    let mut patch = Row::new();
    if let Some(ref full_name) = data.full_name {
        patch.insert("full_name".into(), json!(full_name));
    }
    if let Some(ref pin) = data.pin {
        patch.insert("pin".into(), json!(pin));
    }
    if let Some(is_admin) = data.is_admin {
        patch.insert("is_admin".into(), json!(is_admin));
    }
    if patch.is_empty() {
        return find_by_id(store, id).await;
    }

    let mut updated = store
        .update_rows(TABLE, &[Filter::Eq("id", json!(id))], patch)
        .await?;
    updated.pop().map(from_row).transpose()
}

pub async fn set_active(
    store: &dyn StoreClient,
    id: &str,
    active: bool,
) -> anyhow::Result<Option<Agent>> {
    let mut patch = Row::new();
    patch.insert("active".into(), json!(active));
    let mut updated = store
        .update_rows(TABLE, &[Filter::Eq("id", json!(id))], patch)
        .await?;
    updated.pop().map(from_row).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    #[tokio::test]
    async fn pin_lookup_ignores_deactivated_agents() {
        let store = MemoryStore::new();
        let created = create(
            &store,
            &CreateAgentRequest {
                full_name: "Ada".into(),
                pin: "1234".into(),
                is_admin: false,
            },
        )
        .await
        .unwrap();

        assert!(find_by_pin(&store, "1234").await.unwrap().is_some());
        assert!(find_by_pin(&store, "9999").await.unwrap().is_none());

        set_active(&store, &created.id, false).await.unwrap();
        assert!(find_by_pin(&store, "1234").await.unwrap().is_none());
    }
}
