use super::{from_row, to_row};
use crate::store::{Filter, Row, StoreClient};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

pub const TABLE: &str = "providers";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,
    pub name: String,
    #[serde(default = "default_active")]
    pub active: bool,
    pub created_at: String,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct CreateProviderRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProviderRequest {
    pub name: Option<String>,
}

pub async fn find_all(store: &dyn StoreClient) -> anyhow::Result<Vec<Provider>> {
    let rows = store.select_rows(TABLE, &[]).await?;
    rows.into_iter().map(from_row).collect()
}

pub async fn create(
    store: &dyn StoreClient,
    data: &CreateProviderRequest,
) -> anyhow::Result<Provider> {
    let provider = Provider {
        id: Uuid::new_v4().to_string(),
        name: data.name.clone(),
        active: true,
        created_at: chrono::Utc::now().to_rfc3339(),
    };
    let mut returned = store.insert_rows(TABLE, vec![to_row(&provider)?]).await?;
    match returned.pop() {
        Some(row) => from_row(row),
        None => Ok(provider),
    }
}

pub async fn update(
    store: &dyn StoreClient,
    id: &str,
    data: &UpdateProviderRequest,
) -> anyhow::Result<Option<Provider>> {
    let mut patch = Row::new();
    if let Some(ref name) = data.name {
        patch.insert("name".into(), json!(name));
    }
    if patch.is_empty() {
        let mut rows = store
            .select_rows(TABLE, &[Filter::Eq("id", json!(id))])
            .await?;
        return rows.pop().map(from_row).transpose();
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
) -> anyhow::Result<Option<Provider>> {
    let mut patch = Row::new();
    patch.insert("active".into(), json!(active));
    let mut updated = store
        .update_rows(TABLE, &[Filter::Eq("id", json!(id))], patch)
        .await?;
    updated.pop().map(from_row).transpose()
}
