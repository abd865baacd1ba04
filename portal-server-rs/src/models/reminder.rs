use super::{from_row, to_row};
use crate::store::{Filter, Row, StoreClient};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

pub const TABLE: &str = "reminders";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    pub id: String,
    pub agent_id: String,
    pub practice_id: Option<String>,
    pub due_date: String,
    pub note: String,
    #[serde(default)]
    pub resolved: bool,
    pub resolved_at: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateReminderRequest {
    pub agent_id: String,
    pub practice_id: Option<String>,
    pub due_date: String,
    pub note: String,
}

pub async fn find_all(
    store: &dyn StoreClient,
    agent_id: Option<&str>,
    open_only: bool,
) -> anyhow::Result<Vec<Reminder>> {
    let mut filters = Vec::new();
    if let Some(agent_id) = agent_id {
        filters.push(Filter::Eq("agent_id", json!(agent_id)));
    }
    if open_only {
        filters.push(Filter::Eq("resolved", json!(false)));
    }
    let rows = store.select_rows(TABLE, &filters).await?;
    rows.into_iter().map(from_row).collect()
}

pub async fn create(
    store: &dyn StoreClient,
    data: &CreateReminderRequest,
) -> anyhow::Result<Reminder> {
    let reminder = Reminder {
        id: Uuid::new_v4().to_string(),
        agent_id: data.agent_id.clone(),
        practice_id: data.practice_id.clone(),
        due_date: data.due_date.clone(),
        note: data.note.clone(),
        resolved: false,
        resolved_at: None,
        created_at: chrono::Utc::now().to_rfc3339(),
    };
    let mut returned = store.insert_rows(TABLE, vec![to_row(&reminder)?]).await?;
    match returned.pop() {
        Some(row) => from_row(row),
        None => Ok(reminder),
    }
}

pub async fn resolve(store: &dyn StoreClient, id: &str) -> anyhow::Result<Option<Reminder>> {
    let mut patch = Row::new();
    patch.insert("resolved".into(), json!(true));
    patch.insert(
        "resolved_at".into(),
        json!(chrono::Utc::now().to_rfc3339()),
    );
    let mut updated = store
        .update_rows(TABLE, &[Filter::Eq("id", json!(id))], patch)
        .await?;
    updated.pop().map(from_row).transpose()
}

pub async fn delete(store: &dyn StoreClient, id: &str) -> anyhow::Result<bool> {
    let existing = store
        .select_rows(TABLE, &[Filter::Eq("id", json!(id))])
        .await?;
    if existing.is_empty() {
        return Ok(false);
    }
    store
        .delete_rows(TABLE, &[Filter::Eq("id", json!(id))])
        .await?;
    Ok(true)
}
