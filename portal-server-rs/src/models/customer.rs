use super::{from_row, to_row};
use crate::store::{Filter, Row, StoreClient};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

pub const TABLE: &str = "customers";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCustomerRequest {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

pub async fn find_all(store: &dyn StoreClient) -> anyhow::Result<Vec<Customer>> {
    let rows = store.select_rows(TABLE, &[]).await?;
    rows.into_iter().map(from_row).collect()
}

pub async fn find_by_id(store: &dyn StoreClient, id: &str) -> anyhow::Result<Option<Customer>> {
    let mut rows = store
        .select_rows(TABLE, &[Filter::Eq("id", json!(id))])
        .await?;
    rows.pop().map(from_row).transpose()
}

pub async fn create(
    store: &dyn StoreClient,
    data: &CreateCustomerRequest,
) -> anyhow::Result<Customer> {
    let customer = Customer {
        id: Uuid::new_v4().to_string(),
        full_name: data.full_name.clone(),
        phone: data.phone.clone(),
        email: data.email.clone(),
        created_at: chrono::Utc::now().to_rfc3339(),
    };
    let mut returned = store.insert_rows(TABLE, vec![to_row(&customer)?]).await?;
    match returned.pop() {
        Some(row) => from_row(row),
        None => Ok(customer),
    }
}

pub async fn update(
    store: &dyn StoreClient,
    id: &str,
    data: &UpdateCustomerRequest,
) -> anyhow::Result<Option<Customer>> {
    let mut patch = Row::new();
    if let Some(ref full_name) = data.full_name {
        patch.insert("full_name".into(), json!(full_name));
    }
    if let Some(ref phone) = data.phone {
        patch.insert("phone".into(), json!(phone));
    }
    if let Some(ref email) = data.email {
        patch.insert("email".into(), json!(email));
    }
    if patch.is_empty() {
        return find_by_id(store, id).await;
    }

    let mut updated = store
        .update_rows(TABLE, &[Filter::Eq("id", json!(id))], patch)
        .await?;
    updated.pop().map(from_row).transpose()
}
