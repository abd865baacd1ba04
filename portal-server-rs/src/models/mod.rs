pub mod agent;
pub mod customer;
pub mod practice;
pub mod provider;
pub mod reminder;

use crate::store::Row;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

pub(crate) fn from_row<T: DeserializeOwned>(row: Row) -> anyhow::Result<T> {
    Ok(serde_json::from_value(Value::Object(row))?)
}

pub(crate) fn to_row<T: Serialize>(value: &T) -> anyhow::Result<Row> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => anyhow::bail!("expected object row, got {}", other),
    }
}
