//! HTTP implementation of the store client.
//!
//! Rows go through the service's PostgREST-style endpoint
//! (`/rest/v1/{table}`), blobs through its storage endpoint
//! (`/storage/v1/object/...`). Authentication is a static API key sent
//! both as `apikey` and bearer token.

use super::{Filter, ObjectInfo, Row, StoreClient, StoreError};
use reqwest::Method;
use serde_json::Value;

pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestStore {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn request(&self, method: Method, url: String) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn object_url(&self, bucket: &str, name: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, name)
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn filter_params(filters: &[Filter]) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|f| match f {
            Filter::Eq(col, v) => ((*col).to_string(), format!("eq.{}", scalar(v))),
            Filter::Neq(col, v) => ((*col).to_string(), format!("neq.{}", scalar(v))),
            Filter::In(col, vs) => {
                let list = vs.iter().map(scalar).collect::<Vec<_>>().join(",");
                ((*col).to_string(), format!("in.({})", list))
            }
        })
        .collect()
}

async fn ok(resp: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp.text().await.unwrap_or_default();
    Err(StoreError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait::async_trait]
impl StoreClient for RestStore {
    async fn select_rows(&self, table: &str, filters: &[Filter]) -> Result<Vec<Row>, StoreError> {
        let resp = self
            .request(Method::GET, self.table_url(table))
            .query(&[("select", "*")])
            .query(&filter_params(filters))
            .send()
            .await?;
        Ok(ok(resp).await?.json().await?)
    }

    async fn insert_rows(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>, StoreError> {
        let resp = self
            .request(Method::POST, self.table_url(table))
            .header("Prefer", "return=representation")
            .json(&rows)
            .send()
            .await?;
        Ok(ok(resp).await?.json().await?)
    }

    async fn update_rows(
        &self,
        table: &str,
        filters: &[Filter],
        patch: Row,
    ) -> Result<Vec<Row>, StoreError> {
        let resp = self
            .request(Method::PATCH, self.table_url(table))
            .query(&filter_params(filters))
            .header("Prefer", "return=representation")
            .json(&patch)
            .send()
            .await?;
        Ok(ok(resp).await?.json().await?)
    }

    async fn upsert_rows(&self, table: &str, rows: Vec<Row>) -> Result<(), StoreError> {
        let resp = self
            .request(Method::POST, self.table_url(table))
            .header("Prefer", "resolution=merge-duplicates")
            .json(&rows)
            .send()
            .await?;
        ok(resp).await?;
        Ok(())
    }

    async fn delete_rows(&self, table: &str, filters: &[Filter]) -> Result<(), StoreError> {
        let resp = self
            .request(Method::DELETE, self.table_url(table))
            .query(&filter_params(filters))
            .send()
            .await?;
        ok(resp).await?;
        Ok(())
    }

    async fn list_objects(&self, bucket: &str, limit: usize) -> Result<Vec<ObjectInfo>, StoreError> {
        let body = serde_json::json!({
            "prefix": "",
            "limit": limit,
            "sortBy": { "column": "name", "order": "desc" },
        });
        let url = format!("{}/storage/v1/object/list/{}", self.base_url, bucket);
        let resp = ok(self.request(Method::POST, url).json(&body).send().await?).await?;
        let entries: Vec<Value> = resp.json().await?;

        entries
            .into_iter()
            .map(|e| {
                let name = e
                    .get("name")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| StoreError::Decode("object entry without name".into()))?;
                let created_at = e.get("created_at").and_then(Value::as_str).map(str::to_string);
                let size = e.pointer("/metadata/size").and_then(Value::as_u64).unwrap_or(0);
                Ok(ObjectInfo { name, created_at, size })
            })
            .collect()
    }

    async fn upload_object(
        &self,
        bucket: &str,
        name: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> Result<(), StoreError> {
        let resp = self
            .request(Method::POST, self.object_url(bucket, name))
            .header("x-upsert", upsert.to_string())
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await?;
        ok(resp).await?;
        Ok(())
    }

    async fn download_object(&self, bucket: &str, name: &str) -> Result<Vec<u8>, StoreError> {
        let resp = ok(self
            .request(Method::GET, self.object_url(bucket, name))
            .send()
            .await?)
        .await?;
        Ok(resp.bytes().await?.to_vec())
    }

    async fn delete_objects(&self, bucket: &str, names: &[String]) -> Result<(), StoreError> {
        let url = format!("{}/storage/v1/object/{}", self.base_url, bucket);
        let resp = self
            .request(Method::DELETE, url)
            .json(&serde_json::json!({ "prefixes": names }))
            .send()
            .await?;
        ok(resp).await?;
        Ok(())
    }
}
