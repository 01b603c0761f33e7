use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{Condition, Filter, RemoteError, RemoteTables, SelectQuery};
use crate::availability::RemoteSettings;

const REST_PREFIX: &str = "rest/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct PostgrestErrorBody {
    message: String,
}

/// Table client for a PostgREST endpoint (the hosted backend's REST surface).
/// Each call is attempted exactly once; callers decide how to degrade.
#[derive(Clone)]
pub struct PostgrestClient {
    client: Client,
    base_url: String,
    key: String,
}

impl PostgrestClient {
    pub fn new(settings: &RemoteSettings) -> Result<Self, RemoteError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            base_url: settings.url.as_str().trim_end_matches('/').to_string(),
            key: settings.key.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{REST_PREFIX}/{table}", self.base_url)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .header("content-type", "application/json")
    }

    async fn check(response: Response) -> Result<Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<PostgrestErrorBody>(&body)
            .map(|e| e.message)
            .unwrap_or(body);
        Err(RemoteError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl RemoteTables for PostgrestClient {
    async fn select(&self, table: &str, query: &SelectQuery) -> Result<Vec<Value>, RemoteError> {
        let mut pairs = vec![("select".to_string(), "*".to_string())];
        pairs.extend(select_pairs(query));

        let response = self
            .authorized(self.client.get(self.table_url(table)))
            .query(&pairs)
            .send()
            .await?;
        let rows: Vec<Value> = Self::check(response).await?.json().await?;
        debug!("Selected {} rows from {table}", rows.len());
        Ok(rows)
    }

    async fn insert(&self, table: &str, row: &Value) -> Result<Value, RemoteError> {
        let response = self
            .authorized(self.client.post(self.table_url(table)))
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await?;
        let rows: Vec<Value> = Self::check(response).await?.json().await?;
        rows.into_iter().next().ok_or(RemoteError::EmptyInsert)
    }

    async fn update(&self, table: &str, filter: &Filter, patch: &Value) -> Result<(), RemoteError> {
        let response = self
            .authorized(self.client.patch(self.table_url(table)))
            .query(&filter_pairs(filter))
            .json(patch)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<(), RemoteError> {
        let response = self
            .authorized(self.client.delete(self.table_url(table)))
            .query(&filter_pairs(filter))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

/// Encodes filter conditions as PostgREST query pairs (`col=eq.v`, `col=in.("a","b")`).
fn filter_pairs(filter: &Filter) -> Vec<(String, String)> {
    filter
        .conditions
        .iter()
        .map(|c| match c {
            Condition::Eq { column, value } => (column.clone(), format!("eq.{value}")),
            Condition::In { column, values } => {
                let quoted: Vec<String> = values.iter().map(|v| quote(v)).collect();
                (column.clone(), format!("in.({})", quoted.join(",")))
            }
        })
        .collect()
}

fn select_pairs(query: &SelectQuery) -> Vec<(String, String)> {
    let mut pairs = filter_pairs(&query.filter);
    if let Some(column) = &query.order_desc {
        pairs.push(("order".to_string(), format!("{column}.desc")));
    }
    if let Some(limit) = query.limit {
        pairs.push(("limit".to_string(), limit.to_string()));
    }
    if let Some(offset) = query.offset {
        pairs.push(("offset".to_string(), offset.to_string()));
    }
    pairs
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
