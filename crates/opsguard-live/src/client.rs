//! HTTP access to the ES|QL backend.

use crate::config::LiveConfig;
use crate::error::LiveError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IndexCount {
    pub index: String,
    /// `_cat` reports counts as strings; numbers are accepted too.
    #[serde(rename = "docs.count", default)]
    pub docs_count: Value,
}

impl IndexCount {
    pub fn docs(&self) -> u64 {
        match &self.docs_count {
            Value::Number(n) => n.as_u64().unwrap_or(0),
            Value::String(s) => s.trim().parse().unwrap_or(0),
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EsqlColumn {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Tabular ES|QL result. Rows are addressed by column name.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct EsqlResponse {
    #[serde(default)]
    pub columns: Vec<EsqlColumn>,
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl EsqlResponse {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
struct BulkItem {
    #[serde(default)]
    status: u16,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
struct BulkResponse {
    #[serde(default)]
    items: Vec<HashMap<String, BulkItem>>,
}

/// Per-document result of one `_bulk` request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkOutcome {
    pub indexed: usize,
    pub failed: usize,
    pub first_error: Option<Value>,
}

impl BulkOutcome {
    fn from_response(response: BulkResponse) -> Self {
        let mut outcome = Self::default();
        for item in response.items.iter().flat_map(|entry| entry.values()) {
            if matches!(item.status, 200 | 201) {
                outcome.indexed += 1;
            } else {
                outcome.failed += 1;
                if outcome.first_error.is_none() {
                    outcome.first_error = item.error.clone();
                }
            }
        }
        outcome
    }

    pub fn merge(&mut self, other: BulkOutcome) {
        self.indexed += other.indexed;
        self.failed += other.failed;
        if self.first_error.is_none() {
            self.first_error = other.first_error;
        }
    }
}

#[async_trait]
pub trait QueryBackend: Send + Sync {
    async fn index_counts(&self, pattern: &str) -> Result<Vec<IndexCount>, LiveError>;

    async fn esql(&self, query: &str) -> Result<EsqlResponse, LiveError>;
}

pub struct EsClient {
    client: Client,
    base_url: String,
}

impl EsClient {
    pub fn new(config: &LiveConfig) -> Result<Self, LiveError> {
        if !config.is_complete() {
            return Err(LiveError::NotConfigured);
        }
        let mut auth = HeaderValue::from_str(&format!("ApiKey {}", config.api_key))
            .map_err(|_| LiveError::InvalidApiKey)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: config.url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn index_url(&self, index: &str) -> String {
        format!("{}/{index}", self.base_url)
    }

    /// Drops an index. A missing index is not an error.
    pub async fn delete_index(&self, index: &str) -> Result<bool, LiveError> {
        let response = self.client.delete(self.index_url(index)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(index, "index absent, nothing to delete");
            return Ok(false);
        }
        Self::decode(response).await?;
        Ok(true)
    }

    /// Creates an index with the given mappings. An index that already
    /// exists is left as it is.
    pub async fn create_index(&self, index: &str, mappings: &Value) -> Result<bool, LiveError> {
        let body = serde_json::json!({ "mappings": mappings });
        let response = self
            .client
            .put(self.index_url(index))
            .json(&body)
            .send()
            .await?;
        match Self::decode(response).await {
            Ok(_) => Ok(true),
            Err(LiveError::Status { status: 400, body })
                if body.contains("resource_already_exists_exception") =>
            {
                debug!(index, "index already exists");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Posts one newline-delimited `_bulk` payload.
    pub async fn bulk(&self, ndjson: String) -> Result<BulkOutcome, LiveError> {
        let response = self
            .client
            .post(format!("{}/_bulk", self.base_url))
            .header(CONTENT_TYPE, HeaderValue::from_static("application/x-ndjson"))
            .body(ndjson)
            .send()
            .await?;
        let value = Self::decode(response).await?;
        let parsed: BulkResponse = serde_json::from_value(value)?;
        Ok(BulkOutcome::from_response(parsed))
    }

    pub async fn count(&self, index: &str) -> Result<u64, LiveError> {
        #[derive(Deserialize)]
        struct CountResponse {
            count: u64,
        }
        let url = format!("{}/_count", self.index_url(index));
        let response = self.client.get(url).send().await?;
        let value = Self::decode(response).await?;
        let parsed: CountResponse = serde_json::from_value(value)?;
        Ok(parsed.count)
    }

    async fn decode(response: reqwest::Response) -> Result<Value, LiveError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "backend error");
            return Err(LiveError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl QueryBackend for EsClient {
    async fn index_counts(&self, pattern: &str) -> Result<Vec<IndexCount>, LiveError> {
        let url = format!(
            "{}/_cat/indices/{pattern}?format=json&h=index,docs.count,store.size",
            self.base_url
        );
        debug!(url = %url, "fetching index counts");
        let response = self.client.get(&url).send().await?;
        let value = Self::decode(response).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn esql(&self, query: &str) -> Result<EsqlResponse, LiveError> {
        let url = format!("{}/_query", self.base_url);
        let body = serde_json::json!({ "query": query, "format": "json" });
        let response = self.client.post(&url).json(&body).send().await?;
        let value = Self::decode(response).await?;
        Ok(serde_json::from_value(value)?)
    }
}
