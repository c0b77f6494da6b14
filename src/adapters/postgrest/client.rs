use crate::adapters::postgrest::query::SelectQuery;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, TrackerError};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;

const REST_PREFIX: &str = "rest/v1";
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Thin handle on a PostgREST endpoint. Cheap to clone; clones share the
/// underlying connection pool.
#[derive(Debug, Clone)]
pub struct StoreClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl StoreClient {
    pub fn new<C: ConfigProvider>(config: &C) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| TrackerError::ConfigError {
                message: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self::with_client(client, config.store_url(), config.api_key()))
    }

    pub fn with_client(client: Client, store_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: format!("{}/{}", store_url.trim_end_matches('/'), REST_PREFIX),
            api_key: api_key.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!("{} {}", method, url);
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn send(&self, operation: &str, request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| TrackerError::store(operation, e))?;
        tracing::debug!("{} -> {}", operation, response.status());
        Ok(response)
    }

    async fn ensure_success(operation: &str, response: Response) -> Result<Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(TrackerError::store(
            operation,
            format!("HTTP {}: {}", status, body.trim()),
        ))
    }

    async fn read_rows(operation: &str, response: Response) -> Result<Vec<Value>> {
        let response = Self::ensure_success(operation, response).await?;
        let body = response.text().await.map_err(|e| TrackerError::store(operation, e))?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str(&body).map_err(|e| TrackerError::store(operation, e))? {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            row @ Value::Object(_) => Ok(vec![row]),
            other => Err(TrackerError::store(
                operation,
                format!("unexpected response body: {}", other),
            )),
        }
    }

    /// Rows matching `query`, limited to its row range if it has one.
    pub async fn select(&self, operation: &str, query: &SelectQuery) -> Result<Vec<Value>> {
        let mut request = self
            .request(Method::GET, query.table())
            .query(&query.select_params());
        if let Some(range) = query.row_range().and_then(|r| r.header_value()) {
            request = request.header("Range-Unit", "items").header("Range", range);
        }
        let response = self.send(operation, request).await?;
        Self::read_rows(operation, response).await
    }

    /// Exactly one matching row. Zero or several matches read as `None`.
    pub async fn select_single(&self, operation: &str, query: &SelectQuery) -> Result<Option<Value>> {
        let request = self
            .request(Method::GET, query.table())
            .query(&query.select_params())
            .header("Accept", SINGLE_OBJECT);
        let response = self.send(operation, request).await?;

        // PostgREST answers 406 when the row count is not exactly one.
        if response.status() == StatusCode::NOT_ACCEPTABLE {
            tracing::debug!("{}: no single row matched", operation);
            return Ok(None);
        }
        let mut rows = Self::read_rows(operation, response).await?;
        if rows.len() == 1 {
            Ok(rows.pop())
        } else {
            Ok(None)
        }
    }

    /// Insert one object or an array of objects and return the stored rows.
    pub async fn insert(&self, operation: &str, table: &str, body: &Value) -> Result<Vec<Value>> {
        let request = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(body);
        let response = self.send(operation, request).await?;
        Self::read_rows(operation, response).await
    }

    pub async fn delete(&self, operation: &str, query: &SelectQuery) -> Result<()> {
        let request = self
            .request(Method::DELETE, query.table())
            .query(&query.filter_params());
        let response = self.send(operation, request).await?;
        Self::ensure_success(operation, response).await?;
        Ok(())
    }

    /// Call a store-side function.
    pub async fn rpc(&self, operation: &str, function: &str, args: &Value) -> Result<Vec<Value>> {
        let request = self
            .request(Method::POST, &format!("rpc/{}", function))
            .json(args);
        let response = self.send(operation, request).await?;
        Self::read_rows(operation, response).await
    }

    /// Whether the REST endpoint answers at all.
    pub async fn health_check(&self) -> bool {
        match self.send("health_check", self.request(Method::GET, "")).await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::warn!("Store health check failed: {}", e);
                false
            }
        }
    }
}
