use reqwest::{Client, StatusCode};
use serde_json::Value;
use url::Url;

use crate::config::{clamp_limit, BlockchairConfig};
use crate::error::{AppError, Result};

use super::{endpoint, parse_json, read_body, upstream_message, validate_identifier};

pub const CHAIN_NOT_FOUND: &str = "Chain not found";

/// Stats/transactions provider. Responses are wrapped as
/// `{"data": ..., "context": {"code": ..., "error": ...}}`.
#[derive(Clone)]
pub struct BlockchairClient {
    http: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl BlockchairClient {
    pub fn new(http: Client, config: &BlockchairConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// Raw `data` object of `/{chain}/stats`.
    pub async fn fetch_stats(&self, chain: &str) -> Result<Value> {
        validate_identifier(chain)?;
        let url = self.url(&[chain, "stats"], None)?;
        self.get_data(url).await
    }

    pub async fn fetch_live_transactions(&self, chain: &str, limit: usize) -> Result<Vec<Value>> {
        validate_identifier(chain)?;
        let limit = clamp_limit(limit);
        let url = self.url(&[chain, "mempool", "transactions"], Some(limit))?;
        match self.get_data(url).await? {
            Value::Array(items) => Ok(items),
            other => Err(AppError::MalformedPayload(format!(
                "expected transaction list, got {}",
                if other.is_object() { "object" } else { "scalar" }
            ))),
        }
    }

    fn url(&self, segments: &[&str], limit: Option<usize>) -> Result<Url> {
        let mut url = endpoint(&self.base_url, segments)?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(limit) = limit {
                query.append_pair("limit", &limit.to_string());
            }
            if let Some(key) = &self.api_key {
                query.append_pair("key", key);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        Ok(url)
    }

    async fn get_data(&self, url: Url) -> Result<Value> {
        let path = url.path().to_string();
        tracing::debug!("GET {}", path);

        let response = self.http.get(url).send().await?;
        let (status, body) = read_body(response).await?;

        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(CHAIN_NOT_FOUND.to_string()));
        }
        if !status.is_success() {
            let message = upstream_message(status, &body);
            tracing::warn!("stats provider returned {} for {}: {}", status, path, message);
            return Err(AppError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let mut json = parse_json(&body)?;
        if json.pointer("/context/code").and_then(Value::as_u64) == Some(404) {
            return Err(AppError::NotFound(CHAIN_NOT_FOUND.to_string()));
        }
        match json.get_mut("data").map(Value::take) {
            None | Some(Value::Null) => Err(AppError::NotFound(CHAIN_NOT_FOUND.to_string())),
            Some(data) => Ok(data),
        }
    }
}
