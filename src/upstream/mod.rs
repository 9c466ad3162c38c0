//! Outbound calls to the stats and social-search providers. Every public
//! method issues exactly one request and never retries.

pub mod blockchair;
pub mod reddit;

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use url::Url;

use crate::error::{AppError, Result};

pub use blockchair::BlockchairClient;
pub use reddit::{RedditClient, TokenLease};

const MAX_ERROR_MESSAGE_LEN: usize = 200;

pub fn build_http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AppError::Configuration(format!("failed to build HTTP client: {}", e)))
}

/// Chain and asset identifiers end up in provider URLs and queries.
pub fn validate_identifier(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(AppError::InvalidRequest("identifier must not be empty".into()));
    }
    if id.len() > 64 {
        return Err(AppError::InvalidRequest("identifier is too long".into()));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::InvalidRequest(format!(
            "identifier {:?} contains unsupported characters",
            id
        )));
    }
    Ok(())
}

/// `base` with `segments` appended as path components.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| AppError::Configuration(format!("{} cannot be used as a base URL", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn read_body(response: Response) -> Result<(StatusCode, String)> {
    let status = response.status();
    let body = response.text().await?;
    Ok((status, body))
}

fn parse_json(body: &str) -> Result<Value> {
    serde_json::from_str(body).map_err(|e| {
        AppError::MalformedPayload(format!("response is not valid JSON: {}", e))
    })
}

/// Best human-readable message from an error body, without echoing the whole
/// payload back.
fn upstream_message(status: StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|json| {
        ["/context/error", "/message", "/error", "/error/message"]
            .iter()
            .find_map(|ptr| json.pointer(ptr).and_then(Value::as_str).map(str::to_string))
    });
    let message = from_json.unwrap_or_else(|| body.trim().to_string());
    if message.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string();
    }
    message.chars().take(MAX_ERROR_MESSAGE_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_validated() {
        assert!(validate_identifier("bitcoin").is_ok());
        assert!(validate_identifier("bitcoin-cash").is_ok());
        assert!(validate_identifier("BTC_2").is_ok());
        for bad in ["", "../stats", "btc?key=x", "a b", "ético"] {
            assert!(
                matches!(validate_identifier(bad), Err(AppError::InvalidRequest(_))),
                "{bad:?} should be rejected"
            );
        }
        assert!(validate_identifier(&"a".repeat(65)).is_err());
    }

    #[test]
    fn endpoint_appends_segments() {
        let base = Url::parse("https://api.blockchair.com").unwrap();
        let url = endpoint(&base, &["bitcoin", "stats"]).unwrap();
        assert_eq!(url.as_str(), "https://api.blockchair.com/bitcoin/stats");

        let base = Url::parse("http://127.0.0.1:1234/proxy/").unwrap();
        let url = endpoint(&base, &["r", "all", "search"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:1234/proxy/r/all/search");
    }

    #[test]
    fn upstream_message_prefers_structured_errors() {
        let body = r#"{"data":null,"context":{"code":402,"error":"Limit exceeded"}}"#;
        assert_eq!(
            upstream_message(StatusCode::PAYMENT_REQUIRED, body),
            "Limit exceeded"
        );
        assert_eq!(
            upstream_message(StatusCode::SERVICE_UNAVAILABLE, "  "),
            "Service Unavailable"
        );
        let long = "x".repeat(1000);
        assert_eq!(
            upstream_message(StatusCode::BAD_GATEWAY, &long).len(),
            MAX_ERROR_MESSAGE_LEN
        );
    }
}
