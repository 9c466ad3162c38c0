use std::fmt;
use std::time::Duration;

use reqwest::header::USER_AGENT;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::config::{clamp_limit, RedditConfig, RedditCredentials};
use crate::error::{AppError, Result};
use crate::models::RawPost;

use super::{endpoint, parse_json, read_body, upstream_message, validate_identifier};

/// Provider time filters, smallest first.
const SEARCH_WINDOWS: &[(u64, &str)] = &[
    (3_600, "hour"),
    (86_400, "day"),
    (7 * 86_400, "week"),
    (31 * 86_400, "month"),
    (366 * 86_400, "year"),
];

/// A bearer token obtained for one request's worth of calls. Never cached.
#[derive(Clone)]
pub struct TokenLease {
    access_token: String,
    pub expires_in: Option<u64>,
}

impl fmt::Debug for TokenLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenLease")
            .field("access_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
    error: Option<Value>,
}

#[derive(Clone)]
pub struct RedditClient {
    http: Client,
    auth_url: Url,
    api_url: Url,
    user_agent: String,
    credentials: Option<RedditCredentials>,
}

impl RedditClient {
    pub fn new(http: Client, config: &RedditConfig) -> Self {
        Self {
            http,
            auth_url: config.auth_url.clone(),
            api_url: config.api_url.clone(),
            user_agent: config.user_agent.clone(),
            credentials: config.credentials.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    /// Password-grant token request.
    pub async fn authorize(&self) -> Result<TokenLease> {
        let creds = self.credentials.as_ref().ok_or_else(|| {
            AppError::Configuration(
                "Reddit credentials are not configured; set REDDIT_CLIENT_ID, \
                 REDDIT_CLIENT_SECRET, REDDIT_USERNAME and REDDIT_PASSWORD"
                    .to_string(),
            )
        })?;

        let url = endpoint(&self.auth_url, &["api", "v1", "access_token"])?;
        let response = self
            .http
            .post(url)
            .header(USER_AGENT, &self.user_agent)
            .basic_auth(&creds.client_id, Some(&creds.client_secret))
            .form(&[
                ("grant_type", "password"),
                ("username", creds.username.as_str()),
                ("password", creds.password.as_str()),
            ])
            .send()
            .await?;
        let (status, body) = read_body(response).await?;
        if !status.is_success() {
            return Err(rejected(status, &body));
        }

        let token: TokenResponse = serde_json::from_str(&body)?;
        match (token.access_token, token.error) {
            (Some(access_token), None) if !access_token.is_empty() => Ok(TokenLease {
                access_token,
                expires_in: token.expires_in,
            }),
            (_, error) => {
                let reason = error
                    .as_ref()
                    .and_then(Value::as_str)
                    .unwrap_or("no access token issued")
                    .to_string();
                tracing::warn!("search provider rejected credentials: {}", reason);
                Err(AppError::Upstream {
                    status: StatusCode::UNAUTHORIZED.as_u16(),
                    message: format!("authentication rejected: {}", reason),
                })
            }
        }
    }

    /// Newest posts across all communities matching `query` within `window`.
    pub async fn search_posts(
        &self,
        lease: &TokenLease,
        query: &str,
        window: Duration,
        limit: usize,
    ) -> Result<Vec<RawPost>> {
        validate_identifier(query)?;
        let mut url = endpoint(&self.api_url, &["r", "all", "search"])?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("sort", "new")
            .append_pair("limit", &clamp_limit(limit).to_string())
            .append_pair("t", search_window_param(window))
            .append_pair("raw_json", "1");

        let listing = self.get_json(lease, url).await?;
        parse_listing(&listing)
    }

    /// Name of the account the lease belongs to.
    pub async fn whoami(&self, lease: &TokenLease) -> Result<String> {
        let url = endpoint(&self.api_url, &["api", "v1", "me"])?;
        let me = self.get_json(lease, url).await?;
        me.get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| AppError::MalformedPayload("account response has no name".into()))
    }

    async fn get_json(&self, lease: &TokenLease, url: Url) -> Result<Value> {
        let response = self
            .http
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .bearer_auth(&lease.access_token)
            .send()
            .await?;
        let (status, body) = read_body(response).await?;
        if !status.is_success() {
            return Err(rejected(status, &body));
        }
        parse_json(&body)
    }
}

fn rejected(status: StatusCode, body: &str) -> AppError {
    let message = upstream_message(status, body);
    tracing::warn!("search provider returned {}: {}", status, message);
    AppError::Upstream {
        status: status.as_u16(),
        message,
    }
}

/// Smallest provider time filter that covers `window`.
pub fn search_window_param(window: Duration) -> &'static str {
    let secs = window.as_secs();
    SEARCH_WINDOWS
        .iter()
        .find(|(limit, _)| secs <= *limit)
        .map(|(_, name)| *name)
        .unwrap_or("all")
}

fn parse_listing(listing: &Value) -> Result<Vec<RawPost>> {
    let children = listing
        .pointer("/data/children")
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::MalformedPayload("search listing has no children".into()))?;

    Ok(children
        .iter()
        .map(|child| {
            let data = child.get("data");
            let field = |name: &str| {
                data.and_then(|d| d.get(name))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            };
            RawPost {
                title: field("title"),
                body: field("selftext"),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn window_maps_to_smallest_covering_bucket() {
        assert_eq!(search_window_param(Duration::from_secs(60)), "hour");
        assert_eq!(search_window_param(Duration::from_secs(3_600)), "hour");
        assert_eq!(search_window_param(Duration::from_secs(24 * 3_600)), "day");
        assert_eq!(search_window_param(Duration::from_secs(3 * 86_400)), "week");
        assert_eq!(search_window_param(Duration::from_secs(90 * 86_400)), "year");
        assert_eq!(search_window_param(Duration::from_secs(800 * 86_400)), "all");
    }

    #[test]
    fn listing_children_become_posts() {
        let listing = json!({
            "kind": "Listing",
            "data": {
                "children": [
                    {"kind": "t3", "data": {"title": "BTC up", "selftext": "to the moon"}},
                    {"kind": "t3", "data": {"title": "link post"}},
                    {"kind": "t3"},
                ]
            }
        });
        let posts = parse_listing(&listing).unwrap();
        assert_eq!(posts.len(), 3);
        assert_eq!(posts[0].title.as_deref(), Some("BTC up"));
        assert_eq!(posts[0].body.as_deref(), Some("to the moon"));
        assert_eq!(posts[1].body, None);
        assert_eq!(posts[2].title, None);
    }

    #[test]
    fn listing_without_children_is_malformed() {
        assert!(matches!(
            parse_listing(&json!({"data": {}})),
            Err(AppError::MalformedPayload(_))
        ));
    }

    #[tokio::test]
    async fn missing_credentials_is_a_configuration_error() {
        let config = RedditConfig {
            auth_url: Url::parse("https://www.reddit.com").unwrap(),
            api_url: Url::parse("https://oauth.reddit.com").unwrap(),
            user_agent: "test".to_string(),
            credentials: None,
        };
        let client = RedditClient::new(Client::new(), &config);
        assert!(!client.is_configured());
        assert!(matches!(
            client.authorize().await,
            Err(AppError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn whoami_returns_the_account_name() {
        let mut server = mockito::Server::new_async().await;
        let me = server
            .mock("GET", "/api/v1/me")
            .match_header("authorization", "Bearer tok-me")
            .match_header("user-agent", "test-agent")
            .with_status(200)
            .with_body(r#"{"name":"stats_bot","id":"t2_abc"}"#)
            .create_async()
            .await;
        let base = Url::parse(&server.url()).unwrap();
        let client = RedditClient::new(
            Client::new(),
            &RedditConfig {
                auth_url: base.clone(),
                api_url: base,
                user_agent: "test-agent".to_string(),
                credentials: None,
            },
        );
        let lease = TokenLease {
            access_token: "tok-me".to_string(),
            expires_in: Some(3600),
        };

        assert_eq!(client.whoami(&lease).await.unwrap(), "stats_bot");
        me.assert_async().await;
    }

    #[tokio::test]
    async fn whoami_without_name_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v1/me")
            .with_status(200)
            .with_body(r#"{"id":"t2_abc"}"#)
            .create_async()
            .await;
        let base = Url::parse(&server.url()).unwrap();
        let client = RedditClient::new(
            Client::new(),
            &RedditConfig {
                auth_url: base.clone(),
                api_url: base,
                user_agent: "test-agent".to_string(),
                credentials: None,
            },
        );
        let lease = TokenLease {
            access_token: "tok-me".to_string(),
            expires_in: None,
        };

        assert!(matches!(
            client.whoami(&lease).await,
            Err(AppError::MalformedPayload(_))
        ));
    }

    #[test]
    fn lease_debug_hides_token() {
        let lease = TokenLease {
            access_token: "secret-token".to_string(),
            expires_in: Some(3600),
        };
        assert!(!format!("{:?}", lease).contains("secret-token"));
    }
}
