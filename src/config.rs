use std::env;
use std::fmt;
use std::time::Duration;

use url::Url;

pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:3001",
    "https://ysong01.github.io",
    "https://cryptostats.me",
    "https://stingray-app-prmsm.ondigitalocean.app",
];

/// Upper bound for any caller-supplied result count.
pub const MAX_LIMIT: usize = 100;

#[derive(Clone)]
pub struct Config {
    pub http_bind_addr: String,
    pub allowed_origins: Vec<String>,
    pub upstream_timeout: Duration,
    pub blockchair: BlockchairConfig,
    pub reddit: RedditConfig,
    pub sentiment_post_limit: usize,
    pub sentiment_window: Duration,
    pub live_tx_limit: usize,
}

#[derive(Clone)]
pub struct BlockchairConfig {
    pub base_url: Url,
    pub api_key: Option<String>,
}

#[derive(Clone)]
pub struct RedditConfig {
    pub auth_url: Url,
    pub api_url: Url,
    pub user_agent: String,
    pub credentials: Option<RedditCredentials>,
}

#[derive(Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("{var} must be a valid {expected}, got {value:?}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error("Reddit credentials are incomplete; missing {0}")]
    PartialRedditCredentials(String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source. `from_env` is the
    /// production entry point; tests feed a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let http_bind_addr = match (var("HTTP_BIND"), var("PORT")) {
            (Some(bind), _) => bind,
            (None, Some(port)) => {
                let port: u16 = parse_value("PORT", "port number", &port)?;
                format!("0.0.0.0:{}", port)
            }
            (None, None) => "0.0.0.0:5000".to_string(),
        };

        let allowed_origins = var("ALLOWED_ORIGINS")
            .map(|raw| parse_list(&raw))
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect());

        let timeout_secs: u64 = parse_or(
            "UPSTREAM_TIMEOUT_SECS",
            "positive number of seconds",
            var("UPSTREAM_TIMEOUT_SECS"),
            10,
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "UPSTREAM_TIMEOUT_SECS",
                expected: "positive number of seconds",
                value: timeout_secs.to_string(),
            });
        }
        let upstream_timeout = Duration::from_secs(timeout_secs);

        let blockchair = BlockchairConfig {
            base_url: parse_url(
                "BLOCKCHAIR_BASE_URL",
                var("BLOCKCHAIR_BASE_URL"),
                "https://api.blockchair.com",
            )?,
            api_key: var("BLOCKCHAIR_API_KEY"),
        };

        let reddit = RedditConfig {
            auth_url: parse_url("REDDIT_AUTH_URL", var("REDDIT_AUTH_URL"), "https://www.reddit.com")?,
            api_url: parse_url("REDDIT_API_URL", var("REDDIT_API_URL"), "https://oauth.reddit.com")?,
            user_agent: var("REDDIT_USER_AGENT")
                .unwrap_or_else(|| "CryptoSentimentAnalyzer/1.0.0".to_string()),
            credentials: reddit_credentials(&var)?,
        };

        let sentiment_post_limit: usize =
            parse_or("SENTIMENT_POST_LIMIT", "count", var("SENTIMENT_POST_LIMIT"), 50)?;
        let window_hours: u64 =
            parse_or("SENTIMENT_WINDOW_HOURS", "number of hours", var("SENTIMENT_WINDOW_HOURS"), 24)?;
        let sentiment_window = window_hours
            .checked_mul(3600)
            .map(Duration::from_secs)
            .ok_or_else(|| ConfigError::Invalid {
                var: "SENTIMENT_WINDOW_HOURS",
                expected: "number of hours",
                value: window_hours.to_string(),
            })?;
        let live_tx_limit: usize = parse_or("LIVE_TX_LIMIT", "count", var("LIVE_TX_LIMIT"), 10)?;

        Ok(Self {
            http_bind_addr,
            allowed_origins,
            upstream_timeout,
            blockchair,
            reddit,
            sentiment_post_limit: clamp_limit(sentiment_post_limit),
            sentiment_window,
            live_tx_limit: clamp_limit(live_tx_limit),
        })
    }
}

pub fn clamp_limit(limit: usize) -> usize {
    limit.clamp(1, MAX_LIMIT)
}

fn reddit_credentials<F>(var: &F) -> Result<Option<RedditCredentials>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    const KEYS: [&str; 4] = [
        "REDDIT_CLIENT_ID",
        "REDDIT_CLIENT_SECRET",
        "REDDIT_USERNAME",
        "REDDIT_PASSWORD",
    ];
    let values: Vec<Option<String>> = KEYS.iter().map(|k| var(*k)).collect();

    if values.iter().all(Option::is_none) {
        return Ok(None);
    }

    let missing: Vec<&str> = KEYS
        .iter()
        .zip(&values)
        .filter(|(_, v)| v.is_none())
        .map(|(k, _)| *k)
        .collect();
    if !missing.is_empty() {
        return Err(ConfigError::PartialRedditCredentials(missing.join(", ")));
    }

    let mut values = values.into_iter().flatten();
    Ok(Some(RedditCredentials {
        client_id: values.next().unwrap_or_default(),
        client_secret: values.next().unwrap_or_default(),
        username: values.next().unwrap_or_default(),
        password: values.next().unwrap_or_default(),
    }))
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_value<T: std::str::FromStr>(
    var: &'static str,
    expected: &'static str,
    raw: &str,
) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        var,
        expected,
        value: raw.to_string(),
    })
}

fn parse_or<T: std::str::FromStr>(
    var: &'static str,
    expected: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(raw) => parse_value(var, expected, &raw),
        None => Ok(default),
    }
}

fn parse_url(var: &'static str, raw: Option<String>, default: &str) -> Result<Url, ConfigError> {
    let raw = raw.unwrap_or_else(|| default.to_string());
    Url::parse(&raw).map_err(|_| ConfigError::Invalid {
        var,
        expected: "URL",
        value: raw,
    })
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("http_bind_addr", &self.http_bind_addr)
            .field("allowed_origins", &self.allowed_origins)
            .field("upstream_timeout", &self.upstream_timeout)
            .field("blockchair", &self.blockchair)
            .field("reddit", &self.reddit)
            .field("sentiment_post_limit", &self.sentiment_post_limit)
            .field("sentiment_window", &self.sentiment_window)
            .field("live_tx_limit", &self.live_tx_limit)
            .finish()
    }
}

impl fmt::Debug for BlockchairConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockchairConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl fmt::Debug for RedditConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedditConfig")
            .field("auth_url", &self.auth_url.as_str())
            .field("api_url", &self.api_url.as_str())
            .field("user_agent", &self.user_agent)
            .field("credentials", &self.credentials.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_env_is_empty() {
        let config = load(&[]).unwrap();
        assert_eq!(config.http_bind_addr, "0.0.0.0:5000");
        assert_eq!(config.upstream_timeout, Duration::from_secs(10));
        assert_eq!(config.sentiment_post_limit, 50);
        assert_eq!(config.live_tx_limit, 10);
        assert_eq!(config.sentiment_window, Duration::from_secs(24 * 3600));
        assert_eq!(config.allowed_origins.len(), DEFAULT_ALLOWED_ORIGINS.len());
        assert!(config.reddit.credentials.is_none());
        assert!(config.blockchair.api_key.is_none());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = load(&[("UPSTREAM_TIMEOUT_SECS", "0")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: "UPSTREAM_TIMEOUT_SECS",
                ..
            }
        ));
        let config = load(&[("UPSTREAM_TIMEOUT_SECS", "3")]).unwrap();
        assert_eq!(config.upstream_timeout, Duration::from_secs(3));
    }

    #[test]
    fn overflowing_window_is_rejected() {
        let huge = u64::MAX.to_string();
        let err = load(&[("SENTIMENT_WINDOW_HOURS", huge.as_str())]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: "SENTIMENT_WINDOW_HOURS",
                ..
            }
        ));
        let config = load(&[("SENTIMENT_WINDOW_HOURS", "168")]).unwrap();
        assert_eq!(config.sentiment_window, Duration::from_secs(168 * 3600));
    }

    #[test]
    fn port_builds_bind_addr_and_http_bind_wins() {
        let config = load(&[("PORT", "8081")]).unwrap();
        assert_eq!(config.http_bind_addr, "0.0.0.0:8081");

        let config = load(&[("PORT", "8081"), ("HTTP_BIND", "127.0.0.1:9000")]).unwrap();
        assert_eq!(config.http_bind_addr, "127.0.0.1:9000");
    }

    #[test]
    fn partial_reddit_credentials_fail_fast() {
        let err = load(&[("REDDIT_CLIENT_ID", "id"), ("REDDIT_PASSWORD", "pw")]).unwrap_err();
        match err {
            ConfigError::PartialRedditCredentials(missing) => {
                assert!(missing.contains("REDDIT_CLIENT_SECRET"));
                assert!(missing.contains("REDDIT_USERNAME"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn complete_reddit_credentials_are_loaded() {
        let config = load(&[
            ("REDDIT_CLIENT_ID", "id"),
            ("REDDIT_CLIENT_SECRET", "secret"),
            ("REDDIT_USERNAME", "user"),
            ("REDDIT_PASSWORD", "pw"),
        ])
        .unwrap();
        let creds = config.reddit.credentials.unwrap();
        assert_eq!(creds.client_id, "id");
        assert_eq!(creds.client_secret, "secret");
        assert_eq!(creds.username, "user");
        assert_eq!(creds.password, "pw");
    }

    #[test]
    fn limits_are_clamped() {
        let config = load(&[("SENTIMENT_POST_LIMIT", "500"), ("LIVE_TX_LIMIT", "0")]).unwrap();
        assert_eq!(config.sentiment_post_limit, MAX_LIMIT);
        assert_eq!(config.live_tx_limit, 1);
    }

    #[test]
    fn invalid_numbers_and_urls_are_rejected() {
        assert!(matches!(
            load(&[("UPSTREAM_TIMEOUT_SECS", "soon")]),
            Err(ConfigError::Invalid { var: "UPSTREAM_TIMEOUT_SECS", .. })
        ));
        assert!(matches!(
            load(&[("BLOCKCHAIR_BASE_URL", "not a url")]),
            Err(ConfigError::Invalid { var: "BLOCKCHAIR_BASE_URL", .. })
        ));
    }

    #[test]
    fn allowed_origins_are_parsed_from_list() {
        let config = load(&[("ALLOWED_ORIGINS", "https://a.example/, ,http://b.example")]).unwrap();
        assert_eq!(
            config.allowed_origins,
            vec!["https://a.example".to_string(), "http://b.example".to_string()]
        );
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = load(&[
            ("BLOCKCHAIR_API_KEY", "super-secret-key"),
            ("REDDIT_CLIENT_ID", "id"),
            ("REDDIT_CLIENT_SECRET", "reddit-secret"),
            ("REDDIT_USERNAME", "user"),
            ("REDDIT_PASSWORD", "hunter2"),
        ])
        .unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret-key"));
        assert!(!rendered.contains("reddit-secret"));
        assert!(!rendered.contains("hunter2"));
    }
}
