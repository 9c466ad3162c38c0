mod error;
mod routes;

use std::sync::Arc;

use anyhow::Result;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::sentiment::SentimentAnalyzer;
use crate::upstream::{build_http_client, BlockchairClient, RedditClient};

pub use error::ApiError;
pub use routes::SentimentResponse;

/// Shared across handlers. Everything in here is immutable after startup;
/// the provider clients share one connection pool.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub blockchair: BlockchairClient,
    pub reddit: RedditClient,
    pub analyzer: Arc<SentimentAnalyzer>,
}

impl AppState {
    pub fn from_config(config: Config) -> crate::error::Result<Self> {
        let http = build_http_client(config.upstream_timeout)?;
        Ok(Self {
            blockchair: BlockchairClient::new(http.clone(), &config.blockchair),
            reddit: RedditClient::new(http, &config.reddit),
            analyzer: Arc::new(SentimentAnalyzer::default()),
            config: Arc::new(config),
        })
    }
}

pub fn app_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);
    routes::router()
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Browsers get CORS headers only for listed origins. Requests without an
/// `Origin` header are served as usual.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid allowed origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

pub async fn run_http_server(addr: &str, state: AppState) -> Result<()> {
    let app = app_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
