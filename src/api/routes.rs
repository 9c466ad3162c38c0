use std::future::Future;

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::clamp_limit;
use crate::error::{AppError, Result};
use crate::models::{
    LiveTransaction, SentimentReport, StatsSnapshot, TransactionSummary, WordFrequencyReport,
};
use crate::normalize::{normalize_live_transactions, normalize_stats, normalize_transactions};
use crate::upstream::validate_identifier;

use super::{ApiError, AppState};

const STATS_FAILED: &str = "Failed to fetch blockchain stats";
const TRANSACTIONS_FAILED: &str = "Failed to fetch transactions";
const LIVE_TRANSACTIONS_FAILED: &str = "Failed to fetch live transactions";
const PASSTHROUGH_FAILED: &str = "Failed to fetch data from Blockchair API";
const SENTIMENT_FAILED: &str = "Failed to fetch data from Reddit API";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/:asset", get(asset_stats))
        .route("/api/blockchain/stats/:chain", get(blockchain_stats))
        .route("/api/blockchain/transactions/:chain", get(blockchain_transactions))
        .route(
            "/api/blockchain/live-transactions/:chain",
            get(live_transactions),
        )
        .route("/api/sentiment/:asset", get(sentiment))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Serialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct LimitQuery {
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentResponse {
    #[serde(flatten)]
    pub report: SentimentReport,
    pub word_frequencies: WordFrequencyReport,
    #[serde(skip_serializing_if = "is_zero")]
    pub malformed_posts: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// GET /api/:asset returns the provider stats object unmodified.
async fn asset_stats(
    State(state): State<AppState>,
    Path(asset): Path<String>,
) -> std::result::Result<Json<Value>, ApiError> {
    let client = state.blockchair.clone();
    let data = detached(async move { client.fetch_stats(&asset).await })
        .await
        .map_err(|err| {
            tracing::warn!("passthrough stats failed: {}", err);
            ApiError::opaque(PASSTHROUGH_FAILED)
        })?;
    Ok(Json(data))
}

/// GET /api/blockchain/stats/:chain
async fn blockchain_stats(
    State(state): State<AppState>,
    Path(chain): Path<String>,
) -> std::result::Result<Json<DataEnvelope<StatsSnapshot>>, ApiError> {
    let snapshot = fetch_snapshot(&state, chain)
        .await
        .map_err(|err| failed(err, STATS_FAILED))?;
    Ok(Json(DataEnvelope { data: snapshot }))
}

/// GET /api/blockchain/transactions/:chain returns a summary derived from stats.
async fn blockchain_transactions(
    State(state): State<AppState>,
    Path(chain): Path<String>,
) -> std::result::Result<Json<DataEnvelope<Vec<TransactionSummary>>>, ApiError> {
    let snapshot = fetch_snapshot(&state, chain)
        .await
        .map_err(|err| failed(err, TRANSACTIONS_FAILED))?;
    Ok(Json(DataEnvelope {
        data: normalize_transactions(&snapshot),
    }))
}

/// GET /api/blockchain/live-transactions/:chain?limit=N
async fn live_transactions(
    State(state): State<AppState>,
    Path(chain): Path<String>,
    Query(query): Query<LimitQuery>,
) -> std::result::Result<Json<DataEnvelope<Vec<LiveTransaction>>>, ApiError> {
    let limit = clamp_limit(query.limit.unwrap_or(state.config.live_tx_limit));
    let client = state.blockchair.clone();
    let raw = detached(async move { client.fetch_live_transactions(&chain, limit).await })
        .await
        .map_err(|err| failed(err, LIVE_TRANSACTIONS_FAILED))?;
    Ok(Json(DataEnvelope {
        data: normalize_live_transactions(&raw),
    }))
}

/// GET /api/sentiment/:asset scores recent posts mentioning the asset.
/// No posts is a successful, zero-valued report.
async fn sentiment(
    State(state): State<AppState>,
    Path(asset): Path<String>,
) -> std::result::Result<Json<SentimentResponse>, ApiError> {
    validate_identifier(&asset).map_err(|err| {
        let kind = err.kind();
        failed(err, SENTIMENT_FAILED).with_type(kind)
    })?;

    let reddit = state.reddit.clone();
    let window = state.config.sentiment_window;
    let limit = state.config.sentiment_post_limit;
    let query = asset.clone();

    let posts = detached(async move {
        let lease = reddit.authorize().await?;
        reddit.search_posts(&lease, &query, window, limit).await
    })
    .await
    .map_err(|err| {
        let kind = err.kind();
        failed(err, SENTIMENT_FAILED).with_type(kind)
    })?;

    let batch = state.analyzer.analyze_posts(&posts);
    tracing::info!(
        asset = %asset,
        posts = batch.report.posts_analyzed,
        average = batch.report.average_score,
        "sentiment computed"
    );

    let message = (batch.report.posts_analyzed == 0)
        .then(|| format!("No posts found for {}", asset));
    Ok(Json(SentimentResponse {
        report: batch.report,
        word_frequencies: batch.word_frequencies,
        malformed_posts: batch.malformed_posts,
        message,
    }))
}

async fn fetch_snapshot(state: &AppState, chain: String) -> Result<StatsSnapshot> {
    let client = state.blockchair.clone();
    let raw = detached(async move { client.fetch_stats(&chain).await }).await?;
    normalize_stats(&raw)
}

fn failed(err: AppError, headline: &str) -> ApiError {
    match &err {
        AppError::NotFound(_) | AppError::InvalidRequest(_) => {
            tracing::debug!("{}: {}", headline, err)
        }
        _ => tracing::warn!("{}: {}", headline, err),
    }
    ApiError::from_app(err, headline)
}

/// Runs an upstream call on its own task. If the client goes away the handler
/// future is dropped but the call still completes and its socket is returned.
async fn detached<T, F>(call: F) -> Result<T>
where
    F: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(call)
        .await
        .map_err(|e| AppError::Transport(format!("upstream task failed: {}", e)))?
}
