mod cli;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;

use crypto_stats_proxy::api::{self, AppState};
use crypto_stats_proxy::config::{clamp_limit, Config};
use crypto_stats_proxy::normalize::{normalize_live_transactions, normalize_stats};
use crypto_stats_proxy::upstream::validate_identifier;

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("failed to load configuration")?;
    tracing::debug!(?config, "configuration loaded");

    let bind_addr = config.http_bind_addr.clone();
    let state = AppState::from_config(config).context("failed to build upstream clients")?;

    match cli.command {
        Commands::Serve { addr } => {
            let bind = addr.unwrap_or(bind_addr);
            api::run_http_server(&bind, state).await?;
        }
        Commands::Stats { chain } => {
            let raw = state
                .blockchair
                .fetch_stats(&chain)
                .await
                .with_context(|| format!("failed to fetch stats for {}", chain))?;
            print_json(&normalize_stats(&raw)?)?;
        }
        Commands::LiveTxs { chain, limit } => {
            let limit = clamp_limit(limit.unwrap_or(state.config.live_tx_limit));
            let raw = state
                .blockchair
                .fetch_live_transactions(&chain, limit)
                .await
                .with_context(|| format!("failed to fetch live transactions for {}", chain))?;
            print_json(&normalize_live_transactions(&raw))?;
        }
        Commands::Sentiment { asset } => {
            validate_identifier(&asset)?;
            let lease = state.reddit.authorize().await.context("Reddit login failed")?;
            let posts = state
                .reddit
                .search_posts(
                    &lease,
                    &asset,
                    state.config.sentiment_window,
                    state.config.sentiment_post_limit,
                )
                .await
                .with_context(|| format!("failed to search posts for {}", asset))?;
            let batch = state.analyzer.analyze_posts(&posts);
            print_json(&api::SentimentResponse {
                report: batch.report,
                word_frequencies: batch.word_frequencies,
                malformed_posts: batch.malformed_posts,
                message: None,
            })?;
        }
        Commands::CheckReddit => {
            let lease = state.reddit.authorize().await.context("Reddit login failed")?;
            let name = state.reddit.whoami(&lease).await?;
            tracing::info!("logged in as {}", name);
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .init();
}
