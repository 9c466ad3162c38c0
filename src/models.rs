use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub blocks: f64,
    pub difficulty: f64,
    pub hashrate_24h: f64,
    pub mempool_transactions: f64,
    pub transactions_24h: f64,
    pub mempool_size: f64,
    pub mempool_tps: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionSummary {
    pub kind: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveTransaction {
    pub hash: String,
    pub timestamp_utc: String,
    pub size_bytes: u64,
    pub sender_masked: String,
    pub receiver_masked: String,
    pub value_smallest_unit: String,
    pub fee_smallest_unit: String,
}

/// One search hit as the aggregator sees it. Missing fields stay `None` so the
/// aggregator can count them.
#[derive(Debug, Clone, Default)]
pub struct RawPost {
    pub title: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentSample {
    pub title: String,
    pub score: i32,
    pub comparative: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentReport {
    pub average_score: f64,
    pub posts_analyzed: usize,
    pub samples: Vec<SentimentSample>,
}

/// Lower-cased token -> occurrences. Ordered so responses are stable.
pub type WordFrequencyReport = BTreeMap<String, u64>;
