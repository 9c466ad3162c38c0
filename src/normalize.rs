use chrono::{NaiveDateTime, TimeZone, Utc};
use serde_json::{Map, Value};

use crate::error::{AppError, Result};
use crate::models::{LiveTransaction, StatsSnapshot, TransactionSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsField {
    Blocks,
    Difficulty,
    Hashrate24h,
    MempoolTransactions,
    Transactions24h,
    MempoolSize,
    MempoolTps,
}

impl StatsField {
    fn slot(self, snapshot: &mut StatsSnapshot) -> &mut f64 {
        match self {
            StatsField::Blocks => &mut snapshot.blocks,
            StatsField::Difficulty => &mut snapshot.difficulty,
            StatsField::Hashrate24h => &mut snapshot.hashrate_24h,
            StatsField::MempoolTransactions => &mut snapshot.mempool_transactions,
            StatsField::Transactions24h => &mut snapshot.transactions_24h,
            StatsField::MempoolSize => &mut snapshot.mempool_size,
            StatsField::MempoolTps => &mut snapshot.mempool_tps,
        }
    }
}

/// Provider key for each snapshot field. Adding a provider means adding a table.
pub const BLOCKCHAIR_STATS_FIELDS: &[(&str, StatsField)] = &[
    ("blocks", StatsField::Blocks),
    ("difficulty", StatsField::Difficulty),
    ("hashrate_24h", StatsField::Hashrate24h),
    ("mempool_transactions", StatsField::MempoolTransactions),
    ("transactions_24h", StatsField::Transactions24h),
    ("mempool_size", StatsField::MempoolSize),
    ("mempool_tps", StatsField::MempoolTps),
];

/// Display order of the transaction summary.
const TRANSACTION_SUMMARY: &[(&str, fn(&StatsSnapshot) -> f64)] = &[
    ("Transactions (24h)", |s| s.transactions_24h),
    ("Mempool Transactions", |s| s.mempool_transactions),
    ("Mempool Size", |s| s.mempool_size),
    ("Mempool TPS", |s| s.mempool_tps),
];

/// Provider keys for each live transaction field, tried in order. The first
/// non-null key wins.
#[derive(Debug, Clone, Copy)]
pub struct LiveTxFields {
    pub hash: &'static [&'static str],
    pub time: &'static [&'static str],
    pub size: &'static [&'static str],
    pub sender: &'static [&'static str],
    pub recipient: &'static [&'static str],
    pub value: &'static [&'static str],
    pub fee: &'static [&'static str],
}

/// Account-based chains report `value`; UTXO chains only carry totals and
/// have no single sender or recipient.
pub const BLOCKCHAIR_LIVE_TX_FIELDS: LiveTxFields = LiveTxFields {
    hash: &["hash"],
    time: &["time"],
    size: &["size"],
    sender: &["sender"],
    recipient: &["recipient"],
    value: &["value", "output_total"],
    fee: &["fee"],
};

const UNKNOWN_ADDRESS: &str = "Unknown";
const PROVIDER_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn normalize_stats(raw: &Value) -> Result<StatsSnapshot> {
    normalize_stats_with(raw, BLOCKCHAIR_STATS_FIELDS)
}

pub fn normalize_stats_with(raw: &Value, fields: &[(&str, StatsField)]) -> Result<StatsSnapshot> {
    let obj = as_object(raw, "stats")?;
    let mut snapshot = StatsSnapshot::default();
    for (key, field) in fields {
        *field.slot(&mut snapshot) = number_or_zero(obj.get(*key));
    }
    Ok(snapshot)
}

pub fn normalize_transactions(snapshot: &StatsSnapshot) -> Vec<TransactionSummary> {
    TRANSACTION_SUMMARY
        .iter()
        .map(|(kind, read)| TransactionSummary {
            kind: kind.to_string(),
            value: read(snapshot),
        })
        .collect()
}

pub fn normalize_live_transactions(raw: &[Value]) -> Vec<LiveTransaction> {
    normalize_live_transactions_with(raw, &BLOCKCHAIR_LIVE_TX_FIELDS)
}

pub fn normalize_live_transactions_with(raw: &[Value], fields: &LiveTxFields) -> Vec<LiveTransaction> {
    raw.iter()
        .enumerate()
        .filter_map(|(idx, entry)| match entry.as_object() {
            Some(obj) => Some(normalize_live_transaction(obj, fields)),
            None => {
                tracing::warn!("skipping non-object transaction entry at index {}", idx);
                None
            }
        })
        .collect()
}

fn normalize_live_transaction(obj: &Map<String, Value>, fields: &LiveTxFields) -> LiveTransaction {
    let text = |keys: &[&str]| lookup(obj, keys).and_then(Value::as_str);
    LiveTransaction {
        hash: text(fields.hash).unwrap_or_default().to_string(),
        timestamp_utc: text(fields.time).map(to_rfc3339).unwrap_or_default(),
        size_bytes: number_or_zero(lookup(obj, fields.size)).max(0.0) as u64,
        sender_masked: mask_address(text(fields.sender)),
        receiver_masked: mask_address(text(fields.recipient)),
        value_smallest_unit: integer_string(lookup(obj, fields.value)),
        fee_smallest_unit: integer_string(lookup(obj, fields.fee)),
    }
}

fn lookup<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| obj.get(*key).filter(|value| !value.is_null()))
}

/// Keeps the first 6 and last 4 characters. Anything shorter than 10
/// characters, or absent, is shown as "Unknown".
pub fn mask_address(address: Option<&str>) -> String {
    let Some(address) = address else {
        return UNKNOWN_ADDRESS.to_string();
    };
    let chars: Vec<char> = address.chars().collect();
    if chars.len() < 10 {
        return UNKNOWN_ADDRESS.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

fn as_object<'a>(raw: &'a Value, what: &str) -> Result<&'a Map<String, Value>> {
    raw.as_object().ok_or_else(|| {
        AppError::MalformedPayload(format!(
            "expected {} object, got {}",
            what,
            json_type_name(raw)
        ))
    })
}

/// Numbers pass through, numeric strings are parsed, everything else is zero.
fn number_or_zero(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Amounts in the smallest unit can exceed f64 precision, so strings are kept
/// verbatim when they are all digits. Numbers must be non-negative integers;
/// anything past u64 is printed without an exponent.
fn integer_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::Number(n)) => {
            if let Some(whole) = n.as_u64() {
                return whole.to_string();
            }
            match n.as_f64() {
                Some(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 => format!("{:.0}", f),
                _ => {
                    tracing::warn!("amount {} is not a non-negative integer, using 0", n);
                    "0".to_string()
                }
            }
        }
        Some(Value::String(s)) if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) => {
            s.clone()
        }
        _ => "0".to_string(),
    }
}

fn to_rfc3339(raw: &str) -> String {
    match NaiveDateTime::parse_from_str(raw, PROVIDER_TIME_FORMAT) {
        Ok(naive) => Utc.from_utc_datetime(&naive).to_rfc3339(),
        Err(_) => raw.to_string(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
