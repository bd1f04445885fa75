use chrono::{DateTime, NaiveDateTime, Utc};
use metrics::counter;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::TradeRecord;

/// Version of the upstream row contract. Bump when the query's column set
/// changes; the client fails fast on drift instead of misreading fields.
pub const WALLET_TRADES_SCHEMA_VERSION: u32 = 1;

/// Columns the wallet-trades query must return for this schema version.
pub const REQUIRED_COLUMNS: &[&str] = &["executed_at", "buyer", "seller", "amount_eth"];

/// One raw upstream row. Every field is optional so a single bad row can
/// be skipped instead of failing the batch.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawTradeRow {
    #[serde(default)]
    pub trade_id: Option<String>,
    #[serde(default)]
    pub executed_at: Option<String>,
    #[serde(default)]
    pub buyer: Option<String>,
    #[serde(default)]
    pub seller: Option<String>,
    #[serde(default)]
    pub amount_eth: Option<Decimal>,
    #[serde(default)]
    pub amount_usd: Option<Decimal>,
    #[serde(default)]
    pub platform_fee_eth: Option<Decimal>,
    #[serde(default)]
    pub platform_fee_usd: Option<Decimal>,
    #[serde(default)]
    pub royalty_fee_eth: Option<Decimal>,
    #[serde(default)]
    pub royalty_fee_usd: Option<Decimal>,
    #[serde(default)]
    pub collection: Option<String>,
}

enum RowDefect {
    MissingTimestamp,
    UnparseableTimestamp(String),
    MissingAmount,
    MissingCounterparty,
}

impl RowDefect {
    fn reason(&self) -> String {
        match self {
            RowDefect::MissingTimestamp => "missing timestamp".into(),
            RowDefect::UnparseableTimestamp(raw) => format!("unparseable timestamp: {raw}"),
            RowDefect::MissingAmount => "missing amount".into(),
            RowDefect::MissingCounterparty => "missing counterparty".into(),
        }
    }
}

/// Normalize upstream rows into trade records.
///
/// Per-row skip-and-warn policy: a row missing its timestamp, ETH amount,
/// or both counterparties is dropped with a data-quality warning, never a
/// batch failure. Missing fee and USD fields default to zero.
pub fn normalize_rows(rows: Vec<RawTradeRow>) -> Vec<TradeRecord> {
    let mut records = Vec::with_capacity(rows.len());
    for (position, row) in rows.into_iter().enumerate() {
        match normalize_row(row) {
            Ok(record) => records.push(record),
            Err(defect) => {
                counter!("trade_rows_skipped_total").increment(1);
                tracing::warn!(position, reason = %defect.reason(), "Skipping upstream trade row");
            }
        }
    }
    records
}

fn normalize_row(row: RawTradeRow) -> Result<TradeRecord, RowDefect> {
    let raw_ts = row.executed_at.ok_or(RowDefect::MissingTimestamp)?;
    let executed_at =
        parse_timestamp(&raw_ts).ok_or_else(|| RowDefect::UnparseableTimestamp(raw_ts.clone()))?;

    let amount_eth = row.amount_eth.ok_or(RowDefect::MissingAmount)?;

    let buyer = row.buyer.unwrap_or_default();
    let seller = row.seller.unwrap_or_default();
    if buyer.is_empty() && seller.is_empty() {
        return Err(RowDefect::MissingCounterparty);
    }

    let trade_id = match row.trade_id.filter(|id| !id.is_empty()) {
        Some(id) => id,
        // No upstream id: synthesize a deterministic dedup key.
        None => format!("{}:{}:{}:{}", executed_at.timestamp(), buyer, seller, amount_eth),
    };

    Ok(TradeRecord {
        trade_id,
        executed_at,
        buyer,
        seller,
        amount_eth,
        amount_usd: row.amount_usd.unwrap_or(Decimal::ZERO),
        platform_fee_eth: row.platform_fee_eth.unwrap_or(Decimal::ZERO),
        platform_fee_usd: row.platform_fee_usd.unwrap_or(Decimal::ZERO),
        royalty_fee_eth: row.royalty_fee_eth.unwrap_or(Decimal::ZERO),
        royalty_fee_usd: row.royalty_fee_usd.unwrap_or(Decimal::ZERO),
        collection: row.collection,
    })
}

/// Timestamps arrive in a handful of shapes depending on the export path:
/// RFC 3339, Dune's "2021-05-01 13:00:00.000 UTC", bare datetimes, or
/// unix seconds.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    let stripped = trimmed.strip_suffix(" UTC").unwrap_or(trimmed);
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(stripped, fmt) {
            return Some(naive.and_utc());
        }
    }

    if let Ok(secs) = trimmed.parse::<i64>() {
        return DateTime::from_timestamp(secs, 0);
    }

    None
}
