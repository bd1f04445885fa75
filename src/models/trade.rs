use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One matched marketplace fill, normalized from an upstream row.
///
/// `trade_id` is the dedup key: unique within a wallet's fetched set.
/// When the upstream returns the same id twice, the record with the most
/// recent `executed_at` wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub trade_id: String,
    pub executed_at: DateTime<Utc>,
    pub buyer: String,
    pub seller: String,
    pub amount_eth: Decimal,
    pub amount_usd: Decimal,
    pub platform_fee_eth: Decimal,
    pub platform_fee_usd: Decimal,
    pub royalty_fee_eth: Decimal,
    pub royalty_fee_usd: Decimal,
    pub collection: Option<String>,
}
