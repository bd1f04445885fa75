use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Summary statistics for a single wallet's marketplace history.
///
/// Invariant: `buy_count + sell_count == trade_count` — every counted
/// trade is either a buy or a sell from the wallet's perspective.
/// Computed fresh per lookup; only ever persisted in the short-lived
/// report cache.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalletAggregate {
    pub trade_count: u64,
    pub buy_count: u64,
    pub sell_count: u64,
    pub total_eth_volume: Decimal,
    pub total_usd_volume: Decimal,
    pub eth_bought: Decimal,
    pub eth_sold: Decimal,
    pub platform_fee_eth: Decimal,
    pub platform_fee_usd: Decimal,
    pub royalty_fee_eth: Decimal,
    pub royalty_fee_usd: Decimal,
    pub first_trade_at: Option<DateTime<Utc>>,
    pub last_trade_at: Option<DateTime<Utc>>,
}

impl WalletAggregate {
    /// An empty wallet: fetch succeeded but no qualifying trades.
    /// Distinct from a fetch failure, which never produces an aggregate.
    pub fn is_empty(&self) -> bool {
        self.trade_count == 0
    }

    /// Net realised ETH flow (sells minus buys).
    pub fn net_eth_volume(&self) -> Decimal {
        self.eth_sold - self.eth_bought
    }

    pub fn total_usd_f64(&self) -> f64 {
        self.total_usd_volume.to_f64().unwrap_or(0.0)
    }

    pub fn total_eth_f64(&self) -> f64 {
        self.total_eth_volume.to_f64().unwrap_or(0.0)
    }

    /// First qualifying trade on or before the cutoff makes the wallet an
    /// OG for that cohort.
    pub fn qualifies_for_cutoff(&self, cutoff: DateTime<Utc>) -> bool {
        self.first_trade_at.is_some_and(|first| first <= cutoff)
    }
}
