use std::collections::HashMap;

use metrics::counter;

use crate::models::{Side, TradeRecord, WalletAggregate};

/// Reduce a wallet's fetched trade records into summary statistics.
///
/// Dedup by trade id first: the record with the most recent `executed_at`
/// wins, and on equal timestamps the later row in the sequence wins. Each
/// kept record is then classified as a buy or sell from the wallet's
/// perspective (case-insensitive address match); a record matching
/// neither side is discarded with a data-quality warning.
///
/// An empty input yields an all-zero aggregate with no timestamps — that
/// is an empty wallet, not an error.
pub fn aggregate_wallet(wallet: &str, records: &[TradeRecord]) -> WalletAggregate {
    let mut kept: HashMap<&str, &TradeRecord> = HashMap::with_capacity(records.len());
    for record in records {
        match kept.get(record.trade_id.as_str()) {
            Some(existing) if existing.executed_at > record.executed_at => {}
            _ => {
                kept.insert(record.trade_id.as_str(), record);
            }
        }
    }

    let mut agg = WalletAggregate::default();
    for record in kept.values() {
        let side = match Side::classify(wallet, &record.buyer, &record.seller) {
            Some(side) => side,
            None => {
                counter!("trade_sides_unmatched_total").increment(1);
                tracing::warn!(
                    trade_id = %record.trade_id,
                    wallet,
                    "Trade matches neither side of the fill; discarding"
                );
                continue;
            }
        };

        agg.trade_count += 1;
        match side {
            Side::Buy => {
                agg.buy_count += 1;
                agg.eth_bought += record.amount_eth;
            }
            Side::Sell => {
                agg.sell_count += 1;
                agg.eth_sold += record.amount_eth;
            }
        }

        agg.total_eth_volume += record.amount_eth;
        agg.total_usd_volume += record.amount_usd;
        agg.platform_fee_eth += record.platform_fee_eth;
        agg.platform_fee_usd += record.platform_fee_usd;
        agg.royalty_fee_eth += record.royalty_fee_eth;
        agg.royalty_fee_usd += record.royalty_fee_usd;

        agg.first_trade_at = Some(match agg.first_trade_at {
            Some(first) => first.min(record.executed_at),
            None => record.executed_at,
        });
        agg.last_trade_at = Some(match agg.last_trade_at {
            Some(last) => last.max(record.executed_at),
            None => record.executed_at,
        });
    }

    agg
}
