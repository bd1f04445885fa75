use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::counter;
use tokio::sync::Mutex;

use crate::dune::{DuneClient, DuneError};
use crate::ingestion::{normalize_rows, RawTradeRow};
use crate::intelligence::aggregate_wallet;
use crate::models::WalletAggregate;

/// Cache entries beyond this count trigger an expiry sweep on the next
/// lookup. Single-tenant tool; the map stays tiny in practice.
const PURGE_THRESHOLD: usize = 128;

/// Source of raw wallet trade rows — the seam between the report cache
/// and the network client, so cache behavior tests without I/O.
pub trait TradeSource: Send + Sync {
    fn fetch_trades(
        &self,
        wallet: &str,
    ) -> impl Future<Output = Result<Vec<RawTradeRow>, DuneError>> + Send;

    /// Version of the upstream query; part of the cache key so a query
    /// change invalidates cached aggregates.
    fn query_version(&self) -> u64;
}

impl TradeSource for DuneClient {
    fn fetch_trades(
        &self,
        wallet: &str,
    ) -> impl Future<Output = Result<Vec<RawTradeRow>, DuneError>> + Send {
        self.fetch_wallet_trades(wallet)
    }

    fn query_version(&self) -> u64 {
        self.query_id()
    }
}

#[derive(Clone)]
struct CachedReport {
    aggregate: WalletAggregate,
    fetched_at: Instant,
}

type Slot = Arc<Mutex<Option<CachedReport>>>;

/// Wallet report cache with short TTL and per-key coalescing.
///
/// Owned by the caller (it lives in `AppState`), never ambient process
/// state. Concurrent lookups for one key queue on the key's slot: exactly
/// one flies upstream, followers reuse the fresh result. A fetch failure
/// caches nothing — "no data" stays distinct from "empty wallet".
pub struct ReportService<S = DuneClient> {
    source: S,
    ttl: Duration,
    slots: Mutex<HashMap<String, Slot>>,
}

impl<S: TradeSource> ReportService<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch-or-reuse the aggregate for a wallet address.
    pub async fn wallet_aggregate(&self, wallet: &str) -> Result<WalletAggregate, DuneError> {
        let wallet = wallet.trim().to_lowercase();
        let key = format!("{}:{}", wallet, self.source.query_version());

        let slot = {
            let mut slots = self.slots.lock().await;
            if slots.len() > PURGE_THRESHOLD {
                purge_expired(&mut slots, self.ttl);
            }
            slots.entry(key).or_default().clone()
        };

        let mut guard = slot.lock().await;
        if let Some(cached) = guard.as_ref() {
            if cached.fetched_at.elapsed() < self.ttl {
                counter!("wallet_report_cache_hits_total").increment(1);
                return Ok(cached.aggregate.clone());
            }
        }

        let rows = self.source.fetch_trades(&wallet).await?;
        let records = normalize_rows(rows);
        let aggregate = aggregate_wallet(&wallet, &records);
        counter!("wallet_reports_built_total").increment(1);
        tracing::info!(
            wallet = %wallet,
            trades = aggregate.trade_count,
            "Wallet aggregate computed"
        );

        *guard = Some(CachedReport {
            aggregate: aggregate.clone(),
            fetched_at: Instant::now(),
        });
        Ok(aggregate)
    }
}

fn purge_expired(slots: &mut HashMap<String, Slot>, ttl: Duration) {
    slots.retain(|_, slot| match slot.try_lock() {
        // A locked slot has a fetch in flight; keep it.
        Err(_) => true,
        Ok(guard) => guard
            .as_ref()
            .is_some_and(|cached| cached.fetched_at.elapsed() < ttl),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubSource {
        calls: AtomicUsize,
        rows: Vec<RawTradeRow>,
        fail: bool,
    }

    impl StubSource {
        fn with_rows(rows: Vec<RawTradeRow>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                rows,
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                rows: Vec::new(),
                fail: true,
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TradeSource for &StubSource {
        fn fetch_trades(
            &self,
            _wallet: &str,
        ) -> impl Future<Output = Result<Vec<RawTradeRow>, DuneError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let rows = self.rows.clone();
            let fail = self.fail;
            async move {
                tokio::task::yield_now().await;
                if fail {
                    Err(DuneError::RateLimited)
                } else {
                    Ok(rows)
                }
            }
        }

        fn query_version(&self) -> u64 {
            1
        }
    }

    fn one_buy_row(wallet: &str) -> RawTradeRow {
        RawTradeRow {
            trade_id: Some("t1".into()),
            executed_at: Some("2021-08-01T12:00:00Z".into()),
            buyer: Some(wallet.into()),
            seller: Some("0xseller".into()),
            amount_eth: Some(Decimal::ONE),
            amount_usd: Some(Decimal::from(3000)),
            ..RawTradeRow::default()
        }
    }

    #[tokio::test]
    async fn caches_within_ttl() {
        let source = StubSource::with_rows(vec![one_buy_row("0xwallet")]);
        let service = ReportService::new(&source, Duration::from_secs(60));

        let first = service.wallet_aggregate("0xWALLET").await.unwrap();
        let second = service.wallet_aggregate("0xwallet").await.unwrap();

        assert_eq!(first.trade_count, 1);
        assert_eq!(second.trade_count, 1);
        // Case-insensitive key: one upstream call serves both lookups.
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test]
    async fn expired_entry_refetches() {
        let source = StubSource::with_rows(vec![one_buy_row("0xwallet")]);
        let service = ReportService::new(&source, Duration::ZERO);

        service.wallet_aggregate("0xwallet").await.unwrap();
        service.wallet_aggregate("0xwallet").await.unwrap();

        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn distinct_wallets_fetch_separately() {
        let source = StubSource::with_rows(vec![]);
        let service = ReportService::new(&source, Duration::from_secs(60));

        service.wallet_aggregate("0xaaa").await.unwrap();
        service.wallet_aggregate("0xbbb").await.unwrap();

        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn concurrent_lookups_coalesce() {
        let source = StubSource::with_rows(vec![one_buy_row("0xwallet")]);
        let service = ReportService::new(&source, Duration::from_secs(60));

        let (a, b) = tokio::join!(
            service.wallet_aggregate("0xwallet"),
            service.wallet_aggregate("0xwallet"),
        );

        assert_eq!(a.unwrap().trade_count, 1);
        assert_eq!(b.unwrap().trade_count, 1);
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test]
    async fn fetch_failure_is_not_cached() {
        let source = StubSource::failing();
        let service = ReportService::new(&source, Duration::from_secs(60));

        assert!(service.wallet_aggregate("0xwallet").await.is_err());
        assert!(service.wallet_aggregate("0xwallet").await.is_err());

        // No negative caching: each lookup retried upstream.
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn empty_rows_yield_empty_wallet_not_error() {
        let source = StubSource::with_rows(vec![]);
        let service = ReportService::new(&source, Duration::from_secs(60));

        let aggregate = service.wallet_aggregate("0xwallet").await.unwrap();
        assert!(aggregate.is_empty());
    }
}
