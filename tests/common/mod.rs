use std::sync::{Arc, OnceLock};
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusHandle;

use dropcast::cohorts::CohortTable;
use dropcast::config::AppConfig;
use dropcast::dune::DuneClient;
use dropcast::models::{Cohort, CohortDistribution, CohortMeta, PercentileBand};
use dropcast::services::{CardService, ReportService};
use dropcast::share::ShareClient;
use dropcast::AppState;

use chrono::{TimeZone, Utc};

/// 100 bands stepping down from [990k, 1M] at rank 1 to [0, 10k] at rank
/// 100, 500 wallets each — a contiguous synthetic curve.
pub fn synthetic_distribution() -> CohortDistribution {
    let bands = (1..=100u32)
        .map(|rank| {
            let max = (101 - rank) as f64 * 10_000.0;
            let min = max - 10_000.0;
            PercentileBand {
                rank,
                wallet_count: 500,
                min_total_usd: min,
                max_total_usd: max,
                sum_total_usd: (min + max) / 2.0 * 500.0,
                min_total_eth: min / 2_000.0,
                max_total_eth: max / 2_000.0,
                sum_total_eth: (min + max) / 4_000.0 * 500.0,
            }
        })
        .collect();
    CohortDistribution { bands }
}

pub fn synthetic_cohort(slug: &str) -> Cohort {
    Cohort {
        meta: CohortMeta {
            slug: slug.into(),
            title: "Super OG".into(),
            tagline: "Pre-2022 traders".into(),
            timeline_label: "\u{2264}2021".into(),
            description: "First trade on or before 31 Dec 2021".into(),
            cutoff: Utc.with_ymd_and_hms(2021, 12, 31, 23, 59, 59).unwrap(),
            file: "synthetic.json".into(),
        },
        distribution: synthetic_distribution(),
    }
}

// The Prometheus recorder installs into a process-wide slot; share one
// handle across every test in the binary.
fn metrics_handle() -> PrometheusHandle {
    static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
    HANDLE
        .get_or_init(dropcast::metrics::init_metrics)
        .clone()
}

/// App state wired against synthetic reference data and an unconfigured
/// upstream: good for any route that fails before (or never reaches)
/// the network.
pub fn test_state() -> AppState {
    let config = AppConfig::from_env().expect("test config");
    let http = reqwest::Client::new();

    let dune = DuneClient::new(http.clone(), None, 1);
    let reports = Arc::new(ReportService::new(dune, Duration::from_secs(60)));

    let share = ShareClient::new(http, String::new(), None);
    let cards = Arc::new(CardService::new(share));

    AppState {
        config,
        cohorts: Arc::new(CohortTable::from_cohorts(vec![synthetic_cohort("pre2022")])),
        reports,
        cards,
        metrics_handle: metrics_handle(),
    }
}
