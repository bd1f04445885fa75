use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One of 100 pre-aggregated buckets of wallets ranked by USD volume.
/// Rank 1 is the highest-volume band; band value ceilings are
/// non-increasing as rank grows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PercentileBand {
    #[serde(rename = "usd_percentile_rank")]
    pub rank: u32,
    pub wallet_count: u64,
    pub min_total_usd: f64,
    pub max_total_usd: f64,
    pub sum_total_usd: f64,
    pub min_total_eth: f64,
    pub max_total_eth: f64,
    pub sum_total_eth: f64,
}

/// An ordered percentile distribution for one cohort.
///
/// The loader guarantees contiguous ranks 1..=100; the table is static
/// reference data — replacing the source file is the only mutation path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohortDistribution {
    pub bands: Vec<PercentileBand>,
}

impl CohortDistribution {
    /// Total wallet count represented by the distribution.
    pub fn total_wallets(&self) -> u64 {
        self.bands.iter().map(|b| b.wallet_count).sum()
    }
}

/// Display metadata for a cohort cutoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohortMeta {
    pub slug: String,
    pub title: String,
    pub tagline: String,
    pub timeline_label: String,
    pub description: String,
    /// Wallets whose first trade is on or before this instant qualify.
    pub cutoff: DateTime<Utc>,
    /// Source file name under the data directory, versioned by cutoff.
    pub file: String,
}

impl CohortMeta {
    /// "Super OG · ≤2021" — the label the renderer and UI show.
    pub fn display_label(&self) -> String {
        format!("{} · {}", self.title, self.timeline_label)
    }
}

/// A cohort's metadata together with its loaded distribution.
#[derive(Debug, Clone)]
pub struct Cohort {
    pub meta: CohortMeta,
    pub distribution: CohortDistribution,
}
