use serde::Serialize;

use crate::models::{CohortDistribution, PercentileBand};

/// A wallet's resolved position on a cohort curve. Rank 1 is the
/// highest-volume band.
#[derive(Debug, Clone, Serialize)]
pub struct Placement {
    pub rank: u32,
    pub band: PercentileBand,
}

/// The located band's span expressed against a modelled cohort size.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BandSpan {
    pub start_percentile: f64,
    pub end_percentile: f64,
    pub wallets_ahead: u64,
    pub band_wallets: u64,
}

impl BandSpan {
    pub fn midpoint(&self) -> f64 {
        (self.start_percentile + self.end_percentile) / 2.0
    }
}

/// Locate a wallet's percentile band by USD volume.
///
/// Scans bands in rank order and takes the first whose `[min, max]`
/// interval contains the value (inclusive on both ends). Edge policy
/// keeps the function total over non-negative volumes: a value above
/// every ceiling clamps to rank 1, a value below every floor clamps to
/// rank 100, and a value landing in an inter-band gap takes the first
/// band whose floor it clears.
pub fn locate(distribution: &CohortDistribution, total_usd: f64) -> Placement {
    for band in &distribution.bands {
        if total_usd >= band.min_total_usd && total_usd <= band.max_total_usd {
            return Placement {
                rank: band.rank,
                band: band.clone(),
            };
        }
    }

    // No containing band: the first floor at or below the value is the
    // closest higher-volume band. Covers the off-the-top clamp too.
    if let Some(band) = distribution
        .bands
        .iter()
        .find(|b| total_usd >= b.min_total_usd)
    {
        return Placement {
            rank: band.rank,
            band: band.clone(),
        };
    }

    // Below every floor.
    match distribution.bands.last() {
        Some(bottom) => Placement {
            rank: bottom.rank,
            band: bottom.clone(),
        },
        None => Placement {
            rank: 100,
            band: PercentileBand::default(),
        },
    }
}

/// Express a band's position as a percentile span of a modelled cohort,
/// walking the distribution's wallet counts until the modelled size is
/// exhausted. Returns `None` when the wallet's band lies outside the
/// modelled cohort.
pub fn band_span(
    distribution: &CohortDistribution,
    rank: u32,
    modelled_cohort_size: u64,
) -> Option<BandSpan> {
    if modelled_cohort_size == 0 {
        return None;
    }

    let mut remaining = modelled_cohort_size;
    let mut ahead = 0u64;

    for band in &distribution.bands {
        if band.wallet_count == 0 {
            continue;
        }
        let take = band.wallet_count.min(remaining);

        if band.rank == rank {
            let size = modelled_cohort_size as f64;
            let end = ((ahead + take) as f64 / size * 100.0).min(100.0);
            return Some(BandSpan {
                start_percentile: ahead as f64 / size * 100.0,
                end_percentile: end,
                wallets_ahead: ahead,
                band_wallets: take,
            });
        }

        ahead += take;
        remaining -= take;
        if remaining == 0 {
            break;
        }
    }

    None
}
