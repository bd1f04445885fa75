use std::fs;
use std::path::{Path, PathBuf};

use chrono::TimeZone;
use chrono::Utc;
use serde_json::Value;
use thiserror::Error;

use crate::models::{Cohort, CohortDistribution, CohortMeta, PercentileBand};

/// Every distribution file carries exactly this many bands.
pub const DISTRIBUTION_BANDS: usize = 100;

/// A cohort file failed validation. Fatal at load time: the process must
/// not start serving with a partially loaded table.
#[derive(Debug, Error)]
pub enum MalformedDistribution {
    #[error("cohort {slug}: cannot read {path}: {source}")]
    Io {
        slug: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cohort {slug}: invalid JSON: {source}")]
    Json {
        slug: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("cohort {slug}: unrecognized payload shape (expected a band array or a Dune result envelope)")]
    Shape { slug: String },

    #[error("cohort {slug}: expected {DISTRIBUTION_BANDS} bands, found {found}")]
    BandCount { slug: String, found: usize },

    #[error("cohort {slug}: ranks are not contiguous 1..={DISTRIBUTION_BANDS} (saw {rank} at position {position})")]
    RankCoverage {
        slug: String,
        rank: u32,
        position: usize,
    },

    #[error("cohort {slug}: band {rank} has min {min} above max {max}")]
    InvertedBounds {
        slug: String,
        rank: u32,
        min: f64,
        max: f64,
    },

    #[error("cohort {slug}: band {rank} ceiling rises above the previous band")]
    NotMonotonic { slug: String, rank: u32 },
}

/// The immutable cohort registry, loaded once at startup.
#[derive(Debug, Clone)]
pub struct CohortTable {
    cohorts: Vec<Cohort>,
}

impl CohortTable {
    /// Load every registered cohort from `data_dir`, failing fast on the
    /// first invalid or missing file.
    pub fn load(data_dir: &Path) -> Result<Self, MalformedDistribution> {
        let mut cohorts = Vec::with_capacity(registered_metas().len());
        for meta in registered_metas() {
            let distribution = load_distribution(&meta, data_dir)?;
            tracing::info!(
                cohort = %meta.slug,
                wallets = distribution.total_wallets(),
                "Cohort distribution loaded"
            );
            cohorts.push(Cohort { meta, distribution });
        }
        Ok(Self { cohorts })
    }

    /// Build a table from already-validated cohorts (test seam).
    pub fn from_cohorts(cohorts: Vec<Cohort>) -> Self {
        Self { cohorts }
    }

    pub fn get(&self, slug: &str) -> Option<&Cohort> {
        self.cohorts.iter().find(|c| c.meta.slug == slug)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cohort> {
        self.cohorts.iter()
    }

    pub fn len(&self) -> usize {
        self.cohorts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cohorts.is_empty()
    }
}

/// The three shipped cutoffs. Replacing a file under the data directory
/// is the only way reference data changes.
fn registered_metas() -> Vec<CohortMeta> {
    vec![
        CohortMeta {
            slug: "pre2022".into(),
            title: "Super OG".into(),
            tagline: "Pre-2022 traders".into(),
            timeline_label: "\u{2264}2021".into(),
            description: "First trade on or before 31 Dec 2021".into(),
            cutoff: Utc.with_ymd_and_hms(2021, 12, 31, 23, 59, 59).unwrap(),
            file: "og_percentile_distribution_pre2022.json".into(),
        },
        CohortMeta {
            slug: "pre2023".into(),
            title: "Uncle".into(),
            tagline: "First active in 2022".into(),
            timeline_label: "\u{2264}2022".into(),
            description: "First trade on or before 31 Dec 2022".into(),
            cutoff: Utc.with_ymd_and_hms(2022, 12, 31, 23, 59, 59).unwrap(),
            file: "og_percentile_distribution_pre2023.json".into(),
        },
        CohortMeta {
            slug: "pre2024".into(),
            title: "Cousin".into(),
            tagline: "Joined by 2023".into(),
            timeline_label: "\u{2264}2023".into(),
            description: "First trade on or before 31 Dec 2023".into(),
            cutoff: Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap(),
            file: "og_percentile_distribution_pre2024.json".into(),
        },
    ]
}

fn load_distribution(
    meta: &CohortMeta,
    data_dir: &Path,
) -> Result<CohortDistribution, MalformedDistribution> {
    let path = data_dir.join(&meta.file);
    let raw = fs::read_to_string(&path).map_err(|source| MalformedDistribution::Io {
        slug: meta.slug.clone(),
        path: path.clone(),
        source,
    })?;

    let value: Value = serde_json::from_str(&raw).map_err(|source| MalformedDistribution::Json {
        slug: meta.slug.clone(),
        source,
    })?;

    parse_bands(&meta.slug, value).map(|bands| CohortDistribution { bands })
}

/// Accept either a bare band array or the Dune export envelope
/// `{"result": {"rows": [...]}}`.
pub fn parse_bands(slug: &str, value: Value) -> Result<Vec<PercentileBand>, MalformedDistribution> {
    let rows = match value {
        Value::Array(_) => value,
        Value::Object(ref map) => match map.get("result").and_then(|r| r.get("rows")) {
            Some(rows @ Value::Array(_)) => rows.clone(),
            _ => return Err(MalformedDistribution::Shape { slug: slug.into() }),
        },
        _ => return Err(MalformedDistribution::Shape { slug: slug.into() }),
    };

    let mut bands: Vec<PercentileBand> =
        serde_json::from_value(rows).map_err(|source| MalformedDistribution::Json {
            slug: slug.into(),
            source,
        })?;
    bands.sort_by_key(|b| b.rank);
    validate_bands(slug, &bands)?;
    Ok(bands)
}

fn validate_bands(slug: &str, bands: &[PercentileBand]) -> Result<(), MalformedDistribution> {
    if bands.len() != DISTRIBUTION_BANDS {
        return Err(MalformedDistribution::BandCount {
            slug: slug.into(),
            found: bands.len(),
        });
    }

    for (i, band) in bands.iter().enumerate() {
        let expected = (i + 1) as u32;
        if band.rank != expected {
            return Err(MalformedDistribution::RankCoverage {
                slug: slug.into(),
                rank: band.rank,
                position: i,
            });
        }
        if band.min_total_usd > band.max_total_usd {
            return Err(MalformedDistribution::InvertedBounds {
                slug: slug.into(),
                rank: band.rank,
                min: band.min_total_usd,
                max: band.max_total_usd,
            });
        }
        // Rank 1 is the deepest band; ceilings must not rise as rank grows.
        if i > 0 && band.max_total_usd > bands[i - 1].max_total_usd {
            return Err(MalformedDistribution::NotMonotonic {
                slug: slug.into(),
                rank: band.rank,
            });
        }
    }

    Ok(())
}
