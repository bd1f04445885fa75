use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::models::ScenarioSpread;

/// Dune query returning per-fill wallet trade rows.
const DEFAULT_WALLET_TRADES_QUERY_ID: u64 = 5_850_749;
const DEFAULT_SHARE_SERVICE_URL: &str = "http://127.0.0.1:4076";
const DEFAULT_TOTAL_SUPPLY: u64 = 1_000_000_000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,

    /// Directory holding the cohort distribution files.
    pub data_dir: PathBuf,

    // Upstream trade-data API (optional — lookups fail until configured)
    pub dune_api_key: Option<String>,
    pub dune_query_id: u64,

    /// TTL for cached wallet aggregates.
    pub report_cache_ttl: Duration,

    // Card renderer
    pub share_service_url: String,
    pub share_public_base: Option<String>,

    // Scenario defaults
    pub total_supply: u64,
    pub spread_down: f64,
    pub spread_up: f64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,

            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| "data".into()).into(),

            dune_api_key: env::var("DUNE_API_KEY").ok().filter(|k| !k.is_empty()),
            dune_query_id: env::var("DUNE_QUERY_WALLET_TRADES_ID")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_WALLET_TRADES_QUERY_ID),

            report_cache_ttl: Duration::from_secs(
                env::var("REPORT_CACHE_TTL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(300),
            ),

            share_service_url: env::var("SHARE_SERVICE_URL")
                .unwrap_or_else(|_| DEFAULT_SHARE_SERVICE_URL.into()),
            share_public_base: env::var("SHARE_PUBLIC_BASE")
                .or_else(|_| env::var("BASE_URL"))
                .ok()
                .filter(|b| !b.is_empty()),

            total_supply: env::var("TOTAL_SUPPLY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TOTAL_SUPPLY),
            spread_down: env::var("SCENARIO_SPREAD_DOWN")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.40),
            spread_up: env::var("SCENARIO_SPREAD_UP")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.40),
        })
    }

    /// Default spread applied when a request doesn't override it.
    pub fn scenario_spread(&self) -> ScenarioSpread {
        ScenarioSpread {
            down: self.spread_down,
            up: self.spread_up,
        }
    }
}
