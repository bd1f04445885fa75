use serde::{Deserialize, Serialize};
use std::fmt;

/// User-adjustable levers for a payout projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioAssumptions {
    /// Total token supply at launch.
    pub total_supply: u64,
    /// Fraction of supply reserved for the OG pool, 0..=1.
    pub og_pool_fraction: f64,
    /// Modelled number of wallets qualifying for the pool.
    pub qualifying_wallet_count: u64,
    /// Central estimate of this wallet's slice of the OG pool, 0..=1.
    pub wallet_percentile_share: f64,
    /// Launch valuations (USD) to project across.
    pub launch_fdv_usd: Vec<f64>,
}

/// Relative spread applied to the central share when deriving the
/// cautious and upside scenarios. Presentation constant, not a derived
/// formula — callers may override per request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScenarioSpread {
    /// Cautious share = central × (1 − down).
    pub down: f64,
    /// Upside share = central × (1 + up).
    pub up: f64,
}

impl Default for ScenarioSpread {
    fn default() -> Self {
        Self { down: 0.40, up: 0.40 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioLabel {
    Cautious,
    Base,
    Upside,
}

impl ScenarioLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioLabel::Cautious => "Cautious",
            ScenarioLabel::Base => "Base",
            ScenarioLabel::Upside => "Upside",
        }
    }
}

impl fmt::Display for ScenarioLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Projected payout at one launch valuation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FdvProjection {
    pub fdv_usd: f64,
    pub payout_usd: f64,
}

/// One named projection. Values keep full f64 precision; whole-dollar
/// rounding happens only at the display edge.
///
/// Invariants: `token_amount = total_supply × og_pool_fraction ×
/// share_of_pool`; `payout(fdv) = token_amount × fdv / total_supply`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub label: ScenarioLabel,
    pub share_of_pool: f64,
    pub token_amount: f64,
    pub projections: Vec<FdvProjection>,
}

impl Scenario {
    /// Payout at a specific valuation, if it was projected.
    pub fn payout_at(&self, fdv_usd: f64) -> Option<f64> {
        self.projections
            .iter()
            .find(|p| p.fdv_usd == fdv_usd)
            .map(|p| p.payout_usd)
    }
}
