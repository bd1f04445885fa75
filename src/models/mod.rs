pub mod aggregate;
pub mod cohort;
pub mod scenario;
pub mod trade;

pub use aggregate::WalletAggregate;
pub use cohort::{Cohort, CohortDistribution, CohortMeta, PercentileBand};
pub use scenario::{FdvProjection, Scenario, ScenarioAssumptions, ScenarioLabel, ScenarioSpread};
pub use trade::TradeRecord;

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// Which side of a fill the wallet under analysis was on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Classify a record from the wallet's perspective. Buyer match wins
    /// over seller match; a record matching neither is a data-quality
    /// problem the aggregator discards with a warning.
    pub fn classify(wallet: &str, buyer: &str, seller: &str) -> Option<Self> {
        if wallet.eq_ignore_ascii_case(buyer) {
            Some(Side::Buy)
        } else if wallet.eq_ignore_ascii_case(seller) {
            Some(Side::Sell)
        } else {
            None
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}
