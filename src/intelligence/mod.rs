pub mod aggregator;
pub mod percentile;
pub mod scenario;

pub use aggregator::aggregate_wallet;
pub use percentile::{band_span, locate, BandSpan, Placement};
pub use scenario::{
    build_scenarios, share_sensitivity, token_price, InvalidAssumption, ShareSensitivityRow,
};
