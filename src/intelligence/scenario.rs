use serde::Serialize;
use thiserror::Error;

use crate::models::{FdvProjection, Scenario, ScenarioAssumptions, ScenarioLabel, ScenarioSpread};

/// A scenario lever violates its domain constraint. Rejected before any
/// computation — levers are never silently clamped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidAssumption {
    #[error("{lever} must not be negative (got {value})")]
    Negative { lever: &'static str, value: f64 },

    #[error("{lever} must lie within [0, 1] (got {value})")]
    FractionOutOfRange { lever: &'static str, value: f64 },

    #[error("{lever} must be a finite number")]
    NonFinite { lever: &'static str },

    #[error("qualifying_wallet_count must be positive")]
    EmptyCohort,

    #[error("launch_fdv_usd must contain at least one valuation")]
    NoValuations,

    #[error("spread.down must lie within [0, 1] so the cautious share stays non-negative (got {value})")]
    SpreadOutOfRange { value: f64 },
}

/// One row of the share-sensitivity comparison table.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ShareSensitivityRow {
    pub share_of_pool: f64,
    pub token_amount: f64,
    pub payout_usd: f64,
}

/// Build the Cautious / Base / Upside scenario set by scaling the central
/// `wallet_percentile_share` by the spread.
///
/// All arithmetic is f64; results keep full precision — whole-dollar
/// rounding belongs to the display edge. Degenerate levers (zero pool
/// fraction or zero supply) produce all-zero payouts, not an error.
pub fn build_scenarios(
    assumptions: &ScenarioAssumptions,
    spread: ScenarioSpread,
) -> Result<Vec<Scenario>, InvalidAssumption> {
    validate(assumptions)?;
    validate_spread(spread)?;

    let central = assumptions.wallet_percentile_share;
    let shares = [
        (ScenarioLabel::Cautious, central * (1.0 - spread.down)),
        (ScenarioLabel::Base, central),
        (ScenarioLabel::Upside, central * (1.0 + spread.up)),
    ];

    Ok(shares
        .into_iter()
        .map(|(label, share)| project(label, share, assumptions))
        .collect())
}

/// Payouts across alternative pool shares at a fixed valuation, powering
/// the comparison table next to the featured scenario.
pub fn share_sensitivity(
    assumptions: &ScenarioAssumptions,
    shares: &[f64],
    fdv_usd: f64,
) -> Result<Vec<ShareSensitivityRow>, InvalidAssumption> {
    validate(assumptions)?;
    for &share in shares {
        check_fraction("share_of_pool", share)?;
    }
    check_non_negative("fdv_usd", fdv_usd)?;

    Ok(shares
        .iter()
        .map(|&share| {
            let token_amount = tokens_for_share(assumptions, share);
            ShareSensitivityRow {
                share_of_pool: share,
                token_amount,
                payout_usd: payout(token_amount, fdv_usd, assumptions.total_supply),
            }
        })
        .collect())
}

/// Implied per-token price at a given launch valuation.
pub fn token_price(fdv_usd: f64, total_supply: u64) -> f64 {
    if total_supply == 0 {
        0.0
    } else {
        fdv_usd / total_supply as f64
    }
}

fn project(label: ScenarioLabel, share_of_pool: f64, assumptions: &ScenarioAssumptions) -> Scenario {
    let token_amount = tokens_for_share(assumptions, share_of_pool);
    let projections = assumptions
        .launch_fdv_usd
        .iter()
        .map(|&fdv_usd| FdvProjection {
            fdv_usd,
            payout_usd: payout(token_amount, fdv_usd, assumptions.total_supply),
        })
        .collect();

    Scenario {
        label,
        share_of_pool,
        token_amount,
        projections,
    }
}

fn tokens_for_share(assumptions: &ScenarioAssumptions, share_of_pool: f64) -> f64 {
    assumptions.total_supply as f64 * assumptions.og_pool_fraction * share_of_pool
}

fn payout(token_amount: f64, fdv_usd: f64, total_supply: u64) -> f64 {
    // token_amount is already zero when supply is zero; avoid 0/0.
    if total_supply == 0 {
        0.0
    } else {
        token_amount * fdv_usd / total_supply as f64
    }
}

fn validate(assumptions: &ScenarioAssumptions) -> Result<(), InvalidAssumption> {
    check_fraction("og_pool_fraction", assumptions.og_pool_fraction)?;
    check_fraction("wallet_percentile_share", assumptions.wallet_percentile_share)?;

    if assumptions.qualifying_wallet_count == 0 {
        return Err(InvalidAssumption::EmptyCohort);
    }

    if assumptions.launch_fdv_usd.is_empty() {
        return Err(InvalidAssumption::NoValuations);
    }

    for &fdv in &assumptions.launch_fdv_usd {
        check_non_negative("launch_fdv_usd", fdv)?;
    }

    Ok(())
}

fn validate_spread(spread: ScenarioSpread) -> Result<(), InvalidAssumption> {
    if !spread.down.is_finite() {
        return Err(InvalidAssumption::NonFinite { lever: "spread.down" });
    }
    if !(0.0..=1.0).contains(&spread.down) {
        return Err(InvalidAssumption::SpreadOutOfRange { value: spread.down });
    }
    check_non_negative("spread.up", spread.up)
}

fn check_fraction(lever: &'static str, value: f64) -> Result<(), InvalidAssumption> {
    if !value.is_finite() {
        return Err(InvalidAssumption::NonFinite { lever });
    }
    if value < 0.0 {
        return Err(InvalidAssumption::Negative { lever, value });
    }
    if value > 1.0 {
        return Err(InvalidAssumption::FractionOutOfRange { lever, value });
    }
    Ok(())
}

fn check_non_negative(lever: &'static str, value: f64) -> Result<(), InvalidAssumption> {
    if !value.is_finite() {
        return Err(InvalidAssumption::NonFinite { lever });
    }
    if value < 0.0 {
        return Err(InvalidAssumption::Negative { lever, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_assumptions() -> ScenarioAssumptions {
        ScenarioAssumptions {
            total_supply: 1_000_000_000,
            og_pool_fraction: 0.10,
            qualifying_wallet_count: 100_000,
            wallet_percentile_share: 0.0018,
            launch_fdv_usd: vec![4_000_000_000.0],
        }
    }

    #[test]
    fn documented_base_scenario_figures() {
        let scenarios = build_scenarios(&base_assumptions(), ScenarioSpread::default()).unwrap();
        let base = scenarios
            .iter()
            .find(|s| s.label == ScenarioLabel::Base)
            .unwrap();

        assert!((base.token_amount - 180_000.0).abs() < 1e-6);
        let payout = base.payout_at(4_000_000_000.0).unwrap();
        assert!((payout - 720_000.0).abs() < 1e-6);
    }

    #[test]
    fn produces_three_ordered_scenarios() {
        let scenarios = build_scenarios(&base_assumptions(), ScenarioSpread::default()).unwrap();
        assert_eq!(scenarios.len(), 3);
        assert_eq!(scenarios[0].label, ScenarioLabel::Cautious);
        assert_eq!(scenarios[1].label, ScenarioLabel::Base);
        assert_eq!(scenarios[2].label, ScenarioLabel::Upside);
        assert!(scenarios[0].token_amount < scenarios[1].token_amount);
        assert!(scenarios[1].token_amount < scenarios[2].token_amount);
    }

    #[test]
    fn payout_is_linear_in_fdv() {
        let mut assumptions = base_assumptions();
        assumptions.launch_fdv_usd = vec![3_000_000_000.0, 6_000_000_000.0];
        let scenarios = build_scenarios(&assumptions, ScenarioSpread::default()).unwrap();

        for scenario in &scenarios {
            let low = scenario.payout_at(3_000_000_000.0).unwrap();
            let high = scenario.payout_at(6_000_000_000.0).unwrap();
            assert!((high - 2.0 * low).abs() < 1e-6);
        }
    }

    #[test]
    fn zero_pool_fraction_zeroes_every_payout() {
        let mut assumptions = base_assumptions();
        assumptions.og_pool_fraction = 0.0;
        assumptions.launch_fdv_usd = vec![2_000_000_000.0, 4_000_000_000.0];
        let scenarios = build_scenarios(&assumptions, ScenarioSpread::default()).unwrap();

        for scenario in &scenarios {
            assert_eq!(scenario.token_amount, 0.0);
            for projection in &scenario.projections {
                assert_eq!(projection.payout_usd, 0.0);
            }
        }
    }

    #[test]
    fn zero_supply_yields_zero_not_nan() {
        let mut assumptions = base_assumptions();
        assumptions.total_supply = 0;
        let scenarios = build_scenarios(&assumptions, ScenarioSpread::default()).unwrap();
        for scenario in &scenarios {
            for projection in &scenario.projections {
                assert_eq!(projection.payout_usd, 0.0);
            }
        }
    }

    #[test]
    fn negative_pool_fraction_is_rejected() {
        let mut assumptions = base_assumptions();
        assumptions.og_pool_fraction = -0.05;
        let err = build_scenarios(&assumptions, ScenarioSpread::default()).unwrap_err();
        assert!(matches!(err, InvalidAssumption::Negative { lever: "og_pool_fraction", .. }));
    }

    #[test]
    fn fraction_above_one_is_rejected() {
        let mut assumptions = base_assumptions();
        assumptions.wallet_percentile_share = 1.5;
        let err = build_scenarios(&assumptions, ScenarioSpread::default()).unwrap_err();
        assert!(matches!(err, InvalidAssumption::FractionOutOfRange { .. }));
    }

    #[test]
    fn zero_cohort_count_is_rejected() {
        let mut assumptions = base_assumptions();
        assumptions.qualifying_wallet_count = 0;
        let err = build_scenarios(&assumptions, ScenarioSpread::default()).unwrap_err();
        assert_eq!(err, InvalidAssumption::EmptyCohort);
    }

    #[test]
    fn negative_fdv_is_rejected() {
        let mut assumptions = base_assumptions();
        assumptions.launch_fdv_usd = vec![-1.0];
        assert!(build_scenarios(&assumptions, ScenarioSpread::default()).is_err());
    }

    #[test]
    fn oversized_spread_is_rejected() {
        let spread = ScenarioSpread { down: 1.2, up: 0.4 };
        let err = build_scenarios(&base_assumptions(), spread).unwrap_err();
        assert!(matches!(err, InvalidAssumption::SpreadOutOfRange { .. }));
    }

    #[test]
    fn token_price_tracks_fdv_over_supply() {
        assert_eq!(token_price(4_000_000_000.0, 1_000_000_000), 4.0);
        assert_eq!(token_price(4_000_000_000.0, 0), 0.0);
    }

    #[test]
    fn share_sensitivity_rows_match_direct_projection() {
        let assumptions = base_assumptions();
        let rows = share_sensitivity(&assumptions, &[0.001, 0.002], 4_000_000_000.0).unwrap();
        assert_eq!(rows.len(), 2);
        assert!((rows[0].token_amount - 100_000.0).abs() < 1e-6);
        assert!((rows[0].payout_usd - 400_000.0).abs() < 1e-6);
        assert!((rows[1].payout_usd - 2.0 * rows[0].payout_usd).abs() < 1e-6);
    }

    #[test]
    fn share_sensitivity_rejects_out_of_range_share() {
        let err = share_sensitivity(&base_assumptions(), &[1.5], 4e9).unwrap_err();
        assert!(matches!(err, InvalidAssumption::FractionOutOfRange { .. }));
    }
}
