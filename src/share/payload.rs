use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::intelligence::token_price;
use crate::models::{Scenario, WalletAggregate};

/// Renderer constraint: label fields are bounded.
pub const MAX_LABEL_LEN: usize = 80;

/// The payload violates the renderer's declared constraints. Surfaced to
/// the caller before any network call is made.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("{field} must not be negative")]
    NegativeField { field: &'static str },

    #[error("{field} must be finite")]
    NonFinite { field: &'static str },

    #[error("{field} must not be empty")]
    EmptyLabel { field: &'static str },

    #[error("{field} exceeds {MAX_LABEL_LEN} characters")]
    LabelTooLong { field: &'static str },

    #[error("scenario has no projection at the featured valuation")]
    MissingProjection,
}

/// Flat payload the external card renderer consumes. Raw numerics and
/// plain strings only — currency/percentage formatting is the renderer's
/// responsibility. Count fields are signed on the wire so validation can
/// reject a negative value instead of silently wrapping it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPayload {
    pub wallet: String,
    pub payout_usd: f64,
    pub payout_tokens: f64,
    pub token_price: f64,
    pub cohort_label: String,
    pub cohort_wallets: i64,
    pub percentile_label: String,
    pub share_pct: f64,
    pub fdv_billion: f64,
    pub og_pool_pct: f64,
    pub trade_count: i64,
    pub total_eth: f64,
    pub total_usd: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_of: Option<String>,
}

impl CardPayload {
    /// Check the payload against the renderer's constraints.
    pub fn validate(&self) -> Result<(), BuildError> {
        check_label("wallet", &self.wallet)?;
        check_label("cohortLabel", &self.cohort_label)?;
        check_label("percentileLabel", &self.percentile_label)?;

        for (field, value) in [
            ("payoutUsd", self.payout_usd),
            ("payoutTokens", self.payout_tokens),
            ("tokenPrice", self.token_price),
            ("sharePct", self.share_pct),
            ("fdvBillion", self.fdv_billion),
            ("ogPoolPct", self.og_pool_pct),
            ("totalEth", self.total_eth),
            ("totalUsd", self.total_usd),
        ] {
            check_amount(field, value)?;
        }

        if self.cohort_wallets < 0 {
            return Err(BuildError::NegativeField { field: "cohortWallets" });
        }
        if self.trade_count < 0 {
            return Err(BuildError::NegativeField { field: "tradeCount" });
        }

        Ok(())
    }
}

/// Everything the builder needs to assemble one card.
#[derive(Debug, Clone, Copy)]
pub struct CardInputs<'a> {
    pub wallet_address: &'a str,
    pub aggregate: &'a WalletAggregate,
    pub scenario: &'a Scenario,
    /// Featured valuation; must be one of the scenario's projections.
    pub fdv_usd: f64,
    pub total_supply: u64,
    pub og_pool_fraction: f64,
    /// Percentile position for the "Top X%" label.
    pub tier_pct: f64,
    pub cohort_label: &'a str,
    pub cohort_wallets: u64,
}

/// Assemble and validate a renderer payload. Validation failures are a
/// `BuildError` and nothing leaves the process.
pub fn build_card_payload(inputs: &CardInputs<'_>) -> Result<CardPayload, BuildError> {
    let payout_usd = inputs
        .scenario
        .payout_at(inputs.fdv_usd)
        .ok_or(BuildError::MissingProjection)?;

    let payload = CardPayload {
        wallet: mask_wallet(inputs.wallet_address),
        payout_usd,
        payout_tokens: inputs.scenario.token_amount,
        token_price: token_price(inputs.fdv_usd, inputs.total_supply),
        cohort_label: inputs.cohort_label.to_string(),
        cohort_wallets: inputs.cohort_wallets as i64,
        percentile_label: percentile_label(inputs.tier_pct),
        share_pct: inputs.scenario.share_of_pool * 100.0,
        fdv_billion: inputs.fdv_usd / 1_000_000_000.0,
        og_pool_pct: inputs.og_pool_fraction * 100.0,
        trade_count: inputs.aggregate.trade_count as i64,
        total_eth: inputs.aggregate.total_eth_f64(),
        total_usd: inputs.aggregate.total_usd_f64(),
        as_of: inputs.aggregate.last_trade_at.map(|t| t.to_rfc3339()),
    };

    payload.validate()?;
    Ok(payload)
}

/// First 6 + last 4 characters, lowercase, joined by an ellipsis.
/// Addresses short enough to show whole stay whole.
pub fn mask_wallet(address: &str) -> String {
    let value = address.trim().to_lowercase();
    if value.len() <= 12 {
        return value;
    }
    match (value.get(..6), value.get(value.len() - 4..)) {
        (Some(head), Some(tail)) => format!("{head}\u{2026}{tail}"),
        _ => value,
    }
}

/// "Top 2.5%" / "Top 10%" — trailing zeros trimmed.
pub fn percentile_label(tier_pct: f64) -> String {
    let formatted = format!("{tier_pct:.1}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("Top {trimmed}%")
}

fn check_label(field: &'static str, value: &str) -> Result<(), BuildError> {
    if value.trim().is_empty() {
        return Err(BuildError::EmptyLabel { field });
    }
    if value.chars().count() > MAX_LABEL_LEN {
        return Err(BuildError::LabelTooLong { field });
    }
    Ok(())
}

fn check_amount(field: &'static str, value: f64) -> Result<(), BuildError> {
    if !value.is_finite() {
        return Err(BuildError::NonFinite { field });
    }
    if value < 0.0 {
        return Err(BuildError::NegativeField { field });
    }
    Ok(())
}
