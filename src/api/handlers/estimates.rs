use std::time::Instant;

use axum::extract::State;
use axum::Json;
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::intelligence::{
    band_span, build_scenarios, locate, share_sensitivity, token_price, BandSpan,
    ShareSensitivityRow,
};
use crate::models::{PercentileBand, Scenario, ScenarioAssumptions, ScenarioSpread};
use crate::AppState;

#[derive(Deserialize)]
pub struct EstimateRequest {
    pub wallet: String,
    /// Cohort slug; the caller decides which curve applies, never the engine.
    pub cohort: String,
    pub assumptions: ScenarioAssumptions,
    #[serde(default)]
    pub spread: Option<ScenarioSpread>,
    /// Alternative pool shares for the comparison table.
    #[serde(default)]
    pub share_comparisons: Vec<f64>,
}

#[derive(Serialize)]
pub struct ProjectionView {
    pub fdv_usd: f64,
    /// Rounded to the nearest whole dollar for display; the engine keeps
    /// full precision internally.
    pub payout_usd: i64,
}

#[derive(Serialize)]
pub struct ScenarioView {
    pub label: &'static str,
    pub share_of_pool: f64,
    pub token_amount: f64,
    pub projections: Vec<ProjectionView>,
}

impl ScenarioView {
    fn from_scenario(scenario: &Scenario) -> Self {
        Self {
            label: scenario.label.as_str(),
            share_of_pool: scenario.share_of_pool,
            token_amount: scenario.token_amount,
            projections: scenario
                .projections
                .iter()
                .map(|p| ProjectionView {
                    fdv_usd: p.fdv_usd,
                    payout_usd: p.payout_usd.round() as i64,
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
pub struct EstimateResponse {
    pub wallet: String,
    pub cohort: String,
    pub cohort_label: String,
    pub rank: u32,
    pub band: PercentileBand,
    pub span: Option<BandSpan>,
    pub token_price: f64,
    pub scenarios: Vec<ScenarioView>,
    pub share_table: Vec<ShareSensitivityRow>,
}

/// Run the full pipeline for one wallet: cached aggregate → percentile
/// placement → scenario set.
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<EstimateRequest>,
) -> Result<Json<EstimateResponse>, AppError> {
    let start = Instant::now();

    let cohort = state
        .cohorts
        .get(&req.cohort)
        .ok_or_else(|| AppError::NotFound(format!("unknown cohort: {}", req.cohort)))?;

    // Validates every lever before any upstream call.
    let spread = req.spread.unwrap_or_else(|| state.config.scenario_spread());
    let scenarios = build_scenarios(&req.assumptions, spread)?;

    let aggregate = state.reports.wallet_aggregate(&req.wallet).await?;
    let placement = locate(&cohort.distribution, aggregate.total_usd_f64());
    let span = band_span(
        &cohort.distribution,
        placement.rank,
        req.assumptions.qualifying_wallet_count,
    );

    // Validation guarantees at least one valuation.
    let featured_fdv = req.assumptions.launch_fdv_usd.first().copied().unwrap_or_default();
    let share_table = if req.share_comparisons.is_empty() {
        Vec::new()
    } else {
        share_sensitivity(&req.assumptions, &req.share_comparisons, featured_fdv)?
    };

    counter!("estimates_total").increment(1);
    histogram!("estimate_latency_seconds").record(start.elapsed().as_secs_f64());

    Ok(Json(EstimateResponse {
        wallet: req.wallet.trim().to_lowercase(),
        cohort: cohort.meta.slug.clone(),
        cohort_label: cohort.meta.display_label(),
        rank: placement.rank,
        band: placement.band,
        span,
        token_price: token_price(featured_fdv, req.assumptions.total_supply),
        scenarios: scenarios.iter().map(ScenarioView::from_scenario).collect(),
        share_table,
    }))
}
