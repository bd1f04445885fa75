use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use metrics::counter;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::errors::AppError;
use crate::intelligence::{band_span, build_scenarios, locate};
use crate::models::{ScenarioAssumptions, ScenarioLabel, ScenarioSpread};
use crate::share::{build_card_payload, CardInputs, CardPayload, ShareCard};
use crate::AppState;

#[derive(Deserialize)]
pub struct CardRequest {
    pub wallet: String,
    pub cohort: String,
    pub assumptions: ScenarioAssumptions,
    #[serde(default)]
    pub spread: Option<ScenarioSpread>,
}

#[derive(Serialize)]
pub struct CardResponse {
    pub card: ShareCard,
    pub payload: CardPayload,
}

/// Build, validate, and render a share card for the Base scenario.
///
/// A render failure degrades only the image artifact: the response still
/// carries the validated payload so the caller can retry or display
/// numeric results without a card.
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CardRequest>,
) -> Result<Response, AppError> {
    let cohort = state
        .cohorts
        .get(&req.cohort)
        .ok_or_else(|| AppError::NotFound(format!("unknown cohort: {}", req.cohort)))?;

    let spread = req.spread.unwrap_or_else(|| state.config.scenario_spread());
    let scenarios = build_scenarios(&req.assumptions, spread)?;
    let base = scenarios
        .iter()
        .find(|s| s.label == ScenarioLabel::Base)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("scenario set missing base case")))?;

    let aggregate = state.reports.wallet_aggregate(&req.wallet).await?;
    let placement = locate(&cohort.distribution, aggregate.total_usd_f64());
    let span = band_span(
        &cohort.distribution,
        placement.rank,
        req.assumptions.qualifying_wallet_count,
    );
    // "Top X%" — the band midpoint when the model covers it, otherwise
    // the rank itself is the percentile.
    let tier_pct = span
        .map(|s| s.midpoint())
        .unwrap_or(placement.rank as f64);

    let featured_fdv = req.assumptions.launch_fdv_usd.first().copied().unwrap_or_default();
    let payload = build_card_payload(&CardInputs {
        wallet_address: &req.wallet,
        aggregate: &aggregate,
        scenario: base,
        fdv_usd: featured_fdv,
        total_supply: req.assumptions.total_supply,
        og_pool_fraction: req.assumptions.og_pool_fraction,
        tier_pct,
        cohort_label: &cohort.meta.display_label(),
        cohort_wallets: req.assumptions.qualifying_wallet_count,
    })?;

    match state.cards.ensure_card(&payload).await {
        Ok(card) => Ok(Json(CardResponse { card, payload }).into_response()),
        Err(err) => {
            counter!("card_render_failures_total").increment(1);
            tracing::warn!(error = %err, wallet = %payload.wallet, "Card render failed");
            Ok((
                StatusCode::BAD_GATEWAY,
                Json(json!({
                    "success": false,
                    "error": err.to_string(),
                    "retryable": true,
                    "payload": payload,
                })),
            )
                .into_response())
        }
    }
}
