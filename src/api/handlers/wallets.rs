use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::errors::AppError;
use crate::intelligence::{band_span, locate, BandSpan};
use crate::models::WalletAggregate;
use crate::AppState;

#[derive(Serialize)]
pub struct CohortPlacement {
    pub cohort: String,
    pub label: String,
    /// First qualifying trade predates the cohort cutoff.
    pub qualifies: bool,
    pub rank: u32,
    pub span: Option<BandSpan>,
}

#[derive(Serialize)]
pub struct WalletReport {
    pub wallet: String,
    pub aggregate: WalletAggregate,
    pub placements: Vec<CohortPlacement>,
}

/// Cached wallet summary plus its percentile placement on every cohort
/// curve. An empty wallet still reports — placements land on the shallow
/// end of each curve.
pub async fn report(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<WalletReport>, AppError> {
    let aggregate = state.reports.wallet_aggregate(&address).await?;
    let total_usd = aggregate.total_usd_f64();

    let placements = state
        .cohorts
        .iter()
        .map(|cohort| {
            let placement = locate(&cohort.distribution, total_usd);
            let span = band_span(
                &cohort.distribution,
                placement.rank,
                cohort.distribution.total_wallets(),
            );
            CohortPlacement {
                cohort: cohort.meta.slug.clone(),
                label: cohort.meta.display_label(),
                qualifies: aggregate.qualifies_for_cutoff(cohort.meta.cutoff),
                rank: placement.rank,
                span,
            }
        })
        .collect();

    Ok(Json(WalletReport {
        wallet: address.trim().to_lowercase(),
        aggregate,
        placements,
    }))
}
