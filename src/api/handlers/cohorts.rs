use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct CohortSummary {
    pub slug: String,
    pub title: String,
    pub tagline: String,
    pub timeline_label: String,
    pub description: String,
    pub label: String,
    pub cutoff: DateTime<Utc>,
    /// Total wallets represented in the distribution.
    pub wallets: u64,
}

pub async fn list(State(state): State<AppState>) -> Json<Vec<CohortSummary>> {
    let summaries = state
        .cohorts
        .iter()
        .map(|cohort| CohortSummary {
            slug: cohort.meta.slug.clone(),
            title: cohort.meta.title.clone(),
            tagline: cohort.meta.tagline.clone(),
            timeline_label: cohort.meta.timeline_label.clone(),
            description: cohort.meta.description.clone(),
            label: cohort.meta.display_label(),
            cutoff: cohort.meta.cutoff,
            wallets: cohort.distribution.total_wallets(),
        })
        .collect();

    Json(summaries)
}
