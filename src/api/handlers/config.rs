use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::AppState;

/// Defaults the dashboard seeds its input controls with.
#[derive(Serialize)]
pub struct EngineDefaults {
    pub total_supply: u64,
    pub spread_down: f64,
    pub spread_up: f64,
    pub report_cache_ttl_secs: u64,
}

pub async fn get_defaults(State(state): State<AppState>) -> Json<EngineDefaults> {
    let c = &state.config;
    Json(EngineDefaults {
        total_supply: c.total_supply,
        spread_down: c.spread_down,
        spread_up: c.spread_up,
        report_cache_ttl_secs: c.report_cache_ttl.as_secs(),
    })
}
