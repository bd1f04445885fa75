pub mod api;
pub mod cohorts;
pub mod config;
pub mod dune;
pub mod errors;
pub mod ingestion;
pub mod intelligence;
pub mod metrics;
pub mod models;
pub mod services;
pub mod share;

use std::sync::Arc;

use crate::cohorts::CohortTable;
use crate::config::AppConfig;
use crate::services::{CardService, ReportService};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub cohorts: Arc<CohortTable>,
    pub reports: Arc<ReportService>,
    pub cards: Arc<CardService>,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}
