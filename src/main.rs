use std::sync::Arc;
use std::time::Duration;

use dropcast::api::router::create_router;
use dropcast::cohorts::CohortTable;
use dropcast::config::AppConfig;
use dropcast::dune::DuneClient;
use dropcast::metrics::init_metrics;
use dropcast::services::{CardService, ReportService};
use dropcast::share::ShareClient;
use dropcast::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);

    let metrics_handle = init_metrics();

    tracing::info!(data_dir = %config.data_dir.display(), "Loading cohort distributions...");
    // A malformed distribution is fatal: refuse to serve a partial table.
    let cohorts = CohortTable::load(&config.data_dir)?;
    tracing::info!(cohorts = cohorts.len(), "Cohort table ready");

    if config.dune_api_key.is_none() {
        tracing::warn!("DUNE_API_KEY not set — wallet lookups will fail until configured");
    }

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    let dune = DuneClient::new(
        http.clone(),
        config.dune_api_key.clone(),
        config.dune_query_id,
    );
    let reports = Arc::new(ReportService::new(dune, config.report_cache_ttl));

    let share = ShareClient::new(
        http,
        config.share_service_url.clone(),
        config.share_public_base.clone(),
    );
    let cards = Arc::new(CardService::new(share));

    let state = AppState {
        config,
        cohorts: Arc::new(cohorts),
        reports,
        cards,
        metrics_handle,
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();
}
