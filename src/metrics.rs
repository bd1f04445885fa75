use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus exporter and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload.
pub fn init_metrics() -> PrometheusHandle {
    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // Pre-register counters so they appear even before the first increment.
    counter!("wallet_reports_built_total").absolute(0);
    counter!("wallet_report_cache_hits_total").absolute(0);
    counter!("trade_rows_skipped_total").absolute(0);
    counter!("trade_sides_unmatched_total").absolute(0);
    counter!("estimates_total").absolute(0);
    counter!("cards_rendered_total").absolute(0);
    counter!("card_render_failures_total").absolute(0);

    // Histogram is lazily created on first record; force creation.
    histogram!("estimate_latency_seconds").record(0.0);

    handle
}
