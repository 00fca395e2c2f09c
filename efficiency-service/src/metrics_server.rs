use std::net::SocketAddr;

use axum::{routing::get, Router};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static PROM_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Request and backfill latencies are sub-second in the common case.
const LATENCY_BUCKETS: &[f64] = &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5];

/// Installs the Prometheus recorder and serves `/metrics` on `bind_addr`.
pub fn init(bind_addr: &str) -> anyhow::Result<()> {
    let addr: SocketAddr = bind_addr
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid metrics.bind_addr: {e}"))?;

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Suffix("latency_seconds".to_string()), LATENCY_BUCKETS)?
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("failed to install Prometheus metrics recorder: {e}"))?;

    if PROM_HANDLE.set(handle).is_err() {
        tracing::warn!("metrics recorder already initialized");
    }
    describe();

    tokio::spawn(async move {
        let app = Router::new().route("/metrics", get(render));

        match tokio::net::TcpListener::bind(addr).await {
            Ok(listener) => {
                tracing::info!(%addr, "metrics endpoint listening");
                if let Err(e) = axum::serve(listener, app.into_make_service()).await {
                    tracing::error!(error = %e, "metrics server error");
                }
            }
            Err(e) => tracing::error!(error = %e, %addr, "failed to bind metrics listener"),
        }
    });

    Ok(())
}

fn describe() {
    metrics::describe_counter!("efficiency_calculations_total", "Calculations computed and stored");
    metrics::describe_counter!(
        "efficiency_validation_rejected_total",
        "Submissions rejected as invalid"
    );
    metrics::describe_counter!("efficiency_not_found_total", "Lookups of unknown buildings or ids");
    metrics::describe_counter!("efficiency_store_errors_total", "Store operations that failed");
    metrics::describe_counter!("efficiency_store_retry_total", "Backfill appends retried");
    metrics::describe_histogram!(
        "efficiency_request_latency_seconds",
        metrics::Unit::Seconds,
        "Latency of /efficiency requests"
    );
}

async fn render() -> String {
    PROM_HANDLE.get().map(PrometheusHandle::render).unwrap_or_default()
}
