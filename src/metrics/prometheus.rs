use std::net::SocketAddr;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus HTTP exporter on `port`.
/// Until this is called the recording helpers below are no-ops.
pub fn init_metrics_server(port: u16) -> anyhow::Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(SocketAddr::from(([0, 0, 0, 0], port)))
        .install()?;
    Ok(())
}

// ── Fetch metrics ────────────────────────────────────────────────

pub fn record_fetch(source: &str, outcome: &str) {
    counter!("fetch_total", "source" => source.to_string(), "outcome" => outcome.to_string())
        .increment(1);
}

pub fn record_fetch_latency(source: &str, latency_ms: f64) {
    histogram!("fetch_latency_ms", "source" => source.to_string()).record(latency_ms);
}

// ── Publish metrics ──────────────────────────────────────────────

pub fn record_publish(publisher: &str, outcome: &str) {
    counter!("publish_total", "publisher" => publisher.to_string(), "outcome" => outcome.to_string())
        .increment(1);
}

/// Wall time of one fetch → compose → publish cycle.
pub fn record_cycle_duration(latency_ms: f64) {
    histogram!("cycle_duration_ms").record(latency_ms);
}
