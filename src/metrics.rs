use std::sync::Mutex;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

static HANDLE: Mutex<Option<PrometheusHandle>> = Mutex::new(None);

/// Install the Prometheus exporter and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload.
///
/// The recorder is process-global, so later calls return the same handle.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let mut slot = HANDLE
        .lock()
        .map_err(|_| anyhow::anyhow!("metrics handle lock poisoned"))?;
    if let Some(handle) = slot.as_ref() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("failed to install Prometheus recorder: {e}"))?;
    *slot = Some(handle.clone());

    // Pre-register counters so they appear even before the first increment.
    counter!("predictions_requested_total", "mode" => "mock").absolute(0);
    counter!("predictions_requested_total", "mode" => "live").absolute(0);
    counter!("prediction_fallbacks_total").absolute(0);
    counter!("verifications_total").absolute(0);
    counter!("nft_predictions_total").absolute(0);
    counter!("contract_deployments_total").absolute(0);
    counter!("query_cache_hits_total").absolute(0);
    counter!("query_cache_misses_total").absolute(0);

    // Histogram is lazily created on first record; force creation.
    histogram!("provider_request_seconds").record(0.0);

    Ok(handle)
}
