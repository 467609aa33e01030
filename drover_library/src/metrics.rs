use tracing::info;

/// Destination for application counters. The wire-level sink is deployment
/// specific; components only depend on this contract.
pub trait MetricsSink: Send + Sync {
    /// Add `value` to the counter `name`, tagged with the owning application id.
    fn emit_counter(&self, name: &'static str, app_id: &str, value: u64);
}

/// Sink that folds counters into the structured log stream, for deployments
/// without a metrics backend and for tests.
#[derive(Default)]
pub struct TracingMetricsSink {}

impl MetricsSink for TracingMetricsSink {
    fn emit_counter(&self, name: &'static str, app_id: &str, value: u64) {
        info!(counter = name, app_id = app_id, value = value, "counter increment");
    }
}
