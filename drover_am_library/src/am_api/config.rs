use drover_library::logging::LoggingConfig;
use serde::Deserialize;
use std::sync::Arc;

pub const AM_ENV_PREFIX: &str = "DROVER_AM";

#[derive(Debug, Deserialize)]
pub struct Configuration {
    /// id the cluster assigned this application; tags metrics and logs
    pub app_id: String,
    /// host the AM service listens on, reported to the RM at registration
    pub host: String,
    /// port of the AM service
    pub port: u16,
    /// address of the embedded tracking endpoint, advertised to the RM as the tracking URL
    pub webapp_host: String,
    pub webapp_port: u16,
    pub logging: Arc<LoggingConfig>,
    pub scheduler: Arc<SchedulerConfig>,
}

#[derive(Debug, Deserialize)]
/// Knobs for the container-manager heartbeat loop.
pub struct SchedulerConfig {
    /// heartbeat period against the RM, in milliseconds
    #[serde(default = "default_allocate_interval_ms")]
    pub allocate_interval_ms: u64,
    /// fold RM-reported container resizes into the running set and request
    /// resizes when role demand moves
    #[serde(default)]
    pub enable_update_resource: bool,
    /// most containers that may wait for release dispatch at once
    #[serde(default = "default_release_queue_capacity")]
    pub release_queue_capacity: usize,
}

fn default_allocate_interval_ms() -> u64 {
    10_000
}
fn default_release_queue_capacity() -> usize {
    4096
}

pub type AmConfig = Arc<Configuration>;

impl Configuration {
    pub fn boxed(config_fpath: Option<&str>, overrides: Option<Vec<(String, String)>>) -> anyhow::Result<AmConfig> {
        let config: Configuration =
            drover_library::load_config_default!("drover_am_library/src/am.json", config_fpath, overrides, AM_ENV_PREFIX)?;
        Ok(Arc::new(config))
    }
}
