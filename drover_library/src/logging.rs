use crate::transaction::TransactionId;
use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{filter::EnvFilter, registry::Registry, Layer};

#[derive(Debug, serde::Serialize, serde::Deserialize, Default, Clone)]
/// Details about how/where to log to
pub struct LoggingConfig {
    /// the minimum log level
    /// see [tracing_subscriber::filter::EnvFilter] for the accepted directives
    pub level: String,
    /// Directory to write JSON-formatted logs into; empty disables file logging.
    pub directory: String,
    /// log filename start string
    pub basename: String,
    /// Additionally write logs to stdout.
    #[serde(default)]
    pub stdout: Option<bool>,
    /// How to log spans, in all caps.
    /// Multiple options can be passed as a list joined with '+'.
    /// `NONE` is the recommended value; span capturing grows log files quickly.
    pub spanning: String,
}

fn parse_span(span: &str) -> Result<FmtSpan> {
    Ok(match span {
        "NEW" => FmtSpan::NEW,
        "ENTER" => FmtSpan::ENTER,
        "EXIT" => FmtSpan::EXIT,
        "CLOSE" => FmtSpan::CLOSE,
        "NONE" => FmtSpan::NONE,
        "" => FmtSpan::NONE,
        "ACTIVE" => FmtSpan::ACTIVE,
        "FULL" => FmtSpan::FULL,
        _ => anyhow::bail!("Unknown spanning value {}", span),
    })
}
fn str_to_span(spanning: &str) -> Result<FmtSpan> {
    spanning
        .split('+')
        .map(parse_span)
        .try_fold(FmtSpan::NONE, |acc, span| Ok(acc | span?))
}

/// Keeps the non-blocking log writers alive; dropping it flushes and closes them.
pub struct TracingGuard {
    _worker_guards: Vec<WorkerGuard>,
}

/// Install the global tracing subscriber from the given config.
/// Call once at process startup and hold the returned guard until exit.
pub fn start_tracing(config: &Arc<LoggingConfig>, tid: &TransactionId) -> Result<TracingGuard> {
    let mut guards = vec![];
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync + 'static>> = vec![];
    if config.stdout.unwrap_or(false) {
        layers.push(
            tracing_subscriber::fmt::layer()
                .with_span_events(str_to_span(&config.spanning)?)
                .boxed(),
        );
    }
    if !config.directory.is_empty() {
        std::fs::create_dir_all(&config.directory)?;
        let fname = format!("{}.log", config.basename);
        let appender = tracing_appender::rolling::never(&config.directory, fname);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        guards.push(guard);
        layers.push(
            tracing_subscriber::fmt::layer()
                .with_span_events(str_to_span(&config.spanning)?)
                .with_writer(writer)
                .json()
                .boxed(),
        );
    }
    let filter = EnvFilter::builder().parse(&config.level)?;
    let subscriber = Registry::default().with(layers).with(filter);
    tracing::subscriber::set_global_default(subscriber)?;
    info!(tid = tid, level = %config.level, "Logging initialized");
    Ok(TracingGuard {
        _worker_guards: guards,
    })
}
