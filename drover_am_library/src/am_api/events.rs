use crate::rm_api::Container;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Exit codes the AM reports when an attempt ends.
pub enum ApplicationExitCode {
    Abort,
    ContainerComplete,
}

#[derive(Debug, Clone, PartialEq)]
/// Application-level events the container manager publishes.
pub enum AmEvent {
    /// Fail this attempt with a diagnostic.
    FailAttempt {
        diagnostics: String,
        exit_code: ApplicationExitCode,
    },
    /// The application finished and every executor succeeded.
    ApplicationSuccess {
        message: String,
        exit_code: ApplicationExitCode,
    },
    /// Ask an executor to wind down cleanly.
    ExecutorKill { executor_id: String },
    /// Ask an executor to stop immediately.
    ExecutorKillForcibly { executor_id: String },
    /// The RM replaced a running container's snapshot.
    ContainerUpdated { container: Container },
}

/// Receiver for [AmEvent]s; the application driver owns routing and reaction.
pub trait AmEventSink: Send + Sync {
    fn emit(&self, event: AmEvent);
}
