use crate::rm_api::Container;
use crate::services::blacklist::BlacklistTracker;
use std::sync::Arc;

/// Everything a scheduling strategy may inspect, and amend, about a container
/// that just came back from the cluster.
pub struct ScheduleContext {
    pub container: Container,
    pub exit_code: i32,
    pub diagnostics: String,
    pub blacklist_tracker: Option<Arc<dyn BlacklistTracker>>,
    /// Strategies may rewrite this; it is the diagnostic the executor manager
    /// finally sees.
    pub err_msg: String,
}

impl ScheduleContext {
    pub fn new(
        container: Container,
        exit_code: i32,
        diagnostics: String,
        blacklist_tracker: Option<Arc<dyn BlacklistTracker>>,
    ) -> Self {
        let err_msg = diagnostics.clone();
        ScheduleContext {
            container,
            exit_code,
            diagnostics,
            blacklist_tracker,
            err_msg,
        }
    }
}

/// Chain of scheduling strategies consulted for every released container,
/// e.g. to feed the blacklist or annotate failure diagnostics.
pub trait ScheduleChain: Send + Sync {
    fn process_released_container(&self, ctx: &mut ScheduleContext);
}
