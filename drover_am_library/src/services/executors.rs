use crate::rm_api::Container;

#[derive(Debug, Clone)]
/// A container-bound executor as the executor manager tracks it.
pub struct ExecutorHandle {
    pub executor_id: String,
    pub exit_code: i32,
    pub exit_message: String,
    pub container: Container,
}

#[derive(Debug, Clone)]
/// Notifications the container manager forwards to the executor manager.
pub enum ExecutorEvent {
    ContainerReleased {
        container: Container,
        exit_code: i32,
        diagnostics: String,
    },
}

/// The executor state manager, consumed by contract.
pub trait ExecutorManager: Send + Sync {
    /// Look up the executor bound to a container, by the container id's string form.
    fn get_executor(&self, container_id: &str) -> Option<ExecutorHandle>;

    fn handle(&self, event: ExecutorEvent);

    /// Every executor finished and succeeded.
    fn is_all_success(&self) -> bool;

    /// Every executor finished, successfully or not.
    fn is_all_completed(&self) -> bool;
}
