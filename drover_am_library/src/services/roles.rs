use crate::rm_api::{Priority, Resource};

#[derive(Debug, Clone)]
/// Descriptor of one worker role, keyed by its scheduling priority.
pub struct RoleInfo {
    pub name: String,
    /// Per-container resource demand for this role. May move over the
    /// application's lifetime; running containers are resized to follow it.
    pub resource: Resource,
}

/// Catalog of the application's roles.
/// Priorities are monotonic over an application's lifetime: new ones appear,
/// none are retired.
pub trait RoleCatalog: Send + Sync {
    fn priorities(&self) -> Vec<Priority>;
    fn role_by_priority(&self, priority: Priority) -> Option<RoleInfo>;
}
