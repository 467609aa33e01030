//! Records and client contract for the AM <-> resource-manager protocol.
//! The wire format, authentication, and retry policy all belong to the
//! [RmClient] implementation; everything here is plain data.

use anyhow::Result;
use async_trait::async_trait;
use std::fmt::{Display, Formatter};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
/// Cluster-unique identity of a granted container.
/// Totally ordered so registries and logs iterate deterministically.
pub struct ContainerId(pub u64);

impl Display for ContainerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "container_{}", self.0)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
/// Scheduling band a container belongs to. Assigned per role, never retired.
pub struct Priority(pub u32);

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
/// Compute demand in scheduler units. The zero value stands for unknown/unset.
pub struct Resource {
    pub memory_mb: u64,
    pub vcores: u32,
}

impl Resource {
    pub fn new(memory_mb: u64, vcores: u32) -> Self {
        Resource { memory_mb, vcores }
    }

    pub fn is_unset(&self) -> bool {
        self.memory_mb == 0 && self.vcores == 0
    }

    /// True when every component of `self` is within `other`.
    pub fn fits_in(&self, other: &Resource) -> bool {
        self.memory_mb <= other.memory_mb && self.vcores <= other.vcores
    }

    /// Round the memory component up to the next multiple of `step` MiB.
    pub fn round_memory_up(&self, step: u64) -> Resource {
        if step == 0 {
            return *self;
        }
        Resource {
            memory_mb: self.memory_mb.div_ceil(step) * step,
            vcores: self.vcores,
        }
    }
}

impl Display for Resource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "<memory:{}, vCores:{}>", self.memory_mb, self.vcores)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable snapshot of one granted allocation.
/// The RM reports changes by sending a whole new snapshot with a bumped version.
pub struct Container {
    pub id: ContainerId,
    pub priority: Priority,
    pub resource: Resource,
    /// Address of the node manager's HTTP endpoint hosting this container.
    pub node_http_address: String,
    pub version: u64,
}

#[derive(Debug, Clone)]
/// Terminal report for a container the RM has reclaimed.
pub struct ContainerStatus {
    pub id: ContainerId,
    pub exit_status: i32,
    pub diagnostics: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Direction of a container resize, reported by the RM or requested by the AM.
pub enum UpdateKind {
    Increase,
    Decrease,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionKind {
    Guaranteed,
    Opportunistic,
}

#[derive(Debug, Clone)]
pub struct UpdatedContainer {
    pub container: Container,
    pub kind: UpdateKind,
}

#[derive(Debug, Clone, Default)]
/// Everything one heartbeat round brings back from the RM.
pub struct AllocateResponse {
    pub allocated: Vec<Container>,
    pub completed: Vec<ContainerStatus>,
    pub updated: Vec<UpdatedContainer>,
}

#[derive(Debug, Clone, Default)]
pub struct RegisterResponse {
    /// Largest single-container resource the cluster will grant.
    pub maximum_resource: Resource,
}

#[derive(Debug, Clone)]
/// One resize request against a running container.
pub struct UpdateRequest {
    /// Version of the snapshot the request was computed from; the RM rejects stale versions.
    pub version: u64,
    pub kind: UpdateKind,
    pub target: Resource,
    pub execution: ExecutionKind,
}

/// Client half of the AM <-> RM protocol.
/// All calls happen on the container manager's heartbeat task; callers treat
/// any error as fatal to the attempt, so implementations should encapsulate
/// their own short-retry policy.
#[async_trait]
pub trait RmClient: Send + Sync {
    /// One-shot registration of this application master with the cluster.
    async fn register(&self, host: &str, port: u16, tracking_url: &str) -> Result<RegisterResponse>;

    /// One heartbeat round. Also the only channel that delivers allocations,
    /// completions, and accepted resizes.
    async fn allocate(&self, progress: f32) -> Result<AllocateResponse>;

    /// Ask the RM to reclaim an assigned container. Fire and forget; the
    /// completion arrives through a later [Self::allocate] response.
    async fn release_assigned(&self, id: ContainerId) -> Result<()>;

    /// Adjust the AM's node blacklist by delta.
    async fn update_blacklist(&self, additions: Vec<String>, removals: Vec<String>) -> Result<()>;

    /// Ask the RM to resize a running container.
    async fn request_container_update(&self, container: &Container, request: UpdateRequest) -> Result<()>;
}
