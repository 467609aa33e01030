use self::containermanager::ContainerManager;
use crate::rm_api::AllocateResponse;
use anyhow::Result;
use async_trait::async_trait;
use drover_library::transaction::TransactionId;
use std::sync::Arc;

pub mod containermanager;
pub mod registry;
pub mod release_queue;
pub mod resource_update;

/// Role-aware allocation behavior injected into the [ContainerManager].
/// Implementations translate role demand into RM container requests and decide
/// which granted containers to keep; accepted containers go through
/// [ContainerManager::admit_container].
/// Neither call may block longer than one heartbeat period.
#[async_trait]
pub trait AllocationPolicy: Send + Sync {
    /// React to the containers granted in this heartbeat: admit the keepers
    /// and bind them to executors.
    async fn handle_allocation(
        &self,
        mgr: &Arc<ContainerManager>,
        response: &AllocateResponse,
        tid: &TransactionId,
    ) -> Result<()>;

    /// Ask the RM for whatever the roles still need.
    async fn ask_for_containers(&self, mgr: &Arc<ContainerManager>, tid: &TransactionId) -> Result<()>;
}
