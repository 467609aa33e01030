use super::registry::ContainerRegistry;
use super::release_queue::ReleaseQueue;
use super::resource_update::{classify, MEMORY_GRANULARITY_MB};
use super::AllocationPolicy;
use crate::am_api::config::AmConfig;
use crate::am_api::events::{AmEvent, AmEventSink, ApplicationExitCode};
use crate::am_api::ProgressSource;
use crate::rm_api::{
    Container, ContainerStatus, ExecutionKind, RmClient, UpdateRequest, UpdatedContainer,
};
use crate::services::blacklist::{BlacklistTracker, BlacklistView};
use crate::services::executors::{ExecutorEvent, ExecutorManager};
use crate::services::roles::RoleCatalog;
use crate::services::schedule::{ScheduleChain, ScheduleContext};
use anyhow::Result;
use drover_library::metrics::MetricsSink;
use drover_library::threading::tokio_interval_thread;
use drover_library::transaction::{TransactionId, CTR_MGR_WORKER_TID};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

pub const EXECUTOR_EXPIRED_COUNTER: &str = "am.container_manager.executor_expired";
pub const RELEASE_CONTAINER_COUNTER: &str = "am.container_manager.release_container";

#[derive(Debug, Clone)]
/// Requests and changes the container manager reacts to, emitted by the AM's
/// other subsystems. Handled synchronously on the caller's task.
pub enum ContainerManagerEvent {
    /// A role published its first container request; bands may need creating.
    RequestCreated,
    /// A role's container request changed.
    RequestUpdated,
    /// An executor stopped heartbeating; its container must be reclaimed.
    ExecutorExpired(Container),
    /// Wind the application down, letting executors exit cleanly.
    GracefulShutdown,
    /// Wind the application down immediately.
    ForciblyShutdown,
}

/// Drives the application's container demand against the cluster RM:
/// heartbeat allocation, release dispatch, container resizes, blacklist upkeep
/// and shutdown fan-out. One instance per application attempt; all RM traffic
/// happens on the single heartbeat task this service owns.
pub struct ContainerManager {
    config: AmConfig,
    rm: Arc<dyn RmClient>,
    executors: Arc<dyn ExecutorManager>,
    roles: Arc<dyn RoleCatalog>,
    schedule_chain: Arc<dyn ScheduleChain>,
    blacklist_tracker: Option<Arc<dyn BlacklistTracker>>,
    policy: Arc<dyn AllocationPolicy>,
    progress: Arc<dyn ProgressSource>,
    events: Arc<dyn AmEventSink>,
    metrics: Arc<dyn MetricsSink>,
    registry: ContainerRegistry,
    to_release: ReleaseQueue,
    /// Blacklist as last accepted by the RM. Heartbeat-task only.
    blacklist: Mutex<BlacklistView>,
    stopped: Arc<AtomicBool>,
    shutting_down: AtomicBool,
    wake: Arc<Notify>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ContainerManager {
    #[allow(clippy::too_many_arguments)]
    pub fn boxed(
        config: AmConfig,
        rm: Arc<dyn RmClient>,
        executors: Arc<dyn ExecutorManager>,
        roles: Arc<dyn RoleCatalog>,
        schedule_chain: Arc<dyn ScheduleChain>,
        blacklist_tracker: Option<Arc<dyn BlacklistTracker>>,
        policy: Arc<dyn AllocationPolicy>,
        progress: Arc<dyn ProgressSource>,
        events: Arc<dyn AmEventSink>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Arc<Self> {
        Arc::new(ContainerManager {
            registry: ContainerRegistry::new(),
            to_release: ReleaseQueue::new(config.scheduler.release_queue_capacity),
            blacklist: Mutex::new(BlacklistView::new()),
            stopped: Arc::new(AtomicBool::new(false)),
            shutting_down: AtomicBool::new(false),
            wake: Arc::new(Notify::new()),
            worker: Mutex::new(None),
            config,
            rm,
            executors,
            roles,
            schedule_chain,
            blacklist_tracker,
            policy,
            progress,
            events,
            metrics,
        })
    }

    /// Register this attempt with the RM and launch the heartbeat loop as a
    /// background task.
    pub async fn start(self: &Arc<Self>, tid: &TransactionId) -> Result<()> {
        if self.worker.lock().is_some() {
            drover_library::bail_error!(tid = tid, "Container manager is already started");
        }
        let tracking_url = format!("http://{}:{}", self.config.webapp_host, self.config.webapp_port);
        let response = self
            .rm
            .register(&self.config.host, self.config.port, &tracking_url)
            .await?;
        info!(tid=tid, tracking_url=%tracking_url, max_resource=%response.maximum_resource,
              "Application master registered");
        let handle = tokio_interval_thread(
            self.config.scheduler.allocate_interval_ms,
            CTR_MGR_WORKER_TID.clone(),
            self.clone(),
            self.stopped.clone(),
            self.wake.clone(),
            Self::tick,
        );
        *self.worker.lock() = Some(handle);
        Ok(())
    }

    /// Stop the heartbeat loop and wait for any in-flight tick to finish.
    /// Idempotent; join failures are logged and swallowed.
    pub async fn stop(&self, tid: &TransactionId) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        self.wake.notify_waiters();
        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(tid=tid, error=%e, "Container manager worker ended abnormally");
            }
        }
        info!(tid = tid, "Container manager stopped");
    }

    /// Synchronous event entry point. A failure in here is fatal to the
    /// attempt: it is logged and converted into a fail event instead of
    /// unwinding into the event source.
    pub fn handle_event(&self, event: ContainerManagerEvent, tid: &TransactionId) {
        if let Err(e) = self.try_handle_event(event, tid) {
            let diag = format!("Container manager event handling failed: {:#}", e);
            error!(tid=tid, error=%e, "Container manager event handling failed");
            self.abort(diag, tid);
        }
    }

    fn try_handle_event(&self, event: ContainerManagerEvent, tid: &TransactionId) -> Result<()> {
        match event {
            ContainerManagerEvent::RequestCreated | ContainerManagerEvent::RequestUpdated => {
                for priority in self.roles.priorities() {
                    self.registry.ensure_priority(priority);
                }
            },
            ContainerManagerEvent::ExecutorExpired(container) => {
                debug!(tid=tid, container_id=%container.id, "Executor expired, reclaiming container");
                self.registry.remove_by_id(&container.id, tid);
                self.to_release.push(container.clone())?;
                if let Some(executor) = self.executors.get_executor(&container.id.to_string()) {
                    self.on_container_released(container, executor.exit_code, &executor.exit_message, tid);
                }
                self.metrics.emit_counter(EXECUTOR_EXPIRED_COUNTER, &self.config.app_id, 1);
            },
            ContainerManagerEvent::GracefulShutdown => self.kill_all_executors(false, tid),
            ContainerManagerEvent::ForciblyShutdown => self.kill_all_executors(true, tid),
        }
        Ok(())
    }

    fn kill_all_executors(&self, forcibly: bool, tid: &TransactionId) {
        info!(tid = tid, forcibly = forcibly, "Start killing all running containers");
        self.shutting_down.store(true, Ordering::Release);
        for container in self.registry.snapshot_all() {
            if let Some(executor) = self.executors.get_executor(&container.id.to_string()) {
                info!(tid=tid, container_id=%container.id, executor_id=%executor.executor_id,
                      forcibly=forcibly, "Killing container");
                let event = match forcibly {
                    true => AmEvent::ExecutorKillForcibly {
                        executor_id: executor.executor_id,
                    },
                    false => AmEvent::ExecutorKill {
                        executor_id: executor.executor_id,
                    },
                };
                self.events.emit(event);
            }
        }
    }

    /// Accept a granted container into the running set. Called by
    /// [AllocationPolicy] implementations as they bind allocations to
    /// executors.
    pub fn admit_container(&self, container: Container, tid: &TransactionId) {
        info!(tid=tid, container_id=%container.id, priority=%container.priority,
              log_url=%format!("http://{}/node/containerlogs/{}", container.node_http_address, container.id),
              "Allocated container");
        self.registry.ensure_priority(container.priority);
        self.registry.insert(container, tid);
    }

    pub fn registry(&self) -> &ContainerRegistry {
        &self.registry
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::Acquire)
    }

    /// Shared release path for heartbeat completions and executor expiry.
    /// Consults the schedule chain, which may amend the diagnostic, then
    /// notifies the executor manager with the final text.
    pub fn on_container_released(&self, container: Container, exit_code: i32, diagnostics: &str, tid: &TransactionId) {
        self.registry.remove_from_band(container.priority, &container.id);
        let mut ctx = ScheduleContext::new(
            container.clone(),
            exit_code,
            diagnostics.to_string(),
            self.blacklist_tracker.clone(),
        );
        self.schedule_chain.process_released_container(&mut ctx);
        self.executors.handle(ExecutorEvent::ContainerReleased {
            container,
            exit_code,
            diagnostics: ctx.err_msg,
        });
        self.metrics.emit_counter(RELEASE_CONTAINER_COUNTER, &self.config.app_id, 1);
    }

    async fn tick(self: Arc<Self>, tid: TransactionId) {
        if let Err(e) = self.heartbeat(&tid).await {
            let diag = format!("Container manager heartbeat failed: {:#}", e);
            error!(tid=tid, error=%e, "Container manager heartbeat failed");
            self.abort(diag, &tid);
        }
    }

    /// One full round against the RM. The step order is fixed and observable:
    /// blacklist delta, allocate, release dispatch, allocation handling,
    /// completion fan-out, resource updates, solicitation, terminal checks.
    async fn heartbeat(self: &Arc<Self>, tid: &TransactionId) -> Result<()> {
        if self.stopped.load(Ordering::Acquire) {
            return Ok(());
        }
        let progress = self.progress.progress();

        let latest = self
            .blacklist_tracker
            .as_ref()
            .map(|t| t.node_blacklist())
            .unwrap_or_default();
        let (additions, removals) = self.blacklist.lock().delta(&latest);
        if !additions.is_empty() {
            info!(tid=tid, additions=?additions, "Blacklist additions");
        }
        if !removals.is_empty() {
            info!(tid=tid, removals=?removals, "Blacklist removals");
        }
        self.rm.update_blacklist(additions, removals).await?;
        self.blacklist.lock().commit(latest);

        let response = self.rm.allocate(progress).await?;

        for container in self.to_release.drain() {
            debug!(tid=tid, container_id=%container.id, "Releasing container to the RM");
            self.rm.release_assigned(container.id).await?;
        }

        self.policy.handle_allocation(self, &response, tid).await?;
        self.handle_completed_containers(&response.completed, tid);
        if self.config.scheduler.enable_update_resource {
            self.handle_updated_containers(&response.updated, tid);
            self.request_container_updates(tid).await?;
        }

        if !self.shutting_down.load(Ordering::Acquire) {
            self.policy.ask_for_containers(self, tid).await?;
        }

        if self.executors.is_all_success() {
            self.finish(tid);
        } else if self.executors.is_all_completed() {
            let diag = "All executors completed but not success";
            error!(tid = tid, "All executors completed but not success");
            self.abort(diag.to_string(), tid);
        }
        Ok(())
    }

    fn handle_completed_containers(&self, statuses: &[ContainerStatus], tid: &TransactionId) {
        for status in statuses {
            info!(tid=tid, container_id=%status.id, exit_status=status.exit_status, "Container completed");
            match self.registry.remove_by_id(&status.id, tid) {
                Some(container) => {
                    self.on_container_released(container, status.exit_status, &status.diagnostics, tid)
                },
                // an executor-expired event already reclaimed it
                None => warn!(tid=tid, container_id=%status.id, "Completed container is not in the running set"),
            }
        }
    }

    fn handle_updated_containers(&self, updated: &[UpdatedContainer], tid: &TransactionId) {
        for update in updated {
            let container = &update.container;
            info!(tid=tid, container_id=%container.id, kind=?update.kind, resource=%container.resource,
                  "RM reported a container update");
            self.registry.update_snapshot(container.clone(), tid);
            self.events.emit(AmEvent::ContainerUpdated {
                container: container.clone(),
            });
        }
    }

    /// Ask the RM to resize any running container whose role demand moved.
    async fn request_container_updates(&self, tid: &TransactionId) -> Result<()> {
        for container in self.registry.snapshot_all() {
            let target = match self.roles.role_by_priority(container.priority) {
                Some(role) => role.resource,
                None => continue,
            };
            if let Some(kind) = classify(&container.resource, &target) {
                let target = target.round_memory_up(MEMORY_GRANULARITY_MB);
                info!(tid=tid, container_id=%container.id, current=%container.resource, target=%target,
                      kind=?kind, "Requesting container update");
                self.rm
                    .request_container_update(
                        &container,
                        UpdateRequest {
                            version: container.version,
                            kind,
                            target,
                            execution: ExecutionKind::Guaranteed,
                        },
                    )
                    .await?;
            }
        }
        Ok(())
    }

    fn abort(&self, diagnostics: String, tid: &TransactionId) {
        debug!(tid=tid, diagnostics=%diagnostics, "Failing application attempt");
        self.events.emit(AmEvent::FailAttempt {
            diagnostics,
            exit_code: ApplicationExitCode::Abort,
        });
    }

    fn finish(&self, tid: &TransactionId) {
        info!(tid = tid, "All containers complete");
        self.events.emit(AmEvent::ApplicationSuccess {
            message: "All containers complete".to_string(),
            exit_code: ApplicationExitCode::ContainerComplete,
        });
    }
}
