use crate::transaction::TransactionId;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::debug;

/// Run `function` against `service` on a background Tokio task, once
/// immediately and then every `call_ms` milliseconds, until `stop` is set.
/// A `wake` notification cuts the sleep short so a pending stop (or other
/// urgent work) is observed without waiting out the period.
/// The task never outlives the runtime and does not block process shutdown.
pub fn tokio_interval_thread<S, T>(
    call_ms: u64,
    tid: TransactionId,
    service: Arc<S>,
    stop: Arc<AtomicBool>,
    wake: Arc<Notify>,
    function: fn(Arc<S>, TransactionId) -> T,
) -> JoinHandle<()>
where
    T: Future<Output = ()> + Send + 'static,
    S: Send + Sync + 'static,
{
    tokio::spawn(async move {
        debug!(tid=tid, typename=%std::any::type_name::<S>(), "Interval worker task started");
        while !stop.load(Ordering::Acquire) {
            function(service.clone(), tid.clone()).await;
            if stop.load(Ordering::Acquire) {
                break;
            }
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_millis(call_ms)) => {},
                _ = wake.notified() => {},
            }
        }
        debug!(tid = tid, "Interval worker task exited");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    struct Counter {
        ticks: AtomicU32,
    }
    async fn bump(svc: Arc<Counter>, _tid: TransactionId) {
        svc.ticks.fetch_add(1, Ordering::Relaxed);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn stop_interrupts_the_sleep() {
        let svc = Arc::new(Counter {
            ticks: AtomicU32::new(0),
        });
        let stop = Arc::new(AtomicBool::new(false));
        let wake = Arc::new(Notify::new());
        let handle = tokio_interval_thread(60_000, "test".to_string(), svc.clone(), stop.clone(), wake.clone(), bump);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(svc.ticks.load(Ordering::Relaxed), 1, "First tick runs immediately");
        stop.store(true, Ordering::Release);
        wake.notify_waiters();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("loop should exit well before the interval elapses")
            .unwrap();
    }
}
