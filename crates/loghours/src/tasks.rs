use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::runtime::Handle;
use tokio::sync::Notify;
use tracing::debug;

/// Runs deferred work on the tokio runtime.
///
/// Submitting never blocks and returns nothing to wait on. Each submitted
/// future is polled to completion at most once. The pool only tracks how
/// many tasks are still running so shutdown can drain them.
#[derive(Debug, Clone)]
pub struct TaskPool {
    handle: Handle,
    state: Arc<PoolState>,
}

#[derive(Debug, Default)]
struct PoolState {
    in_flight: AtomicUsize,
    idle: Notify,
}

impl TaskPool {
    pub fn new(handle: Handle) -> Self {
        TaskPool {
            handle,
            state: Arc::new(PoolState::default()),
        }
    }

    pub fn submit<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.state.in_flight.fetch_add(1, Ordering::SeqCst);
        let guard = InFlightGuard {
            state: self.state.clone(),
        };

        // Join handle dropped, task is detached.
        let _ = self.handle.spawn(async move {
            let _guard = guard;
            fut.await;
        });
    }

    pub fn in_flight(&self) -> usize {
        self.state.in_flight.load(Ordering::SeqCst)
    }

    /// Wait until no submitted tasks are running.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.state.idle.notified();
            let remaining = self.in_flight();
            if remaining == 0 {
                return;
            }
            debug!(remaining, "waiting for background tasks");
            notified.await;
        }
    }
}

/// Decrements the in-flight count even if the task panics.
struct InFlightGuard {
    state: Arc<PoolState>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.state.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.state.idle.notify_waiters();
        }
    }
}
