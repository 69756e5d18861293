//! Poll scheduler: the only source of recurring background work.
//!
//! Each mounted viewer gets one `Poller` — a spawned tokio task that runs
//! its refresh callback immediately, then on every interval. The loop can
//! be woken early (after checkout or an admin write), suppressed entirely
//! while a modal editing session is open, and is cancelled through a
//! `CancellationToken` when the viewer unmounts, so no timer outlives its
//! viewer. In-flight refreshes are allowed to finish; their results are
//! discarded by the snapshot cells' sequence check.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Handle to one viewer's polling task.
pub struct Poller {
    token: CancellationToken,
    wake: Arc<Notify>,
    suppressed: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl Poller {
    /// Spawn the polling loop. `tick` is awaited to completion before the
    /// next sleep is armed, so a single poller never overlaps its own
    /// refreshes — overlap only arises from out-of-band refreshes, which the
    /// snapshot cells coalesce.
    pub fn spawn<F, Fut>(interval: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let token = CancellationToken::new();
        let wake = Arc::new(Notify::new());
        let suppressed = Arc::new(AtomicBool::new(false));

        let task = tokio::spawn({
            let token = token.clone();
            let wake = Arc::clone(&wake);
            let suppressed = Arc::clone(&suppressed);
            async move {
                info!(interval_ms = interval.as_millis() as u64, "poller started");
                loop {
                    if token.is_cancelled() {
                        break;
                    }
                    if suppressed.load(Ordering::SeqCst) {
                        debug!("refresh suppressed while editing session is open");
                    } else {
                        tick().await;
                    }
                    tokio::select! {
                        _ = token.cancelled() => break,
                        _ = wake.notified() => {}
                        _ = tokio::time::sleep(interval) => {}
                    }
                }
                info!("poller stopped");
            }
        });

        Self {
            token,
            wake,
            suppressed,
            task: Some(task),
        }
    }

    /// Wake the loop for an immediate tick instead of waiting out the
    /// interval. A wake issued while a tick is running is not lost — the
    /// loop re-ticks right after.
    pub fn refresh_now(&self) {
        self.wake.notify_one();
    }

    /// Skip ticks entirely while a modal editing session is open, so a
    /// concurrent server read never clobbers in-progress form state.
    pub fn set_suppressed(&self, suppressed: bool) {
        self.suppressed.store(suppressed, Ordering::SeqCst);
        debug!(suppressed, "poller suppression changed");
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed.load(Ordering::SeqCst)
    }

    /// Cancel the loop. Deterministic: the sleep itself is interrupted, not
    /// just flagged for the next wrap-around.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Cancel and wait for the task to wind down.
    pub async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        // A dropped handle must not leave an orphaned timer behind.
        self.token.cancel();
    }
}
