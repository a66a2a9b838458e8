use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::app::TaskService;
use crate::ports::{Clock, EventSink, TaskRepository};

/// Background activation sweep handle.
/// - dropping the handle or calling `request_shutdown()` stops the loop
/// - `shutdown_and_join()` waits for the current pass to finish
pub struct ActivationSweep {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl ActivationSweep {
    /// Interval between sweeps unless the caller picks another one.
    pub const DEFAULT_PERIOD: Duration = Duration::from_secs(30);

    /// Spawn the sweep, activating due tasks every `period`.
    pub fn spawn<R, C, S>(service: Arc<TaskService<R, C, S>>, period: Duration) -> Self
    where
        R: TaskRepository + 'static,
        C: Clock + 'static,
        S: EventSink + 'static,
    {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(async move {
            sweep_loop(service, period, &mut shutdown_rx).await;
        });
        Self { shutdown_tx, join }
    }

    /// Request shutdown. The current pass is not cancelled; the loop stops
    /// before starting another one.
    pub fn request_shutdown(&self) {
        // ignore send error: receiver may already be dropped
        let _ = self.shutdown_tx.send(true);
    }

    /// Shutdown and wait for the loop.
    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        let _ = self.join.await;
    }
}

async fn sweep_loop<R, C, S>(
    service: Arc<TaskService<R, C, S>>,
    period: Duration,
    shutdown_rx: &mut watch::Receiver<bool>,
) where
    R: TaskRepository,
    C: Clock,
    S: EventSink,
{
    // The first tick fires at once, so startup catches up overdue tasks
    // without waiting a full period.
    let mut ticker = tokio::time::interval(period);

    loop {
        // shutdown が来ていたら抜ける
        if *shutdown_rx.borrow() {
            break;
        }

        // tick を待つ間も shutdown には即応する
        tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() {
                    // ハンドルごと drop されたら終了扱い
                    break;
                }
                continue;
            }
            _ = ticker.tick() => {}
        }

        match service.activate_due_tasks().await {
            Ok(0) => {}
            Ok(n) => info!("sweep activated {n} task(s)"),
            Err(err) => warn!("sweep failed: {err}"),
        }
    }
}
