//! Background auto-save driver.
//!
//! Ticks a shared [`DraftController`] at a fixed cadence until it is disposed
//! or [`AutoSaveDriver::shutdown`] is called. Save failures are already
//! reported by the controller; the driver only keeps ticking.

use std::sync::Arc;
use std::time::Duration;

use relief_core::DraftDocument;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::collaborators::{DraftStore, FileTransfer};
use crate::controller::DraftController;

pub struct AutoSaveDriver {
    shutdown_tx: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl AutoSaveDriver {
    /// Spawn the tick loop on the current runtime. The first tick happens one
    /// `tick` after spawning.
    pub fn spawn<D, S, F>(controller: Arc<Mutex<DraftController<D, S, F>>>, tick: Duration) -> Self
    where
        D: DraftDocument,
        S: DraftStore<D> + 'static,
        F: FileTransfer + 'static,
    {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let handle = tokio::spawn(Self::run(controller, tick, shutdown_rx));
        Self {
            shutdown_tx,
            handle,
        }
    }

    async fn run<D, S, F>(
        controller: Arc<Mutex<DraftController<D, S, F>>>,
        tick: Duration,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) where
        D: DraftDocument,
        S: DraftStore<D>,
        F: FileTransfer,
    {
        tracing::debug!(draft_kind = %D::KIND, tick_ms = tick.as_millis() as u64, "Auto-save driver started");
        let mut interval = interval_at(Instant::now() + tick, tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let mut controller = controller.lock().await;
                    if controller.is_disposed() {
                        break;
                    }
                    if let Some(Err(e)) = controller.tick().await {
                        tracing::debug!(error = %e, "Auto-save attempt failed, will retry");
                    }
                }
                _ = shutdown_rx.recv() => break,
            }
        }

        tracing::debug!(draft_kind = %D::KIND, "Auto-save driver stopped");
    }

    /// Stop ticking. Does not wait for an in-flight save.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for AutoSaveDriver {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
