use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use priceforge_core::Clock;

use crate::fact_store::PriceFactStore;
use crate::service::PriceService;

/// Handle to control and join a background worker.
#[derive(Debug)]
pub struct WorkerHandle {
    shutdown: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl WorkerHandle {
    /// Request graceful shutdown and wait for the worker to stop.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

/// Periodically purges expired facts from a service's store.
///
/// Purely an optimization: reads filter expired facts regardless, so a stopped
/// or lagging worker only costs memory.
#[derive(Debug)]
pub struct CompactionWorker;

impl CompactionWorker {
    /// Spawn a worker thread that compacts every `interval`.
    pub fn spawn<S, C>(
        name: &'static str,
        service: Arc<PriceService<S, C>>,
        interval: Duration,
    ) -> std::io::Result<WorkerHandle>
    where
        S: PriceFactStore + 'static,
        C: Clock + 'static,
    {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let join = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || worker_loop(name, &service, shutdown_rx, interval))?;

        Ok(WorkerHandle {
            shutdown: shutdown_tx,
            join: Some(join),
        })
    }
}

fn worker_loop<S, C>(
    name: &'static str,
    service: &PriceService<S, C>,
    shutdown_rx: mpsc::Receiver<()>,
    interval: Duration,
) where
    S: PriceFactStore,
    C: Clock,
{
    loop {
        match shutdown_rx.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {
                if let Err(err) = service.compact() {
                    warn!(worker = name, error = %err, "compaction failed");
                }
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    debug!(worker = name, "compaction worker stopped");
}
