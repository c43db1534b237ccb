mod session_cleanup;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

use crate::services::SessionOrchestrator;

pub use session_cleanup::evict_idle_sessions;

pub struct WorkerManager {
    scheduler: Mutex<JobScheduler>,
    shutdown_tx: broadcast::Sender<()>,
    orchestrator: Arc<SessionOrchestrator>,
    running: AtomicBool,
}

impl WorkerManager {
    pub async fn new(orchestrator: Arc<SessionOrchestrator>) -> Result<Self, WorkerError> {
        let scheduler = JobScheduler::new().await?;
        let (shutdown_tx, _) = broadcast::channel(1);
        Ok(Self {
            scheduler: Mutex::new(scheduler),
            shutdown_tx,
            orchestrator,
            running: AtomicBool::new(false),
        })
    }

    /// Schedules the idle-session sweep on `schedule` (six-field cron, seconds first).
    pub async fn start(&self, schedule: &str) -> Result<(), WorkerError> {
        let orchestrator = Arc::clone(&self.orchestrator);
        let shutdown_rx = self.shutdown_tx.subscribe();
        let job = Job::new_async(schedule, move |_uuid, _lock| {
            let orchestrator = Arc::clone(&orchestrator);
            let mut rx = shutdown_rx.resubscribe();
            Box::pin(async move {
                tokio::select! {
                    _ = rx.recv() => {},
                    result = evict_idle_sessions(orchestrator) => {
                        if let Err(e) = result {
                            error!(error = %e, "Session cleanup worker error");
                        }
                    }
                }
            })
        })?;

        let scheduler = self.scheduler.lock().await;
        scheduler.add(job).await?;
        scheduler.start().await?;
        self.running.store(true, Ordering::Relaxed);
        info!(schedule = %schedule, "Session cleanup worker scheduled");
        Ok(())
    }

    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::Relaxed) {
            return;
        }

        info!("Stopping workers...");
        let _ = self.shutdown_tx.send(());

        let mut scheduler = self.scheduler.lock().await;
        if let Err(e) = scheduler.shutdown().await {
            warn!(error = %e, "Error shutting down scheduler");
        }
        info!("Workers stopped");
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] tokio_cron_scheduler::JobSchedulerError),
}
