//! Lifecycle sweeper - periodic resolution of elapsed appointments
//!
//! Drives the coordinator's lifecycle sweep on an interval: confirmed
//! appointments past their end become `Completed` or, after the grace
//! window with no check-in, `NoShow`. Optionally archives terminal
//! appointments older than the retention window on each tick.

use std::sync::Arc;
use std::time::Duration;

use carebook_core::BookingCoordinator;
use carebook_domain::constants::{LIFECYCLE_SWEEP_INTERVAL_SECS, RETENTION_WINDOW};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Type alias for task handle to avoid complexity warnings
type TaskHandle = Arc<Mutex<Option<JoinHandle<()>>>>;

/// Configuration for the lifecycle sweeper
#[derive(Debug, Clone)]
pub struct LifecycleSchedulerConfig {
    /// Sweep interval
    pub sweep_interval: Duration,
    /// Retention window for terminal appointments; `None` disables archival
    pub retention: Option<Duration>,
}

impl Default for LifecycleSchedulerConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(LIFECYCLE_SWEEP_INTERVAL_SECS),
            retention: Some(RETENTION_WINDOW),
        }
    }
}

/// Background sweeper resolving elapsed appointments
pub struct LifecycleScheduler {
    coordinator: Arc<BookingCoordinator>,
    config: LifecycleSchedulerConfig,
    cancellation_token: CancellationToken,
    task_handle: TaskHandle,
}

impl LifecycleScheduler {
    /// Create a new lifecycle sweeper
    pub fn new(coordinator: Arc<BookingCoordinator>, config: LifecycleSchedulerConfig) -> Self {
        Self {
            coordinator,
            config,
            cancellation_token: CancellationToken::new(),
            task_handle: Arc::new(Mutex::new(None)),
        }
    }

    /// Start the sweeper
    ///
    /// # Errors
    ///
    /// Returns error if the sweeper is already running
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        info!("Starting lifecycle scheduler");

        self.cancellation_token = CancellationToken::new();

        let coordinator = Arc::clone(&self.coordinator);
        let config = self.config.clone();
        let cancel = self.cancellation_token.clone();

        let handle = tokio::spawn(async move {
            Self::sweep_loop(coordinator, config, cancel).await;
        });

        *self.task_handle.lock().await = Some(handle);

        info!("Lifecycle scheduler started");
        Ok(())
    }

    /// Stop the sweeper gracefully
    ///
    /// # Errors
    ///
    /// Returns error if the sweeper is not running
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        info!("Stopping lifecycle scheduler");

        self.cancellation_token.cancel();

        if let Some(handle) = self.task_handle.lock().await.take() {
            let join_timeout = Duration::from_secs(5);
            tokio::time::timeout(join_timeout, handle)
                .await
                .map_err(|_| SchedulerError::Timeout { seconds: join_timeout.as_secs() })?
                .map_err(|e| SchedulerError::TaskJoinFailed(e.to_string()))?;
        }

        info!("Lifecycle scheduler stopped");
        Ok(())
    }

    /// Check if the sweeper is running
    pub fn is_running(&self) -> bool {
        self.task_handle
            .try_lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    async fn sweep_loop(
        coordinator: Arc<BookingCoordinator>,
        config: LifecycleSchedulerConfig,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Lifecycle sweep loop cancelled");
                    break;
                }
                _ = tokio::time::sleep(config.sweep_interval) => {
                    let report = coordinator.lifecycle_sweep().await;
                    if report.completed > 0 || report.no_shows > 0 {
                        info!(
                            completed = report.completed,
                            no_shows = report.no_shows,
                            "Lifecycle sweep resolved appointments"
                        );
                    }

                    if let Some(retention) = config.retention {
                        coordinator.archive_expired(retention);
                    }
                }
            }
        }
    }
}

/// Ensure the sweeper is stopped when dropped
impl Drop for LifecycleScheduler {
    fn drop(&mut self) {
        if !self.cancellation_token.is_cancelled() {
            warn!("LifecycleScheduler dropped while running; cancelling");
            self.cancellation_token.cancel();
        }
    }
}
