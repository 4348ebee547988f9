//! Reminder pump - periodic firing of due reminders
//!
//! Polls the reminder service on an interval and delivers whatever came due.
//! Because the service fires everything with `fires_at <= now`, a pump that
//! was down across a fire time delivers late on its first tick after
//! recovery (unless the appointment has already started).

use std::sync::Arc;
use std::time::Duration;

use carebook_common::time::Clock;
use carebook_core::ReminderService;
use carebook_domain::constants::REMINDER_POLL_INTERVAL_SECS;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Type alias for task handle to avoid complexity warnings
type TaskHandle = Arc<Mutex<Option<JoinHandle<()>>>>;

/// Configuration for the reminder pump
#[derive(Debug, Clone)]
pub struct ReminderSchedulerConfig {
    /// Poll interval; bounds reminder delivery latency
    pub poll_interval: Duration,
}

impl Default for ReminderSchedulerConfig {
    fn default() -> Self {
        Self { poll_interval: Duration::from_secs(REMINDER_POLL_INTERVAL_SECS) }
    }
}

/// Background pump feeding the reminder service from the clock
pub struct ReminderScheduler {
    reminders: Arc<ReminderService>,
    clock: Arc<dyn Clock>,
    config: ReminderSchedulerConfig,
    cancellation_token: CancellationToken,
    task_handle: TaskHandle,
}

impl ReminderScheduler {
    /// Create a new reminder pump
    pub fn new(
        reminders: Arc<ReminderService>,
        clock: Arc<dyn Clock>,
        config: ReminderSchedulerConfig,
    ) -> Self {
        Self {
            reminders,
            clock,
            config,
            cancellation_token: CancellationToken::new(),
            task_handle: Arc::new(Mutex::new(None)),
        }
    }

    /// Start the pump
    ///
    /// # Errors
    ///
    /// Returns error if the pump is already running
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        info!("Starting reminder scheduler");

        // Fresh token so the pump can restart after a stop
        self.cancellation_token = CancellationToken::new();

        let reminders = Arc::clone(&self.reminders);
        let clock = Arc::clone(&self.clock);
        let poll_interval = self.config.poll_interval;
        let cancel = self.cancellation_token.clone();

        let handle = tokio::spawn(async move {
            Self::pump_loop(reminders, clock, poll_interval, cancel).await;
        });

        *self.task_handle.lock().await = Some(handle);

        info!("Reminder scheduler started");
        Ok(())
    }

    /// Stop the pump gracefully
    ///
    /// # Errors
    ///
    /// Returns error if the pump is not running
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        info!("Stopping reminder scheduler");

        self.cancellation_token.cancel();

        if let Some(handle) = self.task_handle.lock().await.take() {
            let join_timeout = Duration::from_secs(5);
            tokio::time::timeout(join_timeout, handle)
                .await
                .map_err(|_| SchedulerError::Timeout { seconds: join_timeout.as_secs() })?
                .map_err(|e| SchedulerError::TaskJoinFailed(e.to_string()))?;
        }

        info!("Reminder scheduler stopped");
        Ok(())
    }

    /// Check if the pump is running
    pub fn is_running(&self) -> bool {
        self.task_handle
            .try_lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    async fn pump_loop(
        reminders: Arc<ReminderService>,
        clock: Arc<dyn Clock>,
        poll_interval: Duration,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Reminder pump cancelled");
                    break;
                }
                _ = tokio::time::sleep(poll_interval) => {
                    let fired = reminders.fire_due(clock.now()).await;
                    if !fired.is_empty() {
                        debug!(count = fired.len(), "Reminders fired");
                    }
                }
            }
        }
    }
}

/// Ensure the pump is stopped when dropped
impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        if !self.cancellation_token.is_cancelled() {
            warn!("ReminderScheduler dropped while running; cancelling");
            self.cancellation_token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use carebook_common::time::MockClock;
    use carebook_core::Notifier;
    use carebook_domain::{NotificationKind, Result as DomainResult};
    use uuid::Uuid;

    use super::*;

    struct NullNotifier;

    #[async_trait]
    impl Notifier for NullNotifier {
        async fn notify(&self, _: Uuid, _: Uuid, _: NotificationKind) -> DomainResult<()> {
            Ok(())
        }
    }

    fn scheduler() -> ReminderScheduler {
        let reminders = Arc::new(ReminderService::new(Arc::new(NullNotifier)));
        let clock = Arc::new(MockClock::new());
        ReminderScheduler::new(reminders, clock, ReminderSchedulerConfig::default())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_scheduler_lifecycle() {
        let mut scheduler = scheduler();

        assert!(!scheduler.is_running());

        scheduler.start().await.unwrap();
        assert!(scheduler.is_running());

        scheduler.stop().await.unwrap();
        assert!(!scheduler.is_running());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_double_start_fails() {
        let mut scheduler = scheduler();

        scheduler.start().await.unwrap();

        let result = scheduler.start().await;
        assert!(matches!(result, Err(SchedulerError::AlreadyRunning)));

        scheduler.stop().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_stop_without_start_fails() {
        let mut scheduler = scheduler();

        let result = scheduler.stop().await;
        assert!(matches!(result, Err(SchedulerError::NotRunning)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_restart_after_stop() {
        let mut scheduler = scheduler();

        scheduler.start().await.unwrap();
        scheduler.stop().await.unwrap();

        scheduler.start().await.unwrap();
        assert!(scheduler.is_running());
        scheduler.stop().await.unwrap();
    }
}
