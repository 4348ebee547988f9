//! Notification adapters
//!
//! The engine decides when to notify; these adapters decide how hard to try.
//! `RetryingNotifier` wraps any transport with bounded exponential backoff,
//! and `LoggingNotifier` is the default sink for deployments without a real
//! transport wired in.

use std::sync::Arc;

use async_trait::async_trait;
use carebook_common::resilience::{retry, BackoffStrategy, Jitter, RetryConfig};
use carebook_core::Notifier;
use carebook_domain::constants::{
    NOTIFY_INITIAL_BACKOFF_MS, NOTIFY_MAX_ATTEMPTS, NOTIFY_MAX_BACKOFF_SECS,
};
use carebook_domain::{CarebookError, NotificationKind, Result};
use tracing::{info, warn};
use uuid::Uuid;

/// Transport stub that logs deliveries
pub struct LoggingNotifier;

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn notify(
        &self,
        participant_id: Uuid,
        appointment_id: Uuid,
        kind: NotificationKind,
    ) -> Result<()> {
        info!(
            participant_id = %participant_id,
            appointment_id = %appointment_id,
            ?kind,
            "Notification delivered"
        );
        Ok(())
    }
}

/// Decorator that retries a transport with bounded exponential backoff
///
/// Exhausted retries surface as `NotificationDelivery`; callers treat that
/// as a delivery failure event, never as a reason to roll anything back.
pub struct RetryingNotifier {
    inner: Arc<dyn Notifier>,
    config: RetryConfig,
}

impl RetryingNotifier {
    /// Wrap a transport with the engine's default delivery policy
    pub fn new(inner: Arc<dyn Notifier>) -> Self {
        Self {
            inner,
            config: RetryConfig {
                max_attempts: NOTIFY_MAX_ATTEMPTS,
                backoff: BackoffStrategy::Exponential {
                    initial_delay: std::time::Duration::from_millis(NOTIFY_INITIAL_BACKOFF_MS),
                    base: 2.0,
                    max_delay: std::time::Duration::from_secs(NOTIFY_MAX_BACKOFF_SECS),
                },
                jitter: Jitter::Equal,
            },
        }
    }

    /// Wrap a transport with a custom retry policy
    pub fn with_config(inner: Arc<dyn Notifier>, config: RetryConfig) -> Self {
        Self { inner, config }
    }
}

#[async_trait]
impl Notifier for RetryingNotifier {
    async fn notify(
        &self,
        participant_id: Uuid,
        appointment_id: Uuid,
        kind: NotificationKind,
    ) -> Result<()> {
        let inner = Arc::clone(&self.inner);
        retry(&self.config, || {
            let inner = Arc::clone(&inner);
            async move { inner.notify(participant_id, appointment_id, kind).await }
        })
        .await
        .map_err(|err| {
            warn!(
                participant_id = %participant_id,
                appointment_id = %appointment_id,
                ?kind,
                error = %err,
                "Notification delivery exhausted retries"
            );
            CarebookError::NotificationDelivery(err.into_source().to_string())
        })
    }
}
