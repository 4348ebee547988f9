//! Error types used throughout the scheduling engine

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Carebook
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum CarebookError {
    /// Unknown participant or appointment id
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed or inverted time bounds; caller error, not retried
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// Non-positive or otherwise unusable duration
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    /// Slot taken by a concurrent winner; caller should re-query and retry
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Illegal state-machine transition; caller error
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// Request shape violation (missing or inconsistent fields)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Transient notification failure; retried with backoff, never rolls
    /// back ledger state
    #[error("Notification delivery failed: {0}")]
    NotificationDelivery(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Carebook operations
pub type Result<T> = std::result::Result<T, CarebookError>;
