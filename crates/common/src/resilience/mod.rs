//! Resilience utilities
//!
//! Retry with bounded backoff for operations that fail transiently.

mod retry;

pub use retry::{retry, BackoffStrategy, Jitter, RetryConfig, RetryError};
