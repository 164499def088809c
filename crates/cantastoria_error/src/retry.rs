//! Retry classification for provider errors.

use crate::{CantastoriaError, CantastoriaErrorKind, GeminiError};
use std::time::Duration;

/// Classifies errors for the backoff retrier.
///
/// An error is retryable when a fresh attempt at the identical request
/// could succeed. Quota errors may additionally carry a server-suggested
/// delay, which the retrier honors as a lower bound on its backoff.
pub trait RetryableError {
    /// Whether the failed operation should be attempted again.
    fn is_retryable(&self) -> bool;

    /// Server-suggested delay before the next attempt, if any.
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

impl RetryableError for GeminiError {
    fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }

    fn retry_after(&self) -> Option<Duration> {
        self.kind().retry_after()
    }
}

/// Only provider errors are retryable. Local failures such as storage or
/// container assembly repeat deterministically and propagate at once.
impl RetryableError for CantastoriaError {
    fn is_retryable(&self) -> bool {
        match self.kind() {
            CantastoriaErrorKind::Gemini(e) => e.is_retryable(),
            _ => false,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self.kind() {
            CantastoriaErrorKind::Gemini(e) => e.retry_after(),
            _ => None,
        }
    }
}
