//! Exponential backoff around remote calls.

use cantastoria_core::{ProgressEvent, ProgressSink};
use cantastoria_error::{CantastoriaResult, EngineError, EngineErrorKind, RetryableError};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_retry2::strategy::ExponentialBackoff;
use tokio_retry2::{Retry, RetryError};
use tracing::warn;

/// Backoff shape for one retrier.
///
/// `max_attempts` counts retries after the first try, so an operation
/// runs at most `max_attempts + 1` times. Delays double from
/// `base_delay` and are capped at `max_delay`; a server-suggested delay
/// overrides the computed one when it is longer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retry ceiling, not counting the first attempt
    pub max_attempts: usize,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Upper bound on any single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(60),
        }
    }
}

/// Runs an operation under a [`RetryPolicy`], reporting each retry.
///
/// Failures are classified through [`RetryableError`]: transient ones
/// wait and run again, everything else propagates at once. When the
/// policy runs out, the final failure surfaces as
/// [`EngineErrorKind::ExhaustedRetries`] so callers can tell an
/// exhausted unit from a single hard failure.
#[derive(Debug, Clone)]
pub struct Retrier {
    policy: RetryPolicy,
    sink: ProgressSink,
}

impl Retrier {
    /// Create a retrier reporting through `sink`.
    pub fn new(policy: RetryPolicy, sink: ProgressSink) -> Self {
        Self { policy, sink }
    }

    /// The policy this retrier applies.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `operation` until it succeeds, fails permanently, or the
    /// policy is exhausted. `label` names the unit of work in retry
    /// events and logs.
    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> CantastoriaResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = CantastoriaResult<T>>,
    {
        let failures = AtomicUsize::new(0);
        let max_attempts = self.policy.max_attempts;
        // from_millis sets the exponent base, so growth is written as
        // 2^n and base_delay becomes the constant factor.
        let strategy = ExponentialBackoff::from_millis(2)
            .factor((self.policy.base_delay.as_millis() as u64 / 2).max(1))
            .max_delay(self.policy.max_delay)
            .take(max_attempts);

        let result = Retry::spawn(strategy, || {
            let fut = operation();
            let failures = &failures;
            let sink = &self.sink;
            async move {
                match fut.await {
                    Ok(value) => Ok(value),
                    Err(e) if e.is_retryable() => {
                        let failed = failures.fetch_add(1, Ordering::SeqCst) + 1;
                        if failed <= max_attempts {
                            warn!(
                                attempt = failed,
                                max_attempts,
                                error = %e,
                                "{label} failed, will retry"
                            );
                            sink.emit(ProgressEvent::retry(
                                failed,
                                max_attempts,
                                format!("{label}: {e}"),
                            ));
                        }
                        let retry_after = e.retry_after();
                        Err(RetryError::Transient { err: e, retry_after })
                    }
                    Err(e) => Err(RetryError::Permanent(e)),
                }
            }
        })
        .await;

        match result {
            Ok(value) => Ok(value),
            Err(e) if e.is_retryable() => {
                let attempts = failures.load(Ordering::SeqCst);
                warn!(attempts, error = %e, "{label} exhausted its retries");
                Err(EngineError::new(EngineErrorKind::ExhaustedRetries {
                    attempts,
                    cause: e.to_string(),
                })
                .into())
            }
            Err(e) => Err(e),
        }
    }
}
