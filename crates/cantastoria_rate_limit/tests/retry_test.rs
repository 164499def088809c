//! Backoff retrier behavior against scripted failure sequences.

use cantastoria_core::{ProgressEvent, ProgressSink};
use cantastoria_error::{
    CantastoriaError, CantastoriaErrorKind, EngineErrorKind, GeminiError, GeminiErrorKind,
};
use cantastoria_rate_limit::{Retrier, RetryPolicy};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

fn http_error(status_code: u16, retry_after: Option<Duration>) -> CantastoriaError {
    GeminiError::new(GeminiErrorKind::HttpStatus {
        status_code,
        message: format!("scripted status {status_code}"),
        retry_after,
    })
    .into()
}

fn policy(max_attempts: usize, base_ms: u64) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        base_delay: Duration::from_millis(base_ms),
        max_delay: Duration::from_secs(5),
    }
}

#[tokio::test]
async fn succeeds_after_transient_failures() {
    let (sink, mut rx) = ProgressSink::channel();
    let retrier = Retrier::new(policy(5, 50), sink.clone());
    let calls = AtomicUsize::new(0);

    let start = Instant::now();
    let result = retrier
        .run("outline", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(http_error(503, None))
                } else {
                    Ok("outline text")
                }
            }
        })
        .await;
    let elapsed = start.elapsed();

    assert_eq!(result.expect("third attempt succeeds"), "outline text");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    // Two backoff delays: 50ms then 100ms.
    assert!(elapsed >= Duration::from_millis(150), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_millis(600), "elapsed {elapsed:?}");

    drop(sink);
    drop(retrier);
    let mut attempts = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let ProgressEvent::Retry {
            attempt,
            max_attempts,
            message,
        } = event
        {
            assert_eq!(max_attempts, 5);
            assert!(message.contains("outline"), "message {message:?}");
            attempts.push(attempt);
        }
    }
    assert_eq!(attempts, vec![1, 2]);
}

#[tokio::test]
async fn exhaustion_is_distinguishable_from_a_single_failure() {
    let retrier = Retrier::new(policy(2, 10), ProgressSink::disabled());
    let calls = AtomicUsize::new(0);

    let result: Result<(), _> = retrier
        .run("section 4", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(http_error(503, None)) }
        })
        .await;

    // Initial attempt plus two retries.
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    let err = result.expect_err("policy exhausts");
    match err.kind() {
        CantastoriaErrorKind::Engine(e) => match e.kind() {
            EngineErrorKind::ExhaustedRetries { attempts, cause } => {
                assert_eq!(*attempts, 3);
                assert!(cause.contains("503"), "cause {cause:?}");
            }
            other => panic!("expected ExhaustedRetries, got {other:?}"),
        },
        other => panic!("expected engine error, got {other:?}"),
    }
}

#[tokio::test]
async fn permanent_failure_propagates_without_retry() {
    let retrier = Retrier::new(policy(5, 10), ProgressSink::disabled());
    let calls = AtomicUsize::new(0);

    let start = Instant::now();
    let result: Result<(), _> = retrier
        .run("image 1", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(http_error(400, None)) }
        })
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(start.elapsed() < Duration::from_millis(50));
    let err = result.expect_err("bad request is permanent");
    match err.kind() {
        CantastoriaErrorKind::Gemini(e) => {
            assert!(matches!(
                e.kind(),
                GeminiErrorKind::HttpStatus {
                    status_code: 400,
                    ..
                }
            ));
        }
        other => panic!("expected gemini error, got {other:?}"),
    }
}

#[tokio::test]
async fn server_hint_stretches_the_delay() {
    let retrier = Retrier::new(policy(3, 10), ProgressSink::disabled());
    let calls = AtomicUsize::new(0);

    let start = Instant::now();
    let result = retrier
        .run("audio chunk 2", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(http_error(429, Some(Duration::from_millis(200))))
                } else {
                    Ok(())
                }
            }
        })
        .await;

    result.expect("second attempt succeeds");
    // The 200ms hint wins over the 10ms computed delay.
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(200), "elapsed {elapsed:?}");
}
