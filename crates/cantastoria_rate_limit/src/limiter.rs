//! Sliding window rate limiter.

use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Pause added to every computed wait so a call lands safely inside the
/// next window rather than on its edge.
const DEFAULT_SAFETY_MARGIN: Duration = Duration::from_millis(50);

/// Paces calls so at most `max_requests` happen per sliding window.
///
/// The limiter keeps the timestamps of recent admissions. When the
/// window is full, [`admit`] sleeps until the oldest admission has aged
/// out, then records the new call. This throttles call rate only; it is
/// not a concurrency gate and never rejects.
///
/// Each provider channel (script, audio, images) gets its own instance
/// so pacing on one channel cannot starve another.
///
/// [`admit`]: RateLimiter::admit
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    safety_margin: Duration,
    admissions: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Create a limiter allowing `max_requests` per `window`.
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            safety_margin: DEFAULT_SAFETY_MARGIN,
            admissions: Mutex::new(VecDeque::new()),
        }
    }

    /// Create a limiter over a one minute window.
    pub fn per_minute(max_requests: u32) -> Self {
        Self::new(max_requests, Duration::from_secs(60))
    }

    /// Replace the safety margin added to each computed wait.
    pub fn with_safety_margin(mut self, margin: Duration) -> Self {
        self.safety_margin = margin;
        self
    }

    /// Wait for a slot in the window, then record the admission.
    ///
    /// Returns immediately while fewer than `max_requests` admissions
    /// remain in the window. Otherwise sleeps for
    /// `window - age_of_oldest + safety_margin` before recording.
    pub async fn admit(&self) {
        let mut admissions = self.admissions.lock().await;
        Self::evict_expired(&mut admissions, self.window);

        if admissions.len() >= self.max_requests as usize {
            if let Some(oldest) = admissions.front().copied() {
                let age = oldest.elapsed();
                let wait = self.window.saturating_sub(age) + self.safety_margin;
                warn!(
                    wait_ms = wait.as_millis() as u64,
                    in_window = admissions.len(),
                    "rate limit window full, pacing"
                );
                // Do not hold the lock across the sleep.
                drop(admissions);
                tokio::time::sleep(wait).await;
                admissions = self.admissions.lock().await;
                Self::evict_expired(&mut admissions, self.window);
            }
        } else {
            debug!(in_window = admissions.len(), "rate limit slot free");
        }

        admissions.push_back(Instant::now());
    }

    /// Number of admissions still inside the window.
    pub async fn admitted_in_window(&self) -> usize {
        let mut admissions = self.admissions.lock().await;
        Self::evict_expired(&mut admissions, self.window);
        admissions.len()
    }

    fn evict_expired(admissions: &mut VecDeque<Instant>, window: Duration) {
        while admissions.front().is_some_and(|t| t.elapsed() >= window) {
            admissions.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn admits_up_to_limit_instantly() {
        let limiter = RateLimiter::new(3, Duration::from_millis(200));
        let start = Instant::now();
        for _ in 0..3 {
            limiter.admit().await;
        }
        assert!(start.elapsed() < Duration::from_millis(50));
        assert_eq!(limiter.admitted_in_window().await, 3);
    }

    #[tokio::test]
    async fn delays_the_call_past_the_limit() {
        let limiter = RateLimiter::new(2, Duration::from_millis(200))
            .with_safety_margin(Duration::from_millis(10));
        limiter.admit().await;
        limiter.admit().await;

        let start = Instant::now();
        limiter.admit().await;
        let waited = start.elapsed();
        assert!(waited >= Duration::from_millis(150), "waited {waited:?}");
        assert!(waited < Duration::from_millis(500), "waited {waited:?}");
    }

    #[tokio::test]
    async fn expired_admissions_free_the_window() {
        let limiter = RateLimiter::new(1, Duration::from_millis(100));
        limiter.admit().await;
        tokio::time::sleep(Duration::from_millis(150)).await;

        let start = Instant::now();
        limiter.admit().await;
        assert!(start.elapsed() < Duration::from_millis(50));
        assert_eq!(limiter.admitted_in_window().await, 1);
    }

    #[tokio::test]
    async fn channels_do_not_interact() {
        let script = RateLimiter::new(1, Duration::from_millis(500));
        let audio = RateLimiter::new(1, Duration::from_millis(500));
        script.admit().await;

        let start = Instant::now();
        audio.admit().await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
