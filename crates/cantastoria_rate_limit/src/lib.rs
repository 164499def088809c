#![forbid(unsafe_code)]
#![warn(missing_docs)]
//! Rate limiting, retry, and configuration for the cantastoria
//! generation engine.
//!
//! Three pieces keep long generation runs inside provider quotas:
//!
//! - [`RateLimiter`]: sliding window pacing, one instance per channel
//! - [`Retrier`]: exponential backoff honoring server retry hints
//! - [`CantastoriaConfig`]: layered TOML settings for both, plus the
//!   generation pipelines
//!
//! # Examples
//!
//! ```
//! use cantastoria_rate_limit::RateLimiter;
//! use std::time::Duration;
//!
//! # async fn pace() {
//! let limiter = RateLimiter::per_minute(10);
//! limiter.admit().await;
//! # }
//! ```

mod config;
mod limiter;
mod retry;

pub use config::{
    AudioConfig, CantastoriaConfig, ImagesConfig, LimitsConfig, RetryConfig, ScriptConfig,
    StorageConfig, WindowConfig,
};
pub use limiter::RateLimiter;
pub use retry::{Retrier, RetryPolicy};
