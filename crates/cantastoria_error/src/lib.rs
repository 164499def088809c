#![forbid(unsafe_code)]
#![warn(missing_docs)]
//! Error types for the cantastoria generation engine.
//!
//! Each workspace crate has a dedicated error domain here, wrapped by
//! [`CantastoriaError`] for use at API boundaries. Domain errors record
//! the source location of their construction via `#[track_caller]`, so
//! a surfaced error names the file and line that raised it.
//!
//! # Examples
//!
//! ```
//! use cantastoria_error::{CantastoriaError, CantastoriaErrorKind, ConfigError};
//!
//! fn load() -> Result<(), CantastoriaError> {
//!     Err(ConfigError::new("no such profile").into())
//! }
//!
//! let err = load().unwrap_err();
//! assert!(matches!(err.kind(), CantastoriaErrorKind::Config(_)));
//! ```

mod builder;
mod config;
mod engine;
mod error;
mod gemini;
mod json;
mod retry;
mod storage;
mod wave;

pub use builder::BuilderError;
pub use config::ConfigError;
pub use engine::{EngineError, EngineErrorKind};
pub use error::{CantastoriaError, CantastoriaErrorKind, CantastoriaResult};
pub use gemini::{GeminiError, GeminiErrorKind};
pub use json::JsonError;
pub use retry::RetryableError;
pub use storage::{StorageError, StorageErrorKind};
pub use wave::{WaveError, WaveErrorKind};
