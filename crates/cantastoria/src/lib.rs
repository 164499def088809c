//! Cantastoria turns a single subject prompt into a narrated picture show:
//! a multi-section script, one assembled narration audio file, and a set of
//! illustrations per section.
//!
//! The workspace is split by concern:
//!
//! - `cantastoria_core`: messages, requests, sentence chunking, progress events
//! - `cantastoria_interface`: the driver traits providers implement
//! - `cantastoria_models`: the Gemini provider client
//! - `cantastoria_rate_limit`: sliding-window limiter, backoff retrier, configuration
//! - `cantastoria_wave`: PCM-to-WAV packaging and fragment joining
//! - `cantastoria_storage`: artifact store and naming scheme
//! - `cantastoria_engine`: the script, audio, and image pipelines
//! - `cantastoria_error`: workspace error types
//!
//! This crate re-exports all of them and ships the `cantastoria` binary.

pub use cantastoria_core::*;
pub use cantastoria_engine::*;
pub use cantastoria_error::*;
pub use cantastoria_interface::*;
pub use cantastoria_models::*;
pub use cantastoria_rate_limit::*;
pub use cantastoria_storage::*;
pub use cantastoria_wave::*;
