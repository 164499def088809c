#![forbid(unsafe_code)]
#![warn(missing_docs)]
//! Provider clients for the cantastoria generation engine.
//!
//! Each provider implements the capability traits from
//! `cantastoria_interface`. Gemini is the only provider today: text
//! generation goes through the official SDK, while speech and image
//! synthesis call the REST endpoints directly.

#[cfg(feature = "gemini")]
pub mod gemini;

#[cfg(feature = "gemini")]
pub use gemini::GeminiClient;
