//! Google Gemini provider.

mod client;
pub mod protocol;

pub use client::GeminiClient;

pub(crate) type GeminiResult<T> = Result<T, cantastoria_error::GeminiError>;
