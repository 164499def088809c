#![forbid(unsafe_code)]
#![warn(missing_docs)]
//! Core data types for the cantastoria generation engine.
//!
//! Conversation turns, generation requests and payloads, sentence-aligned
//! [`chunking`], and the [`ProgressEvent`] stream that pipelines report
//! through. Everything here is provider-agnostic; provider bindings live
//! in `cantastoria_models`.
//!
//! # Examples
//!
//! ```
//! use cantastoria_core::{GenerateRequest, Message};
//!
//! let request = GenerateRequest::builder()
//!     .messages(vec![Message::user("Outline a story about tides.")])
//!     .temperature(Some(0.7))
//!     .build()
//!     .expect("messages is set");
//! assert_eq!(request.messages().len(), 1);
//! ```

pub mod chunking;
mod media;
mod message;
mod progress;
mod request;
mod role;

pub use media::{
    AudioPayload, ImagePayload, ImageRequest, ImageRequestBuilder, SpeechRequest,
    SpeechRequestBuilder,
};
pub use message::Message;
pub use progress::{ProgressEvent, ProgressSink};
pub use request::{GenerateRequest, GenerateRequestBuilder, GenerateResponse};
pub use role::Role;
