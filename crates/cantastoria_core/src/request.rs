//! Text generation request and response types.

use crate::Message;

/// A text generation request carrying the full conversation so far.
///
/// Build with [`GenerateRequest::builder`]. Only `messages` is required;
/// unset options fall back to provider defaults.
#[derive(
    Debug,
    Clone,
    PartialEq,
    serde::Serialize,
    serde::Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct GenerateRequest {
    /// Ordered conversation history, oldest first.
    messages: Vec<Message>,

    /// Model identifier override.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,

    /// Sampling temperature.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    /// Output token ceiling.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<i32>,
}

impl GenerateRequest {
    /// Start building a request.
    pub fn builder() -> GenerateRequestBuilder {
        GenerateRequestBuilder::default()
    }
}

/// Text returned by a generation call.
#[derive(
    Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, derive_getters::Getters,
)]
pub struct GenerateResponse {
    text: String,
}

impl GenerateResponse {
    /// Wrap response text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Consume the response, yielding the text.
    pub fn into_text(self) -> String {
        self.text
    }
}
