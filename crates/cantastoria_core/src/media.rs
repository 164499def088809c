//! Speech and image request/payload types.

/// A speech synthesis request.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct SpeechRequest {
    /// Text to narrate.
    text: String,

    /// Prebuilt voice name override.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    voice: Option<String>,

    /// Model identifier override.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
}

impl SpeechRequest {
    /// Start building a speech request.
    pub fn builder() -> SpeechRequestBuilder {
        SpeechRequestBuilder::default()
    }
}

/// Audio returned by a synthesis call, still in wire form.
///
/// `data` is the base64 sample payload exactly as the API returned it.
/// The wave crate decodes it and wraps raw PCM in a container.
#[derive(
    Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, derive_getters::Getters,
)]
pub struct AudioPayload {
    mime_type: String,
    data: String,
}

impl AudioPayload {
    /// Wrap an inline audio payload.
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }
}

/// An image generation request.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct ImageRequest {
    /// Prompt describing the image.
    prompt: String,

    /// Model identifier override.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,

    /// Number of variants to generate.
    #[builder(default = "1")]
    count: u32,
}

impl ImageRequest {
    /// Start building an image request.
    pub fn builder() -> ImageRequestBuilder {
        ImageRequestBuilder::default()
    }
}

/// One decoded image artifact.
#[derive(
    Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, derive_getters::Getters,
)]
pub struct ImagePayload {
    mime_type: String,
    data: Vec<u8>,
}

impl ImagePayload {
    /// Wrap decoded image bytes.
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Consume the payload, yielding the bytes.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}
