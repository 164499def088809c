//! Capability traits implemented by provider clients.

use async_trait::async_trait;
use cantastoria_core::{
    AudioPayload, GenerateRequest, GenerateResponse, ImagePayload, ImageRequest, SpeechRequest,
};
use cantastoria_error::CantastoriaResult;

/// Base capability: multi-turn text generation.
///
/// Pipelines depend on this trait rather than a concrete client, so a
/// stub driver can stand in for the remote service under test.
#[async_trait]
pub trait CantastoriaDriver: Send + Sync {
    /// Generate a response to the conversation in `request`.
    async fn generate(&self, request: &GenerateRequest) -> CantastoriaResult<GenerateResponse>;

    /// Provider name, e.g. "gemini".
    fn provider_name(&self) -> &'static str;

    /// Default model this driver calls.
    fn model_name(&self) -> &str;
}

/// Speech synthesis capability.
#[async_trait]
pub trait SpeechSynthesis: CantastoriaDriver {
    /// Narrate `request`, returning the inline audio payload.
    async fn synthesize(&self, request: &SpeechRequest) -> CantastoriaResult<AudioPayload>;
}

/// Image generation capability.
#[async_trait]
pub trait ImageSynthesis: CantastoriaDriver {
    /// Generate one or more images for `request`.
    async fn paint(&self, request: &ImageRequest) -> CantastoriaResult<Vec<ImagePayload>>;
}
