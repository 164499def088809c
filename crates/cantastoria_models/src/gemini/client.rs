//! Gemini driver: pooled SDK clients for text, REST for speech and images.

use crate::gemini::{protocol, GeminiResult};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use cantastoria_core::{
    AudioPayload, GenerateRequest, GenerateResponse, ImagePayload, ImageRequest, Role,
    SpeechRequest,
};
use cantastoria_error::{CantastoriaResult, GeminiError, GeminiErrorKind};
use cantastoria_interface::{CantastoriaDriver, ImageSynthesis, SpeechSynthesis};
use cantastoria_rate_limit::CantastoriaConfig;
use gemini_rust::{client::Model, Gemini};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, instrument};

/// REST base shared by the speech and image paths.
const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_SPEECH_MODEL: &str = "gemini-2.5-flash-preview-tts";
const DEFAULT_IMAGE_MODEL: &str = "imagen-3.0-generate-002";
const DEFAULT_VOICE: &str = "Kore";

// ─── CLIENT ─────────────────────────────────────────────────────────────────────

/// Gemini API client covering text, speech, and image generation.
///
/// Text generation goes through the official SDK with one pooled client
/// per model name. Speech synthesis and image prediction use the REST
/// endpoints directly since the SDK does not surface them.
///
/// Reads the API key from the `GEMINI_API_KEY` environment variable.
#[derive(Clone)]
pub struct GeminiClient {
    /// SDK clients keyed by model name
    clients: Arc<Mutex<HashMap<String, Gemini>>>,
    /// Shared HTTP client for the REST paths
    http: reqwest::Client,
    api_key: String,
    text_model: String,
    speech_model: String,
    image_model: String,
    voice: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cached = self.clients.lock().map(|pool| pool.len()).unwrap_or(0);
        f.debug_struct("GeminiClient")
            .field("text_model", &self.text_model)
            .field("speech_model", &self.speech_model)
            .field("image_model", &self.image_model)
            .field("voice", &self.voice)
            .field("cached_clients", &cached)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Create a client with the default models and voice.
    ///
    /// # Errors
    ///
    /// Returns an error if `GEMINI_API_KEY` is not set.
    pub fn new() -> CantastoriaResult<Self> {
        Self::new_internal(
            DEFAULT_TEXT_MODEL,
            DEFAULT_SPEECH_MODEL,
            DEFAULT_IMAGE_MODEL,
            DEFAULT_VOICE,
        )
        .map_err(Into::into)
    }

    /// Create a client with models and voice taken from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `GEMINI_API_KEY` is not set.
    pub fn from_config(config: &CantastoriaConfig) -> CantastoriaResult<Self> {
        Self::new_internal(
            config.script.model.as_str(),
            config.audio.model.as_str(),
            config.images.model.as_str(),
            config.audio.voice.as_str(),
        )
        .map_err(Into::into)
    }

    fn new_internal(
        text_model: &str,
        speech_model: &str,
        image_model: &str,
        voice: &str,
    ) -> GeminiResult<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| GeminiError::new(GeminiErrorKind::MissingApiKey))?;

        Ok(Self {
            clients: Arc::new(Mutex::new(HashMap::new())),
            http: reqwest::Client::new(),
            api_key,
            text_model: text_model.to_string(),
            speech_model: speech_model.to_string(),
            image_model: image_model.to_string(),
            voice: voice.to_string(),
        })
    }

    /// Map a model name string to the SDK's model enum.
    fn model_name_to_enum(model_name: &str) -> Model {
        match model_name {
            "gemini-2.5-flash" => Model::Gemini25Flash,
            "gemini-2.5-flash-lite" => Model::Gemini25FlashLite,
            "gemini-2.5-pro" => Model::Gemini25Pro,
            "text-embedding-004" => Model::TextEmbedding004,
            custom => Model::Custom(format!("models/{}", custom)),
        }
    }

    /// Fetch or create the pooled SDK client for a model.
    fn pooled_client(&self, model_name: &str) -> GeminiResult<Gemini> {
        let mut clients = self.clients.lock().unwrap();
        if let Some(client) = clients.get(model_name) {
            return Ok(client.clone());
        }

        debug!(model = model_name, "Creating Gemini client");
        let model = Self::model_name_to_enum(model_name);
        let client = Gemini::with_model(&self.api_key, model)
            .map_err(|e| GeminiError::new(GeminiErrorKind::ClientCreation(e.to_string())))?;
        clients.insert(model_name.to_string(), client.clone());
        Ok(client)
    }

    // ─── TEXT ───────────────────────────────────────────────────────────────────

    #[instrument(skip(self, request))]
    async fn generate_internal(&self, request: &GenerateRequest) -> GeminiResult<GenerateResponse> {
        let model_name = request.model().as_deref().unwrap_or(&self.text_model);
        let client = self.pooled_client(model_name)?;

        let mut builder = client.generate_content();
        let mut system_prompt = None;
        for message in request.messages() {
            match message.role() {
                Role::System => system_prompt = Some(message.content()),
                Role::User => builder = builder.with_user_message(message.content()),
                Role::Assistant => builder = builder.with_model_message(message.content()),
            }
        }
        if let Some(prompt) = system_prompt {
            builder = builder.with_system_prompt(prompt);
        }
        if let Some(temperature) = request.temperature() {
            builder = builder.with_temperature(*temperature);
        }
        if let Some(max_tokens) = request.max_tokens() {
            builder = builder.with_max_output_tokens(*max_tokens);
        }

        debug!(model = model_name, turns = request.messages().len(), "Generating content");
        let response = builder.execute().await.map_err(Self::parse_gemini_error)?;
        Ok(GenerateResponse::new(response.text()))
    }

    // ─── SPEECH ─────────────────────────────────────────────────────────────────

    #[instrument(skip(self, request), fields(chars = request.text().len()))]
    async fn synthesize_internal(&self, request: &SpeechRequest) -> GeminiResult<AudioPayload> {
        let model = request.model().as_deref().unwrap_or(&self.speech_model);
        let voice = request.voice().as_deref().unwrap_or(&self.voice);
        let url = format!("{API_BASE}/models/{model}:generateContent");
        let body = protocol::speech_request(request.text(), voice);

        debug!(model, voice, "Synthesizing speech");
        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| GeminiError::new(GeminiErrorKind::ApiRequest(e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(protocol::status_error(status.as_u16(), &body_text));
        }

        let parsed: protocol::GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GeminiError::new(GeminiErrorKind::ApiRequest(e.to_string())))?;

        parsed
            .inline_audio()
            .ok_or_else(|| GeminiError::new(GeminiErrorKind::MissingInlineData("audio".into())))
    }

    // ─── IMAGES ─────────────────────────────────────────────────────────────────

    #[instrument(skip(self, request))]
    async fn paint_internal(&self, request: &ImageRequest) -> GeminiResult<Vec<ImagePayload>> {
        let model = request.model().as_deref().unwrap_or(&self.image_model);
        let url = format!("{API_BASE}/models/{model}:predict");
        let body = protocol::predict_request(request.prompt(), *request.count());

        debug!(model, count = *request.count(), "Requesting images");
        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| GeminiError::new(GeminiErrorKind::ApiRequest(e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(protocol::status_error(status.as_u16(), &body_text));
        }

        let parsed: protocol::PredictResponse = response
            .json()
            .await
            .map_err(|e| GeminiError::new(GeminiErrorKind::ApiRequest(e.to_string())))?;

        let mut images = Vec::with_capacity(parsed.predictions.len());
        for prediction in parsed.predictions {
            let Some(encoded) = prediction.bytes_base64_encoded else {
                continue;
            };
            let bytes = STANDARD
                .decode(encoded.trim())
                .map_err(|e| GeminiError::new(GeminiErrorKind::Base64Decode(e.to_string())))?;
            let mime = prediction.mime_type.unwrap_or_else(|| "image/png".to_string());
            images.push(ImagePayload::new(mime, bytes));
        }

        if images.is_empty() {
            return Err(GeminiError::new(GeminiErrorKind::MissingInlineData(
                "image".into(),
            )));
        }
        Ok(images)
    }

    // ─── ERROR PARSING ──────────────────────────────────────────────────────────

    /// Convert an SDK error into a structured error.
    ///
    /// The SDK flattens HTTP failures into display strings. When the
    /// string carries a status code it is lifted back out so the caller
    /// can tell transient statuses from permanent ones.
    fn parse_gemini_error(err: impl std::fmt::Display) -> GeminiError {
        let message = err.to_string();
        match Self::extract_status_code(&message) {
            Some(status_code) => GeminiError::new(GeminiErrorKind::HttpStatus {
                status_code,
                message,
                retry_after: None,
            }),
            None => GeminiError::new(GeminiErrorKind::ApiRequest(message)),
        }
    }

    /// Pull an HTTP status code out of an error message like
    /// "API error: ... code 429 ...".
    fn extract_status_code(message: &str) -> Option<u16> {
        let start = message.find("code ")? + "code ".len();
        let digits: String = message[start..]
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        digits.parse().ok()
    }
}

// ─── DRIVER IMPLS ───────────────────────────────────────────────────────────────

#[async_trait]
impl CantastoriaDriver for GeminiClient {
    async fn generate(&self, request: &GenerateRequest) -> CantastoriaResult<GenerateResponse> {
        self.generate_internal(request).await.map_err(Into::into)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.text_model
    }
}

#[async_trait]
impl SpeechSynthesis for GeminiClient {
    async fn synthesize(&self, request: &SpeechRequest) -> CantastoriaResult<AudioPayload> {
        self.synthesize_internal(request).await.map_err(Into::into)
    }
}

#[async_trait]
impl ImageSynthesis for GeminiClient {
    async fn paint(&self, request: &ImageRequest) -> CantastoriaResult<Vec<ImagePayload>> {
        self.paint_internal(request).await.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_lifted_from_sdk_messages() {
        assert_eq!(
            GeminiClient::extract_status_code("API error with code 429: quota exceeded"),
            Some(429)
        );
        assert_eq!(
            GeminiClient::extract_status_code("bad gateway, code 502"),
            Some(502)
        );
        assert_eq!(GeminiClient::extract_status_code("connection reset"), None);
        assert_eq!(GeminiClient::extract_status_code("code unknown"), None);
    }

    #[test]
    fn known_models_map_to_enum_variants() {
        assert!(matches!(
            GeminiClient::model_name_to_enum("gemini-2.5-flash"),
            Model::Gemini25Flash
        ));
        assert!(matches!(
            GeminiClient::model_name_to_enum("gemini-2.5-pro"),
            Model::Gemini25Pro
        ));
        match GeminiClient::model_name_to_enum("gemini-2.5-flash-preview-tts") {
            Model::Custom(name) => assert_eq!(name, "models/gemini-2.5-flash-preview-tts"),
            other => panic!("expected custom model, got {other:?}"),
        }
    }
}
