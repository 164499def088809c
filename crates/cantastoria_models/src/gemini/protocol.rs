//! Wire types for the generativelanguage REST endpoints.
//!
//! Text generation rides the official SDK, but speech synthesis and
//! image prediction are plain JSON over `:generateContent` and
//! `:predict`. These structs mirror those payloads, plus the standard
//! error envelope with its RetryInfo detail.

use cantastoria_core::AudioPayload;
use cantastoria_error::{GeminiError, GeminiErrorKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Detail type google.rpc attaches to quota errors.
const RETRY_INFO_TYPE: &str = "type.googleapis.com/google.rpc.RetryInfo";

/// Request body for `models/{model}:generateContent`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Conversation contents, one entry per turn
    pub contents: Vec<Content>,
    /// Modality and speech settings
    pub generation_config: GenerationConfig,
}

/// One content block: an ordered list of parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    /// Text or inline binary parts
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// One part of a content block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// Plain text, when the part is textual
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Base64 payload, when the part is binary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

/// Inline binary content with its MIME type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    /// Declared MIME type, e.g. `audio/L16;codec=pcm;rate=24000`
    pub mime_type: String,
    /// Base64 encoded bytes
    pub data: String,
}

/// Generation settings for a speech call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Requested response modalities, `["AUDIO"]` for speech
    pub response_modalities: Vec<String>,
    /// Voice selection, absent for text calls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_config: Option<SpeechConfig>,
}

/// Speech settings wrapper.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechConfig {
    /// Voice selection
    pub voice_config: VoiceConfig,
}

/// Voice selection wrapper.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceConfig {
    /// One of the prebuilt voices
    pub prebuilt_voice_config: PrebuiltVoiceConfig,
}

/// A prebuilt voice, by name.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrebuiltVoiceConfig {
    /// Voice name, e.g. "Kore"
    pub voice_name: String,
}

/// Response body from `models/{model}:generateContent`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Generated candidates, usually one
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// One generated candidate.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Candidate content, absent when generation was blocked
    #[serde(default)]
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    /// First inline payload across the candidates, as an audio payload.
    pub fn inline_audio(&self) -> Option<AudioPayload> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|content| content.parts.iter())
            .find_map(|part| part.inline_data.as_ref())
            .map(|data| AudioPayload::new(&data.mime_type, &data.data))
    }
}

/// Request body for `models/{model}:predict`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictRequest {
    /// One instance per prompt
    pub instances: Vec<ImageInstance>,
    /// Generation parameters
    pub parameters: PredictParameters,
}

/// One image prompt.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInstance {
    /// Prompt describing the image
    pub prompt: String,
}

/// Image generation parameters.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictParameters {
    /// Number of images to generate
    pub sample_count: u32,
}

/// Response body from `models/{model}:predict`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictResponse {
    /// One prediction per generated image
    #[serde(default)]
    pub predictions: Vec<Prediction>,
}

/// One generated image.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    /// Base64 encoded image bytes
    #[serde(default)]
    pub bytes_base64_encoded: Option<String>,
    /// Image MIME type, usually image/png
    #[serde(default)]
    pub mime_type: Option<String>,
}

/// Standard error envelope returned with non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorEnvelope {
    /// The error payload
    pub error: ApiError,
}

/// `google.rpc.Status` shaped error payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    /// Numeric status code, mirrors the HTTP status
    pub code: i32,
    /// Human-readable description
    pub message: String,
    /// Symbolic status, e.g. "RESOURCE_EXHAUSTED"
    #[serde(default)]
    pub status: Option<String>,
    /// Typed detail objects, possibly including RetryInfo
    #[serde(default)]
    pub details: Vec<serde_json::Value>,
}

impl ApiError {
    /// Server-suggested retry delay from a RetryInfo detail, if any.
    pub fn retry_hint(&self) -> Option<Duration> {
        self.details.iter().find_map(|detail| {
            if detail.get("@type").and_then(serde_json::Value::as_str) != Some(RETRY_INFO_TYPE) {
                return None;
            }
            detail
                .get("retryDelay")
                .and_then(serde_json::Value::as_str)
                .and_then(parse_retry_delay)
        })
    }
}

/// Build the body for a speech synthesis call.
pub fn speech_request(text: &str, voice: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            parts: vec![Part {
                text: Some(text.to_string()),
                inline_data: None,
            }],
        }],
        generation_config: GenerationConfig {
            response_modalities: vec!["AUDIO".to_string()],
            speech_config: Some(SpeechConfig {
                voice_config: VoiceConfig {
                    prebuilt_voice_config: PrebuiltVoiceConfig {
                        voice_name: voice.to_string(),
                    },
                },
            }),
        },
    }
}

/// Build the body for an image prediction call.
pub fn predict_request(prompt: &str, count: u32) -> PredictRequest {
    PredictRequest {
        instances: vec![ImageInstance {
            prompt: prompt.to_string(),
        }],
        parameters: PredictParameters {
            sample_count: count,
        },
    }
}

/// Convert a non-success response into a structured error.
///
/// The body is parsed as the standard envelope when possible; a quota
/// error's RetryInfo detail becomes the retry hint. Unparseable bodies
/// are carried verbatim as the message.
pub fn status_error(status_code: u16, body: &str) -> GeminiError {
    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) => {
            let retry_after = envelope.error.retry_hint();
            GeminiError::new(GeminiErrorKind::HttpStatus {
                status_code,
                message: envelope.error.message,
                retry_after,
            })
        }
        Err(_) => GeminiError::new(GeminiErrorKind::HttpStatus {
            status_code,
            message: body.trim().to_string(),
            retry_after: None,
        }),
    }
}

/// Parse a protobuf Duration rendering like "39s" or "0.5s".
fn parse_retry_delay(value: &str) -> Option<Duration> {
    let seconds: f64 = value.strip_suffix('s')?.parse().ok()?;
    if seconds.is_finite() && seconds >= 0.0 {
        Some(Duration::from_secs_f64(seconds))
    } else {
        None
    }
}
