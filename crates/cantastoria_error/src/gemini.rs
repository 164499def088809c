//! Gemini provider error types.

use std::time::Duration;

/// Specific Gemini API error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum GeminiErrorKind {
    /// GEMINI_API_KEY is not set
    #[display("GEMINI_API_KEY environment variable not set")]
    MissingApiKey,

    /// SDK client construction failed
    #[display("Failed to create Gemini client: {}", _0)]
    ClientCreation(String),

    /// Request could not be sent or the response body could not be read
    #[display("Gemini API request failed: {}", _0)]
    ApiRequest(String),

    /// The API answered with a non-success HTTP status
    #[display("Gemini API returned status {}: {}", status_code, message)]
    HttpStatus {
        /// Numeric HTTP status code
        status_code: u16,
        /// Message from the error payload, or the raw body
        message: String,
        /// Server-suggested delay parsed from a RetryInfo detail
        retry_after: Option<Duration>,
    },

    /// The response carried no usable content
    #[display("Gemini API returned an empty response")]
    EmptyResponse,

    /// A candidate part lacked the expected inline data
    #[display("Gemini response missing inline {} data", _0)]
    MissingInlineData(String),

    /// Inline payload failed to decode
    #[display("Failed to decode base64 payload: {}", _0)]
    Base64Decode(String),
}

impl GeminiErrorKind {
    /// Whether a fresh attempt at the same request could succeed.
    ///
    /// Transient statuses follow the usual set: 408, 429, 500, 502, 503,
    /// and 504. Empty or incomplete responses also count as transient
    /// since the service produces them sporadically under load.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::HttpStatus { status_code, .. } => {
                matches!(status_code, 408 | 429 | 500 | 502 | 503 | 504)
            }
            Self::EmptyResponse | Self::MissingInlineData(_) => true,
            _ => false,
        }
    }

    /// Server-suggested retry delay, when the error payload carried one.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::HttpStatus { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// Gemini error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Gemini Error: {} at line {} in {}", kind, line, file)]
pub struct GeminiError {
    kind: GeminiErrorKind,
    line: u32,
    file: &'static str,
}

impl GeminiError {
    /// Create a new Gemini error with caller location tracking.
    #[track_caller]
    pub fn new(kind: GeminiErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &GeminiErrorKind {
        &self.kind
    }
}
