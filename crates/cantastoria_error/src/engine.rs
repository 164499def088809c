//! Generation pipeline error types.

/// Specific pipeline error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum EngineErrorKind {
    /// Retry policy ran out of attempts
    #[display("Retries exhausted after {} attempts: {}", attempts, cause)]
    ExhaustedRetries {
        /// Total attempts made, counting the first
        attempts: usize,
        /// Message from the final failure
        cause: String,
    },

    /// The outline turn produced no text
    #[display("Outline response was empty, cannot continue")]
    EmptyOutline,

    /// Every section was skipped or failed
    #[display("No sections were produced")]
    NoSections,

    /// Every audio chunk was skipped or failed
    #[display("No audio fragments were produced")]
    NoAudioProduced,

    /// Every sub-prompt was skipped or failed
    #[display("No images were produced")]
    NoImagesProduced,

    /// A prompt template referenced an unknown placeholder
    #[display("Unresolved template placeholder: {}", _0)]
    Template(String),
}

/// Pipeline error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Engine Error: {} at line {} in {}", kind, line, file)]
pub struct EngineError {
    kind: EngineErrorKind,
    line: u32,
    file: &'static str,
}

impl EngineError {
    /// Create a new engine error with caller location tracking.
    #[track_caller]
    pub fn new(kind: EngineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &EngineErrorKind {
        &self.kind
    }
}
