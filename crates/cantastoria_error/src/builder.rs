//! Request builder error types.

/// Builder validation error with source location.
///
/// Request types in `cantastoria_core` build through `derive_builder`,
/// whose generated errors render as strings; they land here via the
/// `From` impls below.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Builder Error: {} at line {} in {}", message, line, file)]
pub struct BuilderError {
    /// The underlying error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl BuilderError {
    /// Create a new BuilderError with the given message at the current location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}

impl From<String> for BuilderError {
    #[track_caller]
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for BuilderError {
    #[track_caller]
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}
