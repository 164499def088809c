//! Audio container error types.

/// Specific wave assembly error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum WaveErrorKind {
    /// Join called with no fragments
    #[display("Cannot join an empty fragment list")]
    NoFragments,

    /// Fragment shorter than a full header
    #[display("Fragment is {} bytes, shorter than the 44 byte header", _0)]
    HeaderTooShort(usize),

    /// Header region did not carry the expected markers
    #[display("Invalid audio header: {}", _0)]
    InvalidHeader(String),

    /// Fragment format differs from the first fragment
    #[display(
        "Fragment {} format {} does not match canonical format {}",
        index,
        found,
        expected
    )]
    FormatMismatch {
        /// Zero-based fragment position in the join input
        index: usize,
        /// Canonical format taken from the first fragment
        expected: String,
        /// Format read from the mismatched fragment
        found: String,
    },

    /// Combined sample data exceeds the container's 32-bit length fields
    #[display("Joined audio data of {} bytes overflows the container", _0)]
    DataTooLarge(u64),

    /// Base64 sample payload failed to decode
    #[display("Failed to decode base64 audio payload: {}", _0)]
    Base64Decode(String),

    /// MIME type carried no usable format parameters
    #[display("Unsupported audio MIME type: {}", _0)]
    UnsupportedMime(String),
}

/// Wave error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Wave Error: {} at line {} in {}", kind, line, file)]
pub struct WaveError {
    kind: WaveErrorKind,
    line: u32,
    file: &'static str,
}

impl WaveError {
    /// Create a new wave error with caller location tracking.
    #[track_caller]
    pub fn new(kind: WaveErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &WaveErrorKind {
        &self.kind
    }
}
