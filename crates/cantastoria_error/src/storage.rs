//! Artifact storage error types.

/// Specific storage error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StorageErrorKind {
    /// Failed to create the artifact directory
    #[display("Failed to create directory '{}': {}", path, message)]
    DirectoryCreation {
        /// Directory path
        path: String,
        /// Underlying error message
        message: String,
    },

    /// Failed to write an artifact
    #[display("Failed to write '{}': {}", name, message)]
    FileWrite {
        /// Artifact name
        name: String,
        /// Underlying error message
        message: String,
    },

    /// Failed to read an artifact
    #[display("Failed to read '{}': {}", name, message)]
    FileRead {
        /// Artifact name
        name: String,
        /// Underlying error message
        message: String,
    },

    /// Failed to delete an artifact
    #[display("Failed to delete '{}': {}", name, message)]
    FileDelete {
        /// Artifact name
        name: String,
        /// Underlying error message
        message: String,
    },

    /// Artifact does not exist
    #[display("Artifact not found: {}", _0)]
    NotFound(String),

    /// Artifact name would escape the storage directory
    #[display("Invalid artifact name: {}", _0)]
    InvalidPath(String),
}

/// Storage error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    kind: StorageErrorKind,
    line: u32,
    file: &'static str,
}

impl StorageError {
    /// Create a new storage error with caller location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &StorageErrorKind {
        &self.kind
    }
}
