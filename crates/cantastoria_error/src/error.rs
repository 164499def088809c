//! Top-level error type aggregating all error domains.

use crate::{BuilderError, ConfigError, EngineError, GeminiError, JsonError, StorageError, WaveError};

/// All error domains in the cantastoria workspace.
#[derive(Debug, Clone, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum CantastoriaErrorKind {
    /// Builder validation errors
    #[from(BuilderError)]
    Builder(BuilderError),

    /// Configuration loading errors
    #[from(ConfigError)]
    Config(ConfigError),

    /// Generation pipeline errors
    #[from(EngineError)]
    Engine(EngineError),

    /// Gemini provider errors
    #[from(GeminiError)]
    Gemini(GeminiError),

    /// JSON serialization errors
    #[from(JsonError)]
    Json(JsonError),

    /// Artifact storage errors
    #[from(StorageError)]
    Storage(StorageError),

    /// Audio container errors
    #[from(WaveError)]
    Wave(WaveError),
}

/// Boxed workspace error.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Cantastoria Error: {}", _0)]
pub struct CantastoriaError(Box<CantastoriaErrorKind>);

impl CantastoriaError {
    /// Wrap an error kind.
    pub fn new(kind: CantastoriaErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &CantastoriaErrorKind {
        &self.0
    }
}

impl<T: Into<CantastoriaErrorKind>> From<T> for CantastoriaError {
    fn from(value: T) -> Self {
        Self::new(value.into())
    }
}

/// Convenience alias used across the workspace.
pub type CantastoriaResult<T> = Result<T, CantastoriaError>;
