//! Workspace configuration.
//!
//! Settings load from TOML with a precedence system:
//! - Bundled defaults (include_str! from cantastoria.toml)
//! - User override (~/.config/cantastoria/cantastoria.toml, then
//!   ./cantastoria.toml)

use crate::{RateLimiter, RetryPolicy};
use cantastoria_error::{CantastoriaError, CantastoriaResult, ConfigError};
use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Script generation settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScriptConfig {
    /// Text model for outline and continuation turns
    pub model: String,

    /// Number of continuation sections after the outline
    pub sections: usize,

    /// Requester turn appended before each section call; `{index}` and
    /// `{total}` expand to the section number and count
    pub continuation_prompt: String,

    /// Separator between section bodies in the assembled script
    pub section_delimiter: String,
}

/// Audio narration settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AudioConfig {
    /// Speech model for narration
    pub model: String,

    /// Prebuilt voice name
    pub voice: String,

    /// Maximum script bytes per synthesis request
    pub max_chunk_chars: usize,

    /// Flat pause between chunk requests, beyond rate limiting. Zero
    /// disables it.
    pub inter_chunk_delay_ms: u64,
}

/// Image batch settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ImagesConfig {
    /// Image model for illustration batches
    pub model: String,

    /// Images generated per sub-prompt
    pub variants: u32,

    /// Template expanded with `{section}` and sent to the text model to
    /// derive one image prompt per line
    pub derivation_prompt: String,
}

/// Backoff settings, converted to a [`RetryPolicy`] via [`policy`].
///
/// [`policy`]: RetryConfig::policy
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Retries per remote call after the first attempt
    pub max_attempts: usize,

    /// Delay before the first retry
    pub base_delay_ms: u64,

    /// Upper bound on any single delay
    pub max_delay_secs: u64,
}

impl RetryConfig {
    /// Convert to the policy type the retrier consumes.
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_secs(self.max_delay_secs),
        }
    }
}

/// One sliding window shape.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WindowConfig {
    /// Calls admitted per window
    pub max_requests: u32,

    /// Window length in seconds
    pub window_secs: u64,
}

impl WindowConfig {
    /// Build a limiter over this window.
    pub fn limiter(&self, safety_margin: Duration) -> RateLimiter {
        RateLimiter::new(self.max_requests, Duration::from_secs(self.window_secs))
            .with_safety_margin(safety_margin)
    }
}

/// Per-channel rate limit windows.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LimitsConfig {
    /// Added to every computed wait
    pub safety_margin_ms: u64,

    /// Window for text generation calls
    pub script: WindowConfig,

    /// Window for speech synthesis calls
    pub audio: WindowConfig,

    /// Window for image calls, derivation included
    pub images: WindowConfig,
}

impl LimitsConfig {
    /// Limiter for the script channel.
    pub fn script_limiter(&self) -> RateLimiter {
        self.script.limiter(self.safety_margin())
    }

    /// Limiter for the audio channel.
    pub fn audio_limiter(&self) -> RateLimiter {
        self.audio.limiter(self.safety_margin())
    }

    /// Limiter for the image channel.
    pub fn images_limiter(&self) -> RateLimiter {
        self.images.limiter(self.safety_margin())
    }

    fn safety_margin(&self) -> Duration {
        Duration::from_millis(self.safety_margin_ms)
    }
}

/// Artifact output settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory where scripts, audio, and images are written
    pub out_dir: String,
}

/// Top-level cantastoria configuration.
///
/// # Example
///
/// ```no_run
/// use cantastoria_rate_limit::CantastoriaConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = CantastoriaConfig::load()?;
/// println!("narrating with voice {}", config.audio.voice);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CantastoriaConfig {
    /// Script generation settings
    pub script: ScriptConfig,

    /// Audio narration settings
    pub audio: AudioConfig,

    /// Image batch settings
    pub images: ImagesConfig,

    /// Backoff settings
    pub retry: RetryConfig,

    /// Per-channel rate limit windows
    pub limits: LimitsConfig,

    /// Artifact output settings
    pub storage: StorageConfig,
}

impl CantastoriaConfig {
    /// Load configuration from a specific file path.
    ///
    /// The file must carry every section; no defaults are merged in.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> CantastoriaResult<Self> {
        debug!("Loading configuration from file");

        Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                CantastoriaError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                CantastoriaError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Load configuration with precedence: user override > bundled default.
    ///
    /// Configuration sources in order of precedence (later sources override earlier):
    /// 1. Bundled defaults (cantastoria.toml shipped with the workspace)
    /// 2. User config in home directory (~/.config/cantastoria/cantastoria.toml)
    /// 3. User config in current directory (./cantastoria.toml)
    ///
    /// User config files are optional and silently skipped if not found.
    #[instrument]
    pub fn load() -> CantastoriaResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        // Bundled default configuration
        const DEFAULT_CONFIG: &str = include_str!("../../../cantastoria.toml");

        let mut builder = Config::builder()
            // Start with bundled defaults
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        // Add user config from home directory (optional)
        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/cantastoria/cantastoria.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        // Add user config from current directory (optional, highest precedence)
        builder = builder.add_source(File::with_name("cantastoria").required(false));

        builder
            .build()
            .map_err(|e| {
                CantastoriaError::from(ConfigError::new(format!(
                    "Failed to load configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                CantastoriaError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }
}
