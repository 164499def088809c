//! Narration audio: chunked synthesis, container assembly, one file.

use crate::is_exhaustion;
use cantastoria_core::{chunking, ProgressEvent, ProgressSink, SpeechRequest};
use cantastoria_error::{BuilderError, CantastoriaResult, EngineError, EngineErrorKind};
use cantastoria_interface::SpeechSynthesis;
use cantastoria_rate_limit::{AudioConfig, RateLimiter, Retrier};
use cantastoria_storage::{names, ArtifactStore};
use cantastoria_wave::{encode_raw, join};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Outcome of a narration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioRun {
    /// Path of the assembled audio file
    pub path: PathBuf,
    /// Fragments that produced audio
    pub fragments: usize,
    /// Chunks the script split into
    pub chunks: usize,
}

/// Narrates a script chunk by chunk and assembles one audio file.
///
/// The script is cut on sentence boundaries to fit the speech model's
/// request limit. Each chunk is synthesized, wrapped in a container,
/// and persisted as an intermediate fragment; once every chunk has had
/// its chance the fragments are spliced into `COMPLETE_AUDIO` and
/// deleted. A chunk that exhausts its retries is skipped, leaving a
/// gap in the narration rather than failing the run.
#[derive(Debug)]
pub struct AudioPipeline<D, S> {
    driver: D,
    store: S,
    limiter: RateLimiter,
    retrier: Retrier,
    sink: ProgressSink,
    config: AudioConfig,
}

impl<D: SpeechSynthesis, S: ArtifactStore> AudioPipeline<D, S> {
    /// Assemble a pipeline from its parts.
    pub fn new(
        driver: D,
        store: S,
        limiter: RateLimiter,
        retrier: Retrier,
        sink: ProgressSink,
        config: AudioConfig,
    ) -> Self {
        Self {
            driver,
            store,
            limiter,
            retrier,
            sink,
            config,
        }
    }

    /// Narrate `script` and write the assembled audio file.
    ///
    /// # Errors
    ///
    /// Fails when the script produces no chunks, when a synthesis call
    /// fails with a non-transient error, when every chunk was skipped,
    /// or when a fragment cannot be persisted. Every failure that aborts
    /// the run is also reported through the progress sink.
    #[instrument(skip(self, script), fields(chars = script.len()))]
    pub async fn run(&self, script: &str) -> CantastoriaResult<AudioRun> {
        let result = self.narrate(script).await;
        if let Err(e) = &result {
            self.sink
                .emit(ProgressEvent::error(format!("audio run failed: {e}")));
        }
        result
    }

    async fn narrate(&self, script: &str) -> CantastoriaResult<AudioRun> {
        let chunks = chunking::split(script, self.config.max_chunk_chars);
        let total = chunks.len();
        self.sink.emit(ProgressEvent::progress(format!(
            "Narrating {total} chunks"
        )));

        let mut fragment_names = Vec::new();
        let mut buffers = Vec::new();
        let mut extension = "wav";

        for (position, chunk) in chunks.iter().enumerate() {
            let index = position + 1;
            let label = format!("audio chunk {index}");

            let request = SpeechRequest::builder()
                .text(chunk.as_str())
                .build()
                .map_err(|e| BuilderError::from(e.to_string()))?;

            let payload = match self
                .retrier
                .run(&label, || {
                    let request = request.clone();
                    async move {
                        self.limiter.admit().await;
                        self.driver.synthesize(&request).await
                    }
                })
                .await
            {
                Ok(payload) => payload,
                Err(e) if is_exhaustion(&e) => {
                    warn!(chunk = index, error = %e, "Chunk skipped after exhausting retries");
                    self.sink
                        .emit(ProgressEvent::error(format!("{label} failed: {e}")));
                    continue;
                }
                Err(e) => return Err(e),
            };

            // Container assembly failures repeat deterministically, so
            // the chunk is dropped rather than retried.
            let encoded = match encode_raw(payload.data(), payload.mime_type()) {
                Ok(encoded) => encoded,
                Err(e) => {
                    warn!(chunk = index, error = %e, "Chunk payload unusable, skipping");
                    self.sink
                        .emit(ProgressEvent::error(format!("{label} unusable: {e}")));
                    continue;
                }
            };

            let name = names::fragment_name(index, encoded.extension);
            self.store.write(&name, &encoded.bytes).await?;
            fragment_names.push(name);
            extension = encoded.extension;
            buffers.push(encoded.bytes);
            self.sink.emit(ProgressEvent::audio_chunk(index, total));

            if index < total && self.config.inter_chunk_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.inter_chunk_delay_ms)).await;
            }
        }

        if buffers.is_empty() {
            return Err(EngineError::new(EngineErrorKind::NoAudioProduced).into());
        }

        let produced = buffers.len();
        let assembled = if produced == 1 {
            buffers.pop().unwrap_or_default()
        } else {
            extension = "wav";
            join(&buffers)?
        };

        let path = self
            .store
            .write(&names::complete_audio_name(extension), &assembled)
            .await?;

        for name in &fragment_names {
            if let Err(e) = self.store.delete(name).await {
                warn!(fragment = name.as_str(), error = %e, "Fragment cleanup failed");
            }
        }

        debug!(path = %path.display(), fragments = produced, "Narration assembled");
        Ok(AudioRun {
            path,
            fragments: produced,
            chunks: total,
        })
    }
}
