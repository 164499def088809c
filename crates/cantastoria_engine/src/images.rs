//! Image batches: derive sub-prompts from a section, paint each one.

use crate::template;
use cantastoria_core::{GenerateRequest, ImageRequest, Message, ProgressEvent, ProgressSink};
use cantastoria_error::{BuilderError, CantastoriaResult, EngineError, EngineErrorKind};
use cantastoria_interface::ImageSynthesis;
use cantastoria_rate_limit::{ImagesConfig, RateLimiter, Retrier};
use cantastoria_storage::{names, ArtifactStore};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, instrument, warn};

/// Outcome of one section's image batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagesRun {
    /// Paths of every image written
    pub paths: Vec<PathBuf>,
    /// Sub-prompts the derivation produced
    pub prompts: usize,
}

/// Derives illustration prompts for a section and paints each of them.
///
/// The derivation template expands with the section text and goes to
/// the text model; each non-empty line of the answer becomes one image
/// prompt. Prompts are painted independently, so a failed prompt is
/// skipped and the batch continues with the rest. The batch fails only
/// when nothing at all was produced.
#[derive(Debug)]
pub struct ImageBatch<D, S> {
    driver: D,
    store: S,
    limiter: RateLimiter,
    retrier: Retrier,
    sink: ProgressSink,
    config: ImagesConfig,
}

impl<D: ImageSynthesis, S: ArtifactStore> ImageBatch<D, S> {
    /// Assemble a batch from its parts.
    pub fn new(
        driver: D,
        store: S,
        limiter: RateLimiter,
        retrier: Retrier,
        sink: ProgressSink,
        config: ImagesConfig,
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

    /// Paint the batch for one section.
    ///
    /// `values` feeds the derivation template; the bundled default
    /// expects a `section` entry carrying the section text. `section`
    /// numbers the artifacts.
    ///
    /// # Errors
    ///
    /// Fails when the template cannot be expanded, when the derivation
    /// call fails, when it yields no usable lines, when no prompt
    /// produced an image, or when an image cannot be persisted. Every
    /// failure that aborts the batch is also reported through the
    /// progress sink.
    #[instrument(skip(self, values), fields(section = section))]
    pub async fn run(
        &self,
        section: usize,
        values: &HashMap<String, String>,
    ) -> CantastoriaResult<ImagesRun> {
        let result = self.paint_batch(section, values).await;
        if let Err(e) = &result {
            self.sink
                .emit(ProgressEvent::error(format!("image batch failed: {e}")));
        }
        result
    }

    async fn paint_batch(
        &self,
        section: usize,
        values: &HashMap<String, String>,
    ) -> CantastoriaResult<ImagesRun> {
        let derivation = template::expand(&self.config.derivation_prompt, values)?;

        let request = GenerateRequest::builder()
            .messages(vec![Message::user(&derivation)])
            .build()
            .map_err(|e| BuilderError::from(e.to_string()))?;

        let response = self
            .retrier
            .run("prompt derivation", || {
                let request = request.clone();
                async move {
                    self.limiter.admit().await;
                    self.driver.generate(&request).await
                }
            })
            .await?;

        let sub_prompts: Vec<String> = response
            .text()
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();

        if sub_prompts.is_empty() {
            return Err(EngineError::new(EngineErrorKind::NoImagesProduced).into());
        }

        let total = sub_prompts.len();
        self.sink.emit(ProgressEvent::progress(format!(
            "Derived {total} image prompts for section {section}"
        )));

        let mut paths = Vec::new();
        for (position, prompt) in sub_prompts.iter().enumerate() {
            let index = position + 1;
            let label = format!("image prompt {index}");

            let request = ImageRequest::builder()
                .prompt(prompt.as_str())
                .count(self.config.variants)
                .build()
                .map_err(|e| BuilderError::from(e.to_string()))?;

            // Prompts are independent, so any failure here, exhausted
            // or hard, costs only this prompt's images.
            let images = match self
                .retrier
                .run(&label, || {
                    let request = request.clone();
                    async move {
                        self.limiter.admit().await;
                        self.driver.paint(&request).await
                    }
                })
                .await
            {
                Ok(images) => images,
                Err(e) => {
                    warn!(prompt = index, error = %e, "Image prompt skipped");
                    self.sink
                        .emit(ProgressEvent::error(format!("{label} failed: {e}")));
                    continue;
                }
            };

            for (variant_position, image) in images.into_iter().enumerate() {
                let variant = variant_position + 1;
                let name = names::image_name(
                    section,
                    index,
                    variant,
                    names::image_extension(image.mime_type()),
                );
                let path = self.store.write(&name, &image.into_data()).await?;
                paths.push(path);
            }
            self.sink.emit(ProgressEvent::image_chunk(index, total));
        }

        if paths.is_empty() {
            return Err(EngineError::new(EngineErrorKind::NoImagesProduced).into());
        }

        debug!(images = paths.len(), prompts = total, "Image batch complete");
        Ok(ImagesRun {
            paths,
            prompts: total,
        })
    }
}
