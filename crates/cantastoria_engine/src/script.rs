//! Script sequencing: one outline turn, then numbered section turns.

use crate::{is_exhaustion, template};
use cantastoria_core::{GenerateRequest, Message, ProgressEvent, ProgressSink};
use cantastoria_error::{
    BuilderError, CantastoriaResult, EngineError, EngineErrorKind, GeminiError, GeminiErrorKind,
};
use cantastoria_interface::CantastoriaDriver;
use cantastoria_rate_limit::{RateLimiter, Retrier, ScriptConfig};
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

/// One numbered section of a generated script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Section number, 1-based
    pub index: usize,
    /// Section body as the model returned it
    pub content: String,
}

/// Outcome of a full sequencing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRun {
    /// Assembled script, section bodies joined by the configured
    /// delimiter. The outline is a plan, not narration, so it is left
    /// out.
    pub text: String,
    /// Sections that produced content, in order
    pub sections: Vec<Section>,
    /// Full conversation as sent and received, outline turns included
    pub turns: Vec<Message>,
}

/// Drives a text model through an outline turn and numbered section
/// turns.
///
/// The conversation accumulates: every section call carries the
/// subject prompt, the outline, and each previously accepted section,
/// so the model keeps its own thread. A section that fails all retries
/// is skipped and its turns are discarded; the next call repeats the
/// history as if the failed section had never been asked for.
#[derive(Debug)]
pub struct ScriptSequencer<D> {
    driver: D,
    limiter: RateLimiter,
    retrier: Retrier,
    sink: ProgressSink,
    config: ScriptConfig,
}

impl<D: CantastoriaDriver> ScriptSequencer<D> {
    /// Assemble a sequencer from its parts.
    pub fn new(
        driver: D,
        limiter: RateLimiter,
        retrier: Retrier,
        sink: ProgressSink,
        config: ScriptConfig,
    ) -> Self {
        Self {
            driver,
            limiter,
            retrier,
            sink,
            config,
        }
    }

    /// Generate the outline and every configured section, returning the
    /// assembled script.
    ///
    /// # Errors
    ///
    /// Fails when the outline turn fails or comes back empty, when any
    /// call fails with a non-transient error, or when every section
    /// exhausted its retries. Every failure that aborts the run is also
    /// reported through the progress sink.
    #[instrument(skip(self, prompt), fields(sections = self.config.sections))]
    pub async fn run(&self, prompt: &str) -> CantastoriaResult<ScriptRun> {
        let result = self.sequence(prompt).await;
        if let Err(e) = &result {
            self.sink
                .emit(ProgressEvent::error(format!("script run failed: {e}")));
        }
        result
    }

    async fn sequence(&self, prompt: &str) -> CantastoriaResult<ScriptRun> {
        let mut turns = vec![Message::user(prompt)];

        self.sink.emit(ProgressEvent::progress("Generating outline"));
        let outline = self.turn(&turns, "outline", false).await?;
        if outline.trim().is_empty() {
            return Err(EngineError::new(EngineErrorKind::EmptyOutline).into());
        }
        turns.push(Message::assistant(&outline));
        self.sink.emit(ProgressEvent::outline(&outline));

        let total = self.config.sections;
        self.sink
            .emit(ProgressEvent::progress(format!("Generating {total} sections")));

        let mut sections = Vec::new();
        for index in 1..=total {
            let values = HashMap::from([
                ("index".to_string(), index.to_string()),
                ("total".to_string(), total.to_string()),
            ]);
            let continuation = template::expand(&self.config.continuation_prompt, &values)?;

            let mut attempt = turns.clone();
            attempt.push(Message::user(&continuation));

            let label = format!("section {index}");
            match self.turn(&attempt, &label, true).await {
                Ok(content) => {
                    turns.push(Message::user(&continuation));
                    turns.push(Message::assistant(&content));
                    self.sink.emit(ProgressEvent::section(index, &content));
                    sections.push(Section { index, content });
                }
                Err(e) if is_exhaustion(&e) => {
                    warn!(section = index, error = %e, "Section skipped after exhausting retries");
                    self.sink
                        .emit(ProgressEvent::error(format!("{label} failed: {e}")));
                }
                Err(e) => return Err(e),
            }
        }

        if sections.is_empty() {
            return Err(EngineError::new(EngineErrorKind::NoSections).into());
        }

        let text = sections
            .iter()
            .map(|s| s.content.as_str())
            .collect::<Vec<_>>()
            .join(&self.config.section_delimiter);

        debug!(
            sections = sections.len(),
            chars = text.len(),
            "Script assembled"
        );
        Ok(ScriptRun {
            text,
            sections,
            turns,
        })
    }

    /// One generation call over a fixed history, under rate limiting
    /// and the retry policy.
    ///
    /// With `require_text` set, an empty response counts as a transient
    /// provider failure and is retried with the same history. The
    /// outline turn leaves it unset since an empty outline is handled
    /// as its own terminal condition.
    async fn turn(
        &self,
        history: &[Message],
        label: &str,
        require_text: bool,
    ) -> CantastoriaResult<String> {
        let request = GenerateRequest::builder()
            .messages(history.to_vec())
            .build()
            .map_err(|e| BuilderError::from(e.to_string()))?;

        self.retrier
            .run(label, || {
                let request = request.clone();
                async move {
                    self.limiter.admit().await;
                    let response = self.driver.generate(&request).await?;
                    let text = response.into_text();
                    if require_text && text.trim().is_empty() {
                        return Err(GeminiError::new(GeminiErrorKind::EmptyResponse).into());
                    }
                    Ok(text)
                }
            })
            .await
    }
}
