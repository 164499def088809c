#![forbid(unsafe_code)]
#![warn(missing_docs)]
//! Generation pipelines for the cantastoria engine.
//!
//! Three pipelines turn one subject prompt into a set of artifacts:
//!
//! - [`ScriptSequencer`] drives a text model through an outline turn
//!   and numbered continuation turns, assembling a narration script.
//! - [`AudioPipeline`] narrates a script chunk by chunk and splices the
//!   fragments into one audio file.
//! - [`ImageBatch`] derives illustration prompts from a section and
//!   paints each of them.
//!
//! Every remote call runs through a rate limiter and a retrier, and
//! every completed or failed step is reported through a progress sink.
//! A unit that exhausts its retries is skipped so the rest of the run
//! can finish; a call that fails hard aborts the pipeline.

mod audio;
mod images;
mod script;
mod template;

pub use audio::{AudioPipeline, AudioRun};
pub use images::{ImageBatch, ImagesRun};
pub use script::{ScriptRun, ScriptSequencer, Section};

use cantastoria_error::{CantastoriaError, CantastoriaErrorKind, EngineErrorKind};

/// Whether `err` marks an exhausted retry policy rather than a hard
/// failure. Pipelines skip the unit for the former and abort for the
/// latter.
pub(crate) fn is_exhaustion(err: &CantastoriaError) -> bool {
    match err.kind() {
        CantastoriaErrorKind::Engine(e) => {
            matches!(e.kind(), EngineErrorKind::ExhaustedRetries { .. })
        }
        _ => false,
    }
}
