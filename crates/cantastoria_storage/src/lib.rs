#![forbid(unsafe_code)]
#![warn(missing_docs)]
//! Artifact storage for generated scripts, audio, and images.
//!
//! Pipelines persist through the [`ArtifactStore`] trait and name
//! artifacts with the helpers in [`names`], so every output of a run
//! lands at a predictable path. [`FileArtifacts`] is the filesystem
//! implementation.

pub mod names;
mod store;

pub use store::{ArtifactStore, FileArtifacts};
