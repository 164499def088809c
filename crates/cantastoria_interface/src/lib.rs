#![forbid(unsafe_code)]
#![warn(missing_docs)]
//! Provider capability traits for the cantastoria generation engine.
//!
//! The engine crates are written against these traits. A provider crate
//! implements [`CantastoriaDriver`] plus whichever of [`SpeechSynthesis`]
//! and [`ImageSynthesis`] its API supports; tests substitute stubs.

mod traits;

pub use traits::{CantastoriaDriver, ImageSynthesis, SpeechSynthesis};
