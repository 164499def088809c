//! Command line interface for the generation pipelines.

mod commands;
mod run;

pub use commands::{Cli, Commands};
pub use run::{run_audio, run_images, run_script, run_show};
