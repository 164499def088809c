//! Argument definitions for the `cantastoria` binary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Cantastoria command line interface
#[derive(Parser, Debug)]
#[command(name = "cantastoria")]
#[command(about = "Generate narrated picture shows from a single prompt", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a narration script for a subject
    Script {
        /// Subject to write about
        prompt: String,

        /// Output directory, defaults to the configured one
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Narrate an existing script file as one audio artifact
    Audio {
        /// Path to the script text file
        script: PathBuf,

        /// Output directory, defaults to the configured one
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Generate illustrations for a section of text
    Images {
        /// Section text to illustrate
        prompt: String,

        /// Section number used in artifact names
        #[arg(long, default_value = "1")]
        section: usize,

        /// Output directory, defaults to the configured one
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Run the full show: script, narration audio, and illustrations
    Show {
        /// Subject to write about
        prompt: String,

        /// Output directory, defaults to the configured one
        #[arg(long)]
        out: Option<PathBuf>,
    },
}
