//! Entry point for the `cantastoria` binary.

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands};

    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Script { prompt, out } => {
            cli::run_script(&prompt, out.as_deref()).await?;
        }
        Commands::Audio { script, out } => {
            cli::run_audio(&script, out.as_deref()).await?;
        }
        Commands::Images {
            prompt,
            section,
            out,
        } => {
            cli::run_images(&prompt, section, out.as_deref()).await?;
        }
        Commands::Show { prompt, out } => {
            cli::run_show(&prompt, out.as_deref()).await?;
        }
    }

    Ok(())
}
