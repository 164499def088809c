//! Live smoke tests against the Gemini API.
//!
//! These hit the real service and are ignored by default. Run with the
//! `api` feature and a `GEMINI_API_KEY` in the environment or a `.env`
//! file:
//!
//! ```bash
//! cargo test -p cantastoria_models --features api
//! ```
#![cfg(feature = "gemini")]

use anyhow::Result;
use cantastoria_core::{GenerateRequest, ImageRequest, Message, SpeechRequest};
use cantastoria_interface::{CantastoriaDriver, ImageSynthesis, SpeechSynthesis};
use cantastoria_models::GeminiClient;

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn generates_text() -> Result<()> {
    dotenvy::dotenv().ok();

    let client = GeminiClient::new()?;
    let request = GenerateRequest::builder()
        .messages(vec![Message::user("Reply with exactly one word: ready")])
        .build()?;

    let response = client.generate(&request).await?;
    assert!(!response.text().is_empty());
    Ok(())
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn synthesizes_speech() -> Result<()> {
    dotenvy::dotenv().ok();

    let client = GeminiClient::new()?;
    let request = SpeechRequest::builder()
        .text("A single test sentence.")
        .build()?;

    let audio = client.synthesize(&request).await?;
    assert!(audio.mime_type().starts_with("audio/"));
    assert!(!audio.data().is_empty());
    Ok(())
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn paints_an_image() -> Result<()> {
    dotenvy::dotenv().ok();

    let client = GeminiClient::new()?;
    let request = ImageRequest::builder()
        .prompt("A watercolor lighthouse at dusk")
        .build()?;

    let images = client.paint(&request).await?;
    assert!(!images.is_empty());
    assert!(!images[0].data().is_empty());
    Ok(())
}
