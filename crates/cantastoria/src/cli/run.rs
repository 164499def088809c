//! Handlers that wire configuration, the provider client, and the
//! generation pipelines together for each CLI command.

use cantastoria::{
    names, ArtifactStore, AudioPipeline, CantastoriaConfig, CantastoriaResult, FileArtifacts,
    GeminiClient, ImageBatch, ProgressEvent, ProgressSink, Retrier, ScriptSequencer, StorageError,
    StorageErrorKind,
};
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

/// Everything a command needs before any pipeline runs.
struct Stage {
    config: CantastoriaConfig,
    client: GeminiClient,
    store: FileArtifacts,
}

fn prepare(out: Option<&Path>) -> CantastoriaResult<Stage> {
    let config = CantastoriaConfig::load()?;
    let client = GeminiClient::from_config(&config)?;
    let root = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.storage.out_dir.clone().into());
    let store = FileArtifacts::new(root)?;
    Ok(Stage {
        config,
        client,
        store,
    })
}

/// Print progress events until every sink clone is dropped.
fn spawn_printer(mut rx: UnboundedReceiver<ProgressEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match &event {
                ProgressEvent::Error { .. } => eprintln!("{event}"),
                _ => println!("{event}"),
            }
        }
    })
}

/// Generate a narration script and persist it as `script.txt`.
pub async fn run_script(prompt: &str, out: Option<&Path>) -> CantastoriaResult<()> {
    let stage = prepare(out)?;
    let (sink, rx) = ProgressSink::channel();
    let printer = spawn_printer(rx);

    let result = {
        let sequencer = ScriptSequencer::new(
            stage.client.clone(),
            stage.config.limits.script_limiter(),
            Retrier::new(stage.config.retry.policy(), sink.clone()),
            sink.clone(),
            stage.config.script.clone(),
        );
        sequencer.run(prompt).await
    };
    drop(sink);
    let _ = printer.await;

    let script = result?;
    let path = stage
        .store
        .write(names::SCRIPT_NAME, script.text.as_bytes())
        .await?;
    tracing::info!(
        sections = script.sections.len(),
        path = %path.display(),
        "Script written"
    );
    println!("script written to {}", path.display());
    Ok(())
}

/// Narrate a script file into one assembled audio artifact.
pub async fn run_audio(script: &Path, out: Option<&Path>) -> CantastoriaResult<()> {
    let text = tokio::fs::read_to_string(script).await.map_err(|e| {
        StorageError::new(StorageErrorKind::FileRead {
            name: script.display().to_string(),
            message: e.to_string(),
        })
    })?;

    let stage = prepare(out)?;
    let (sink, rx) = ProgressSink::channel();
    let printer = spawn_printer(rx);

    let result = {
        let pipeline = AudioPipeline::new(
            stage.client.clone(),
            stage.store.clone(),
            stage.config.limits.audio_limiter(),
            Retrier::new(stage.config.retry.policy(), sink.clone()),
            sink.clone(),
            stage.config.audio.clone(),
        );
        pipeline.run(&text).await
    };
    drop(sink);
    let _ = printer.await;

    let narration = result?;
    tracing::info!(
        chunks = narration.chunks,
        fragments = narration.fragments,
        path = %narration.path.display(),
        "Narration written"
    );
    println!("narration written to {}", narration.path.display());
    Ok(())
}

/// Generate illustrations for one section of text.
pub async fn run_images(prompt: &str, section: usize, out: Option<&Path>) -> CantastoriaResult<()> {
    let stage = prepare(out)?;
    let (sink, rx) = ProgressSink::channel();
    let printer = spawn_printer(rx);

    let result = {
        let batch = ImageBatch::new(
            stage.client.clone(),
            stage.store.clone(),
            stage.config.limits.images_limiter(),
            Retrier::new(stage.config.retry.policy(), sink.clone()),
            sink.clone(),
            stage.config.images.clone(),
        );
        let values = HashMap::from([("section".to_string(), prompt.to_string())]);
        batch.run(section, &values).await
    };
    drop(sink);
    let _ = printer.await;

    let batch = result?;
    tracing::info!(
        prompts = batch.prompts,
        images = batch.paths.len(),
        "Images written"
    );
    println!("{} images written", batch.paths.len());
    Ok(())
}

/// Run the full show: script, narration audio, and per-section images.
pub async fn run_show(prompt: &str, out: Option<&Path>) -> CantastoriaResult<()> {
    let stage = prepare(out)?;
    let (sink, rx) = ProgressSink::channel();
    let printer = spawn_printer(rx);

    let result = show(&stage, &sink, prompt).await;
    drop(sink);
    let _ = printer.await;
    result
}

async fn show(stage: &Stage, sink: &ProgressSink, prompt: &str) -> CantastoriaResult<()> {
    let retrier = Retrier::new(stage.config.retry.policy(), sink.clone());

    let sequencer = ScriptSequencer::new(
        stage.client.clone(),
        stage.config.limits.script_limiter(),
        retrier.clone(),
        sink.clone(),
        stage.config.script.clone(),
    );
    let script = sequencer.run(prompt).await?;
    stage
        .store
        .write(names::SCRIPT_NAME, script.text.as_bytes())
        .await?;

    let pipeline = AudioPipeline::new(
        stage.client.clone(),
        stage.store.clone(),
        stage.config.limits.audio_limiter(),
        retrier.clone(),
        sink.clone(),
        stage.config.audio.clone(),
    );
    let narration = pipeline.run(&script.text).await?;

    let batch = ImageBatch::new(
        stage.client.clone(),
        stage.store.clone(),
        stage.config.limits.images_limiter(),
        retrier,
        sink.clone(),
        stage.config.images.clone(),
    );
    let mut painted = 0;
    for section in &script.sections {
        let values = HashMap::from([("section".to_string(), section.content.clone())]);
        match batch.run(section.index, &values).await {
            Ok(run) => painted += run.paths.len(),
            Err(e) => {
                // A section without images should not cost the rest of the show.
                tracing::warn!(section = section.index, error = %e, "Image batch failed");
            }
        }
    }

    tracing::info!(
        sections = script.sections.len(),
        narration = %narration.path.display(),
        images = painted,
        "Show complete"
    );
    println!(
        "show complete: {} sections, narration at {}, {} images",
        script.sections.len(),
        narration.path.display(),
        painted
    );
    Ok(())
}
