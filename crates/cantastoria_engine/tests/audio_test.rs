use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use cantastoria_core::{
    AudioPayload, GenerateRequest, GenerateResponse, ProgressEvent, ProgressSink, SpeechRequest,
};
use cantastoria_engine::AudioPipeline;
use cantastoria_error::{
    CantastoriaErrorKind, CantastoriaResult, EngineErrorKind, GeminiError, GeminiErrorKind,
};
use cantastoria_interface::{CantastoriaDriver, SpeechSynthesis};
use cantastoria_rate_limit::{AudioConfig, RateLimiter, Retrier, RetryPolicy};
use cantastoria_storage::{names, ArtifactStore, FileArtifacts};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;

/// What the stub yields for one synthesis call.
enum Voice {
    /// Raw PCM of this many sample bytes
    Pcm(usize),
    /// A status failure
    Status(u16),
    /// An undecodable payload
    Garbage,
}

/// Synthesizer whose nth call follows the nth listed voice. Calls past
/// the list yield 1000 bytes of PCM.
#[derive(Clone)]
struct StubSynth {
    calls: Arc<AtomicUsize>,
    voices: Arc<Vec<Voice>>,
}

impl StubSynth {
    fn new(voices: Vec<Voice>) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            voices: Arc::new(voices),
        }
    }
}

#[async_trait]
impl CantastoriaDriver for StubSynth {
    async fn generate(&self, _request: &GenerateRequest) -> CantastoriaResult<GenerateResponse> {
        Ok(GenerateResponse::new("unused"))
    }

    fn provider_name(&self) -> &'static str {
        "stub"
    }

    fn model_name(&self) -> &str {
        "stub-tts"
    }
}

#[async_trait]
impl SpeechSynthesis for StubSynth {
    async fn synthesize(&self, _request: &SpeechRequest) -> CantastoriaResult<AudioPayload> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        match self.voices.get(call).unwrap_or(&Voice::Pcm(1000)) {
            Voice::Pcm(len) => Ok(AudioPayload::new(
                "audio/L16;codec=pcm;rate=24000",
                STANDARD.encode(vec![0x42u8; *len]),
            )),
            Voice::Status(code) => Err(GeminiError::new(GeminiErrorKind::HttpStatus {
                status_code: *code,
                message: format!("stub status {code}"),
                retry_after: None,
            })
            .into()),
            Voice::Garbage => Ok(AudioPayload::new(
                "audio/L16;rate=24000",
                "not base64 at all!",
            )),
        }
    }
}

fn audio_config(max_chunk_chars: usize, inter_chunk_delay_ms: u64) -> AudioConfig {
    AudioConfig {
        model: "stub-tts".to_string(),
        voice: "Kore".to_string(),
        max_chunk_chars,
        inter_chunk_delay_ms,
    }
}

fn pipeline(
    driver: StubSynth,
    store: FileArtifacts,
    max_attempts: usize,
    sink: ProgressSink,
    config: AudioConfig,
) -> AudioPipeline<StubSynth, FileArtifacts> {
    let policy = RetryPolicy {
        max_attempts,
        base_delay: Duration::from_millis(5),
        max_delay: Duration::from_millis(20),
    };
    AudioPipeline::new(
        driver,
        store,
        RateLimiter::new(100, Duration::from_secs(1)),
        Retrier::new(policy, sink.clone()),
        sink,
        config,
    )
}

fn drain(rx: &mut UnboundedReceiver<ProgressEvent>) -> Vec<ProgressEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

// Splits into "One two. " and "Three four." at a 12 byte limit.
const TWO_CHUNK_SCRIPT: &str = "One two. Three four.";

#[tokio::test]
async fn narrates_in_chunks_and_assembles_one_file() {
    let dir = TempDir::new().unwrap();
    let store = FileArtifacts::new(dir.path()).unwrap();
    let driver = StubSynth::new(vec![]);
    let (sink, mut rx) = ProgressSink::channel();
    let p = pipeline(
        driver.clone(),
        store.clone(),
        1,
        sink,
        audio_config(12, 0),
    );

    let run = p.run(TWO_CHUNK_SCRIPT).await.unwrap();

    assert_eq!(run.chunks, 2);
    assert_eq!(run.fragments, 2);
    assert_eq!(run.path, dir.path().join("COMPLETE_AUDIO.wav"));

    // one header over both fragments' sample data
    let complete = store
        .read(&names::complete_audio_name("wav"))
        .await
        .unwrap();
    assert_eq!(complete.len(), 44 + 2 * 1000);

    // intermediate fragments cleaned up
    assert!(!store.exists(&names::fragment_name(1, "wav")).await.unwrap());
    assert!(!store.exists(&names::fragment_name(2, "wav")).await.unwrap());

    let chunks: Vec<(usize, usize)> = drain(&mut rx)
        .iter()
        .filter_map(|e| match e {
            ProgressEvent::AudioChunk { index, total } => Some((*index, *total)),
            _ => None,
        })
        .collect();
    assert_eq!(chunks, vec![(1, 2), (2, 2)]);
}

#[tokio::test]
async fn transient_chunk_failure_is_retried() {
    let dir = TempDir::new().unwrap();
    let store = FileArtifacts::new(dir.path()).unwrap();
    let driver = StubSynth::new(vec![Voice::Status(503)]);
    let p = pipeline(
        driver.clone(),
        store,
        1,
        ProgressSink::disabled(),
        audio_config(12, 0),
    );

    let run = p.run(TWO_CHUNK_SCRIPT).await.unwrap();

    assert_eq!(run.fragments, 2);
    // chunk one took two tries, chunk two one
    assert_eq!(driver.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn exhausted_chunk_leaves_a_gap() {
    let dir = TempDir::new().unwrap();
    let store = FileArtifacts::new(dir.path()).unwrap();
    let driver = StubSynth::new(vec![Voice::Status(503), Voice::Status(503)]);
    let (sink, mut rx) = ProgressSink::channel();
    let p = pipeline(
        driver.clone(),
        store.clone(),
        1,
        sink,
        audio_config(12, 0),
    );

    let run = p.run(TWO_CHUNK_SCRIPT).await.unwrap();

    assert_eq!(run.chunks, 2);
    assert_eq!(run.fragments, 1);

    // a single surviving fragment is copied verbatim
    let complete = store
        .read(&names::complete_audio_name("wav"))
        .await
        .unwrap();
    assert_eq!(complete.len(), 44 + 1000);
    assert!(!store.exists(&names::fragment_name(2, "wav")).await.unwrap());

    let events = drain(&mut rx);
    assert!(events
        .iter()
        .any(|e| matches!(e, ProgressEvent::Error { .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e, ProgressEvent::AudioChunk { index: 2, total: 2 })));
}

#[tokio::test]
async fn hard_failure_aborts_the_run() {
    let dir = TempDir::new().unwrap();
    let store = FileArtifacts::new(dir.path()).unwrap();
    let driver = StubSynth::new(vec![Voice::Status(400)]);
    let p = pipeline(
        driver.clone(),
        store.clone(),
        3,
        ProgressSink::disabled(),
        audio_config(12, 0),
    );

    let err = p.run(TWO_CHUNK_SCRIPT).await.unwrap_err();
    match err.kind() {
        CantastoriaErrorKind::Gemini(e) => {
            assert!(matches!(
                e.kind(),
                GeminiErrorKind::HttpStatus {
                    status_code: 400,
                    ..
                }
            ));
        }
        other => panic!("expected Gemini, got {other:?}"),
    }
    assert_eq!(driver.calls.load(Ordering::SeqCst), 1);
    assert!(!store
        .exists(&names::complete_audio_name("wav"))
        .await
        .unwrap());
}

#[tokio::test]
async fn undecodable_payload_skips_the_chunk() {
    let dir = TempDir::new().unwrap();
    let store = FileArtifacts::new(dir.path()).unwrap();
    let driver = StubSynth::new(vec![Voice::Garbage]);
    let p = pipeline(
        driver.clone(),
        store,
        1,
        ProgressSink::disabled(),
        audio_config(12, 0),
    );

    let run = p.run(TWO_CHUNK_SCRIPT).await.unwrap();

    assert_eq!(run.fragments, 1);
    // the bad payload is not retried
    assert_eq!(driver.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn run_with_no_audio_fails() {
    let dir = TempDir::new().unwrap();
    let store = FileArtifacts::new(dir.path()).unwrap();
    let driver = StubSynth::new(vec![Voice::Status(503), Voice::Status(503)]);
    let p = pipeline(
        driver,
        store,
        0,
        ProgressSink::disabled(),
        audio_config(12, 0),
    );

    let err = p.run(TWO_CHUNK_SCRIPT).await.unwrap_err();
    match err.kind() {
        CantastoriaErrorKind::Engine(e) => {
            assert_eq!(e.kind(), &EngineErrorKind::NoAudioProduced);
        }
        other => panic!("expected Engine, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_script_produces_nothing() {
    let dir = TempDir::new().unwrap();
    let store = FileArtifacts::new(dir.path()).unwrap();
    let driver = StubSynth::new(vec![]);
    let p = pipeline(
        driver.clone(),
        store,
        1,
        ProgressSink::disabled(),
        audio_config(4000, 0),
    );

    let err = p.run("").await.unwrap_err();
    match err.kind() {
        CantastoriaErrorKind::Engine(e) => {
            assert_eq!(e.kind(), &EngineErrorKind::NoAudioProduced);
        }
        other => panic!("expected Engine, got {other:?}"),
    }
    assert_eq!(driver.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn inter_chunk_delay_paces_synthesis() {
    let dir = TempDir::new().unwrap();
    let store = FileArtifacts::new(dir.path()).unwrap();
    let driver = StubSynth::new(vec![]);
    let p = pipeline(
        driver,
        store,
        1,
        ProgressSink::disabled(),
        audio_config(12, 100),
    );

    let start = Instant::now();
    let run = p.run(TWO_CHUNK_SCRIPT).await.unwrap();
    assert_eq!(run.fragments, 2);
    assert!(start.elapsed() >= Duration::from_millis(100));
}
