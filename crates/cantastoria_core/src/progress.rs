//! Progress reporting for long generation runs.
//!
//! Pipelines narrate their work through a [`ProgressSink`]: one event
//! per completed or failed step. Delivery is best-effort over an
//! unbounded channel, so emission never suspends the pipeline and a
//! slow or absent listener cannot stall a run.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// One step of a generation run, tagged by what happened.
#[derive(
    Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, derive_more::Display,
)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ProgressEvent {
    /// Free-form status line
    #[display("{}", message)]
    Progress {
        /// Human-readable status
        message: String,
    },

    /// The outline turn succeeded
    #[display("outline received ({} chars)", content.len())]
    Outline {
        /// Outline text
        content: String,
    },

    /// One script section completed
    #[display("section {} complete ({} chars)", index, content.len())]
    Section {
        /// Section number, 1-based
        index: usize,
        /// Section text
        content: String,
    },

    /// One audio fragment synthesized and persisted
    #[display("audio chunk {}/{}", index, total)]
    AudioChunk {
        /// Chunk number, 1-based
        index: usize,
        /// Chunk count for the run
        total: usize,
    },

    /// Images persisted for one sub-prompt
    #[display("image {}/{}", index, total)]
    ImageChunk {
        /// Sub-prompt number, 1-based
        index: usize,
        /// Sub-prompt count for the batch
        total: usize,
    },

    /// A failed call is about to be attempted again
    #[display("retry {}/{}: {}", attempt, max_attempts, message)]
    Retry {
        /// Retry number, 1-based
        attempt: usize,
        /// Retry ceiling from the policy
        max_attempts: usize,
        /// Message from the failure that triggered the retry
        message: String,
    },

    /// A step failed, contained or fatal
    #[display("error: {}", message)]
    Error {
        /// Failure description
        message: String,
    },
}

impl ProgressEvent {
    /// Free-form status event.
    pub fn progress(message: impl Into<String>) -> Self {
        Self::Progress {
            message: message.into(),
        }
    }

    /// Outline completion event.
    pub fn outline(content: impl Into<String>) -> Self {
        Self::Outline {
            content: content.into(),
        }
    }

    /// Section completion event.
    pub fn section(index: usize, content: impl Into<String>) -> Self {
        Self::Section {
            index,
            content: content.into(),
        }
    }

    /// Audio fragment completion event.
    pub fn audio_chunk(index: usize, total: usize) -> Self {
        Self::AudioChunk { index, total }
    }

    /// Sub-prompt completion event.
    pub fn image_chunk(index: usize, total: usize) -> Self {
        Self::ImageChunk { index, total }
    }

    /// Retry announcement event.
    pub fn retry(attempt: usize, max_attempts: usize, message: impl Into<String>) -> Self {
        Self::Retry {
            attempt,
            max_attempts,
            message: message.into(),
        }
    }

    /// Failure event.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

/// Non-blocking sender half for progress events.
///
/// Cloned freely into each pipeline. A sink built by [`channel`] feeds
/// a receiver; [`disabled`] swallows everything, for callers that do
/// not listen.
///
/// [`channel`]: ProgressSink::channel
/// [`disabled`]: ProgressSink::disabled
#[derive(Debug, Clone, Default)]
pub struct ProgressSink {
    tx: Option<UnboundedSender<ProgressEvent>>,
}

impl ProgressSink {
    /// Create a sink and the receiver it feeds.
    pub fn channel() -> (Self, UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// Create a sink that discards every event.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Send an event, discarding it if nobody listens.
    pub fn emit(&self, event: ProgressEvent) {
        if let Some(tx) = &self.tx {
            if tx.send(event).is_err() {
                tracing::trace!("progress listener gone, event dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn channel_delivers_in_order() {
        let (sink, mut rx) = ProgressSink::channel();
        sink.emit(ProgressEvent::progress("starting"));
        sink.emit(ProgressEvent::audio_chunk(1, 3));
        drop(sink);

        assert_eq!(rx.recv().await, Some(ProgressEvent::progress("starting")));
        assert_eq!(rx.recv().await, Some(ProgressEvent::audio_chunk(1, 3)));
        assert_eq!(rx.recv().await, None);
    }

    #[test]
    fn emit_without_listener_is_a_no_op() {
        let sink = ProgressSink::disabled();
        sink.emit(ProgressEvent::error("nobody hears this"));

        let (sink, rx) = ProgressSink::channel();
        drop(rx);
        sink.emit(ProgressEvent::progress("receiver already gone"));
    }

    #[test]
    fn serializes_with_tag_and_data() {
        let event = ProgressEvent::image_chunk(2, 5);
        let json = serde_json::to_string(&event).expect("serialize");
        assert_eq!(json, r#"{"type":"imageChunk","data":{"index":2,"total":5}}"#);

        let back: ProgressEvent = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, event);
    }

    #[test]
    fn retry_event_displays_attempt_and_ceiling() {
        let event = ProgressEvent::retry(2, 5, "status 503");
        assert_eq!(event.to_string(), "retry 2/5: status 503");
    }
}
