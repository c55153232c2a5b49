//! meetscribe - Meeting transcription, speaker attribution and summarization
//!
//! Batch pipeline (video → transcript → speakers → summary) and a realtime
//! streaming transcription path, with the speech, diarization and LLM
//! engines behind swappable trait seams.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod command;
pub mod config;
pub mod defaults;
pub mod diarize;
pub mod error;
pub mod extract;
pub mod language;
pub mod pipeline;
pub mod progress;
pub mod streaming;
pub mod stt;
pub mod summary;
pub mod transcript;

// Core traits (engines behind seams)
pub use command::{CommandRunner, SystemCommandRunner};
pub use diarize::engine::Diarizer;
pub use streaming::source::ChunkSource;
pub use streaming::transcriber::IncrementalTranscriber;
pub use stt::transcriber::Transcriber;
pub use summary::ollama::Summarizer;

// Data model
pub use diarize::SpeakerInterval;
pub use transcript::{Transcript, TranscriptSegment, TranscriptWord};

// Pipelines
pub use pipeline::{BatchPipeline, PipelineConfig, PipelineReport};
pub use streaming::session::{StreamingConfig, StreamingSession};

// Error handling
pub use error::{MeetscribeError, Result};

// Config
pub use config::Config;

// Progress observer
pub use progress::{ProgressEvent, ProgressSink};

/// Build version string with optional git commit hash.
///
/// Returns `"0.3.1+abc1234"` when git hash is available, `"0.3.1"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
