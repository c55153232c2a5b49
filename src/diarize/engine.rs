//! Diarization engine seam.
//!
//! The actual diarization model runs outside this crate. `Diarizer` is the
//! boundary: given an audio file it yields speaker-labeled intervals.
//! `CommandDiarizer` adapts any external backend that prints interval JSON
//! on stdout; `MockDiarizer` scripts results for tests.

use crate::command::CommandRunner;
use crate::diarize::SpeakerInterval;
use crate::error::{MeetscribeError, Result};
use crate::progress::ProgressSink;
use std::path::Path;
use std::sync::Arc;

/// Trait for speaker diarization backends.
pub trait Diarizer: Send + Sync {
    /// Produce speaker intervals for an audio file.
    ///
    /// Step-named status updates go through `sink`; the backend decides
    /// the granularity.
    fn diarize(&self, audio: &Path, sink: &dyn ProgressSink) -> Result<Vec<SpeakerInterval>>;
}

/// Implement Diarizer for Arc<T> to allow sharing across pipeline runs.
impl<T: Diarizer> Diarizer for Arc<T> {
    fn diarize(&self, audio: &Path, sink: &dyn ProgressSink) -> Result<Vec<SpeakerInterval>> {
        (**self).diarize(audio, sink)
    }
}

/// Diarizer that shells out to an external backend command.
///
/// The command receives the audio path as its final argument and must
/// print a JSON array of `{start, end, speaker}` objects on stdout. An
/// auth token, when configured, is passed via `--auth-token`.
pub struct CommandDiarizer<R: CommandRunner> {
    runner: R,
    program: String,
    auth_token: Option<String>,
}

impl<R: CommandRunner> CommandDiarizer<R> {
    pub fn new(runner: R, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
            auth_token: None,
        }
    }

    /// Set the auth token forwarded to the backend.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }
}

impl<R: CommandRunner> Diarizer for CommandDiarizer<R> {
    fn diarize(&self, audio: &Path, sink: &dyn ProgressSink) -> Result<Vec<SpeakerInterval>> {
        sink.status("Speaker separation...");

        let audio_arg = audio.to_string_lossy().to_string();
        let mut args: Vec<&str> = Vec::new();
        if let Some(token) = self.auth_token.as_deref() {
            args.push("--auth-token");
            args.push(token);
        }
        args.push(&audio_arg);

        let stdout = self.runner.run(&self.program, &args).map_err(|e| {
            MeetscribeError::Diarization {
                message: e.to_string(),
            }
        })?;

        let intervals: Vec<SpeakerInterval> =
            serde_json::from_str(&stdout).map_err(|e| MeetscribeError::Diarization {
                message: format!("Backend produced invalid interval JSON: {}", e),
            })?;

        sink.status("Speaker separation complete.");
        Ok(intervals)
    }
}

/// Mock diarizer for testing.
#[derive(Debug, Clone, Default)]
pub struct MockDiarizer {
    intervals: Vec<SpeakerInterval>,
    should_fail: bool,
    auth_rejected: bool,
}

impl MockDiarizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the intervals returned on success.
    pub fn with_intervals(mut self, intervals: Vec<SpeakerInterval>) -> Self {
        self.intervals = intervals;
        self
    }

    /// Configure the mock to fail.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Configure the mock to fail with an auth rejection.
    pub fn with_auth_rejection(mut self) -> Self {
        self.auth_rejected = true;
        self
    }
}

impl Diarizer for MockDiarizer {
    fn diarize(&self, _audio: &Path, sink: &dyn ProgressSink) -> Result<Vec<SpeakerInterval>> {
        if self.auth_rejected {
            return Err(MeetscribeError::DiarizationAuth {
                message: "mock token rejected".to_string(),
            });
        }
        if self.should_fail {
            return Err(MeetscribeError::Diarization {
                message: "mock diarization failure".to_string(),
            });
        }
        sink.status("Speaker separation...");
        Ok(self.intervals.clone())
    }
}
