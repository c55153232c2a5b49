//! Realtime streaming transcription session.
//!
//! The session owns the input device and the incremental transcriber for
//! its whole lifetime and drives them from one loop:
//!
//! Idle → WarmUp (engine primed with silence) → Streaming (read chunk,
//! insert, process, emit) → Stopped (device released).
//!
//! Chunk acquisition is the only blocking point and exactly one chunk is
//! in flight at a time, so emitted text always preserves temporal order.
//! Read or engine failures are fatal to the session; the caller decides
//! whether to start a new one.

use crate::defaults;
use crate::error::{MeetscribeError, Result};
use crate::streaming::sink::LineSink;
use crate::streaming::source::ChunkSource;
use crate::streaming::transcriber::IncrementalTranscriber;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// What the recognizer should do with the audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TaskMode {
    /// Transcribe in the source language.
    #[default]
    Transcribe,
    /// Translate to English while transcribing.
    Translate,
}

/// Configuration for a streaming session, fixed at start.
#[derive(Debug, Clone)]
pub struct StreamingConfig {
    /// Sample rate of the input device. Must match the engine's rate.
    pub sample_rate: u32,
    /// Duration of one capture chunk in seconds.
    pub chunk_secs: f64,
    /// Source language code, or "auto".
    pub language: String,
    /// Transcribe or translate.
    pub task: TaskMode,
    /// Voice activity detection, forwarded to the engine.
    pub vad: bool,
    /// Committed audio retained before the rolling buffer is trimmed.
    pub trim_after_secs: f64,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
            chunk_secs: defaults::CHUNK_SECS,
            language: defaults::DEFAULT_LANGUAGE.to_string(),
            task: TaskMode::Transcribe,
            vad: true,
            trim_after_secs: defaults::BUFFER_TRIM_SECS,
        }
    }
}

impl StreamingConfig {
    /// Number of samples in one capture chunk.
    pub fn chunk_samples(&self) -> usize {
        (self.sample_rate as f64 * self.chunk_secs) as usize
    }

    fn validate(&self) -> Result<()> {
        if self.sample_rate != defaults::SAMPLE_RATE {
            return Err(MeetscribeError::ConfigInvalidValue {
                key: "sample_rate".to_string(),
                message: format!(
                    "must be {} Hz to match the recognizer, got {}",
                    defaults::SAMPLE_RATE,
                    self.sample_rate
                ),
            });
        }
        if self.chunk_secs <= 0.0 {
            return Err(MeetscribeError::ConfigInvalidValue {
                key: "chunk_secs".to_string(),
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Lifecycle state of a streaming session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    WarmUp,
    Streaming,
    Stopped,
}

/// Handle to request a running session to stop.
#[derive(Clone)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    /// Request the session to stop after the chunk in flight.
    pub fn stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Returns true if a stop has been requested.
    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// A realtime streaming transcription session.
pub struct StreamingSession {
    config: StreamingConfig,
    state: SessionState,
    stop: Arc<AtomicBool>,
}

impl StreamingSession {
    /// Create a session, validating the configuration.
    pub fn new(config: StreamingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: SessionState::Idle,
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn config(&self) -> &StreamingConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Handle for requesting a stop from another thread.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            flag: self.stop.clone(),
        }
    }

    /// Run the session to completion.
    ///
    /// Blocks the calling thread until the source ends, a stop is
    /// requested, or a failure occurs. The source is released in every
    /// exit path and the session ends in `Stopped`.
    pub fn run(
        &mut self,
        source: &mut dyn ChunkSource,
        transcriber: &mut dyn IncrementalTranscriber,
        sink: &mut dyn LineSink,
    ) -> Result<()> {
        self.state = SessionState::WarmUp;

        if let Err(e) = source.start() {
            self.state = SessionState::Stopped;
            return Err(e);
        }

        let warmup = vec![0i16; (self.config.sample_rate as f64 * defaults::WARMUP_SECS) as usize];
        if let Err(e) = transcriber.warm_up(&warmup) {
            eprintln!("meetscribe: transcriber warm-up failed: {}", e);
            return self.teardown(source, Err(e));
        }

        self.state = SessionState::Streaming;
        let chunk_samples = self.config.chunk_samples();

        while !self.stop.load(Ordering::SeqCst) {
            let chunk = match source.read_chunk(chunk_samples) {
                Ok(chunk) => chunk,
                Err(e) => {
                    eprintln!("meetscribe: audio read failed: {}", e);
                    return self.teardown(source, Err(e));
                }
            };

            if chunk.is_empty() {
                break;
            }
            let source_drained = chunk.len() < chunk_samples;

            if let Err(e) = transcriber.insert_chunk(&chunk) {
                eprintln!("meetscribe: transcriber rejected chunk: {}", e);
                return self.teardown(source, Err(e));
            }

            match transcriber.process() {
                Ok(partial) => {
                    if let Err(e) = self.emit(sink, &partial.committed) {
                        return self.teardown(source, Err(e));
                    }
                }
                Err(e) => {
                    eprintln!("meetscribe: transcription step failed: {}", e);
                    return self.teardown(source, Err(e));
                }
            }

            if source_drained {
                break;
            }
        }

        // Flush whatever is still uncommitted
        match transcriber.finish() {
            Ok(partial) => {
                if let Err(e) = self.emit(sink, &partial.committed) {
                    return self.teardown(source, Err(e));
                }
            }
            Err(e) => return self.teardown(source, Err(e)),
        }

        self.teardown(source, Ok(()))
    }

    /// Emit a committed fragment, terminating the line when it ends a
    /// sentence and space-joining it otherwise.
    fn emit(&self, sink: &mut dyn LineSink, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        if text.ends_with(defaults::SENTENCE_TERMINATORS) {
            sink.emit(&format!("{}\n", text))
        } else {
            sink.emit(&format!("{} ", text))
        }
    }

    fn teardown(&mut self, source: &mut dyn ChunkSource, result: Result<()>) -> Result<()> {
        if let Err(e) = source.stop() {
            eprintln!("meetscribe: failed to stop audio source: {}", e);
        }
        self.state = SessionState::Stopped;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streaming::sink::CollectorLineSink;
    use crate::streaming::source::MockChunkSource;
    use crate::streaming::transcriber::PartialResult;

    /// Incremental transcriber that replays a script of committed
    /// fragments, one per process() call.
    struct ScriptedTranscriber {
        script: Vec<String>,
        next: usize,
        final_fragment: String,
        warmed_up: bool,
        inserted_samples: usize,
    }

    impl ScriptedTranscriber {
        fn new(script: &[&str]) -> Self {
            Self {
                script: script.iter().map(|s| s.to_string()).collect(),
                next: 0,
                final_fragment: String::new(),
                warmed_up: false,
                inserted_samples: 0,
            }
        }

        fn with_final_fragment(mut self, text: &str) -> Self {
            self.final_fragment = text.to_string();
            self
        }
    }

    impl IncrementalTranscriber for ScriptedTranscriber {
        fn warm_up(&mut self, _samples: &[i16]) -> Result<()> {
            self.warmed_up = true;
            Ok(())
        }

        fn insert_chunk(&mut self, samples: &[i16]) -> Result<()> {
            self.inserted_samples += samples.len();
            Ok(())
        }

        fn process(&mut self) -> Result<PartialResult> {
            let committed = self.script.get(self.next).cloned().unwrap_or_default();
            self.next += 1;
            Ok(PartialResult {
                committed,
                uncommitted: String::new(),
                end_time: self.next as f64,
            })
        }

        fn finish(&mut self) -> Result<PartialResult> {
            Ok(PartialResult {
                committed: self.final_fragment.clone(),
                uncommitted: String::new(),
                end_time: self.next as f64,
            })
        }
    }

    /// Samples for `chunks` full capture chunks at the default config.
    fn chunk_audio(chunks: usize) -> Vec<i16> {
        let per_chunk = StreamingConfig::default().chunk_samples();
        vec![250i16; per_chunk * chunks]
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = StreamingConfig::default();
        assert!(StreamingSession::new(config).is_ok());
    }

    #[test]
    fn test_config_rejects_wrong_sample_rate() {
        let config = StreamingConfig {
            sample_rate: 44100,
            ..StreamingConfig::default()
        };
        let result = StreamingSession::new(config);
        assert!(matches!(
            result,
            Err(MeetscribeError::ConfigInvalidValue { .. })
        ));
    }

    #[test]
    fn test_config_rejects_zero_chunk() {
        let config = StreamingConfig {
            chunk_secs: 0.0,
            ..StreamingConfig::default()
        };
        assert!(StreamingSession::new(config).is_err());
    }

    #[test]
    fn test_chunk_samples() {
        let config = StreamingConfig::default();
        assert_eq!(config.chunk_samples(), 12800); // 0.8s at 16kHz
    }

    #[test]
    fn test_sentence_ending_fragment_gets_line_break() {
        let mut session = StreamingSession::new(StreamingConfig::default()).unwrap();
        let mut source = MockChunkSource::new().with_samples(chunk_audio(2));
        let mut transcriber = ScriptedTranscriber::new(&["hello world.", ""]);
        let mut sink = CollectorLineSink::new();

        session.run(&mut source, &mut transcriber, &mut sink).unwrap();

        assert_eq!(sink.fragments()[0], "hello world.\n");
    }

    #[test]
    fn test_unterminated_fragment_gets_no_line_break() {
        let mut session = StreamingSession::new(StreamingConfig::default()).unwrap();
        let mut source = MockChunkSource::new().with_samples(chunk_audio(2));
        let mut transcriber = ScriptedTranscriber::new(&["hello wor", ""]);
        let mut sink = CollectorLineSink::new();

        session.run(&mut source, &mut transcriber, &mut sink).unwrap();

        assert_eq!(sink.fragments()[0], "hello wor ");
        assert!(!sink.output().contains('\n'));
    }

    #[test]
    fn test_question_and_exclamation_terminate_lines() {
        let mut session = StreamingSession::new(StreamingConfig::default()).unwrap();
        let mut source = MockChunkSource::new().with_samples(chunk_audio(3));
        let mut transcriber = ScriptedTranscriber::new(&["any questions?", "yes!", ""]);
        let mut sink = CollectorLineSink::new();

        session.run(&mut source, &mut transcriber, &mut sink).unwrap();

        assert_eq!(sink.output(), "any questions?\nyes!\n");
    }

    #[test]
    fn test_empty_fragments_are_not_emitted() {
        let mut session = StreamingSession::new(StreamingConfig::default()).unwrap();
        let mut source = MockChunkSource::new().with_samples(chunk_audio(3));
        let mut transcriber = ScriptedTranscriber::new(&["", "", ""]);
        let mut sink = CollectorLineSink::new();

        session.run(&mut source, &mut transcriber, &mut sink).unwrap();

        assert!(sink.fragments().is_empty());
    }

    #[test]
    fn test_warm_up_runs_before_streaming() {
        let mut session = StreamingSession::new(StreamingConfig::default()).unwrap();
        let mut source = MockChunkSource::new().with_samples(chunk_audio(1));
        let mut transcriber = ScriptedTranscriber::new(&[""]);
        let mut sink = CollectorLineSink::new();

        session.run(&mut source, &mut transcriber, &mut sink).unwrap();

        assert!(transcriber.warmed_up);
    }

    #[test]
    fn test_all_captured_audio_reaches_transcriber() {
        let mut session = StreamingSession::new(StreamingConfig::default()).unwrap();
        let samples = chunk_audio(3);
        let total = samples.len();
        let mut source = MockChunkSource::new().with_samples(samples);
        let mut transcriber = ScriptedTranscriber::new(&["", "", ""]);
        let mut sink = CollectorLineSink::new();

        session.run(&mut source, &mut transcriber, &mut sink).unwrap();

        assert_eq!(transcriber.inserted_samples, total);
    }

    #[test]
    fn test_finish_flushes_final_fragment() {
        let mut session = StreamingSession::new(StreamingConfig::default()).unwrap();
        let mut source = MockChunkSource::new().with_samples(chunk_audio(1));
        let mut transcriber =
            ScriptedTranscriber::new(&[""]).with_final_fragment("closing remarks.");
        let mut sink = CollectorLineSink::new();

        session.run(&mut source, &mut transcriber, &mut sink).unwrap();

        assert_eq!(sink.output(), "closing remarks.\n");
    }

    #[test]
    fn test_session_ends_stopped_after_source_drains() {
        let mut session = StreamingSession::new(StreamingConfig::default()).unwrap();
        let mut source = MockChunkSource::new().with_samples(chunk_audio(1));
        let mut transcriber = ScriptedTranscriber::new(&[""]);
        let mut sink = CollectorLineSink::new();

        assert_eq!(session.state(), SessionState::Idle);
        session.run(&mut source, &mut transcriber, &mut sink).unwrap();
        assert_eq!(session.state(), SessionState::Stopped);
        assert!(!source.is_started());
    }

    #[test]
    fn test_stop_requested_before_run_skips_streaming() {
        let mut session = StreamingSession::new(StreamingConfig::default()).unwrap();
        let handle = session.stop_handle();
        handle.stop();

        let mut source = MockChunkSource::new().with_samples(chunk_audio(10));
        let mut transcriber = ScriptedTranscriber::new(&["never seen"]);
        let mut sink = CollectorLineSink::new();

        session.run(&mut source, &mut transcriber, &mut sink).unwrap();

        // No chunk was read or processed; only finish ran
        assert_eq!(transcriber.inserted_samples, 0);
        assert_eq!(session.state(), SessionState::Stopped);
        assert!(handle.is_stopped());
    }

    #[test]
    fn test_start_failure_leaves_session_stopped() {
        let mut session = StreamingSession::new(StreamingConfig::default()).unwrap();
        let mut source = MockChunkSource::new().with_start_failure();
        let mut transcriber = ScriptedTranscriber::new(&[]);
        let mut sink = CollectorLineSink::new();

        let result = session.run(&mut source, &mut transcriber, &mut sink);

        assert!(result.is_err());
        assert_eq!(session.state(), SessionState::Stopped);
    }

    #[test]
    fn test_read_failure_is_fatal_and_releases_source() {
        let mut session = StreamingSession::new(StreamingConfig::default()).unwrap();
        let mut source = MockChunkSource::new()
            .with_samples(chunk_audio(5))
            .with_read_failure()
            .with_error_message("device disconnect");
        let mut transcriber = ScriptedTranscriber::new(&[]);
        let mut sink = CollectorLineSink::new();

        let result = session.run(&mut source, &mut transcriber, &mut sink);

        assert!(result.is_err());
        assert_eq!(session.state(), SessionState::Stopped);
        assert!(!source.is_started());
    }

    #[test]
    fn test_engine_failure_is_fatal() {
        struct FailingTranscriber;
        impl IncrementalTranscriber for FailingTranscriber {
            fn warm_up(&mut self, _samples: &[i16]) -> Result<()> {
                Ok(())
            }
            fn insert_chunk(&mut self, _samples: &[i16]) -> Result<()> {
                Ok(())
            }
            fn process(&mut self) -> Result<PartialResult> {
                Err(MeetscribeError::Transcription {
                    message: "engine crashed".to_string(),
                })
            }
            fn finish(&mut self) -> Result<PartialResult> {
                Ok(PartialResult::default())
            }
        }

        let mut session = StreamingSession::new(StreamingConfig::default()).unwrap();
        let mut source = MockChunkSource::new().with_samples(chunk_audio(2));
        let mut sink = CollectorLineSink::new();

        let result = session.run(&mut source, &mut FailingTranscriber, &mut sink);

        assert!(result.is_err());
        assert_eq!(session.state(), SessionState::Stopped);
    }
}
