//! Incremental transcription over a rolling buffer.
//!
//! `IncrementalTranscriber` is the engine-facing contract of the streaming
//! loop. `OnlineTranscriber` implements it on top of any batch
//! `Transcriber` by re-transcribing the rolling buffer each step and
//! committing every segment except the trailing one, which may still be
//! revised as more audio arrives.

use crate::error::Result;
use crate::progress::NullProgress;
use crate::streaming::buffer::RollingAudioBuffer;
use crate::stt::transcriber::Transcriber;
use crate::{defaults, transcript::TranscriptSegment};

/// Output of one incremental processing step.
///
/// `committed` holds only the text newly stabilized by this step; callers
/// concatenate fragments to obtain the full committed transcript.
/// Superseded by the next step's result.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PartialResult {
    /// Text finalized by this step. Empty when nothing new stabilized.
    pub committed: String,
    /// Trailing text still subject to revision.
    pub uncommitted: String,
    /// Absolute end time in seconds of all committed audio.
    pub end_time: f64,
}

/// Trait for incremental transcription engines.
///
/// The streaming session feeds fixed-size chunks through `insert_chunk`,
/// then calls `process` once per chunk. `finish` flushes whatever is still
/// uncommitted at stream end.
pub trait IncrementalTranscriber: Send {
    /// Prime the engine so the first real chunk does not pay model
    /// initialization latency. Must not affect transcription state.
    fn warm_up(&mut self, samples: &[i16]) -> Result<()>;

    /// Append captured samples to the internal rolling buffer.
    fn insert_chunk(&mut self, samples: &[i16]) -> Result<()>;

    /// Run one incremental step over the buffered audio.
    fn process(&mut self) -> Result<PartialResult>;

    /// Commit all remaining buffered audio and reset the buffer.
    fn finish(&mut self) -> Result<PartialResult>;
}

/// Configuration for `OnlineTranscriber`.
#[derive(Debug, Clone)]
pub struct OnlineTranscriberConfig {
    /// Language hint forwarded to the engine (informational; the wrapped
    /// engine was configured with it at construction).
    pub language: String,
    /// Committed audio retained in the buffer before trimming kicks in.
    pub trim_after_secs: f64,
}

impl Default for OnlineTranscriberConfig {
    fn default() -> Self {
        Self {
            language: defaults::DEFAULT_LANGUAGE.to_string(),
            trim_after_secs: defaults::BUFFER_TRIM_SECS,
        }
    }
}

/// Incremental transcriber over a batch engine.
///
/// Commit policy: after transcribing the whole buffer, every segment but
/// the last is considered stable. The last segment's text is reported as
/// uncommitted because the engine may still split or reword it once the
/// following audio arrives. When the committed prefix of the buffer
/// exceeds `trim_after_secs`, the buffer is trimmed to the committed
/// boundary; the moving origin keeps future timestamps on the recording
/// clock.
pub struct OnlineTranscriber<T: Transcriber> {
    engine: T,
    config: OnlineTranscriberConfig,
    buffer: RollingAudioBuffer,
    committed_until: f64,
}

impl<T: Transcriber> OnlineTranscriber<T> {
    pub fn new(engine: T, config: OnlineTranscriberConfig) -> Self {
        Self {
            engine,
            config,
            buffer: RollingAudioBuffer::new(defaults::SAMPLE_RATE),
            committed_until: 0.0,
        }
    }

    /// Absolute end time of all committed audio.
    pub fn committed_until(&self) -> f64 {
        self.committed_until
    }

    /// Duration of audio currently held in the rolling buffer.
    pub fn buffered_secs(&self) -> f64 {
        self.buffer.duration()
    }

    /// Segments from one engine pass, with buffer-relative timestamps
    /// shifted onto the recording clock.
    fn transcribe_buffer(&self) -> Result<Vec<TranscriptSegment>> {
        let origin = self.buffer.origin();
        let transcript = self.engine.transcribe(self.buffer.samples(), &NullProgress)?;
        Ok(transcript
            .segments
            .into_iter()
            .map(|mut segment| {
                segment.start += origin;
                segment.end += origin;
                segment
            })
            .collect())
    }

    /// Join the texts of newly committed segments and advance the commit
    /// boundary.
    fn commit(&mut self, segments: &[TranscriptSegment]) -> String {
        let mut fragments = Vec::new();
        for segment in segments {
            if segment.end > self.committed_until {
                fragments.push(segment.text.trim().to_string());
                self.committed_until = segment.end;
            }
        }
        fragments.retain(|f| !f.is_empty());
        fragments.join(" ")
    }
}

impl<T: Transcriber> IncrementalTranscriber for OnlineTranscriber<T> {
    fn warm_up(&mut self, samples: &[i16]) -> Result<()> {
        // Straight through the engine, bypassing the rolling buffer
        self.engine.transcribe(samples, &NullProgress)?;
        Ok(())
    }

    fn insert_chunk(&mut self, samples: &[i16]) -> Result<()> {
        self.buffer.push(samples);
        Ok(())
    }

    fn process(&mut self) -> Result<PartialResult> {
        if self.buffer.is_empty() {
            return Ok(PartialResult {
                end_time: self.committed_until,
                ..PartialResult::default()
            });
        }

        let segments = self.transcribe_buffer()?;

        let (stable, trailing) = match segments.split_last() {
            Some((last, rest)) => (rest, Some(last)),
            None => (&segments[..], None),
        };

        let committed = self.commit(stable);
        let uncommitted = trailing.map(|s| s.text.trim().to_string()).unwrap_or_default();

        // Trim once enough committed audio has piled up in the buffer
        if self.committed_until - self.buffer.origin() > self.config.trim_after_secs {
            self.buffer.trim_to(self.committed_until);
        }

        Ok(PartialResult {
            committed,
            uncommitted,
            end_time: self.committed_until,
        })
    }

    fn finish(&mut self) -> Result<PartialResult> {
        if self.buffer.is_empty() {
            return Ok(PartialResult {
                end_time: self.committed_until,
                ..PartialResult::default()
            });
        }

        let segments = self.transcribe_buffer()?;
        let committed = self.commit(&segments);
        self.buffer.clear();

        Ok(PartialResult {
            committed,
            uncommitted: String::new(),
            end_time: self.committed_until,
        })
    }
}
