//! Speech-to-text recognizer seam.
//!
//! The recognition engine is an external collaborator; everything in this
//! crate talks to it through the `Transcriber` trait, which turns 16kHz
//! mono PCM into a timestamped `Transcript`.

use crate::defaults;
use crate::error::{MeetscribeError, Result};
use crate::progress::ProgressSink;
use crate::transcript::{Transcript, TranscriptSegment};
use std::path::Path;
use std::sync::Arc;

/// Trait for speech-to-text transcription.
///
/// This trait allows swapping implementations (real Whisper vs mock).
pub trait Transcriber: Send + Sync {
    /// Transcribe audio samples into a timestamped transcript.
    ///
    /// # Arguments
    /// * `audio` - Audio samples as 16-bit PCM at 16kHz mono
    /// * `sink` - Receives fractional progress where the engine reports it
    ///
    /// Segment (and, where supported, word) timestamps are in seconds
    /// from the start of `audio`.
    fn transcribe(&self, audio: &[i16], sink: &dyn ProgressSink) -> Result<Transcript>;

    /// Get the name of the loaded model
    fn model_name(&self) -> &str;

    /// Check if the transcriber is ready
    fn is_ready(&self) -> bool;
}

/// Implement Transcriber for Arc<T> to allow sharing across sessions.
impl<T: Transcriber> Transcriber for Arc<T> {
    fn transcribe(&self, audio: &[i16], sink: &dyn ProgressSink) -> Result<Transcript> {
        (**self).transcribe(audio, sink)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}

/// Transcribe a WAV file from disk.
///
/// Decodes the file with hound, downmixes stereo to mono and resamples to
/// 16kHz when needed, then hands the samples to the transcriber.
pub fn transcribe_file(
    path: &Path,
    transcriber: &dyn Transcriber,
    sink: &dyn ProgressSink,
) -> Result<Transcript> {
    let samples = load_wav_samples(path)?;
    transcriber.transcribe(&samples, sink)
}

/// Decode a WAV file into 16kHz mono i16 samples.
pub fn load_wav_samples(path: &Path) -> Result<Vec<i16>> {
    let mut reader = hound::WavReader::open(path).map_err(|e| match e {
        hound::Error::IoError(io) if io.kind() == std::io::ErrorKind::NotFound => {
            MeetscribeError::MediaFileNotFound {
                path: path.display().to_string(),
            }
        }
        other => MeetscribeError::AudioCapture {
            message: format!("Failed to parse WAV file: {}", other),
        },
    })?;

    let spec = reader.spec();
    let raw_samples: Vec<i16> = reader
        .samples::<i16>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| MeetscribeError::AudioCapture {
            message: format!("Failed to read WAV samples: {}", e),
        })?;

    // Convert to mono if stereo
    let mono_samples = if spec.channels == 2 {
        raw_samples
            .chunks_exact(2)
            .map(|chunk| {
                let left = chunk[0] as i32;
                let right = chunk[1] as i32;
                ((left + right) / 2) as i16
            })
            .collect()
    } else {
        raw_samples
    };

    // Resample to 16kHz if needed
    if spec.sample_rate != defaults::SAMPLE_RATE {
        Ok(resample(&mono_samples, spec.sample_rate, defaults::SAMPLE_RATE))
    } else {
        Ok(mono_samples)
    }
}

/// Simple linear interpolation resampling.
pub(crate) fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = source_pos.floor() as usize;
            let fraction = source_pos - source_idx as f64;

            if source_idx + 1 >= samples.len() {
                samples[source_idx]
            } else {
                let left = samples[source_idx] as f64;
                let right = samples[source_idx + 1] as f64;
                (left + (right - left) * fraction) as i16
            }
        })
        .collect()
}

/// Mock transcriber for testing
#[derive(Debug, Clone)]
pub struct MockTranscriber {
    model_name: String,
    segments: Vec<TranscriptSegment>,
    response: Option<String>,
    should_fail: bool,
}

impl MockTranscriber {
    /// Create a new mock transcriber with default settings
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            segments: vec![TranscriptSegment::new(0.0, 1.0, "mock transcription")],
            response: None,
            should_fail: false,
        }
    }

    /// Configure the mock to return specific segments
    pub fn with_segments(mut self, segments: Vec<TranscriptSegment>) -> Self {
        self.segments = segments;
        self
    }

    /// Configure the mock to return a single segment with this text,
    /// spanning the duration of the input audio.
    pub fn with_response(mut self, text: &str) -> Self {
        self.response = Some(text.to_string());
        self
    }

    /// Configure the mock to fail on transcribe
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Transcriber for MockTranscriber {
    fn transcribe(&self, audio: &[i16], sink: &dyn ProgressSink) -> Result<Transcript> {
        if self.should_fail {
            return Err(MeetscribeError::Transcription {
                message: "mock transcription failure".to_string(),
            });
        }

        sink.percent(100.0);

        if let Some(text) = &self.response {
            let duration = audio.len() as f64 / defaults::SAMPLE_RATE as f64;
            return Ok(Transcript::new(vec![TranscriptSegment::new(
                0.0, duration, text,
            )]));
        }

        Ok(Transcript::new(self.segments.clone()))
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        !self.should_fail
    }
}
