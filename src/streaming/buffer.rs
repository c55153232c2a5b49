//! Rolling audio buffer for incremental transcription.
//!
//! Append-only sample storage with a moving time origin. The ingestion
//! loop appends chunks; the incremental transcriber reads the whole
//! buffer and trims the committed prefix to bound memory and latency.

use crate::defaults;

/// Sample buffer whose front can be trimmed as audio is committed.
///
/// `origin()` is the absolute time of the first retained sample, so
/// transcription timestamps relative to the buffer can always be mapped
/// back to the recording clock.
#[derive(Debug, Clone)]
pub struct RollingAudioBuffer {
    samples: Vec<i16>,
    sample_rate: u32,
    trimmed_samples: u64,
}

impl RollingAudioBuffer {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            samples: Vec::new(),
            sample_rate,
            trimmed_samples: 0,
        }
    }

    /// Append captured samples to the end of the buffer.
    pub fn push(&mut self, samples: &[i16]) {
        self.samples.extend_from_slice(samples);
    }

    /// The retained samples, oldest first.
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Absolute time in seconds of the first retained sample.
    pub fn origin(&self) -> f64 {
        self.trimmed_samples as f64 / self.sample_rate as f64
    }

    /// Duration in seconds of the retained samples.
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Absolute time in seconds just past the last retained sample.
    pub fn end_time(&self) -> f64 {
        self.origin() + self.duration()
    }

    /// Drop all samples before the absolute time `cut`, advancing the
    /// origin. `cut` is clamped to the retained range, so trimming past
    /// the end empties the buffer and trimming before the origin is a
    /// no-op. The origin stays sample-aligned.
    pub fn trim_to(&mut self, cut: f64) {
        let cut_offset = cut - self.origin();
        if cut_offset <= 0.0 {
            return;
        }

        let drop_count = ((cut_offset * self.sample_rate as f64) as usize).min(self.samples.len());
        self.samples.drain(..drop_count);
        self.trimmed_samples += drop_count as u64;
    }

    /// Drop everything, keeping the origin at the current end time.
    pub fn clear(&mut self) {
        self.trimmed_samples += self.samples.len() as u64;
        self.samples.clear();
    }
}

impl Default for RollingAudioBuffer {
    fn default() -> Self {
        Self::new(defaults::SAMPLE_RATE)
    }
}
