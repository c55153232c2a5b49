//! Chunked audio input for the streaming session.

use crate::error::{MeetscribeError, Result};

/// Trait for blocking, chunk-oriented audio sources.
///
/// This trait allows swapping implementations (real audio device vs mock).
pub trait ChunkSource: Send {
    /// Start capturing audio from the source.
    fn start(&mut self) -> Result<()>;

    /// Stop capturing and release the device.
    fn stop(&mut self) -> Result<()>;

    /// Read exactly `samples` samples of 16-bit PCM, blocking until they
    /// are available. A shorter (possibly empty) result means the source
    /// has ended and no further reads will produce data.
    fn read_chunk(&mut self, samples: usize) -> Result<Vec<i16>>;
}

/// Mock chunk source for testing.
///
/// Serves a scripted sample buffer in chunk-sized slices, then an empty
/// read to signal end-of-stream.
#[derive(Debug, Clone)]
pub struct MockChunkSource {
    samples: Vec<i16>,
    position: usize,
    started: bool,
    should_fail_start: bool,
    should_fail_read: bool,
    error_message: String,
}

impl MockChunkSource {
    /// Create a new mock source with no samples.
    pub fn new() -> Self {
        Self {
            samples: Vec::new(),
            position: 0,
            started: false,
            should_fail_start: false,
            should_fail_read: false,
            error_message: "mock audio error".to_string(),
        }
    }

    /// Configure the samples the source serves.
    pub fn with_samples(mut self, samples: Vec<i16>) -> Self {
        self.samples = samples;
        self
    }

    /// Configure the mock to fail on start.
    pub fn with_start_failure(mut self) -> Self {
        self.should_fail_start = true;
        self
    }

    /// Configure the mock to fail on read.
    pub fn with_read_failure(mut self) -> Self {
        self.should_fail_read = true;
        self
    }

    /// Configure the error message for failures.
    pub fn with_error_message(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }

    /// Check if the source is started.
    pub fn is_started(&self) -> bool {
        self.started
    }
}

impl Default for MockChunkSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkSource for MockChunkSource {
    fn start(&mut self) -> Result<()> {
        if self.should_fail_start {
            return Err(MeetscribeError::AudioCapture {
                message: self.error_message.clone(),
            });
        }
        self.started = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.started = false;
        Ok(())
    }

    fn read_chunk(&mut self, samples: usize) -> Result<Vec<i16>> {
        if self.should_fail_read {
            return Err(MeetscribeError::AudioCapture {
                message: self.error_message.clone(),
            });
        }

        let end = (self.position + samples).min(self.samples.len());
        let chunk = self.samples[self.position..end].to_vec();
        self.position = end;
        Ok(chunk)
    }
}
