//! Speaker diarization: engine seam and speaker-attribution fuser.
//!
//! The diarization engine itself is an external collaborator reached
//! through the `Diarizer` trait; this module owns the logic that fuses its
//! speaker intervals with a transcript's segment and word time spans.

pub mod engine;
pub mod fuser;

use serde::{Deserialize, Serialize};

pub use engine::{CommandDiarizer, Diarizer, MockDiarizer};
pub use fuser::{OverlapMode, assign_speakers};

/// A speaker-labeled time interval produced by diarization.
///
/// Labels are unique within one diarization output but not stable across
/// runs. Intervals of different speakers may overlap (simultaneous speech).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpeakerInterval {
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    /// Speaker label, e.g. "SPEAKER_00".
    pub speaker: String,
}

impl SpeakerInterval {
    pub fn new(start: f64, end: f64, speaker: impl Into<String>) -> Self {
        Self {
            start,
            end,
            speaker: speaker.into(),
        }
    }
}
