//! Transcript data model and JSON persistence.
//!
//! The JSON shape is the boundary contract between the transcription,
//! diarization and summarization stages:
//!
//! ```json
//! {
//!   "segments": [
//!     {
//!       "start": 0.0, "end": 4.2, "text": "hello everyone",
//!       "speaker": "SPEAKER_00",
//!       "words": [{"start": 0.0, "end": 0.4, "word": "hello", "speaker": "SPEAKER_00"}]
//!     }
//!   ]
//! }
//! ```
//!
//! `speaker` and `words` are omitted entirely when unset, so a plain
//! transcription and a diarized one share the same reader.

use crate::error::{MeetscribeError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A single recognized word with its time span.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptWord {
    /// Start time in seconds from the start of the recording.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    /// The word text.
    pub word: String,
    /// Speaker label assigned by the fuser, absent until assigned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
}

impl TranscriptWord {
    pub fn new(start: f64, end: f64, word: impl Into<String>) -> Self {
        Self {
            start,
            end,
            word: word.into(),
            speaker: None,
        }
    }
}

/// A contiguous span of transcribed speech.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptSegment {
    /// Start time in seconds from the start of the recording.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    /// Transcribed text of the whole segment.
    pub text: String,
    /// Speaker label assigned by the fuser, absent until assigned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    /// Word-level timings, when the recognizer produced them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<TranscriptWord>>,
}

impl TranscriptSegment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            speaker: None,
            words: None,
        }
    }

    /// Attach word-level timings.
    pub fn with_words(mut self, words: Vec<TranscriptWord>) -> Self {
        self.words = Some(words);
        self
    }
}

/// An ordered transcript. Insertion order is temporal order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Transcript {
    pub segments: Vec<TranscriptSegment>,
}

impl Transcript {
    pub fn new(segments: Vec<TranscriptSegment>) -> Self {
        Self { segments }
    }

    /// True if the transcript has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// End time of the last segment, or 0.0 for an empty transcript.
    pub fn duration(&self) -> f64 {
        self.segments.last().map(|s| s.end).unwrap_or(0.0)
    }

    /// Newline-joined segment texts, the form handed to the summarizer.
    pub fn full_text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Load a transcript from a JSON file.
    ///
    /// A missing file and a malformed file are reported as distinct errors
    /// so callers can tell "nothing transcribed yet" from corruption.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MeetscribeError::TranscriptNotFound {
                    path: path.display().to_string(),
                }
            } else {
                MeetscribeError::Io(e)
            }
        })?;

        serde_json::from_str(&contents).map_err(|e| MeetscribeError::TranscriptMalformed {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Save the transcript as pretty-printed JSON, creating parent
    /// directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
