//! Speech-to-text: the recognizer seam and file-level helpers.

pub mod transcriber;
pub mod whisper;

pub use transcriber::{MockTranscriber, Transcriber, transcribe_file};
pub use whisper::{WhisperConfig, WhisperTranscriber};
