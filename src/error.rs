//! Error types for meetscribe.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MeetscribeError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Media probing / audio extraction errors
    #[error("Media file not found: {path}")]
    MediaFileNotFound { path: String },

    #[error("Media tool not found: {tool}")]
    MediaToolNotFound { tool: String },

    #[error("Media probe failed: {message}")]
    MediaProbe { message: String },

    #[error("Audio extraction failed: {message}")]
    AudioExtraction { message: String },

    // Audio capture errors
    #[error("Audio device not found: {device}")]
    AudioDeviceNotFound { device: String },

    #[error("Audio capture failed: {message}")]
    AudioCapture { message: String },

    // Transcription errors
    #[error("Transcription model not found at {path}")]
    TranscriptionModelNotFound { path: String },

    #[error("Transcription inference failed: {message}")]
    TranscriptionInferenceFailed { message: String },

    #[error("Transcription error: {message}")]
    Transcription { message: String },

    // Transcript persistence errors
    #[error("Transcript file not found: {path}")]
    TranscriptNotFound { path: String },

    #[error("Malformed transcript in {path}: {message}")]
    TranscriptMalformed { path: String, message: String },

    // Diarization errors
    #[error("Diarization failed: {message}")]
    Diarization { message: String },

    #[error("Diarization authentication rejected: {message}")]
    DiarizationAuth { message: String },

    // Summarization errors
    #[error("Prompt file not found: {path}")]
    PromptNotFound { path: String },

    #[error("Summarization service unreachable at {endpoint}: {message}")]
    SummaryServiceUnreachable { endpoint: String, message: String },

    #[error("Summarization failed: {message}")]
    Summarization { message: String },

    // JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, MeetscribeError>;
