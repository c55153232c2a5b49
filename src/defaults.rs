//! Default configuration constants for meetscribe.
//!
//! This module provides shared constants used across different configuration types
//! to ensure consistency and eliminate duplication.

/// Default audio sample rate in Hz.
///
/// 16kHz is the standard for speech recognition and provides a good balance
/// between quality and computational efficiency for voice applications.
pub const SAMPLE_RATE: u32 = 16000;

/// Default streaming chunk duration in seconds.
///
/// 0.8s keeps end-to-end latency low while giving the incremental
/// transcriber enough new audio per step to make progress.
pub const CHUNK_SECS: f64 = 0.8;

/// Default rolling-buffer trim threshold in seconds.
///
/// Once this much committed audio has accumulated, the buffer is trimmed
/// back to the last committed boundary to bound memory and latency.
pub const BUFFER_TRIM_SECS: f64 = 15.0;

/// Warm-up buffer duration in seconds.
///
/// The incremental transcriber is primed with this much silence before
/// streaming starts, so the first real chunk does not pay model
/// initialization latency.
pub const WARMUP_SECS: f64 = 1.0;

/// Characters that terminate a spoken sentence in streaming output.
pub const SENTENCE_TERMINATORS: &[char] = &['.', '?', '!'];

/// Default Whisper model name.
///
/// "base" (multilingual) supports ja/zh/en meetings. Use "base.en" for
/// English-only recordings.
pub const DEFAULT_MODEL: &str = "base";

/// Default language code for transcription.
///
/// "auto" lets the recognizer detect the spoken language.
pub const DEFAULT_LANGUAGE: &str = "auto";

/// Language value that triggers automatic language detection.
pub const AUTO_LANGUAGE: &str = "auto";

/// Default Ollama model used for meeting summaries.
pub const DEFAULT_SUMMARY_MODEL: &str = "llama3.1:8b";

/// Default Ollama HTTP endpoint.
pub const OLLAMA_ENDPOINT: &str = "http://localhost:11434";

/// Context window requested from the summarization model.
///
/// Meeting transcripts routinely exceed the 2k-token default, so the chat
/// request asks for a 10k context explicitly.
pub const SUMMARY_NUM_CTX: u32 = 10240;

/// Default prompt template name.
pub const DEFAULT_PROMPT: &str = "meeting";

/// Directory holding prompt templates, one subdirectory per language code.
pub const PROMPT_DIR: &str = "prompt";

/// File name for the plain transcription artifact.
pub const TRANSCRIPTION_FILE: &str = "transcription.json";

/// File name for the speaker-attributed transcription artifact.
pub const TRANSCRIPTION_DIARIZED_FILE: &str = "transcription_diarized.json";

/// File name for the generated summary (markdown form).
pub const SUMMARY_MD_FILE: &str = "meeting_summary.md";

/// File name for the generated summary (JSON form).
pub const SUMMARY_JSON_FILE: &str = "meeting_summary.json";
