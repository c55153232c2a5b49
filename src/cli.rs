//! Command-line interface for meetscribe
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Meeting transcription, speaker attribution and summarization
#[derive(Parser, Debug)]
#[command(
    name = "meetscribe",
    version,
    about = "Meeting transcription, speaker attribution and summarization"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress status output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transcribe a video: extract audio, recognize speech, attribute speakers
    Run {
        /// Video file to process
        video: PathBuf,

        /// Whisper model (default: base, multilingual)
        #[arg(long, value_name = "MODEL")]
        model: Option<String>,

        /// Source language code (default: auto-detect). Examples: auto, en, ja, zh
        #[arg(long, value_name = "LANG")]
        language: Option<String>,

        /// Hugging Face token for the diarization backend.
        /// Omitting it (and the config token) skips speaker diarization
        #[arg(long, value_name = "TOKEN")]
        hf_token: Option<String>,

        /// Skip speaker diarization even when a token is configured
        #[arg(long)]
        no_diarize: bool,

        /// Root directory for results (default: result)
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Keep the temporary working directory
        #[arg(long)]
        keep_temp: bool,
    },

    /// Stream live transcription from a microphone to stdout
    Stream {
        /// Audio input device (e.g., pipewire)
        #[arg(long, value_name = "DEVICE")]
        device: Option<String>,

        /// Whisper model (default: base)
        #[arg(long, value_name = "MODEL")]
        model: Option<String>,

        /// Source language code (default: auto-detect)
        #[arg(long, value_name = "LANG")]
        language: Option<String>,

        /// Chunk duration in seconds
        #[arg(long, short = 'c', value_name = "SECONDS", default_value = "0.8")]
        chunk_secs: f64,

        /// Translate to English instead of transcribing
        #[arg(long)]
        translate: bool,

        /// Disable voice activity detection
        #[arg(long)]
        no_vad: bool,
    },

    /// Generate a meeting summary from a saved transcript
    Summarize {
        /// Transcript JSON file (transcription.json or transcription_diarized.json)
        transcript: PathBuf,

        /// Ollama model name (default: llama3.1:8b)
        #[arg(long, value_name = "MODEL")]
        model: Option<String>,

        /// Target language for the summary (name or code: English, 日本語, 中文)
        #[arg(long, value_name = "LANG")]
        language: Option<String>,

        /// Prompt template name (default: meeting)
        #[arg(long, value_name = "NAME")]
        prompt: Option<String>,

        /// File with glossary text appended to the prompt
        #[arg(long, value_name = "FILE")]
        glossary: Option<PathBuf>,
    },

    /// List available audio input devices
    Devices,

    /// List Ollama models available for summarization
    Models,

    /// List prompt templates for a language
    Prompts {
        /// Language (name or code, default: English)
        #[arg(long, value_name = "LANG")]
        language: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_command_with_defaults() {
        let cli = Cli::parse_from(["meetscribe", "run", "meeting.mp4"]);
        match cli.command {
            Commands::Run {
                video,
                model,
                hf_token,
                no_diarize,
                ..
            } => {
                assert_eq!(video, PathBuf::from("meeting.mp4"));
                assert_eq!(model, None);
                assert_eq!(hf_token, None);
                assert!(!no_diarize);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_stream_command_chunk_default() {
        let cli = Cli::parse_from(["meetscribe", "stream"]);
        match cli.command {
            Commands::Stream {
                chunk_secs,
                translate,
                no_vad,
                ..
            } => {
                assert_eq!(chunk_secs, 0.8);
                assert!(!translate);
                assert!(!no_vad);
            }
            _ => panic!("Expected Stream command"),
        }
    }

    #[test]
    fn test_summarize_command_options() {
        let cli = Cli::parse_from([
            "meetscribe",
            "summarize",
            "result/standup/transcription.json",
            "--model",
            "qwen2:7b",
            "--language",
            "中文",
            "--prompt",
            "standup",
        ]);
        match cli.command {
            Commands::Summarize {
                transcript,
                model,
                language,
                prompt,
                glossary,
            } => {
                assert_eq!(
                    transcript,
                    PathBuf::from("result/standup/transcription.json")
                );
                assert_eq!(model.as_deref(), Some("qwen2:7b"));
                assert_eq!(language.as_deref(), Some("中文"));
                assert_eq!(prompt.as_deref(), Some("standup"));
                assert_eq!(glossary, None);
            }
            _ => panic!("Expected Summarize command"),
        }
    }

    #[test]
    fn test_global_quiet_flag() {
        let cli = Cli::parse_from(["meetscribe", "-q", "devices"]);
        assert!(cli.quiet);
    }
}
