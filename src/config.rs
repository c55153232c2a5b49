use crate::defaults;
use crate::error::{MeetscribeError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
#[cfg(feature = "cli")]
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub transcription: TranscriptionConfig,
    pub diarization: DiarizationConfig,
    pub summary: SummaryConfig,
}

/// Audio capture and streaming configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub device: Option<String>,
    pub sample_rate: u32,
    pub chunk_secs: f64,
    pub buffer_trim_secs: f64,
    pub vad: bool,
}

/// Speech-to-text configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TranscriptionConfig {
    pub model: String,
    pub language: String,
}

/// Speaker diarization configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct DiarizationConfig {
    /// External backend command that prints interval JSON on stdout.
    pub backend: Option<String>,
    /// Auth token forwarded to the backend. No token disables diarization.
    pub auth_token: Option<String>,
}

/// Summarization configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SummaryConfig {
    pub endpoint: String,
    pub model: String,
    pub language: String,
    pub prompt: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: defaults::SAMPLE_RATE,
            chunk_secs: defaults::CHUNK_SECS,
            buffer_trim_secs: defaults::BUFFER_TRIM_SECS,
            vad: true,
        }
    }
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            model: defaults::DEFAULT_MODEL.to_string(),
            language: defaults::DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::OLLAMA_ENDPOINT.to_string(),
            model: defaults::DEFAULT_SUMMARY_MODEL.to_string(),
            language: "English".to_string(),
            prompt: defaults::DEFAULT_PROMPT.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file is missing or contains invalid TOML.
    /// Missing fields use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MeetscribeError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                MeetscribeError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file, or return defaults if the file
    /// doesn't exist. Invalid TOML is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(MeetscribeError::ConfigFileNotFound { .. }) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - MEETSCRIBE_MODEL → transcription.model
    /// - MEETSCRIBE_LANGUAGE → transcription.language
    /// - MEETSCRIBE_AUDIO_DEVICE → audio.device
    /// - MEETSCRIBE_HF_TOKEN → diarization.auth_token
    /// - MEETSCRIBE_OLLAMA_ENDPOINT → summary.endpoint
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("MEETSCRIBE_MODEL")
            && !model.is_empty()
        {
            self.transcription.model = model;
        }

        if let Ok(language) = std::env::var("MEETSCRIBE_LANGUAGE")
            && !language.is_empty()
        {
            self.transcription.language = language;
        }

        if let Ok(device) = std::env::var("MEETSCRIBE_AUDIO_DEVICE")
            && !device.is_empty()
        {
            self.audio.device = Some(device);
        }

        if let Ok(token) = std::env::var("MEETSCRIBE_HF_TOKEN")
            && !token.is_empty()
        {
            self.diarization.auth_token = Some(token);
        }

        if let Ok(endpoint) = std::env::var("MEETSCRIBE_OLLAMA_ENDPOINT")
            && !endpoint.is_empty()
        {
            self.summary.endpoint = endpoint;
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/meetscribe/config.toml on Linux
    #[cfg(feature = "cli")]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("meetscribe").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to serialize tests that modify environment variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    // SAFETY: These helpers are only used in tests with ENV_LOCK held,
    // ensuring no concurrent access to environment variables.
    fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) }
    }

    fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) }
    }

    fn clear_meetscribe_env() {
        remove_env("MEETSCRIBE_MODEL");
        remove_env("MEETSCRIBE_LANGUAGE");
        remove_env("MEETSCRIBE_AUDIO_DEVICE");
        remove_env("MEETSCRIBE_HF_TOKEN");
        remove_env("MEETSCRIBE_OLLAMA_ENDPOINT");
    }

    #[test]
    fn test_default_config_has_correct_values() {
        let config = Config::default();

        assert_eq!(config.audio.device, None);
        assert_eq!(config.audio.sample_rate, 16000);
        assert_eq!(config.audio.chunk_secs, 0.8);
        assert_eq!(config.audio.buffer_trim_secs, 15.0);
        assert!(config.audio.vad);

        assert_eq!(config.transcription.model, "base");
        assert_eq!(config.transcription.language, "auto");

        assert_eq!(config.diarization.backend, None);
        assert_eq!(config.diarization.auth_token, None);

        assert_eq!(config.summary.endpoint, "http://localhost:11434");
        assert_eq!(config.summary.model, "llama3.1:8b");
        assert_eq!(config.summary.language, "English");
        assert_eq!(config.summary.prompt, "meeting");
    }

    #[test]
    fn test_load_full_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[audio]
device = "pipewire"
chunk_secs = 1.5

[transcription]
model = "large-v2"
language = "ja"

[diarization]
backend = "pyannote-cli"
auth_token = "hf_abc123"

[summary]
model = "qwen2:7b"
language = "日本語"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.audio.device.as_deref(), Some("pipewire"));
        assert_eq!(config.audio.chunk_secs, 1.5);
        // Unspecified fields keep defaults
        assert_eq!(config.audio.sample_rate, 16000);
        assert_eq!(config.transcription.model, "large-v2");
        assert_eq!(config.diarization.backend.as_deref(), Some("pyannote-cli"));
        assert_eq!(config.summary.model, "qwen2:7b");
        assert_eq!(config.summary.language, "日本語");
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load(Path::new("/nonexistent/config.toml"));
        assert!(matches!(
            result,
            Err(MeetscribeError::ConfigFileNotFound { .. })
        ));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_or_default_invalid_toml_is_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "this is not = valid [toml").unwrap();

        let result = Config::load_or_default(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_env_overrides() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_meetscribe_env();

        set_env("MEETSCRIBE_MODEL", "small");
        set_env("MEETSCRIBE_LANGUAGE", "zh");
        set_env("MEETSCRIBE_AUDIO_DEVICE", "hw:1");
        set_env("MEETSCRIBE_HF_TOKEN", "hf_token");
        set_env("MEETSCRIBE_OLLAMA_ENDPOINT", "http://gpu-box:11434");

        let config = Config::default().with_env_overrides();

        assert_eq!(config.transcription.model, "small");
        assert_eq!(config.transcription.language, "zh");
        assert_eq!(config.audio.device.as_deref(), Some("hw:1"));
        assert_eq!(config.diarization.auth_token.as_deref(), Some("hf_token"));
        assert_eq!(config.summary.endpoint, "http://gpu-box:11434");

        clear_meetscribe_env();
    }

    #[test]
    fn test_env_overrides_ignore_empty_values() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_meetscribe_env();

        set_env("MEETSCRIBE_MODEL", "");

        let config = Config::default().with_env_overrides();
        assert_eq!(config.transcription.model, "base");

        clear_meetscribe_env();
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let config = Config {
            diarization: DiarizationConfig {
                backend: Some("diarize-backend".to_string()),
                auth_token: Some("tok".to_string()),
            },
            ..Config::default()
        };

        let serialized = toml::to_string(&config).unwrap();
        let back: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(back, config);
    }
}
