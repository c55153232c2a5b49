//! Prompt templates for summary generation.
//!
//! One JSON file per (language, prompt name), addressed as
//! `prompt/<lang-code>/<name>.json`:
//!
//! ```json
//! {"system_prompt": "You are a meeting assistant...", "user_prompt": "Summarize..."}
//! ```

use crate::error::{MeetscribeError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// A summarization prompt pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct PromptTemplate {
    pub system_prompt: String,
    pub user_prompt: String,
}

impl PromptTemplate {
    /// Load a prompt template from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MeetscribeError::PromptNotFound {
                    path: path.display().to_string(),
                }
            } else {
                MeetscribeError::Io(e)
            }
        })?;
        Ok(serde_json::from_str(&contents)?)
    }
}

/// Path of a prompt template: `<root>/<language>/<name>.json`.
pub fn prompt_path(root: &Path, language: &str, name: &str) -> PathBuf {
    root.join(language).join(format!("{}.json", name))
}

/// Names of the prompt templates available for a language, sorted.
///
/// A missing language folder yields an empty list, not an error.
pub fn list_prompts(root: &Path, language: &str) -> Vec<String> {
    let folder = root.join(language);
    let Ok(entries) = fs::read_dir(&folder) else {
        return Vec::new();
    };

    let mut names: Vec<String> = entries
        .flatten()
        .filter_map(|entry| {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .map(|s| s.to_string())
            } else {
                None
            }
        })
        .collect();
    names.sort();
    names
}
