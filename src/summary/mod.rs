//! Meeting summarization: prompt templates, the Ollama client, and
//! summary output files.

pub mod ollama;
pub mod prompt;

use crate::error::Result;
use std::fs;
use std::path::Path;

pub use ollama::{MockSummarizer, OllamaClient, Summarizer, SummaryRequest};
pub use prompt::{PromptTemplate, list_prompts, prompt_path};

/// Save a generated summary as a Markdown document.
///
/// The file is a single `# Meeting Summary` heading followed by the body.
pub fn save_summary_markdown(summary: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let content = format!("# Meeting Summary\n\n{}", summary);
    fs::write(path, content)?;
    Ok(())
}

/// Save a generated summary as JSON: `{"content": <summary>}`.
pub fn save_summary_json(summary: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::json!({ "content": summary });
    fs::write(path, serde_json::to_string_pretty(&json)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_summary_markdown_has_heading() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("meeting_summary.md");

        save_summary_markdown("Decisions were made.", &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# Meeting Summary\n\n"));
        assert!(content.contains("Decisions were made."));
    }

    #[test]
    fn test_save_summary_json_shape() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("meeting_summary.json");

        save_summary_json("Action items follow.", &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["content"], "Action items follow.");
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("result").join("deep").join("summary.md");

        save_summary_markdown("body", &path).unwrap();
        assert!(path.exists());
    }
}
