//! Ollama-backed meeting summarization.
//!
//! The language model runs behind Ollama's HTTP API; this module owns the
//! request/response plumbing and the prompt assembly. Everything else in
//! the crate talks to it through the `Summarizer` trait.

use crate::defaults;
use crate::error::{MeetscribeError, Result};
use crate::summary::prompt::PromptTemplate;
use async_trait::async_trait;
use serde::Deserialize;

/// One summarization request.
#[derive(Debug, Clone)]
pub struct SummaryRequest {
    /// Newline-joined transcript text.
    pub transcript_text: String,
    /// Free-form glossary of names and terms the model should respect.
    pub glossary: String,
    /// System/user prompt pair.
    pub prompt: PromptTemplate,
    /// Ollama model name, e.g. "llama3.1:8b".
    pub model: String,
}

impl SummaryRequest {
    pub fn new(transcript_text: impl Into<String>, prompt: PromptTemplate, model: impl Into<String>) -> Self {
        Self {
            transcript_text: transcript_text.into(),
            glossary: String::new(),
            prompt,
            model: model.into(),
        }
    }

    /// Attach glossary text.
    pub fn with_glossary(mut self, glossary: impl Into<String>) -> Self {
        self.glossary = glossary.into();
        self
    }

    /// The combined prompt sent as a single user message: transcript,
    /// glossary, system prompt, user prompt, newline-joined.
    pub fn combined_prompt(&self) -> String {
        format!(
            "{}\n{}\n{}\n{}\n",
            self.transcript_text, self.glossary, self.prompt.system_prompt, self.prompt.user_prompt
        )
    }
}

/// Trait for summary generation backends.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Generate a summary for the request.
    async fn summarize(&self, request: &SummaryRequest) -> Result<String>;

    /// List the model names the backend has available.
    async fn list_models(&self) -> Result<Vec<String>>;
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatMessage,
    #[serde(default)]
    done: bool,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

/// Client for a local or remote Ollama instance.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    endpoint: String,
    client: reqwest::Client,
}

impl OllamaClient {
    /// Create a client for the given endpoint, e.g. "http://localhost:11434".
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn chat_body(request: &SummaryRequest) -> serde_json::Value {
        serde_json::json!({
            "model": request.model,
            "messages": [{"role": "user", "content": request.combined_prompt()}],
            "stream": false,
            "options": {
                "num_ctx": defaults::SUMMARY_NUM_CTX,
                "num_predict": -1,
            },
        })
    }

    fn transport_error(&self, e: reqwest::Error) -> MeetscribeError {
        if e.is_connect() || e.is_timeout() {
            MeetscribeError::SummaryServiceUnreachable {
                endpoint: self.endpoint.clone(),
                message: e.to_string(),
            }
        } else {
            MeetscribeError::Summarization {
                message: e.to_string(),
            }
        }
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new(defaults::OLLAMA_ENDPOINT)
    }
}

#[async_trait]
impl Summarizer for OllamaClient {
    async fn summarize(&self, request: &SummaryRequest) -> Result<String> {
        let url = format!("{}/api/chat", self.endpoint);

        let response = self
            .client
            .post(&url)
            .json(&Self::chat_body(request))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(MeetscribeError::Summarization {
                message: format!("Ollama returned HTTP {}", response.status()),
            });
        }

        let chat: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| MeetscribeError::Summarization {
                    message: format!("Malformed chat response: {}", e),
                })?;

        if !chat.done {
            return Err(MeetscribeError::Summarization {
                message: "Model did not finish generating".to_string(),
            });
        }

        Ok(chat.message.content)
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.endpoint);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(MeetscribeError::Summarization {
                message: format!("Ollama returned HTTP {}", response.status()),
            });
        }

        let tags: TagsResponse =
            response
                .json()
                .await
                .map_err(|e| MeetscribeError::Summarization {
                    message: format!("Malformed tags response: {}", e),
                })?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}

/// Mock summarizer for testing.
#[derive(Debug, Clone)]
pub struct MockSummarizer {
    response: String,
    models: Vec<String>,
    should_fail: bool,
}

impl MockSummarizer {
    pub fn new() -> Self {
        Self {
            response: "mock summary".to_string(),
            models: vec![defaults::DEFAULT_SUMMARY_MODEL.to_string()],
            should_fail: false,
        }
    }

    /// Configure the summary text returned on success.
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = response.to_string();
        self
    }

    /// Configure the model list.
    pub fn with_models(mut self, models: &[&str]) -> Self {
        self.models = models.iter().map(|m| m.to_string()).collect();
        self
    }

    /// Configure the mock to fail as if the service were unreachable.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Default for MockSummarizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(&self, _request: &SummaryRequest) -> Result<String> {
        if self.should_fail {
            return Err(MeetscribeError::SummaryServiceUnreachable {
                endpoint: "mock".to_string(),
                message: "mock service down".to_string(),
            });
        }
        Ok(self.response.clone())
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        if self.should_fail {
            return Err(MeetscribeError::SummaryServiceUnreachable {
                endpoint: "mock".to_string(),
                message: "mock service down".to_string(),
            });
        }
        Ok(self.models.clone())
    }
}
