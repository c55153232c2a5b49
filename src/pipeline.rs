//! Batch pipeline: video → audio → transcript → speakers → summary.
//!
//! Stages run sequentially and every stage persists its output before the
//! next one starts, so a downstream failure never destroys upstream work:
//! a diarization error still leaves `transcription.json` on disk.
//!
//! Concurrent runs must not share a working directory; the pipeline
//! introduces no other shared state.

use crate::command::CommandRunner;
use crate::defaults;
use crate::diarize::fuser::{OverlapMode, assign_speakers};
use crate::diarize::engine::Diarizer;
use crate::error::{MeetscribeError, Result};
use crate::extract;
use crate::progress::ProgressSink;
use crate::stt::transcriber::{Transcriber, transcribe_file};
use crate::summary::prompt::{PromptTemplate, prompt_path};
use crate::summary::{SummaryRequest, Summarizer, save_summary_json, save_summary_markdown};
use crate::transcript::Transcript;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Configuration for the batch pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Working directory for intermediate files (the extracted WAV).
    /// Must not be shared between concurrent runs.
    pub work_dir: PathBuf,
    /// Root directory for results; each run writes into
    /// `<result_root>/<video-stem>/`.
    pub result_root: PathBuf,
    /// Keep the working directory instead of deleting it on success.
    pub keep_work_dir: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("temp"),
            result_root: PathBuf::from("result"),
            keep_work_dir: false,
        }
    }
}

/// Artifacts produced by one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Directory holding this run's outputs.
    pub output_dir: PathBuf,
    /// The plain transcription artifact.
    pub transcript_file: PathBuf,
    /// The speaker-attributed artifact, when diarization ran.
    pub diarized_file: Option<PathBuf>,
    /// The final transcript (fused when diarization ran).
    pub transcript: Transcript,
}

/// The batch pipeline orchestrator.
///
/// Sequences extraction, transcription and optional diarization fusion
/// over external engines supplied as trait objects.
pub struct BatchPipeline {
    config: PipelineConfig,
    runner: Arc<dyn CommandRunner>,
    transcriber: Arc<dyn Transcriber>,
    diarizer: Option<Arc<dyn Diarizer>>,
}

impl BatchPipeline {
    pub fn new(
        config: PipelineConfig,
        runner: Arc<dyn CommandRunner>,
        transcriber: Arc<dyn Transcriber>,
    ) -> Self {
        Self {
            config,
            runner,
            transcriber,
            diarizer: None,
        }
    }

    /// Enable speaker diarization with the given backend.
    pub fn with_diarizer(mut self, diarizer: Arc<dyn Diarizer>) -> Self {
        self.diarizer = Some(diarizer);
        self
    }

    /// Run the pipeline for one video file.
    ///
    /// Stages: extract audio → transcribe → persist → (optional)
    /// diarize + fuse → persist. Status and percent updates are emitted
    /// per stage through `sink`.
    pub fn run(&self, video: &Path, sink: &dyn ProgressSink) -> Result<PipelineReport> {
        let stem = video
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| MeetscribeError::MediaFileNotFound {
                path: video.display().to_string(),
            })?;
        let output_dir = self.config.result_root.join(stem);
        std::fs::create_dir_all(&output_dir)?;

        // Stage 1: audio extraction
        sink.status("Extracting audio...");
        let audio_file = self.config.work_dir.join("extracted_audio.wav");
        extract::extract_audio(self.runner.as_ref(), video, &audio_file, sink)?;

        // Stage 2: speech transcription, persisted before diarization
        sink.status("Speech transcription...");
        let mut transcript = transcribe_file(&audio_file, self.transcriber.as_ref(), sink)?;

        let transcript_file = output_dir.join(defaults::TRANSCRIPTION_FILE);
        transcript.save(&transcript_file)?;

        // Stage 3: diarization and speaker fusion
        let diarized_file = match &self.diarizer {
            Some(diarizer) => {
                sink.status("Speaker diarization...");
                let intervals = diarizer.diarize(&audio_file, sink)?;

                sink.status("Assigning speakers...");
                assign_speakers(&mut transcript, &intervals, OverlapMode::Strict, sink);

                let diarized_file = output_dir.join(defaults::TRANSCRIPTION_DIARIZED_FILE);
                transcript.save(&diarized_file)?;
                Some(diarized_file)
            }
            None => None,
        };

        if !self.config.keep_work_dir && self.config.work_dir.exists() {
            std::fs::remove_dir_all(&self.config.work_dir)?;
        }

        sink.status("Completed! Results saved.");
        sink.percent(100.0);

        Ok(PipelineReport {
            output_dir,
            transcript_file,
            diarized_file,
            transcript,
        })
    }
}

/// Options for summarizing a saved transcript.
#[derive(Debug, Clone)]
pub struct SummarizeOptions {
    /// Ollama model name.
    pub model: String,
    /// Target language code, selects the prompt folder.
    pub language: String,
    /// Root of the prompt template tree.
    pub prompt_root: PathBuf,
    /// Prompt template name.
    pub prompt_name: String,
    /// Free-form glossary text handed to the model.
    pub glossary: String,
}

impl Default for SummarizeOptions {
    fn default() -> Self {
        Self {
            model: defaults::DEFAULT_SUMMARY_MODEL.to_string(),
            language: "en".to_string(),
            prompt_root: PathBuf::from(defaults::PROMPT_DIR),
            prompt_name: defaults::DEFAULT_PROMPT.to_string(),
            glossary: " ".to_string(),
        }
    }
}

/// Summary files written next to the transcript.
#[derive(Debug, Clone)]
pub struct SummaryArtifacts {
    pub markdown_file: PathBuf,
    pub json_file: PathBuf,
    pub summary: String,
}

/// Generate and save a meeting summary for a persisted transcript.
///
/// Loads the transcript and the language-specific prompt template, asks
/// the summarizer, and writes both output shapes (markdown and JSON) into
/// the transcript's directory.
pub async fn summarize_transcript(
    transcript_path: &Path,
    summarizer: &dyn Summarizer,
    options: &SummarizeOptions,
    sink: &dyn ProgressSink,
) -> Result<SummaryArtifacts> {
    let transcript = Transcript::load(transcript_path)?;
    if transcript.is_empty() {
        return Err(MeetscribeError::Summarization {
            message: format!(
                "Transcript {} has no segments to summarize",
                transcript_path.display()
            ),
        });
    }

    let prompt = PromptTemplate::load(&prompt_path(
        &options.prompt_root,
        &options.language,
        &options.prompt_name,
    ))?;

    let request = SummaryRequest::new(transcript.full_text(), prompt, options.model.clone())
        .with_glossary(options.glossary.clone());

    sink.status("Generating meeting summary...");
    let summary = summarizer.summarize(&request).await?;

    let output_dir = transcript_path.parent().unwrap_or(Path::new("."));
    let markdown_file = output_dir.join(defaults::SUMMARY_MD_FILE);
    let json_file = output_dir.join(defaults::SUMMARY_JSON_FILE);
    save_summary_markdown(&summary, &markdown_file)?;
    save_summary_json(&summary, &json_file)?;

    sink.status("Summary generated and saved.");
    sink.percent(100.0);

    Ok(SummaryArtifacts {
        markdown_file,
        json_file,
        summary,
    })
}
