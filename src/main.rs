use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser};
use meetscribe::cli::{Cli, Commands};
use meetscribe::command::SystemCommandRunner;
use meetscribe::config::Config;
use meetscribe::diarize::engine::CommandDiarizer;
use meetscribe::pipeline::{BatchPipeline, PipelineConfig, SummarizeOptions, summarize_transcript};
use meetscribe::progress::{ChannelProgress, NullProgress, ProgressEvent, ProgressSink};
use meetscribe::stt::whisper::{WhisperConfig, WhisperTranscriber, model_file_path};
use meetscribe::summary::ollama::{OllamaClient, Summarizer};
use meetscribe::summary::prompt::list_prompts;
use meetscribe::{defaults, language};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            video,
            model,
            language,
            hf_token,
            no_diarize,
            output_dir,
            keep_temp,
        } => {
            run_batch(
                config, video, model, language, hf_token, no_diarize, output_dir, keep_temp,
                cli.quiet,
            )
            .await?;
        }
        Commands::Stream {
            device,
            model,
            language,
            chunk_secs,
            translate,
            no_vad,
        } => {
            run_stream(config, device, model, language, chunk_secs, translate, no_vad).await?;
        }
        Commands::Summarize {
            transcript,
            model,
            language,
            prompt,
            glossary,
        } => {
            run_summarize(config, transcript, model, language, prompt, glossary, cli.quiet)
                .await?;
        }
        Commands::Devices => {
            list_audio_devices()?;
        }
        Commands::Models => {
            let client = OllamaClient::new(config.summary.endpoint.clone());
            match client.list_models().await {
                Ok(models) if !models.is_empty() => {
                    for model in models {
                        println!("{}", model);
                    }
                }
                Ok(_) => println!("No Ollama models installed."),
                Err(e) => bail!("Unable to list Ollama models: {}", e),
            }
        }
        Commands::Prompts { language: lang } => {
            let code = language::resolve_or_default(
                lang.as_deref().unwrap_or(&config.summary.language),
            );
            let names = list_prompts(Path::new(defaults::PROMPT_DIR), code);
            if names.is_empty() {
                println!("No prompts available for {}", code);
            } else {
                for name in names {
                    println!("{}", name);
                }
            }
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => match Config::default_path() {
            Some(default) => Config::load_or_default(&default)
                .with_context(|| format!("Failed to load config from {}", default.display()))?,
            None => Config::default(),
        },
    };
    Ok(config.with_env_overrides())
}

/// Progress sink for the CLI: status lines and a percent ticker on stderr.
///
/// Returns the sink and a renderer thread that ends when the sink (and its
/// clones) are dropped.
fn console_progress(quiet: bool) -> (Arc<dyn ProgressSink>, Option<std::thread::JoinHandle<()>>) {
    if quiet {
        return (Arc::new(NullProgress), None);
    }

    let (sink, rx) = ChannelProgress::new(256);
    let renderer = std::thread::spawn(move || {
        use std::io::Write;
        for event in rx {
            match event {
                ProgressEvent::Status(message) => {
                    eprint!("\r\x1b[2K");
                    eprintln!("{}", message.bold());
                }
                ProgressEvent::Percent(percent) => {
                    eprint!("\r  {:>3}%", percent.round() as u32);
                    let _ = std::io::stderr().flush();
                }
            }
        }
        eprint!("\r\x1b[2K");
    });
    (Arc::new(sink), Some(renderer))
}

fn build_transcriber(config: &Config, model: Option<String>, language: Option<String>, translate: bool) -> Result<WhisperTranscriber> {
    let model = model.unwrap_or_else(|| config.transcription.model.clone());
    let language = language.unwrap_or_else(|| config.transcription.language.clone());
    let whisper_config = WhisperConfig {
        model_path: model_file_path(&model),
        language,
        translate,
        threads: None,
    };
    WhisperTranscriber::new(whisper_config)
        .map_err(|e| anyhow::anyhow!("{}\nHint: place a ggml model under models/", e))
}

#[allow(clippy::too_many_arguments)]
async fn run_batch(
    config: Config,
    video: PathBuf,
    model: Option<String>,
    language: Option<String>,
    hf_token: Option<String>,
    no_diarize: bool,
    output_dir: Option<PathBuf>,
    keep_temp: bool,
    quiet: bool,
) -> Result<()> {
    let transcriber = Arc::new(build_transcriber(&config, model, language, false)?);
    let runner = Arc::new(SystemCommandRunner::new());

    let pipeline_config = PipelineConfig {
        result_root: output_dir.unwrap_or_else(|| PathBuf::from("result")),
        keep_work_dir: keep_temp,
        ..PipelineConfig::default()
    };

    let mut pipeline = BatchPipeline::new(pipeline_config, runner.clone(), transcriber);

    let auth_token = hf_token.or_else(|| config.diarization.auth_token.clone());
    if !no_diarize {
        if let Some(token) = auth_token {
            let backend = config
                .diarization
                .backend
                .clone()
                .unwrap_or_else(|| "meetscribe-diarize".to_string());
            let diarizer =
                CommandDiarizer::new(SystemCommandRunner::new(), backend).with_auth_token(token);
            pipeline = pipeline.with_diarizer(Arc::new(diarizer));
        } else if !quiet {
            eprintln!("meetscribe: no diarization token; skipping speaker attribution");
        }
    }

    let (sink, renderer) = console_progress(quiet);
    let report = tokio::task::spawn_blocking(move || {
        let result = pipeline.run(&video, sink.as_ref());
        drop(sink);
        result
    })
    .await
    .context("Pipeline task panicked")??;

    if let Some(renderer) = renderer {
        let _ = renderer.join();
    }

    println!("Transcript: {}", report.transcript_file.display().green());
    if let Some(diarized) = &report.diarized_file {
        println!("Diarized:   {}", diarized.display().green());
    }
    Ok(())
}

async fn run_stream(
    config: Config,
    device: Option<String>,
    model: Option<String>,
    language: Option<String>,
    chunk_secs: f64,
    translate: bool,
    no_vad: bool,
) -> Result<()> {
    use meetscribe::streaming::{
        OnlineTranscriber, OnlineTranscriberConfig, StdoutLineSink, StreamingConfig,
        StreamingSession, TaskMode,
    };

    let language = language.unwrap_or_else(|| config.transcription.language.clone());
    let engine = build_transcriber(&config, model, Some(language.clone()), translate)?;

    let streaming_config = StreamingConfig {
        sample_rate: config.audio.sample_rate,
        chunk_secs,
        language: language.clone(),
        task: if translate {
            TaskMode::Translate
        } else {
            TaskMode::Transcribe
        },
        vad: !no_vad && config.audio.vad,
        trim_after_secs: config.audio.buffer_trim_secs,
    };

    let mut session = StreamingSession::new(streaming_config)?;
    let stop = session.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop.stop();
        }
    });

    let mut transcriber = OnlineTranscriber::new(
        engine,
        OnlineTranscriberConfig {
            language,
            trim_after_secs: config.audio.buffer_trim_secs,
        },
    );

    #[cfg(feature = "cpal-audio")]
    {
        meetscribe::audio::suppress_audio_warnings();
        let device = device.or_else(|| config.audio.device.clone());
        let mut source = meetscribe::audio::CpalChunkSource::new(device.as_deref())?;
        let mut sink = StdoutLineSink::new();

        eprintln!("meetscribe: streaming (press Ctrl-C to stop)");
        tokio::task::spawn_blocking(move || {
            session.run(&mut source, &mut transcriber, &mut sink)
        })
        .await
        .context("Streaming task panicked")??;
        Ok(())
    }

    #[cfg(not(feature = "cpal-audio"))]
    {
        let _ = (device, session, transcriber);
        bail!("This build has no microphone support (cpal-audio feature disabled)");
    }
}

async fn run_summarize(
    config: Config,
    transcript: PathBuf,
    model: Option<String>,
    language: Option<String>,
    prompt: Option<String>,
    glossary: Option<PathBuf>,
    quiet: bool,
) -> Result<()> {
    let language_code = language::resolve_or_default(
        language.as_deref().unwrap_or(&config.summary.language),
    );

    let glossary_text = match glossary {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read glossary from {}", path.display()))?,
        None => " ".to_string(),
    };

    let options = SummarizeOptions {
        model: model.unwrap_or_else(|| config.summary.model.clone()),
        language: language_code.to_string(),
        prompt_root: PathBuf::from(defaults::PROMPT_DIR),
        prompt_name: prompt.unwrap_or_else(|| config.summary.prompt.clone()),
        glossary: glossary_text,
    };

    let summarizer = OllamaClient::new(config.summary.endpoint.clone());
    let (sink, renderer) = console_progress(quiet);

    let artifacts = summarize_transcript(&transcript, &summarizer, &options, sink.as_ref()).await;
    drop(sink);
    if let Some(renderer) = renderer {
        let _ = renderer.join();
    }
    let artifacts = artifacts?;

    println!("Summary: {}", artifacts.markdown_file.display().green());
    Ok(())
}

fn list_audio_devices() -> Result<()> {
    #[cfg(feature = "cpal-audio")]
    {
        meetscribe::audio::suppress_audio_warnings();
        let devices = meetscribe::audio::list_devices()?;
        if devices.is_empty() {
            println!("No audio input devices found.");
        } else {
            for device in devices {
                println!("{}", device);
            }
        }
        Ok(())
    }

    #[cfg(not(feature = "cpal-audio"))]
    {
        bail!("This build has no microphone support (cpal-audio feature disabled)")
    }
}
