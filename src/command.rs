//! Testable execution of external media tools.
//!
//! ffmpeg, ffprobe and the diarization backend are external processes. The
//! `CommandRunner` trait keeps every invocation mockable so the pipeline
//! logic is testable without the tools installed.

use crate::error::{MeetscribeError, Result};
use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};

/// Trait for running external commands.
///
/// Object-safe, Send + Sync for use in concurrent contexts.
pub trait CommandRunner: Send + Sync {
    /// Run a command to completion and return its stdout.
    fn run(&self, program: &str, args: &[&str]) -> Result<String>;

    /// Run a command, feeding each stderr line to `on_line` as it appears.
    ///
    /// ffmpeg reports progress on stderr, so this is the hook the audio
    /// extractor uses to observe decode position while the process runs.
    fn run_streaming_stderr(
        &self,
        program: &str,
        args: &[&str],
        on_line: &mut dyn FnMut(&str),
    ) -> Result<()>;
}

/// Production runner using std::process::Command.
#[derive(Debug, Clone, Default)]
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self
    }

    fn spawn_error(program: &str, e: std::io::Error) -> MeetscribeError {
        if e.kind() == std::io::ErrorKind::NotFound {
            MeetscribeError::MediaToolNotFound {
                tool: program.to_string(),
            }
        } else {
            MeetscribeError::MediaProbe {
                message: format!("Failed to execute {}: {}", program, e),
            }
        }
    }
}

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<String> {
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| Self::spawn_error(program, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MeetscribeError::MediaProbe {
                message: format!(
                    "{} failed with status {:?}: {}",
                    program, output.status, stderr
                ),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn run_streaming_stderr(
        &self,
        program: &str,
        args: &[&str],
        on_line: &mut dyn FnMut(&str),
    ) -> Result<()> {
        let mut child = Command::new(program)
            .args(args)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Self::spawn_error(program, e))?;

        let mut tail = String::new();
        if let Some(stderr) = child.stderr.take() {
            let reader = BufReader::new(stderr);
            for line in reader.lines() {
                let line = line?;
                on_line(&line);
                tail = line;
            }
        }

        let status = child.wait()?;
        if !status.success() {
            return Err(MeetscribeError::AudioExtraction {
                message: format!("{} failed with status {:?}: {}", program, status, tail),
            });
        }

        Ok(())
    }
}

/// Mock runner for testing command-driven stages.
#[derive(Debug, Clone, Default)]
pub struct MockCommandRunner {
    stdout: String,
    stderr_lines: Vec<String>,
    should_fail: bool,
    error_message: String,
}

impl MockCommandRunner {
    pub fn new() -> Self {
        Self {
            stdout: String::new(),
            stderr_lines: Vec::new(),
            should_fail: false,
            error_message: "mock command failure".to_string(),
        }
    }

    /// Configure the stdout returned by `run`.
    pub fn with_stdout(mut self, stdout: &str) -> Self {
        self.stdout = stdout.to_string();
        self
    }

    /// Configure the stderr lines streamed by `run_streaming_stderr`.
    pub fn with_stderr_lines(mut self, lines: &[&str]) -> Self {
        self.stderr_lines = lines.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Configure the mock to fail.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Configure the failure message.
    pub fn with_error_message(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }
}

impl CommandRunner for MockCommandRunner {
    fn run(&self, _program: &str, _args: &[&str]) -> Result<String> {
        if self.should_fail {
            Err(MeetscribeError::MediaProbe {
                message: self.error_message.clone(),
            })
        } else {
            Ok(self.stdout.clone())
        }
    }

    fn run_streaming_stderr(
        &self,
        _program: &str,
        _args: &[&str],
        on_line: &mut dyn FnMut(&str),
    ) -> Result<()> {
        if self.should_fail {
            return Err(MeetscribeError::AudioExtraction {
                message: self.error_message.clone(),
            });
        }
        for line in &self.stderr_lines {
            on_line(line);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_runner_returns_stdout() {
        let runner = MockCommandRunner::new().with_stdout("63.5\n");
        let output = runner.run("ffprobe", &["-v", "error"]).unwrap();
        assert_eq!(output, "63.5\n");
    }

    #[test]
    fn test_mock_runner_streams_stderr() {
        let runner = MockCommandRunner::new().with_stderr_lines(&["line one", "line two"]);
        let mut seen = Vec::new();
        runner
            .run_streaming_stderr("ffmpeg", &[], &mut |line| seen.push(line.to_string()))
            .unwrap();
        assert_eq!(seen, vec!["line one", "line two"]);
    }

    #[test]
    fn test_mock_runner_failure() {
        let runner = MockCommandRunner::new()
            .with_failure()
            .with_error_message("boom");
        let result = runner.run("ffprobe", &[]);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("boom"));
    }

    #[test]
    fn test_system_runner_missing_tool() {
        let runner = SystemCommandRunner::new();
        let result = runner.run("definitely-not-a-real-tool-xyz", &[]);
        match result {
            Err(MeetscribeError::MediaToolNotFound { tool }) => {
                assert_eq!(tool, "definitely-not-a-real-tool-xyz");
            }
            other => panic!("Expected MediaToolNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_system_runner_captures_stdout() {
        let runner = SystemCommandRunner::new();
        let output = runner.run("echo", &["hello"]).unwrap();
        assert_eq!(output.trim(), "hello");
    }

    #[test]
    fn test_runner_is_object_safe() {
        let runner: Box<dyn CommandRunner> = Box::new(MockCommandRunner::new());
        assert!(runner.run("anything", &[]).is_ok());
    }
}
