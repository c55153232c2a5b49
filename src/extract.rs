//! Audio extraction from video files via ffmpeg.
//!
//! ffmpeg writes progress to stderr as `time=HH:MM:SS.ss` fields; decoded
//! time over total duration (from a separate ffprobe call) gives the
//! integer percentage reported through the progress sink.

use crate::command::CommandRunner;
use crate::error::{MeetscribeError, Result};
use crate::progress::ProgressSink;
use std::path::Path;

/// Get the duration of a media file in seconds using ffprobe.
pub fn probe_duration(runner: &dyn CommandRunner, media: &Path) -> Result<f64> {
    if !media.exists() {
        return Err(MeetscribeError::MediaFileNotFound {
            path: media.display().to_string(),
        });
    }

    let media_arg = media.to_string_lossy().to_string();
    let stdout = runner.run(
        "ffprobe",
        &[
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
            &media_arg,
        ],
    )?;

    stdout
        .trim()
        .parse::<f64>()
        .map_err(|_| MeetscribeError::MediaProbe {
            message: format!("ffprobe returned a non-numeric duration: {:?}", stdout.trim()),
        })
}

/// Extract the audio track of a video into a WAV file.
///
/// Requests a single audio stream at constant-quality variable bitrate and
/// overwrites the output if present. Progress is an integer percentage
/// 0-100, monotone (a stale decoder report never lowers it), with 100
/// always reported on completion.
pub fn extract_audio(
    runner: &dyn CommandRunner,
    video: &Path,
    audio_out: &Path,
    sink: &dyn ProgressSink,
) -> Result<()> {
    let total_duration = probe_duration(runner, video)?;

    if let Some(parent) = audio_out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let video_arg = video.to_string_lossy().to_string();
    let out_arg = audio_out.to_string_lossy().to_string();

    let mut last_percent: i64 = -1;
    runner.run_streaming_stderr(
        "ffmpeg",
        &["-i", &video_arg, "-q:a", "0", "-map", "a", &out_arg, "-y"],
        &mut |line| {
            if let Some(current_time) = parse_ffmpeg_time(line)
                && total_duration > 0.0
            {
                let percent = ((current_time / total_duration) * 100.0) as i64;
                let percent = percent.clamp(0, 100);
                if percent > last_percent {
                    last_percent = percent;
                    sink.percent(percent as f32);
                }
            }
        },
    )?;

    sink.percent(100.0);
    Ok(())
}

/// Parse the decode position from an ffmpeg status line.
///
/// Lines look like:
/// `size=    1024kB time=00:01:23.45 bitrate= 101.1kbits/s speed=42x`
fn parse_ffmpeg_time(line: &str) -> Option<f64> {
    let time_pos = line.find("time=")?;
    let after = &line[time_pos + 5..];
    let field = after.split_whitespace().next()?;

    let mut parts = field.split(':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }

    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::MockCommandRunner;
    use crate::progress::{CollectingProgress, NullProgress};
    use tempfile::TempDir;

    fn touch(dir: &TempDir, name: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, b"fake media").unwrap();
        path
    }

    #[test]
    fn test_parse_ffmpeg_time_standard_line() {
        let line = "size=    1024kB time=00:01:23.45 bitrate= 101.1kbits/s speed=42x";
        let parsed = parse_ffmpeg_time(line).unwrap();
        assert!((parsed - 83.45).abs() < 1e-9);
    }

    #[test]
    fn test_parse_ffmpeg_time_hours() {
        let parsed = parse_ffmpeg_time("time=01:30:00.00").unwrap();
        assert!((parsed - 5400.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_ffmpeg_time_absent() {
        assert_eq!(parse_ffmpeg_time("frame= 1000 fps=25"), None);
        assert_eq!(parse_ffmpeg_time(""), None);
    }

    #[test]
    fn test_parse_ffmpeg_time_malformed() {
        assert_eq!(parse_ffmpeg_time("time=N/A"), None);
        assert_eq!(parse_ffmpeg_time("time=12:34"), None);
        assert_eq!(parse_ffmpeg_time("time=1:2:3:4"), None);
    }

    #[test]
    fn test_probe_duration_parses_ffprobe_output() {
        let dir = TempDir::new().unwrap();
        let video = touch(&dir, "meeting.mp4");
        let runner = MockCommandRunner::new().with_stdout("63.5\n");

        let duration = probe_duration(&runner, &video).unwrap();
        assert_eq!(duration, 63.5);
    }

    #[test]
    fn test_probe_duration_missing_file() {
        let runner = MockCommandRunner::new().with_stdout("10.0");
        let result = probe_duration(&runner, Path::new("/nonexistent/video.mp4"));
        assert!(matches!(
            result,
            Err(MeetscribeError::MediaFileNotFound { .. })
        ));
    }

    #[test]
    fn test_probe_duration_garbage_output() {
        let dir = TempDir::new().unwrap();
        let video = touch(&dir, "meeting.mp4");
        let runner = MockCommandRunner::new().with_stdout("N/A\n");

        let result = probe_duration(&runner, &video);
        match result {
            Err(MeetscribeError::MediaProbe { message }) => {
                assert!(message.contains("non-numeric"));
            }
            other => panic!("Expected MediaProbe error, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_audio_reports_monotone_integer_progress() {
        let dir = TempDir::new().unwrap();
        let video = touch(&dir, "meeting.mp4");
        let audio_out = dir.path().join("out").join("extracted_audio.wav");

        // 100 seconds total; decoder reports 25s, 50s, stale 40s, 99.4s
        let runner = MockCommandRunner::new()
            .with_stdout("100.0\n")
            .with_stderr_lines(&[
                "frame= 1 fps=0 q=0.0 size= 0kB",
                "size= 256kB time=00:00:25.00 bitrate= 83.9kbits/s",
                "size= 512kB time=00:00:50.00 bitrate= 83.9kbits/s",
                "size= 512kB time=00:00:40.00 bitrate= 83.9kbits/s",
                "size= 999kB time=00:01:39.40 bitrate= 83.9kbits/s",
            ]);
        let sink = CollectingProgress::new();

        extract_audio(&runner, &video, &audio_out, &sink).unwrap();

        let percents = sink.percents();
        assert_eq!(percents, vec![25.0, 50.0, 99.0, 100.0]);
        for pair in percents.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
    }

    #[test]
    fn test_extract_audio_always_finishes_at_100() {
        let dir = TempDir::new().unwrap();
        let video = touch(&dir, "silent.mp4");

        // No time= lines at all
        let runner = MockCommandRunner::new()
            .with_stdout("10.0\n")
            .with_stderr_lines(&["frame= 1 fps=0"]);
        let sink = CollectingProgress::new();

        extract_audio(&runner, &video, &dir.path().join("a.wav"), &sink).unwrap();

        assert_eq!(sink.percents(), vec![100.0]);
    }

    #[test]
    fn test_extract_audio_creates_output_directory() {
        let dir = TempDir::new().unwrap();
        let video = touch(&dir, "meeting.mp4");
        let audio_out = dir.path().join("temp").join("audio.wav");

        let runner = MockCommandRunner::new().with_stdout("5.0\n");
        extract_audio(&runner, &video, &audio_out, &NullProgress).unwrap();

        assert!(audio_out.parent().unwrap().exists());
    }

    #[test]
    fn test_extract_audio_propagates_ffmpeg_failure() {
        let dir = TempDir::new().unwrap();
        let video = touch(&dir, "meeting.mp4");

        // Mock fails both probe and extraction
        let runner = MockCommandRunner::new().with_failure();
        let result = extract_audio(&runner, &video, &dir.path().join("a.wav"), &NullProgress);
        assert!(result.is_err());
    }
}
