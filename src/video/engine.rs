use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use indicatif::ProgressBar;
use serde::Deserialize;
use thiserror::Error;

use crate::common::progress::{create_duration_bar, create_spinner, seconds_to_millis};
use crate::ui::{self, OutputFormat};

use super::dimensions::VideoDimensions;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0} not found. Install FFmpeg from https://ffmpeg.org/download.html")]
    NotFound(String),

    #[error("failed to run {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("ffprobe failed for {path}: {message}")]
    ProbeFailed { path: PathBuf, message: String },

    #[error("unusable ffprobe output for {path}: {message}")]
    ProbeOutput { path: PathBuf, message: String },

    #[error("ffmpeg exited with status {code:?}: {message}")]
    Failed { code: Option<i32>, message: String },

    #[error("IO error while talking to ffmpeg: {0}")]
    Io(#[from] std::io::Error),
}

/// What ffprobe reports about a file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoInfo {
    pub dimensions: VideoDimensions,
    pub duration: f64,
}

impl VideoInfo {
    pub fn resolution(&self) -> String {
        self.dimensions.to_string()
    }
}

pub trait MediaProbe {
    fn probe(&self, path: &Path) -> Result<VideoInfo, EngineError>;
}

pub trait FfmpegRunner {
    fn run(&self, args: &[String], options: &FfmpegRunOptions) -> Result<(), EngineError>;
}

#[derive(Debug, Clone, Default)]
pub struct FfmpegRunOptions {
    /// Media duration of the expected output, drives the progress bar.
    pub total_duration: Option<f64>,
    pub verbose: bool,
    pub message: String,
}

impl FfmpegRunOptions {
    pub fn new(total_duration: Option<f64>, verbose: bool, message: impl Into<String>) -> Self {
        Self {
            total_duration,
            verbose,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FfprobeProbe {
    binary: String,
}

impl FfprobeProbe {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl MediaProbe for FfprobeProbe {
    fn probe(&self, path: &Path) -> Result<VideoInfo, EngineError> {
        let output = Command::new(&self.binary)
            .args([
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-show_entries",
                "stream=width,height:format=duration",
                "-of",
                "json",
            ])
            .arg(path)
            .output()
            .map_err(|source| spawn_error(&self.binary, source))?;

        if !output.status.success() {
            return Err(EngineError::ProbeFailed {
                path: path.to_path_buf(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_probe_output(path, &String::from_utf8_lossy(&output.stdout))
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<i64>,
    height: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

pub fn parse_probe_output(path: &Path, json: &str) -> Result<VideoInfo, EngineError> {
    let unusable = |message: String| EngineError::ProbeOutput {
        path: path.to_path_buf(),
        message,
    };

    let parsed: ProbeOutput =
        serde_json::from_str(json).map_err(|e| unusable(format!("invalid JSON: {e}")))?;

    let stream = parsed
        .streams
        .iter()
        .find(|s| s.width.is_some() && s.height.is_some())
        .ok_or_else(|| unusable("no video stream".to_string()))?;

    let dimensions = VideoDimensions::from_signed(
        stream.width.unwrap_or_default(),
        stream.height.unwrap_or_default(),
    )
    .map_err(|e| unusable(e.to_string()))?;

    let duration_text = parsed
        .format
        .and_then(|f| f.duration)
        .ok_or_else(|| unusable("no duration".to_string()))?;
    let duration: f64 = duration_text
        .trim()
        .parse()
        .map_err(|_| unusable(format!("duration '{duration_text}' is not a number")))?;

    Ok(VideoInfo {
        dimensions,
        duration,
    })
}

#[derive(Debug, Clone)]
pub struct SystemFfmpegRunner {
    binary: String,
}

impl SystemFfmpegRunner {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl FfmpegRunner for SystemFfmpegRunner {
    fn run(&self, args: &[String], options: &FfmpegRunOptions) -> Result<(), EngineError> {
        let mut child = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| spawn_error(&self.binary, source))?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| std::io::Error::other("ffmpeg stderr was not captured"))?;

        let pb = progress_for(options);
        let summary = drain_stderr(stderr, options, &pb);

        let status = child.wait()?;
        pb.finish_and_clear();
        let summary = summary?;

        if !status.success() {
            return Err(EngineError::Failed {
                code: status.code(),
                message: summary.failure_message(),
            });
        }

        Ok(())
    }
}

fn spawn_error(binary: &str, source: std::io::Error) -> EngineError {
    if source.kind() == std::io::ErrorKind::NotFound {
        EngineError::NotFound(binary.to_string())
    } else {
        EngineError::Spawn {
            binary: binary.to_string(),
            source,
        }
    }
}

fn progress_for(options: &FfmpegRunOptions) -> ProgressBar {
    if options.verbose || ui::get_output_format() == OutputFormat::Json {
        return ProgressBar::hidden();
    }
    match options.total_duration {
        Some(duration) if duration > 0.0 => create_duration_bar(duration, options.message.clone()),
        _ => create_spinner(options.message.clone()),
    }
}

/// Splits ffmpeg stderr into lines. The status line is redrawn with `\r`,
/// so both `\r` and `\n` end a line. Bytes are kept until a full line
/// arrives, which keeps multi-byte characters intact across reads.
#[derive(Debug, Default)]
struct StderrLines {
    pending: Vec<u8>,
}

impl StderrLines {
    fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(end) = self.pending.iter().position(|b| matches!(b, b'\r' | b'\n')) {
            let raw: Vec<u8> = self.pending.drain(..=end).collect();
            let line = String::from_utf8_lossy(&raw[..end]).trim_end().to_string();
            if !line.is_empty() {
                lines.push(line);
            }
        }
        lines
    }

    /// Whatever followed the last line break.
    fn rest(self) -> Option<String> {
        let line = String::from_utf8_lossy(&self.pending).trim().to_string();
        (!line.is_empty()).then_some(line)
    }
}

#[derive(Debug, Default)]
struct StderrSummary {
    last_line: String,
    errors: Vec<String>,
}

impl StderrSummary {
    fn record(&mut self, line: String) {
        if line.to_lowercase().contains("error") {
            self.errors.push(line.clone());
        }
        self.last_line = line;
    }

    /// Error lines when there are any, otherwise the last thing ffmpeg said.
    fn failure_message(self) -> String {
        let message = if self.errors.is_empty() {
            self.last_line
        } else {
            self.errors.join("\n")
        };
        message.trim().to_string()
    }
}

fn drain_stderr<R: Read>(
    mut stderr: R,
    options: &FfmpegRunOptions,
    pb: &ProgressBar,
) -> Result<StderrSummary, EngineError> {
    let mut lines = StderrLines::default();
    let mut summary = StderrSummary::default();
    let mut buffer = [0u8; 4096];

    loop {
        let read = match stderr.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };

        for line in lines.feed(&buffer[..read]) {
            if options.verbose {
                eprintln!("{line}");
            }
            if let Some(progress) = parse_progress_line(&line) {
                pb.set_position(seconds_to_millis(progress.seconds));
                if let Some(speed) = progress.speed {
                    pb.set_message(format!("{} ({speed})", options.message));
                }
            }
            summary.record(line);
        }
    }

    if let Some(rest) = lines.rest() {
        summary.record(rest);
    }
    Ok(summary)
}

#[derive(Debug, Clone, PartialEq)]
struct Progress {
    seconds: f64,
    speed: Option<String>,
}

/// Position and speed from a status line such as
/// `frame=240 ... time=00:01:02.50 bitrate=134.2kbits/s speed=2.01x`.
fn parse_progress_line(line: &str) -> Option<Progress> {
    let seconds = status_field(line, "time=").and_then(parse_clock)?;
    let speed = status_field(line, "speed=")
        .filter(|speed| speed.ends_with('x'))
        .map(str::to_string);
    Some(Progress { seconds, speed })
}

/// Value after `key`; ffmpeg pads some values with spaces.
fn status_field<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let (_, rest) = line.split_once(key)?;
    rest.split_whitespace().next()
}

/// `HH:MM:SS.ss` in seconds. Negative clocks (seen while ffmpeg primes
/// its encoder) count as zero.
fn parse_clock(text: &str) -> Option<f64> {
    let (negative, text) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let mut parts = text.split(':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    if negative {
        return Some(0.0);
    }
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

#[derive(Debug, Clone)]
pub struct ToolStatus {
    pub name: String,
    pub path: Option<PathBuf>,
    pub version: Option<String>,
}

impl ToolStatus {
    pub fn is_available(&self) -> bool {
        self.path.is_some()
    }
}

/// Locate a binary on PATH and read the first line of `-version`.
pub fn check_tool(binary: &str) -> ToolStatus {
    let path = which::which(binary).ok();
    let version = path.as_ref().and_then(|p| {
        Command::new(p)
            .arg("-version")
            .output()
            .ok()
            .filter(|o| o.status.success())
            .and_then(|o| {
                String::from_utf8_lossy(&o.stdout)
                    .lines()
                    .next()
                    .map(|l| l.trim().to_string())
            })
    });

    ToolStatus {
        name: binary.to_string(),
        path,
        version,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROBE_JSON: &str = r#"{
        "programs": [],
        "streams": [{ "width": 1920, "height": 1080 }],
        "format": { "duration": "95.480000" }
    }"#;

    #[test]
    fn parses_ffprobe_json() {
        let info = parse_probe_output(Path::new("a.mp4"), PROBE_JSON).unwrap();
        assert_eq!(info.dimensions, VideoDimensions { width: 1920, height: 1080 });
        assert!((info.duration - 95.48).abs() < 1e-9);
        assert_eq!(info.resolution(), "1920x1080");
    }

    #[test]
    fn audio_only_file_has_no_video_stream() {
        let json = r#"{"streams": [], "format": {"duration": "3.0"}}"#;
        let err = parse_probe_output(Path::new("a.mp3"), json).unwrap_err();
        assert!(err.to_string().contains("no video stream"));
    }

    #[test]
    fn zero_sized_stream_is_rejected() {
        let json = r#"{"streams": [{"width": 0, "height": 480}], "format": {"duration": "3.0"}}"#;
        assert!(matches!(
            parse_probe_output(Path::new("a.mp4"), json),
            Err(EngineError::ProbeOutput { .. })
        ));
    }

    #[test]
    fn missing_duration_is_rejected() {
        let json = r#"{"streams": [{"width": 640, "height": 480}], "format": {}}"#;
        assert!(parse_probe_output(Path::new("a.mp4"), json).is_err());
    }

    #[test]
    fn status_line_gives_time_and_speed() {
        let line = "frame=  240 fps= 60 q=28.0 size=    1024kB time=00:01:02.50 bitrate= 134.2kbits/s speed=2.01x";
        assert_eq!(
            parse_progress_line(line),
            Some(Progress {
                seconds: 62.5,
                speed: Some("2.01x".to_string()),
            })
        );

        let padded = parse_progress_line("size=0kB time=00:00:03.00 bitrate=N/A speed= 0.5x").unwrap();
        assert_eq!(padded.speed.as_deref(), Some("0.5x"));

        let unknown_speed = parse_progress_line("time=00:00:01.00 speed=N/A").unwrap();
        assert_eq!(unknown_speed.speed, None);
    }

    #[test]
    fn lines_without_a_clock_are_not_progress() {
        assert_eq!(parse_progress_line("Press [q] to stop, [?] for help"), None);
        assert_eq!(parse_progress_line("size=N/A time=N/A bitrate=N/A speed=N/A"), None);
        assert_eq!(parse_clock("01:02"), None);
        assert_eq!(parse_clock("00:00:01:00"), None);
        assert_eq!(parse_clock("-00:00:00.02"), Some(0.0));
    }

    #[test]
    fn partial_lines_wait_for_their_break() {
        let mut lines = StderrLines::default();
        assert!(lines.feed(b"frame=1 time=00:00").is_empty());
        assert_eq!(lines.feed(b":01.00 speed=1x\r\n"), vec!["frame=1 time=00:00:01.00 speed=1x"]);

        // "é" split across two reads
        assert!(lines.feed(&[b'c', b'a', b'f', 0xC3]).is_empty());
        assert_eq!(lines.feed(&[0xA9, b'\n', b't', b'a', b'i', b'l']), vec!["café"]);
        assert_eq!(lines.rest().as_deref(), Some("tail"));
    }

    #[test]
    fn stderr_summary_keeps_error_lines() {
        let stderr = b"Input #0, mov\r\nframe=1 time=00:00:01.00 speed=1x\r[libx264 @ 0x1] Error: width not divisible by 2\nConversion failed!\n";

        let summary =
            drain_stderr(&stderr[..], &FfmpegRunOptions::default(), &ProgressBar::hidden()).unwrap();

        assert_eq!(summary.errors, vec!["[libx264 @ 0x1] Error: width not divisible by 2"]);
        assert_eq!(summary.last_line, "Conversion failed!");
        assert_eq!(
            summary.failure_message(),
            "[libx264 @ 0x1] Error: width not divisible by 2"
        );
    }

    #[test]
    fn failure_without_error_lines_reports_last_line() {
        let stderr = b"Input #0, mov\nclip.mp4: No such file or directory";

        let summary =
            drain_stderr(&stderr[..], &FfmpegRunOptions::default(), &ProgressBar::hidden()).unwrap();

        assert_eq!(summary.failure_message(), "clip.mp4: No such file or directory");
    }

    #[test]
    fn missing_binary_reports_not_found() {
        let runner = SystemFfmpegRunner::new("vidtool-no-such-ffmpeg");
        let err = runner
            .run(&["-version".to_string()], &FfmpegRunOptions::default())
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[test]
    fn unknown_tool_is_unavailable() {
        let status = check_tool("vidtool-no-such-ffprobe");
        assert!(!status.is_available());
        assert!(status.version.is_none());
    }
}
