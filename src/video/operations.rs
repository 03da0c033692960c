use anyhow::{Context, Result};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ui::prelude::*;

use super::config::VideoToolConfig;
use super::dimensions::{DimensionRounding, InvalidDimensionsError, VideoDimensions, fit_within};
use super::engine::{FfmpegRunOptions, FfmpegRunner, MediaProbe, VideoInfo};
use super::files::{format_size_mb, is_video_file};
use super::presets::{CropPreset, ResizePreset, SplitDuration};

/// `<dir>/<stem><suffix><.ext>` next to `input`.
pub fn sibling_with_suffix(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = extension_with_dot(input);
    input.with_file_name(format!("{stem}{suffix}{ext}"))
}

fn extension_with_dot(input: &Path) -> String {
    input
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default()
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// A single ffmpeg invocation.
pub trait VideoJob {
    fn title(&self) -> String;
    fn args(&self, config: &VideoToolConfig) -> Vec<String>;
    /// Output file reported after a successful run.
    fn primary_output(&self) -> Option<&Path>;

    fn prepare(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResizeJob {
    pub input: PathBuf,
    pub target: VideoDimensions,
    pub output: PathBuf,
}

impl ResizeJob {
    pub fn new(input: &Path, preset: ResizePreset) -> Result<Self, InvalidDimensionsError> {
        let target = preset.target().validate()?;
        let output = sibling_with_suffix(
            input,
            &format!("_resized_{}_{}", target.width, target.height),
        );
        Ok(Self {
            input: input.to_path_buf(),
            target,
            output,
        })
    }
}

impl VideoJob for ResizeJob {
    fn title(&self) -> String {
        format!("Resizing video to {}", self.target)
    }

    fn args(&self, config: &VideoToolConfig) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-i".to_string(),
            path_arg(&self.input),
            "-vf".to_string(),
            format!("scale={}:{}", self.target.width, self.target.height),
            "-c:v".to_string(),
            config.video_codec.clone(),
            "-c:a".to_string(),
            config.audio_codec.clone(),
            path_arg(&self.output),
        ]
    }

    fn primary_output(&self) -> Option<&Path> {
        Some(&self.output)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SplitJob {
    pub input: PathBuf,
    pub segment: SplitDuration,
    pub output_dir: PathBuf,
    pub output_pattern: PathBuf,
}

impl SplitJob {
    pub fn new(input: &Path, segment: SplitDuration, segments_dir: &str) -> Result<Self> {
        let segment = match segment {
            SplitDuration::Custom(seconds) => SplitDuration::custom(seconds)?,
            other => other,
        };
        let parent = input.parent().unwrap_or_else(|| Path::new(""));
        let output_dir = parent.join(segments_dir);
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let output_pattern =
            output_dir.join(format!("{stem}_segment_%03d{}", extension_with_dot(input)));
        Ok(Self {
            input: input.to_path_buf(),
            segment,
            output_dir,
            output_pattern,
        })
    }

    /// Segment files currently present for this input.
    pub fn written_segments(&self) -> Result<Vec<PathBuf>> {
        let prefix = self
            .input
            .file_stem()
            .map(|s| format!("{}_segment_", s.to_string_lossy()))
            .unwrap_or_default();
        let mut found = Vec::new();
        if !self.output_dir.is_dir() {
            return Ok(found);
        }
        for entry in fs::read_dir(&self.output_dir)
            .with_context(|| format!("Failed to read {}", self.output_dir.display()))?
        {
            let path = entry?.path();
            let matches = path
                .file_name()
                .map(|n| n.to_string_lossy().starts_with(&prefix))
                .unwrap_or(false);
            if matches && is_video_file(&path) {
                found.push(path);
            }
        }
        found.sort();
        Ok(found)
    }
}

impl VideoJob for SplitJob {
    fn title(&self) -> String {
        format!("Splitting video into {}", self.segment.label())
    }

    fn args(&self, _config: &VideoToolConfig) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-i".to_string(),
            path_arg(&self.input),
            "-c".to_string(),
            "copy".to_string(),
            "-map".to_string(),
            "0".to_string(),
            "-f".to_string(),
            "segment".to_string(),
            "-segment_time".to_string(),
            format!("{}", self.segment.seconds()),
            "-reset_timestamps".to_string(),
            "1".to_string(),
            path_arg(&self.output_pattern),
        ]
    }

    fn primary_output(&self) -> Option<&Path> {
        None
    }

    fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!(
                "Failed to create segments directory {}",
                self.output_dir.display()
            )
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CropJob {
    pub input: PathBuf,
    pub preset: CropPreset,
    pub source: VideoDimensions,
    /// Target fitted inside the source, before encoder evening.
    pub fitted: VideoDimensions,
    pub crop: VideoDimensions,
    pub output: PathBuf,
}

impl CropJob {
    pub fn new(
        input: &Path,
        preset: CropPreset,
        source: VideoDimensions,
        rounding: DimensionRounding,
    ) -> Result<Self, InvalidDimensionsError> {
        let fitted = fit_within(source, preset.target(), rounding)?;
        let crop = if rounding == DimensionRounding::Even {
            fitted.floor_even()
        } else {
            fitted
        };
        let output = sibling_with_suffix(input, &format!("_cropped_{}", preset.slug()));
        Ok(Self {
            input: input.to_path_buf(),
            preset,
            source,
            fitted,
            crop,
            output,
        })
    }

    /// The requested size did not fit the source.
    pub fn was_scaled(&self) -> bool {
        self.fitted != self.preset.target()
    }

    pub fn was_evened(&self) -> bool {
        self.crop != self.fitted
    }

    pub fn filter(&self) -> String {
        let VideoDimensions { width, height } = self.crop;
        format!("crop={width}:{height}:(iw-{width})/2:(ih-{height})/2")
    }
}

impl VideoJob for CropJob {
    fn title(&self) -> String {
        format!("Cropping video for {}", self.preset.label())
    }

    fn args(&self, config: &VideoToolConfig) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-i".to_string(),
            path_arg(&self.input),
            "-vf".to_string(),
            self.filter(),
            "-c:v".to_string(),
            config.video_codec.clone(),
            "-c:a".to_string(),
            config.audio_codec.clone(),
            path_arg(&self.output),
        ]
    }

    fn primary_output(&self) -> Option<&Path> {
        Some(&self.output)
    }
}

/// Config plus engine collaborators shared by every operation.
pub struct Session<'a> {
    pub config: &'a VideoToolConfig,
    pub runner: &'a dyn FfmpegRunner,
    pub prober: &'a dyn MediaProbe,
    pub dry_run: bool,
    pub verbose: bool,
}

impl Session<'_> {
    pub fn probe(&self, path: &Path) -> Result<VideoInfo> {
        let info = self
            .prober
            .probe(path)
            .with_context(|| format!("Error getting video info for {}", path.display()))?;
        emit(
            Level::Debug,
            "video.probe",
            &format!(
                "Probed {}: {} / {:.2}s",
                path.display(),
                info.resolution(),
                info.duration
            ),
            Some(json!({
                "path": path.display().to_string(),
                "width": info.dimensions.width,
                "height": info.dimensions.height,
                "duration": info.duration,
            })),
        );
        Ok(info)
    }

    pub fn command_line(&self, job: &dyn VideoJob) -> String {
        let mut words = vec![self.config.ffmpeg_path.clone()];
        words.extend(job.args(self.config));
        shell_words::join(words)
    }

    /// Run `job`, or only print it on a dry run.
    pub fn execute(&self, job: &dyn VideoJob, total_duration: Option<f64>) -> Result<()> {
        let command = self.command_line(job);
        if self.dry_run {
            emit(
                Level::Info,
                "video.dry_run",
                &command,
                Some(json!({ "args": job.args(self.config) })),
            );
            return Ok(());
        }

        emit(Level::Debug, "video.command", &command, None);
        job.prepare()?;

        let options = FfmpegRunOptions::new(total_duration, self.verbose, job.title());
        self.runner
            .run(&job.args(self.config), &options)
            .with_context(|| format!("{} failed", job.title()))?;

        if let Some(output) = job.primary_output() {
            self.report_output(output);
        }
        Ok(())
    }

    fn report_output(&self, output: &Path) {
        let size = fs::metadata(output).map(|m| m.len()).ok();
        let resolution = self.prober.probe(output).ok().map(|i| i.resolution());
        let name = output.display().to_string();
        let message = match (size, &resolution) {
            (Some(size), Some(res)) => {
                format!("New file: {} ({} MB, {})", name, format_size_mb(size), res)
            }
            (Some(size), None) => format!("New file: {} ({} MB)", name, format_size_mb(size)),
            _ => format!("New file: {}", name),
        };
        emit(
            Level::Info,
            "video.output",
            &message,
            Some(json!({
                "path": name,
                "size_bytes": size,
                "resolution": resolution,
            })),
        );
    }
}
