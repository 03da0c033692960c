use clap::{ArgGroup, Args, Subcommand, ValueHint};
use std::path::PathBuf;

use super::dimensions::VideoDimensions;
use super::presets::{CropPreset, ResizePreset, SplitDuration};

#[derive(Subcommand, Debug, Clone)]
pub enum VideoCommands {
    /// Interactive menu (default when no command is given)
    Menu(DirArgs),
    /// List video files in a directory
    List(DirArgs),
    /// Show the available resize, split and crop presets
    Presets,
    /// Resize a video to a preset or custom resolution
    Resize(ResizeArgs),
    /// Split a video into fixed-length segments
    Split(SplitArgs),
    /// Crop a video to a social media aspect ratio
    Crop(CropArgs),
    /// Check that ffmpeg and ffprobe are installed
    Check,
}

#[derive(Args, Debug, Clone)]
pub struct DirArgs {
    /// Directory to look for videos in
    #[arg(default_value = ".", value_hint = ValueHint::DirPath)]
    pub dir: PathBuf,
}

/// Common arguments for commands that invoke ffmpeg
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Show the ffmpeg command that would be executed without running it
    #[arg(long)]
    pub dry_run: bool,

    /// Show raw ffmpeg output instead of a progress bar
    #[arg(long)]
    pub verbose: bool,
}

#[derive(Args, Debug, Clone)]
#[command(group(ArgGroup::new("target").required(true).args(["preset", "size"])))]
pub struct ResizeArgs {
    /// Source video file
    #[arg(value_hint = ValueHint::FilePath)]
    pub video: PathBuf,

    /// Resolution preset: fullhd, hd, sd, low (or 1080p, 720p, 480p, 360p)
    #[arg(short, long)]
    pub preset: Option<ResizePreset>,

    /// Custom resolution, e.g. 1280x720
    #[arg(short, long, value_name = "WxH")]
    pub size: Option<VideoDimensions>,

    #[command(flatten)]
    pub run: RunArgs,
}

impl ResizeArgs {
    pub fn resolved_preset(&self) -> Option<ResizePreset> {
        self.preset.or(self.size.map(ResizePreset::Custom))
    }
}

#[derive(Args, Debug, Clone)]
#[command(group(ArgGroup::new("length").required(true).args(["preset", "seconds"])))]
pub struct SplitArgs {
    /// Source video file
    #[arg(value_hint = ValueHint::FilePath)]
    pub video: PathBuf,

    /// Segment length preset: 10s, 30s, 1m, 2m
    #[arg(short, long)]
    pub preset: Option<SplitDuration>,

    /// Custom segment length in seconds
    #[arg(short, long)]
    pub seconds: Option<f64>,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Args, Debug, Clone)]
#[command(group(ArgGroup::new("target").required(true).args(["preset", "size"])))]
pub struct CropArgs {
    /// Source video file
    #[arg(value_hint = ValueHint::FilePath)]
    pub video: PathBuf,

    /// Platform preset: tiktok, instagram-post, facebook, youtube, instagram-feed
    #[arg(short, long)]
    pub preset: Option<CropPreset>,

    /// Custom crop size, e.g. 720x720
    #[arg(short, long, value_name = "WxH")]
    pub size: Option<VideoDimensions>,

    /// Use this source resolution instead of probing the file
    #[arg(long, value_name = "WxH")]
    pub source_size: Option<VideoDimensions>,

    #[command(flatten)]
    pub run: RunArgs,
}

impl CropArgs {
    pub fn resolved_preset(&self) -> Option<CropPreset> {
        self.preset.or(self.size.map(CropPreset::Custom))
    }
}
