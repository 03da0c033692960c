use anyhow::{Context, Result, bail};
use comfy_table::{Table, presets::UTF8_FULL};
use serde_json::json;
use std::path::Path;

use crate::ui::prelude::*;

use super::cli::{CropArgs, ResizeArgs, RunArgs, SplitArgs, VideoCommands};
use super::config::VideoToolConfig;
use super::dimensions::VideoDimensions;
use super::engine::{FfprobeProbe, SystemFfmpegRunner, check_tool};
use super::files::{VideoFile, list_video_files, render_file_table};
use super::menu::video_menu;
use super::operations::{CropJob, ResizeJob, Session, SplitJob};
use super::presets::{CropPreset, ResizePreset, SplitDuration};

pub fn handle_video_command(command: VideoCommands, config: &VideoToolConfig) -> Result<()> {
    let runner = SystemFfmpegRunner::new(&config.ffmpeg_path);
    let prober = FfprobeProbe::new(&config.ffprobe_path);
    let session = |run: &RunArgs| new_session(config, &runner, &prober, run);

    match command {
        VideoCommands::Menu(args) => video_menu(&session(&RunArgs::default()), &args.dir),
        VideoCommands::List(args) => show_video_files(&args.dir).map(|_| ()),
        VideoCommands::Presets => {
            show_presets();
            Ok(())
        }
        VideoCommands::Resize(args) => handle_resize(&session(&args.run), &args),
        VideoCommands::Split(args) => handle_split(&session(&args.run), &args),
        VideoCommands::Crop(args) => handle_crop(&session(&args.run), &args),
        VideoCommands::Check => check_engine(config),
    }
}

fn new_session<'a>(
    config: &'a VideoToolConfig,
    runner: &'a SystemFfmpegRunner,
    prober: &'a FfprobeProbe,
    run: &RunArgs,
) -> Session<'a> {
    Session {
        config,
        runner,
        prober,
        dry_run: run.dry_run,
        verbose: run.verbose,
    }
}

fn handle_resize(session: &Session, args: &ResizeArgs) -> Result<()> {
    let preset = args
        .resolved_preset()
        .context("either --preset or --size is required")?;
    resize_video(session, &args.video, preset)
}

fn handle_split(session: &Session, args: &SplitArgs) -> Result<()> {
    let duration = match (args.preset, args.seconds) {
        (Some(preset), _) => preset,
        (None, Some(seconds)) => SplitDuration::custom(seconds)?,
        (None, None) => bail!("either --preset or --seconds is required"),
    };
    split_video(session, &args.video, duration)
}

fn handle_crop(session: &Session, args: &CropArgs) -> Result<()> {
    let preset = args
        .resolved_preset()
        .context("either --preset or --size is required")?;
    crop_video(session, &args.video, preset, args.source_size)
}

/// Print the video files in `dir` and return them.
pub fn show_video_files(dir: &Path) -> Result<Vec<VideoFile>> {
    let files = list_video_files(dir)?;
    if files.is_empty() {
        emit(
            Level::Warn,
            "video.list.empty",
            &format!("No video files found in {}!", dir.display()),
            None,
        );
        return Ok(files);
    }

    emit(
        Level::Success,
        "video.list",
        "Available Video Files:",
        Some(json!(
            files
                .iter()
                .map(|f| json!({
                    "name": f.name,
                    "path": f.path.display().to_string(),
                    "size_bytes": f.size_bytes,
                }))
                .collect::<Vec<_>>()
        )),
    );
    print_block(&render_file_table(&files));
    Ok(files)
}

fn show_presets() {
    let mut crop = Table::new();
    crop.load_preset(UTF8_FULL)
        .set_header(vec!["Name", "Platform", "Size", "Aspect Ratio"]);
    for (name, preset) in CropPreset::names().into_iter().zip(CropPreset::ALL) {
        crop.add_row(vec![
            name.to_string(),
            preset.label().to_string(),
            preset.target().to_string(),
            preset.ratio_label(),
        ]);
    }

    let mut resize = Table::new();
    resize
        .load_preset(UTF8_FULL)
        .set_header(vec!["Name", "Label", "Resolution"]);
    for (name, preset) in ResizePreset::names().into_iter().zip(ResizePreset::ALL) {
        resize.add_row(vec![
            name.to_string(),
            preset.label().to_string(),
            preset.target().to_string(),
        ]);
    }

    let mut split = Table::new();
    split
        .load_preset(UTF8_FULL)
        .set_header(vec!["Name", "Duration"]);
    for (name, duration) in ["10s", "30s", "1m", "2m"].into_iter().zip(SplitDuration::ALL) {
        split.add_row(vec![name.to_string(), duration.label()]);
    }

    emit(
        Level::Info,
        "video.presets",
        "Presets",
        Some(json!({
            "crop": CropPreset::ALL.iter().map(|p| json!({
                "label": p.label(),
                "slug": p.slug(),
                "width": p.target().width,
                "height": p.target().height,
                "ratio": p.ratio_label(),
                "ratio_value": p.declared_ratio(),
            })).collect::<Vec<_>>(),
            "resize": ResizePreset::ALL.iter().map(|p| json!({
                "label": p.label(),
                "width": p.target().width,
                "height": p.target().height,
            })).collect::<Vec<_>>(),
            "split_seconds": SplitDuration::ALL.iter().map(|d| d.seconds()).collect::<Vec<_>>(),
        })),
    );
    print_block(&crop.to_string());
    print_block(&resize.to_string());
    print_block(&split.to_string());
}

pub fn resize_video(session: &Session, input: &Path, preset: ResizePreset) -> Result<()> {
    let job = ResizeJob::new(input, preset)?;

    let duration = if session.dry_run {
        None
    } else {
        let info = session.probe(input)?;
        emit(
            Level::Info,
            "video.resize.source",
            &format!("Current Resolution: {}", info.resolution()),
            None,
        );
        Some(info.duration)
    };

    emit(
        Level::Info,
        "video.resize.start",
        &format!(
            "Resizing video to {} -> {}",
            job.target,
            job.output.display()
        ),
        None,
    );
    session.execute(&job, duration)?;
    if !session.dry_run {
        emit(
            Level::Success,
            "video.resize.done",
            "Video resized successfully!",
            None,
        );
    }
    Ok(())
}

pub fn split_video(session: &Session, input: &Path, duration: SplitDuration) -> Result<()> {
    let job = SplitJob::new(input, duration, &session.config.segments_dir)?;

    let total = if session.dry_run {
        session.prober.probe(input).ok().map(|info| info.duration)
    } else {
        let info = session.probe(input)?;
        emit(
            Level::Info,
            "video.split.source",
            &format!(
                "Video Duration: {:.2} minutes ({:.2} seconds)",
                info.duration / 60.0,
                info.duration
            ),
            None,
        );
        Some(info.duration)
    };

    let message = match total {
        Some(total) => format!(
            "Splitting video into {} segments of {} seconds each -> {}",
            duration.expected_segments(total),
            duration.seconds(),
            job.output_dir.display()
        ),
        None => format!(
            "Splitting video into segments of {} seconds each -> {}",
            duration.seconds(),
            job.output_dir.display()
        ),
    };
    emit(
        Level::Info,
        "video.split.start",
        &message,
        Some(json!({
            "segment_seconds": duration.seconds(),
            "expected_segments": total.map(|t| duration.expected_segments(t)),
        })),
    );

    session.execute(&job, total)?;

    if !session.dry_run {
        let written = job.written_segments()?;
        emit(
            Level::Success,
            "video.split.done",
            &format!(
                "Video split successfully into {} segments in {}",
                written.len(),
                job.output_dir.display()
            ),
            None,
        );
    }
    Ok(())
}

pub fn crop_video(
    session: &Session,
    input: &Path,
    preset: CropPreset,
    source_size: Option<VideoDimensions>,
) -> Result<()> {
    let (source, duration) = match source_size {
        Some(size) => (size, None),
        None => {
            let info = session.probe(input)?;
            (info.dimensions, Some(info.duration))
        }
    };
    emit(
        Level::Info,
        "video.crop.source",
        &format!("Current Resolution: {}", source),
        None,
    );

    let job = CropJob::new(input, preset, source, session.config.rounding())
        .with_context(|| format!("Cannot crop {} for {}", input.display(), preset.label()))?;

    if job.was_scaled() {
        emit(
            Level::Warn,
            "video.crop.adjusted",
            &format!(
                "Crop dimensions scaled down to {} to fit input video",
                job.fitted
            ),
            Some(json!({
                "requested": preset.target().to_string(),
                "applied": job.fitted.to_string(),
            })),
        );
    }
    if job.was_evened() {
        emit(
            Level::Warn,
            "video.crop.evened",
            &format!(
                "Crop size {} is odd; using {} so the encoder accepts it",
                job.fitted, job.crop
            ),
            Some(json!({
                "fitted": job.fitted.to_string(),
                "applied": job.crop.to_string(),
            })),
        );
    }

    emit(
        Level::Info,
        "video.crop.start",
        &format!(
            "Cropping video for {} -> {}",
            preset.label(),
            job.output.display()
        ),
        None,
    );
    session.execute(&job, duration)?;
    if !session.dry_run {
        emit(
            Level::Success,
            "video.crop.done",
            "Video cropped successfully!",
            None,
        );
    }
    Ok(())
}

fn check_engine(config: &VideoToolConfig) -> Result<()> {
    let mut missing = Vec::new();
    for binary in [&config.ffmpeg_path, &config.ffprobe_path] {
        let status = check_tool(binary);
        if !status.is_available() {
            emit(
                Level::Error,
                "video.check.missing",
                &format!("✗ {} not found", status.name),
                None,
            );
            missing.push(status.name);
            continue;
        }

        let location = status
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let version = status
            .version
            .as_ref()
            .map(|v| format!(" ({v})"))
            .unwrap_or_default();
        emit(
            Level::Success,
            "video.check.found",
            &format!("✓ {} found at {}{}", status.name, location, version),
            Some(json!({
                "name": status.name,
                "path": location,
                "version": status.version,
            })),
        );
    }

    if !missing.is_empty() {
        emit(
            Level::Warn,
            "video.check.hint",
            "Install FFmpeg from https://ffmpeg.org/download.html (macOS: brew install ffmpeg, Linux: sudo apt install ffmpeg)",
            None,
        );
        bail!("missing required tools: {}", missing.join(", "));
    }
    Ok(())
}
