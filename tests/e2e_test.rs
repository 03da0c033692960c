mod common;
mod utils;

use anyhow::Result;
use common::TestEnvironment;
use utils::{CommandOutput, run_vidtool_command};

fn dry_run_words(output: &CommandOutput) -> Vec<String> {
    let line = output
        .dry_run_line()
        .unwrap_or_else(|| panic!("no ffmpeg command in stdout:\n{}", output.stdout));
    CommandOutput::command_words(line)
}

#[test]
fn test_presets_lists_every_table() -> Result<()> {
    let env = TestEnvironment::new()?;

    let output = run_vidtool_command(&env, &["presets"])?;
    assert_eq!(output.exit_code, 0, "presets failed: {}", output.stderr);

    for expected in ["tiktok", "instagram-feed", "1080x1920", "1200x630", "1920x1080", "2m"] {
        assert!(
            output.stdout.contains(expected),
            "missing {expected} in:\n{}",
            output.stdout
        );
    }
    Ok(())
}

#[test]
fn test_presets_json_output_is_one_event_per_line() -> Result<()> {
    let env = TestEnvironment::new()?;

    let output = run_vidtool_command(&env, &["--output", "json", "presets"])?;
    assert_eq!(output.exit_code, 0, "presets failed: {}", output.stderr);

    let events: Vec<serde_json::Value> = output
        .stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(serde_json::from_str)
        .collect::<Result<_, _>>()?;
    let presets = events
        .iter()
        .find(|e| e["code"] == "video.presets")
        .expect("presets event");
    assert_eq!(presets["data"]["crop"].as_array().map(Vec::len), Some(5));
    assert_eq!(presets["data"]["resize"].as_array().map(Vec::len), Some(4));
    Ok(())
}

#[test]
fn test_list_shows_only_videos() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.create_file("holiday.mp4", 2 * 1024 * 1024)?;
    env.create_file("Intro.MOV", 512)?;
    env.create_file("notes.txt", 64)?;
    env.create_file("nested/deep.mkv", 64)?;

    let output = run_vidtool_command(&env, &["list"])?;
    assert_eq!(output.exit_code, 0, "list failed: {}", output.stderr);
    assert!(output.stdout.contains("holiday.mp4"));
    assert!(output.stdout.contains("Intro.MOV"));
    assert!(output.stdout.contains("2.0"));
    assert!(!output.stdout.contains("notes.txt"));
    assert!(!output.stdout.contains("deep.mkv"));
    Ok(())
}

#[test]
fn test_list_empty_directory_warns() -> Result<()> {
    let env = TestEnvironment::new()?;

    let output = run_vidtool_command(&env, &["list"])?;
    assert_eq!(output.exit_code, 0);
    assert!(output.stderr.contains("No video files found"));
    Ok(())
}

#[test]
fn test_config_file_is_created_with_defaults() -> Result<()> {
    let env = TestEnvironment::new()?;

    let output = run_vidtool_command(&env, &["presets"])?;
    assert_eq!(output.exit_code, 0);

    let written = std::fs::read_to_string(env.config_path())?;
    assert!(written.contains("video_codec = \"libx264\""));
    assert!(written.contains("even_dimensions = true"));
    Ok(())
}

#[test]
fn test_resize_dry_run_prints_scale_command() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.create_file("clip.mp4", 128)?;

    let output = run_vidtool_command(&env, &["resize", "clip.mp4", "--preset", "hd", "--dry-run"])?;
    assert_eq!(output.exit_code, 0, "resize failed: {}", output.stderr);

    let words = dry_run_words(&output);
    assert!(words.contains(&"scale=1280:720".to_string()));
    assert!(words.contains(&"libx264".to_string()));
    assert_eq!(words.last().map(String::as_str), Some("clip_resized_1280_720.mp4"));
    assert!(!env.path().join("clip_resized_1280_720.mp4").exists());
    Ok(())
}

#[test]
fn test_resize_uses_configured_codec() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.create_file("clip.mp4", 128)?;
    std::fs::create_dir_all(env.path().join("config"))?;
    std::fs::write(
        env.config_path(),
        "video_codec = \"libx265\"\naudio_codec = \"aac\"\n",
    )?;

    let output = run_vidtool_command(
        &env,
        &["resize", "clip.mp4", "--size", "640x360", "--dry-run"],
    )?;
    assert_eq!(output.exit_code, 0, "resize failed: {}", output.stderr);

    let words = dry_run_words(&output);
    assert!(words.contains(&"libx265".to_string()));
    assert!(words.contains(&"aac".to_string()));
    assert!(words.contains(&"scale=640:360".to_string()));
    Ok(())
}

#[test]
fn test_resize_requires_a_target() -> Result<()> {
    let env = TestEnvironment::new()?;

    let output = run_vidtool_command(&env, &["resize", "clip.mp4"])?;
    assert_ne!(output.exit_code, 0);
    Ok(())
}

#[test]
fn test_crop_scales_down_to_fit_source() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.create_file("clip.mp4", 128)?;

    let output = run_vidtool_command(
        &env,
        &[
            "crop",
            "clip.mp4",
            "--preset",
            "tiktok",
            "--source-size",
            "720x480",
            "--dry-run",
        ],
    )?;
    assert_eq!(output.exit_code, 0, "crop failed: {}", output.stderr);
    assert!(output.stderr.contains("scaled down to 270x480"));

    let words = dry_run_words(&output);
    assert!(words.contains(&"crop=270:480:(iw-270)/2:(ih-480)/2".to_string()));
    assert_eq!(
        words.last().map(String::as_str),
        Some("clip_cropped_tiktok_stories_9x16.mp4")
    );
    Ok(())
}

#[test]
fn test_crop_keeps_fitting_preset() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.create_file("clip.mov", 128)?;

    let output = run_vidtool_command(
        &env,
        &[
            "crop",
            "clip.mov",
            "--preset",
            "instagram-post",
            "--source-size",
            "1920x1080",
            "--dry-run",
        ],
    )?;
    assert_eq!(output.exit_code, 0, "crop failed: {}", output.stderr);
    assert!(!output.stderr.contains("scaled down"));

    let words = dry_run_words(&output);
    assert!(words.contains(&"crop=1080:1080:(iw-1080)/2:(ih-1080)/2".to_string()));
    assert_eq!(
        words.last().map(String::as_str),
        Some("clip_cropped_instagram_post_1x1.mov")
    );
    Ok(())
}

#[test]
fn test_crop_evens_odd_custom_size() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.create_file("clip.mp4", 128)?;

    let output = run_vidtool_command(
        &env,
        &[
            "crop",
            "clip.mp4",
            "--size",
            "301x201",
            "--source-size",
            "1920x1080",
            "--dry-run",
        ],
    )?;
    assert_eq!(output.exit_code, 0, "crop failed: {}", output.stderr);
    assert!(
        output.stderr.contains("Crop size 301x201 is odd; using 300x200"),
        "unexpected stderr: {}",
        output.stderr
    );
    assert!(!output.stderr.contains("scaled down"));

    let words = dry_run_words(&output);
    assert!(words.contains(&"crop=300:200:(iw-300)/2:(ih-200)/2".to_string()));
    Ok(())
}

#[test]
fn test_crop_rejects_zero_source_size() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.create_file("clip.mp4", 128)?;

    let output = run_vidtool_command(
        &env,
        &[
            "crop",
            "clip.mp4",
            "--preset",
            "tiktok",
            "--source-size",
            "0x480",
            "--dry-run",
        ],
    )?;
    assert_ne!(output.exit_code, 0);
    assert!(
        output.stderr.contains("invalid dimensions 0x480"),
        "unexpected stderr: {}",
        output.stderr
    );
    Ok(())
}

#[test]
fn test_split_dry_run_uses_segment_muxer() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.create_file("clip.mp4", 128)?;

    let output = run_vidtool_command(&env, &["split", "clip.mp4", "--preset", "30s", "--dry-run"])?;
    assert_eq!(output.exit_code, 0, "split failed: {}", output.stderr);

    let words = dry_run_words(&output);
    let time_at = words
        .iter()
        .position(|w| w == "-segment_time")
        .expect("segment_time flag");
    assert_eq!(words[time_at + 1], "30");
    assert!(words.contains(&"segment".to_string()));
    assert_eq!(
        words.last().map(String::as_str),
        Some("segments/clip_segment_%03d.mp4")
    );
    assert!(!env.path().join("segments").exists());
    Ok(())
}

#[test]
fn test_split_rejects_non_positive_seconds() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.create_file("clip.mp4", 128)?;

    let output = run_vidtool_command(&env, &["split", "clip.mp4", "--seconds", "0", "--dry-run"])?;
    assert_eq!(output.exit_code, 1);
    assert!(output.stderr.contains("positive"));
    Ok(())
}

#[test]
fn test_bash_completions_generate() -> Result<()> {
    let env = TestEnvironment::new()?;

    let output = run_vidtool_command(&env, &["completions", "generate", "bash"])?;
    assert_eq!(output.exit_code, 0, "completions failed: {}", output.stderr);
    assert!(output.stdout.contains("vidtool"));
    assert!(output.stdout.contains("split"));
    Ok(())
}
