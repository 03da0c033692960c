use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::common::paths;

use super::dimensions::DimensionRounding;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoToolConfig {
    /// ffmpeg binary name or path
    pub ffmpeg_path: String,
    /// ffprobe binary name or path
    pub ffprobe_path: String,
    /// Video encoder used for resize and crop (e.g. libx264)
    pub video_codec: String,
    /// Audio codec for resize and crop; "copy" keeps the source track
    pub audio_codec: String,
    /// Keep derived dimensions even, as 4:2:0 encoders require
    pub even_dimensions: bool,
    /// Directory for split segments, relative to the source video
    pub segments_dir: String,
}

impl Default for VideoToolConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: Self::DEFAULT_FFMPEG.to_string(),
            ffprobe_path: Self::DEFAULT_FFPROBE.to_string(),
            video_codec: Self::DEFAULT_VIDEO_CODEC.to_string(),
            audio_codec: Self::DEFAULT_AUDIO_CODEC.to_string(),
            even_dimensions: true,
            segments_dir: Self::DEFAULT_SEGMENTS_DIR.to_string(),
        }
    }
}

impl VideoToolConfig {
    pub const DEFAULT_FFMPEG: &'static str = "ffmpeg";
    pub const DEFAULT_FFPROBE: &'static str = "ffprobe";
    pub const DEFAULT_VIDEO_CODEC: &'static str = "libx264";
    pub const DEFAULT_AUDIO_CODEC: &'static str = "copy";
    pub const DEFAULT_SEGMENTS_DIR: &'static str = "segments";

    pub fn load() -> Result<Self> {
        Self::load_from_path(paths::default_config_path()?)
    }

    /// Missing files are created with defaults.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            let config = Self::default();
            config.save_to_path(path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading vidtool config from {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("parsing vidtool config {}", path.display()))?;
        Ok(config.sanitized())
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating config directory {}", parent.display()))?;
        }

        let toml = toml::to_string_pretty(self).context("serializing vidtool config")?;
        fs::write(path, toml)
            .with_context(|| format!("writing vidtool config to {}", path.display()))?;
        Ok(())
    }

    fn sanitized(mut self) -> Self {
        fn or_default(value: &mut String, default: &str) {
            if value.trim().is_empty() {
                *value = default.to_string();
            }
        }
        or_default(&mut self.ffmpeg_path, Self::DEFAULT_FFMPEG);
        or_default(&mut self.ffprobe_path, Self::DEFAULT_FFPROBE);
        or_default(&mut self.video_codec, Self::DEFAULT_VIDEO_CODEC);
        or_default(&mut self.audio_codec, Self::DEFAULT_AUDIO_CODEC);
        or_default(&mut self.segments_dir, Self::DEFAULT_SEGMENTS_DIR);
        self
    }

    pub fn rounding(&self) -> DimensionRounding {
        if self.even_dimensions {
            DimensionRounding::Even
        } else {
            DimensionRounding::Nearest
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = VideoToolConfig::load_from_path(&path).unwrap();

        assert_eq!(config, VideoToolConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "video_codec = \"libx265\"\neven_dimensions = false\n").unwrap();

        let config = VideoToolConfig::load_from_path(&path).unwrap();

        assert_eq!(config.video_codec, "libx265");
        assert_eq!(config.ffmpeg_path, "ffmpeg");
        assert_eq!(config.rounding(), DimensionRounding::Nearest);
    }

    #[test]
    fn blank_values_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "segments_dir = \"  \"\nffprobe_path = \"\"\n").unwrap();

        let config = VideoToolConfig::load_from_path(&path).unwrap();

        assert_eq!(config.segments_dir, "segments");
        assert_eq!(config.ffprobe_path, "ffprobe");
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "even_dimensions = \"maybe\"").unwrap();

        assert!(VideoToolConfig::load_from_path(&path).is_err());
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = VideoToolConfig {
            audio_codec: "aac".to_string(),
            ..VideoToolConfig::default()
        };

        config.save_to_path(&path).unwrap();

        assert_eq!(VideoToolConfig::load_from_path(&path).unwrap(), config);
    }
}
