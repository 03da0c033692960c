use anyhow::{Result, anyhow};
use std::fmt;
use std::str::FromStr;

use super::dimensions::VideoDimensions;

const fn dims(width: u32, height: u32) -> VideoDimensions {
    VideoDimensions { width, height }
}

/// Social media crop targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropPreset {
    TikTokStories,
    InstagramPost,
    FacebookPost,
    YouTubeThumbnail,
    InstagramFeed,
    Custom(VideoDimensions),
}

impl CropPreset {
    /// Platform presets in menu order.
    pub const ALL: [CropPreset; 5] = [
        CropPreset::TikTokStories,
        CropPreset::InstagramPost,
        CropPreset::FacebookPost,
        CropPreset::YouTubeThumbnail,
        CropPreset::InstagramFeed,
    ];

    pub fn target(&self) -> VideoDimensions {
        match self {
            CropPreset::TikTokStories => dims(1080, 1920),
            CropPreset::InstagramPost => dims(1080, 1080),
            CropPreset::FacebookPost => dims(1200, 630),
            CropPreset::YouTubeThumbnail => dims(1080, 608),
            CropPreset::InstagramFeed => dims(1080, 1350),
            CropPreset::Custom(size) => *size,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CropPreset::TikTokStories => "TikTok/Instagram Stories (9:16)",
            CropPreset::InstagramPost => "Instagram Post (1:1)",
            CropPreset::FacebookPost => "Facebook Post (1.91:1)",
            CropPreset::YouTubeThumbnail => "YouTube Thumbnail (16:9)",
            CropPreset::InstagramFeed => "Instagram Feed (4:5)",
            CropPreset::Custom(_) => "Custom",
        }
    }

    pub fn ratio_label(&self) -> String {
        match self {
            CropPreset::TikTokStories => "9:16".to_string(),
            CropPreset::InstagramPost => "1:1".to_string(),
            CropPreset::FacebookPost => "1.91:1".to_string(),
            CropPreset::YouTubeThumbnail => "16:9".to_string(),
            CropPreset::InstagramFeed => "4:5".to_string(),
            CropPreset::Custom(size) => format!("{}:{}", size.width, size.height),
        }
    }

    /// Declared ratio as width / height.
    pub fn declared_ratio(&self) -> f64 {
        match self {
            CropPreset::TikTokStories => 9.0 / 16.0,
            CropPreset::InstagramPost => 1.0,
            CropPreset::FacebookPost => 1.91,
            CropPreset::YouTubeThumbnail => 16.0 / 9.0,
            CropPreset::InstagramFeed => 4.0 / 5.0,
            CropPreset::Custom(size) => size.aspect_ratio(),
        }
    }

    /// Used in output file names.
    pub fn slug(&self) -> &'static str {
        match self {
            CropPreset::TikTokStories => "tiktok_stories_9x16",
            CropPreset::InstagramPost => "instagram_post_1x1",
            CropPreset::FacebookPost => "facebook_post_1_91x1",
            CropPreset::YouTubeThumbnail => "youtube_thumbnail_16x9",
            CropPreset::InstagramFeed => "instagram_feed_4x5",
            CropPreset::Custom(_) => "custom",
        }
    }

    fn short_name(&self) -> &'static str {
        match self {
            CropPreset::TikTokStories => "tiktok",
            CropPreset::InstagramPost => "instagram-post",
            CropPreset::FacebookPost => "facebook",
            CropPreset::YouTubeThumbnail => "youtube",
            CropPreset::InstagramFeed => "instagram-feed",
            CropPreset::Custom(_) => "custom",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|p| p.short_name()).collect()
    }
}

impl fmt::Display for CropPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CropPreset {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.short_name() == wanted || p.slug() == wanted)
            .or_else(|| match wanted.as_str() {
                "stories" | "reels" | "instagram-stories" => Some(CropPreset::TikTokStories),
                _ => None,
            })
            .ok_or_else(|| {
                anyhow!(
                    "unknown crop preset '{}' (expected one of: {})",
                    s,
                    Self::names().join(", ")
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizePreset {
    FullHd,
    Hd,
    Sd,
    Low,
    Custom(VideoDimensions),
}

impl ResizePreset {
    pub const ALL: [ResizePreset; 4] = [
        ResizePreset::FullHd,
        ResizePreset::Hd,
        ResizePreset::Sd,
        ResizePreset::Low,
    ];

    pub fn target(&self) -> VideoDimensions {
        match self {
            ResizePreset::FullHd => dims(1920, 1080),
            ResizePreset::Hd => dims(1280, 720),
            ResizePreset::Sd => dims(854, 480),
            ResizePreset::Low => dims(640, 360),
            ResizePreset::Custom(size) => *size,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResizePreset::FullHd => "Full HD",
            ResizePreset::Hd => "HD",
            ResizePreset::Sd => "SD",
            ResizePreset::Low => "Low",
            ResizePreset::Custom(_) => "Custom Size",
        }
    }

    fn short_name(&self) -> &'static str {
        match self {
            ResizePreset::FullHd => "fullhd",
            ResizePreset::Hd => "hd",
            ResizePreset::Sd => "sd",
            ResizePreset::Low => "low",
            ResizePreset::Custom(_) => "custom",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|p| p.short_name()).collect()
    }
}

impl FromStr for ResizePreset {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        if let Some(preset) = Self::ALL.into_iter().find(|p| p.short_name() == wanted) {
            return Ok(preset);
        }
        match wanted.as_str() {
            "1080p" | "full-hd" => Ok(ResizePreset::FullHd),
            "720p" => Ok(ResizePreset::Hd),
            "480p" => Ok(ResizePreset::Sd),
            "360p" => Ok(ResizePreset::Low),
            _ => Err(anyhow!(
                "unknown resize preset '{}' (expected one of: {})",
                s,
                Self::names().join(", ")
            )),
        }
    }
}

/// Segment length used when splitting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SplitDuration {
    TenSeconds,
    ThirtySeconds,
    OneMinute,
    TwoMinutes,
    Custom(f64),
}

impl SplitDuration {
    pub const ALL: [SplitDuration; 4] = [
        SplitDuration::TenSeconds,
        SplitDuration::ThirtySeconds,
        SplitDuration::OneMinute,
        SplitDuration::TwoMinutes,
    ];

    pub fn custom(seconds: f64) -> Result<Self> {
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(anyhow!(
                "segment duration must be a positive number of seconds, got {}",
                seconds
            ));
        }
        Ok(SplitDuration::Custom(seconds))
    }

    pub fn seconds(&self) -> f64 {
        match self {
            SplitDuration::TenSeconds => 10.0,
            SplitDuration::ThirtySeconds => 30.0,
            SplitDuration::OneMinute => 60.0,
            SplitDuration::TwoMinutes => 120.0,
            SplitDuration::Custom(seconds) => *seconds,
        }
    }

    pub fn label(&self) -> String {
        match self {
            SplitDuration::TenSeconds => "10 seconds per segment".to_string(),
            SplitDuration::ThirtySeconds => "30 seconds per segment".to_string(),
            SplitDuration::OneMinute => "1 minute per segment".to_string(),
            SplitDuration::TwoMinutes => "2 minutes per segment".to_string(),
            SplitDuration::Custom(seconds) => format!("{seconds} seconds per segment"),
        }
    }

    /// Number of files a source of `total_seconds` splits into. A trailing
    /// partial segment counts as one.
    pub fn expected_segments(&self, total_seconds: f64) -> u64 {
        if !total_seconds.is_finite() || total_seconds <= 0.0 {
            return 0;
        }
        (total_seconds / self.seconds()).ceil() as u64
    }
}

impl FromStr for SplitDuration {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "10s" | "10" => Ok(SplitDuration::TenSeconds),
            "30s" | "30" => Ok(SplitDuration::ThirtySeconds),
            "1m" | "60s" | "60" => Ok(SplitDuration::OneMinute),
            "2m" | "120s" | "120" => Ok(SplitDuration::TwoMinutes),
            other => Err(anyhow!(
                "unknown split preset '{}' (expected 10s, 30s, 1m or 2m)",
                other
            )),
        }
    }
}
