//! Pixel dimensions and the crop-fit calculation.
//!
//! [`fit_within`] shrinks a requested crop size so it never exceeds the
//! source video, keeping the requested aspect ratio.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid dimensions {width}x{height}: width and height must be positive")]
pub struct InvalidDimensionsError {
    pub width: i64,
    pub height: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseDimensionsError {
    #[error("expected WIDTHxHEIGHT (e.g. 1280x720), got '{0}'")]
    Malformed(String),

    #[error(transparent)]
    Invalid(#[from] InvalidDimensionsError),
}

/// Width and height in pixels. Both are positive once constructed through
/// [`VideoDimensions::new`] or parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VideoDimensions {
    pub width: u32,
    pub height: u32,
}

impl VideoDimensions {
    pub fn new(width: u32, height: u32) -> Result<Self, InvalidDimensionsError> {
        Self::from_signed(width as i64, height as i64)
    }

    /// Accepts user-supplied values that may be negative.
    pub fn from_signed(width: i64, height: i64) -> Result<Self, InvalidDimensionsError> {
        if width <= 0 || height <= 0 || width > u32::MAX as i64 || height > u32::MAX as i64 {
            return Err(InvalidDimensionsError { width, height });
        }
        Ok(Self {
            width: width as u32,
            height: height as u32,
        })
    }

    pub fn validate(self) -> Result<Self, InvalidDimensionsError> {
        Self::new(self.width, self.height)
    }

    pub fn aspect_ratio(self) -> f64 {
        self.width as f64 / self.height as f64
    }

    pub fn area(self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn fits_within(self, bounds: VideoDimensions) -> bool {
        self.width <= bounds.width && self.height <= bounds.height
    }

    /// Largest even size not above this one (never below 2, or the value
    /// itself for 1px sides).
    pub fn floor_even(self) -> Self {
        Self {
            width: floor_even(self.width),
            height: floor_even(self.height),
        }
    }

    pub fn is_even(self) -> bool {
        self.width % 2 == 0 && self.height % 2 == 0
    }
}

impl fmt::Display for VideoDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for VideoDimensions {
    type Err = ParseDimensionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (w, h) = trimmed
            .split_once(['x', 'X', ':', '_'])
            .ok_or_else(|| ParseDimensionsError::Malformed(trimmed.to_string()))?;
        let width: i64 = w
            .trim()
            .parse()
            .map_err(|_| ParseDimensionsError::Malformed(trimmed.to_string()))?;
        let height: i64 = h
            .trim()
            .parse()
            .map_err(|_| ParseDimensionsError::Malformed(trimmed.to_string()))?;
        Ok(Self::from_signed(width, height)?)
    }
}

/// How derived dimensions are rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionRounding {
    /// Nearest integer, at least 1.
    Nearest,
    /// Nearest even integer, at least 2. Needed by encoders using 4:2:0
    /// chroma subsampling (libx264, libx265).
    #[default]
    Even,
}

/// Largest side a derived dimension may take; even, so both modes agree.
const MAX_SIDE: f64 = (u32::MAX - 1) as f64;

impl DimensionRounding {
    fn round(self, value: f64) -> u32 {
        match self {
            DimensionRounding::Nearest => value.round().clamp(1.0, MAX_SIDE) as u32,
            DimensionRounding::Even => ((value / 2.0).round() * 2.0).clamp(2.0, MAX_SIDE) as u32,
        }
    }

    /// A source side used as-is for a candidate. Even mode floors it so the
    /// candidate never overshoots an odd source.
    fn bound(self, side: u32) -> u32 {
        match self {
            DimensionRounding::Nearest => side,
            DimensionRounding::Even => floor_even(side),
        }
    }

    fn clamp(self, value: u32, limit: u32) -> u32 {
        if value <= limit {
            return value;
        }
        match self {
            DimensionRounding::Nearest => limit,
            DimensionRounding::Even => floor_even(limit),
        }
    }
}

fn floor_even(value: u32) -> u32 {
    if value < 2 { value } else { value & !1 }
}

/// Size to actually crop when `target` is requested from a `source` video.
///
/// A target that already fits is returned as is. Otherwise two candidates
/// are built, one bound by the source width and one by the source height
/// (floored to even under [`DimensionRounding::Even`]), and the largest one inside the source wins (width-bound on ties). When
/// rounding pushes both outside, the candidate bound by the tighter side is
/// clamped to the source.
pub fn fit_within(
    source: VideoDimensions,
    target: VideoDimensions,
    rounding: DimensionRounding,
) -> Result<VideoDimensions, InvalidDimensionsError> {
    let source = source.validate()?;
    let target = target.validate()?;

    if target.fits_within(source) {
        return Ok(target);
    }

    let ratio = target.aspect_ratio();
    let bound_width = rounding.bound(source.width);
    let bound_height = rounding.bound(source.height);
    let width_bound = VideoDimensions {
        width: bound_width,
        height: rounding.round(bound_width as f64 / ratio),
    };
    let height_bound = VideoDimensions {
        width: rounding.round(bound_height as f64 * ratio),
        height: bound_height,
    };

    let fitting: Vec<VideoDimensions> = [width_bound, height_bound]
        .into_iter()
        .filter(|c| c.fits_within(source))
        .collect();

    if let Some(best) = largest(&fitting) {
        return Ok(best);
    }

    // Only reachable through rounding, so the candidate on the binding
    // side is off by at most one step.
    let width_binds = source.width as f64 / target.width as f64
        <= source.height as f64 / target.height as f64;
    let binding = if width_binds { width_bound } else { height_bound };
    Ok(VideoDimensions {
        width: rounding.clamp(binding.width, source.width),
        height: rounding.clamp(binding.height, source.height),
    })
}

/// First candidate with the largest area.
fn largest(candidates: &[VideoDimensions]) -> Option<VideoDimensions> {
    let mut best: Option<VideoDimensions> = None;
    for candidate in candidates {
        match best {
            Some(current) if current.area() >= candidate.area() => {}
            _ => best = Some(*candidate),
        }
    }
    best
}
