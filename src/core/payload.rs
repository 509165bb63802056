//! Media payloads and their sizes in address-space units

use serde::{Deserialize, Serialize};
use std::fmt;

/// Units per second of video, unless configured otherwise
pub const DEFAULT_VIDEO_SCALE: u64 = 10;

/// Media descriptor stored in an allocated block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Media {
    Image { width: u32, height: u32 },
    Video { duration: u32 },
}

impl Media {
    pub fn image(width: u32, height: u32) -> Self {
        Media::Image { width, height }
    }

    pub fn video(duration: u32) -> Self {
        Media::Video { duration }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Media::Image { .. } => "image",
            Media::Video { .. } => "video",
        }
    }
}

impl fmt::Display for Media {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Media::Image { width, height } => write!(f, "image {}x{}", width, height),
            Media::Video { duration } => write!(f, "video {}s", duration),
        }
    }
}

/// Maps media to a size in address-space units
///
/// Images take `width * height` units, videos `duration * video_scale`.
/// Zero dimensions size to 0, which allocation rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadSizer {
    video_scale: u64,
}

impl PayloadSizer {
    pub fn new(video_scale: u64) -> Self {
        PayloadSizer { video_scale }
    }

    pub fn video_scale(&self) -> u64 {
        self.video_scale
    }

    pub fn size_of(&self, media: &Media) -> u64 {
        match *media {
            Media::Image { width, height } => u64::from(width) * u64::from(height),
            Media::Video { duration } => u64::from(duration).saturating_mul(self.video_scale),
        }
    }
}

impl Default for PayloadSizer {
    fn default() -> Self {
        PayloadSizer::new(DEFAULT_VIDEO_SCALE)
    }
}

/// Size of `media` with the default video scale
pub fn size_of(media: &Media) -> u64 {
    PayloadSizer::default().size_of(media)
}
