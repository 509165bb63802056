//! Allocator configuration
//!
//! Loaded from TOML, every key optional:
//!
//! ```toml
//! total_size = 1024
//! video_scale = 10
//! default_strategy = "best-fit"
//! ```

use crate::allocator::Strategy;
use crate::error::{AllocatorError, Result};
use crate::payload::DEFAULT_VIDEO_SCALE;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Address space size used when none is configured
pub const DEFAULT_TOTAL_SIZE: u64 = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AllocatorConfig {
    /// Units in the address space
    pub total_size: u64,

    /// Units per second of video
    pub video_scale: u64,

    /// Strategy used by `allocate_default`
    pub default_strategy: Strategy,
}

impl AllocatorConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: AllocatorConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading allocator config from {:?}", path);
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.total_size == 0 {
            return Err(AllocatorError::InvalidConfig(
                "total_size must be greater than zero".to_string(),
            ));
        }

        if self.video_scale == 0 {
            return Err(AllocatorError::InvalidConfig(
                "video_scale must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        AllocatorConfig {
            total_size: DEFAULT_TOTAL_SIZE,
            video_scale: DEFAULT_VIDEO_SCALE,
            default_strategy: Strategy::FirstFit,
        }
    }
}
