//! # media-alloc - Block Allocation for Media Payloads
//!
//! `media-alloc` models a fixed-size address space carved into variable-sized
//! blocks that are handed out to images and videos:
//!
//! - **Placement strategies**: first-fit, best-fit and worst-fit
//! - **Splitting** of oversized free blocks on allocation
//! - **Coalescing** of neighbouring free blocks on deallocation
//! - **Payload sizing**: images by area, videos by duration
//!
//! ## Quick Start
//!
//! ```rust
//! use media_alloc::{AddressSpace, Media, Result, Strategy};
//!
//! # fn main() -> Result<()> {
//! let mut space: AddressSpace = AddressSpace::new(1024)?;
//!
//! // A 16x16 image takes 256 units, a 10 second video 100
//! let photo = space.try_allocate_media(Media::image(16, 16), Strategy::FirstFit)?;
//! assert!(space.allocate_media(Media::video(10), Strategy::BestFit));
//!
//! for block in space.list_blocks() {
//!     println!("{}", block);
//! }
//!
//! // Freeing merges the hole back into its free neighbours
//! space.deallocate(photo);
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use media_alloc::{AddressSpace, AddressSpaceBuilder, Result, Strategy};
//!
//! # fn main() -> Result<()> {
//! let space: AddressSpace = AddressSpaceBuilder::new()
//!     .total_size(4096)
//!     .video_scale(25)
//!     .default_strategy(Strategy::WorstFit)
//!     .build()?;
//!
//! assert_eq!(space.total_size(), 4096);
//! # Ok(())
//! # }
//! ```

pub mod core;

// Re-export core modules internally so crate:: paths in core still work
pub(crate) use crate::core::{allocator, config, error, payload};

pub use crate::core::{
    allocator::{AddressSpace, AllocationStats, Block, BlockInfo, BlockState, Strategy},
    config::{AllocatorConfig, DEFAULT_TOTAL_SIZE},
    error::{AllocatorError, Result},
    payload::{size_of, Media, PayloadSizer, DEFAULT_VIDEO_SCALE},
};

use std::path::Path;
use tracing::info;

/// Builder for customizing address space creation
///
/// # Examples
///
/// ```rust
/// use media_alloc::{AddressSpaceBuilder, Media, Strategy};
///
/// # fn main() -> media_alloc::Result<()> {
/// let mut space = AddressSpaceBuilder::new()
///     .total_size(200)
///     .default_strategy(Strategy::BestFit)
///     .build()?;
///
/// assert!(space.allocate_default(50, Media::video(5)));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct AddressSpaceBuilder {
    config: AllocatorConfig,
}

impl AddressSpaceBuilder {
    /// Create a builder with the default configuration
    pub fn new() -> Self {
        AddressSpaceBuilder {
            config: AllocatorConfig::default(),
        }
    }

    /// Start from an existing configuration
    pub fn from_config(config: AllocatorConfig) -> Self {
        AddressSpaceBuilder { config }
    }

    /// Start from a TOML config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_config(AllocatorConfig::load(path)?))
    }

    /// Set the number of units in the address space
    pub fn total_size(mut self, total_size: u64) -> Self {
        self.config.total_size = total_size;
        self
    }

    /// Set the units allotted per second of video
    pub fn video_scale(mut self, video_scale: u64) -> Self {
        self.config.video_scale = video_scale;
        self
    }

    /// Set the strategy used by `allocate_default`
    pub fn default_strategy(mut self, strategy: Strategy) -> Self {
        self.config.default_strategy = strategy;
        self
    }

    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    /// Build the address space
    pub fn build<P>(self) -> Result<AddressSpace<P>> {
        info!(
            "Building address space of {} units ({}, video scale {})",
            self.config.total_size, self.config.default_strategy, self.config.video_scale
        );
        AddressSpace::with_config(&self.config)
    }
}
