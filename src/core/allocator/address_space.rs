//! The address space: an ordered, gapless list of blocks
//!
//! Invariants held after every public operation:
//! - Blocks are sorted by start, the first starts at 0 and the last ends at
//!   `total_size`, each block starts where the previous one ends
//! - Every block covers at least one unit
//! - No two neighbouring blocks are both free

use crate::allocator::block::{Block, BlockInfo};
use crate::allocator::placement::find_candidate;
use crate::allocator::Strategy;
use crate::config::AllocatorConfig;
use crate::error::{AllocatorError, Result};
use crate::payload::{Media, PayloadSizer};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Address space of `total_size` units shared out among payloads of type `P`
///
/// Uses a plain `Vec` kept in address order. Splits insert after the chosen
/// block and merges rebuild the list, both O(n) in the number of blocks.
#[derive(Debug, Clone)]
pub struct AddressSpace<P = Media> {
    total_size: u64,
    blocks: Vec<Block<P>>,
    default_strategy: Strategy,
    sizer: PayloadSizer,
}

impl<P> AddressSpace<P> {
    /// Create an address space with one free block covering `total_size` units
    pub fn new(total_size: u64) -> Result<Self> {
        if total_size == 0 {
            return Err(AllocatorError::EmptyAddressSpace);
        }

        Ok(AddressSpace {
            total_size,
            blocks: vec![Block::free(0, total_size)],
            default_strategy: Strategy::default(),
            sizer: PayloadSizer::default(),
        })
    }

    /// Create an address space from a validated configuration
    pub fn with_config(config: &AllocatorConfig) -> Result<Self> {
        config.validate()?;

        let mut space = Self::new(config.total_size)?;
        space.default_strategy = config.default_strategy;
        space.sizer = PayloadSizer::new(config.video_scale);
        Ok(space)
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn default_strategy(&self) -> Strategy {
        self.default_strategy
    }

    pub fn set_default_strategy(&mut self, strategy: Strategy) {
        self.default_strategy = strategy;
    }

    pub fn sizer(&self) -> PayloadSizer {
        self.sizer
    }

    /// Blocks in address order
    pub fn blocks(&self) -> &[Block<P>] {
        &self.blocks
    }

    /// Payload-free snapshot of the blocks in address order
    pub fn list_blocks(&self) -> Vec<BlockInfo> {
        self.blocks.iter().map(Block::info).collect()
    }

    /// Payload of the allocated block starting at `address`
    pub fn payload_at(&self, address: u64) -> Option<&P> {
        self.blocks
            .iter()
            .find(|block| block.start == address)
            .and_then(Block::payload)
    }

    /// Allocate `size` units for `payload`, returning the start address
    ///
    /// The chosen block is split when larger than `size`: the allocation takes
    /// the low addresses and the remainder becomes a new free block right after
    /// it. On error the address space is unchanged and `payload` is dropped.
    pub fn try_allocate(&mut self, size: u64, payload: P, strategy: Strategy) -> Result<u64> {
        if size == 0 {
            return Err(AllocatorError::DegenerateSize(size));
        }

        if size > self.total_size {
            return Err(AllocatorError::CapacityExceeded {
                requested: size,
                total: self.total_size,
            });
        }

        let index = find_candidate(&self.blocks, size, strategy).ok_or(AllocatorError::NoFit {
            requested: size,
            strategy,
        })?;

        let block = &mut self.blocks[index];
        let start = block.start;

        if block.size > size {
            let remainder = Block::free(start + size, block.size - size);
            block.size = size;
            self.blocks.insert(index + 1, remainder);
            debug!(
                "Split block at {}: {} allocated, {} left free",
                start,
                size,
                self.blocks[index + 1].size
            );
        }

        self.blocks[index].occupy(payload);
        debug!("Allocated {} units at {} ({})", size, start, strategy);

        debug_assert!(self.is_consistent(), "inconsistent blocks after allocate");
        Ok(start)
    }

    /// Allocate `size` units for `payload`
    ///
    /// Returns `false` when the size is zero, exceeds the address space, or no
    /// free block is large enough. The address space is unchanged in that case.
    pub fn allocate(&mut self, size: u64, payload: P, strategy: Strategy) -> bool {
        match self.try_allocate(size, payload, strategy) {
            Ok(_) => true,
            Err(e) => {
                debug!("Allocation failed: {}", e);
                false
            }
        }
    }

    /// Allocate with the default strategy
    pub fn allocate_default(&mut self, size: u64, payload: P) -> bool {
        self.allocate(size, payload, self.default_strategy)
    }

    /// Free the allocated block starting at `address` and hand back its payload
    pub fn try_deallocate(&mut self, address: u64) -> Result<P> {
        let block = self
            .blocks
            .iter_mut()
            .find(|block| block.start == address && block.is_allocated())
            .ok_or(AllocatorError::InvalidDeallocationTarget(address))?;

        let size = block.size;
        let payload = block
            .release()
            .ok_or(AllocatorError::InvalidDeallocationTarget(address))?;

        debug!("Deallocated {} units at {}", size, address);
        self.merge_free_blocks();

        debug_assert!(self.is_consistent(), "inconsistent blocks after deallocate");
        Ok(payload)
    }

    /// Free the allocated block starting at `address`
    ///
    /// An address that is free or not the start of any block is ignored.
    pub fn deallocate(&mut self, address: u64) {
        if let Err(e) = self.try_deallocate(address) {
            debug!("Ignoring deallocation: {}", e);
        }
    }

    /// Drop every allocation and return to a single free block
    pub fn reset(&mut self) {
        let released = self.blocks.iter().filter(|b| b.is_allocated()).count();
        self.blocks.clear();
        self.blocks.push(Block::free(0, self.total_size));
        info!(
            "Reset address space of {} units ({} payloads released)",
            self.total_size, released
        );
    }

    /// Fold every run of neighbouring free blocks into one block
    ///
    /// A folded block stays as the merge target, so a run of any length
    /// collapses in a single pass. Allocated blocks pass through unchanged.
    fn merge_free_blocks(&mut self) {
        let before = self.blocks.len();
        let mut merged: Vec<Block<P>> = Vec::with_capacity(before);

        for block in self.blocks.drain(..) {
            if let Some(prev) = merged.last_mut() {
                if prev.is_free() && block.is_free() {
                    prev.size += block.size;
                    continue;
                }
            }
            merged.push(block);
        }

        self.blocks = merged;

        if self.blocks.len() < before {
            debug!("Merged {} free blocks", before - self.blocks.len());
        }
    }

    /// Check the coverage and coalescing invariants
    pub fn is_consistent(&self) -> bool {
        let Some(first) = self.blocks.first() else {
            warn!("Address space has no blocks");
            return false;
        };
        if first.start != 0 {
            return false;
        }
        if self.blocks.iter().any(|b| b.size == 0) {
            return false;
        }

        let contiguous = self.blocks.windows(2).all(|pair| pair[0].precedes(&pair[1]));
        let coalesced = self
            .blocks
            .windows(2)
            .all(|pair| pair[0].is_allocated() || pair[1].is_allocated());
        let covers = self.blocks.last().map(Block::end) == Some(self.total_size);

        contiguous && coalesced && covers
    }

    /// Summary of current usage
    pub fn stats(&self) -> AllocationStats {
        let free = self.blocks.iter().filter(|b| b.is_free());
        let free_size: u64 = free.clone().map(|b| b.size).sum();
        let largest_free_block = free.clone().map(|b| b.size).max().unwrap_or(0);

        AllocationStats {
            total_size: self.total_size,
            allocated_size: self.total_size - free_size,
            free_size,
            block_count: self.blocks.len(),
            free_block_count: free.count(),
            largest_free_block,
            fragmentation: fragmentation_ratio(free_size, largest_free_block),
        }
    }

    /// JSON array of the block list for external renderers
    pub fn snapshot_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.list_blocks())?)
    }
}

impl AddressSpace<Media> {
    /// Size `media` with this space's sizer and allocate it
    pub fn try_allocate_media(&mut self, media: Media, strategy: Strategy) -> Result<u64> {
        let size = self.sizer.size_of(&media);
        self.try_allocate(size, media, strategy)
    }

    /// Size `media` with this space's sizer and allocate it
    pub fn allocate_media(&mut self, media: Media, strategy: Strategy) -> bool {
        let size = self.sizer.size_of(&media);
        self.allocate(size, media, strategy)
    }
}

/// Share of free space outside the largest free block
///
/// 0.0 when all free space is one block (or nothing is free), approaching 1.0
/// as free space splinters.
fn fragmentation_ratio(free_size: u64, largest_free_block: u64) -> f64 {
    if free_size == 0 {
        return 0.0;
    }
    let largest = largest_free_block.min(free_size) as f64;
    (1.0 - largest / free_size as f64).clamp(0.0, 1.0)
}

/// Statistics about address space usage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationStats {
    pub total_size: u64,
    pub allocated_size: u64,
    pub free_size: u64,
    pub block_count: usize,
    pub free_block_count: usize,
    pub largest_free_block: u64,
    pub fragmentation: f64,
}
