//! Blocks of the address space
//!
//! Each block is a contiguous, non-empty run of units that is either free or
//! holds exactly one payload.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Occupancy of a block
///
/// The payload lives inside the `Allocated` variant, so a free block can never
/// carry one and an allocated block always does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockState<P> {
    Free,
    Allocated(P),
}

/// A contiguous run of address-space units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block<P> {
    /// Address of the first unit
    pub(crate) start: u64,
    /// Number of units covered, always > 0
    pub(crate) size: u64,
    pub(crate) state: BlockState<P>,
}

impl<P> Block<P> {
    pub(crate) fn free(start: u64, size: u64) -> Self {
        debug_assert!(size > 0, "blocks cover at least one unit");
        Block {
            start,
            size,
            state: BlockState::Free,
        }
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// One past the last unit of this block
    pub fn end(&self) -> u64 {
        self.start + self.size
    }

    pub fn state(&self) -> &BlockState<P> {
        &self.state
    }

    pub fn is_allocated(&self) -> bool {
        matches!(self.state, BlockState::Allocated(_))
    }

    pub fn is_free(&self) -> bool {
        !self.is_allocated()
    }

    pub fn payload(&self) -> Option<&P> {
        match &self.state {
            BlockState::Allocated(payload) => Some(payload),
            BlockState::Free => None,
        }
    }

    /// Check if this block covers an address
    pub fn contains(&self, address: u64) -> bool {
        address >= self.start && address < self.end()
    }

    /// Check if `next` starts exactly where this block ends
    pub fn precedes(&self, next: &Block<P>) -> bool {
        self.end() == next.start
    }

    /// Free block that fits `size` units
    pub(crate) fn is_candidate(&self, size: u64) -> bool {
        self.is_free() && self.size >= size
    }

    pub(crate) fn occupy(&mut self, payload: P) {
        debug_assert!(self.is_free(), "block at {} already allocated", self.start);
        self.state = BlockState::Allocated(payload);
    }

    /// Detach the payload, leaving the block free
    pub(crate) fn release(&mut self) -> Option<P> {
        match std::mem::replace(&mut self.state, BlockState::Free) {
            BlockState::Allocated(payload) => Some(payload),
            BlockState::Free => None,
        }
    }

    /// Read-only snapshot without the payload
    pub fn info(&self) -> BlockInfo {
        BlockInfo {
            start: self.start,
            size: self.size,
            allocated: self.is_allocated(),
        }
    }
}

/// Payload-free view of a block for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockInfo {
    pub start: u64,
    pub size: u64,
    pub allocated: bool,
}

impl BlockInfo {
    pub fn end(&self) -> u64 {
        self.start + self.size
    }
}

impl fmt::Display for BlockInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.allocated { "Allocated" } else { "Free" };
        write!(f, "Block {}-{}: {}", self.start, self.end(), status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_contains() {
        let block: Block<()> = Block::free(10, 20);
        assert!(!block.contains(9));
        assert!(block.contains(10));
        assert!(block.contains(29));
        assert!(!block.contains(30));
    }

    #[test]
    fn test_block_precedes() {
        let b1: Block<()> = Block::free(0, 10);
        let b2: Block<()> = Block::free(10, 5);
        let b3: Block<()> = Block::free(16, 5);

        assert!(b1.precedes(&b2));
        assert!(!b2.precedes(&b1));
        assert!(!b2.precedes(&b3));
    }

    #[test]
    fn test_occupy_and_release() {
        let mut block = Block::free(0, 8);
        assert!(block.is_free());
        assert!(block.payload().is_none());

        block.occupy("photo");
        assert!(block.is_allocated());
        assert_eq!(block.payload(), Some(&"photo"));

        assert_eq!(block.release(), Some("photo"));
        assert!(block.is_free());
        assert_eq!(block.release(), None);
    }

    #[test]
    fn test_candidate_requires_free_and_large_enough() {
        let mut block = Block::free(0, 8);
        assert!(block.is_candidate(8));
        assert!(block.is_candidate(1));
        assert!(!block.is_candidate(9));

        block.occupy(1u8);
        assert!(!block.is_candidate(1));
    }

    #[test]
    fn test_info_display() {
        let mut block = Block::free(15, 15);
        assert_eq!(block.info().to_string(), "Block 15-30: Free");

        block.occupy(());
        assert_eq!(block.info().to_string(), "Block 15-30: Allocated");
    }
}
