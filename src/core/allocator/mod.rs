//! Block allocation over a single contiguous address space
//!
//! The address space is an ordered list of blocks:
//! - Allocation picks a free block with one of three placement strategies
//!   and splits off the unused tail
//! - Deallocation frees a block and coalesces it with free neighbours

pub mod address_space;
pub mod block;
pub mod placement;

pub use address_space::{AddressSpace, AllocationStats};
pub use block::{Block, BlockInfo, BlockState};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placement strategy used to choose among free blocks large enough for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// First candidate in address order
    #[default]
    FirstFit,
    /// Smallest candidate; lowest address wins ties
    BestFit,
    /// Largest candidate; lowest address wins ties
    WorstFit,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::FirstFit, Strategy::BestFit, Strategy::WorstFit];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::FirstFit => "first-fit",
            Strategy::BestFit => "best-fit",
            Strategy::WorstFit => "worst-fit",
        }
    }

    /// Human-readable label used by front-ends
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::FirstFit => "First Fit",
            Strategy::BestFit => "Best Fit",
            Strategy::WorstFit => "Worst Fit",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "first-fit" | "firstfit" | "first" => Ok(Strategy::FirstFit),
            "best-fit" | "bestfit" | "best" => Ok(Strategy::BestFit),
            "worst-fit" | "worstfit" | "worst" => Ok(Strategy::WorstFit),
            _ => Err(format!(
                "Invalid strategy '{}'. Valid options: first-fit, best-fit, worst-fit",
                s
            )),
        }
    }
}
