//! Error types for address space operations

use crate::allocator::Strategy;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AllocatorError {
    #[error("Address space must cover at least one unit")]
    EmptyAddressSpace,

    #[error("Degenerate payload size: {0} (must be greater than zero)")]
    DegenerateSize(u64),

    #[error("Payload of {requested} units exceeds address space of {total} units")]
    CapacityExceeded { requested: u64, total: u64 },

    #[error("No free block of at least {requested} units ({strategy})")]
    NoFit { requested: u64, strategy: Strategy },

    #[error("No allocated block starts at address {0}")]
    InvalidDeallocationTarget(u64),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AllocatorError {
    /// True for the outcomes `allocate` reports as a plain `false`
    pub fn is_allocation_failure(&self) -> bool {
        matches!(
            self,
            AllocatorError::DegenerateSize(_)
                | AllocatorError::CapacityExceeded { .. }
                | AllocatorError::NoFit { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, AllocatorError>;
