//! Core allocator implementation
//!
//! - [`allocator`] - Address space, blocks and placement strategies
//! - [`payload`] - Media descriptors and their sizes
//! - [`config`] - TOML configuration
//! - [`error`] - Error types

pub mod allocator;
pub mod config;
pub mod error;
pub mod payload;
