//! Application layer - Use case implementations
//!
//! This module wires the reader, the workers and the address set into counting runs.

pub mod error;
#[cfg(feature = "mmap")]
pub mod mapped;
pub mod options;
pub mod pipeline;
pub mod worker;
