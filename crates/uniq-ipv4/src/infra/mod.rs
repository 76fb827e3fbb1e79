//! Infrastructure layer - I/O and external dependencies
//!
//! This module handles file reading and memory mapping.

pub mod chunk_reader;
#[cfg(feature = "mmap")]
pub mod mapped_input;
