//! Domain layer - Pure computational logic
//!
//! This module contains pure functions and data structures without I/O dependencies.

pub mod address_set;
pub mod lines;
pub mod parser;
