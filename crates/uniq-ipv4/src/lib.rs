//! uniq-ipv4 - Bounded-memory distinct IPv4 address counter
//!
//! This crate provides functionality to:
//! - Parse dotted-decimal IPv4 lines without allocating
//! - Track observed addresses in a 512 MiB bitmap covering all 2^32 addresses
//! - Stream huge newline-delimited files through a bounded reader -> worker queue
//! - Count the distinct addresses once every worker has finished

pub mod app;
pub mod constants;
pub mod domain;
pub mod infra;

// Re-export commonly used types
pub use app::error::CountError;
pub use app::options::{CountOptions, MalformedPolicy};
pub use app::pipeline::{
    CountSummary, count_unique, count_unique_from_reader, count_unique_with_summary,
};
pub use constants::*;
pub use domain::address_set::AddressSet;
pub use domain::parser::{OctetMode, ParseError, parse_ipv4, parse_ipv4_wrapping};

#[cfg(feature = "mmap")]
pub use app::mapped::count_unique_mapped;
