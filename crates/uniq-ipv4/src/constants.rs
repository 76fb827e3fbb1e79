//! Address space and pipeline tuning constants

// =============================================================================
// Address space
// =============================================================================

/// Number of distinct IPv4 addresses (N = 2^32)
pub const ADDRESS_SPACE: u64 = 1u64 << 32;

/// Bits per bitmap word
pub const WORD_BITS: u32 = 64;

/// Number of u64 words needed for the full address space (2^32 / 64)
pub const NUM_WORDS: usize = (ADDRESS_SPACE / WORD_BITS as u64) as usize; // 67,108,864

/// Octets per IPv4 address
pub const OCTET_COUNT: usize = 4;

// =============================================================================
// Pipeline defaults
// =============================================================================

/// Default number of parsing workers
pub const DEFAULT_WORKER_COUNT: usize = 6;

/// Default read buffer size in bytes (1 MiB)
pub const DEFAULT_BUFFER_SIZE: usize = 1 << 20;

/// Default capacity of the reader -> worker queue, in chunks
pub const DEFAULT_QUEUE_CAPACITY: usize = 32;

/// Longest line prefix kept in a malformed-address error
pub const MAX_REPORTED_LINE_LEN: usize = 64;

/// Number of skipped malformed lines reported individually before going quiet
pub const SKIP_WARN_LIMIT: u64 = 8;
