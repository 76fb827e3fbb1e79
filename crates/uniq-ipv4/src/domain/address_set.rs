//! Address bitmap for tracking observed IPv4 addresses
//!
//! This module provides a bitmap covering the whole 32-bit address space.
//! It uses atomic operations so that any number of workers can mark
//! addresses concurrently, including addresses that share a word.

use crate::constants::NUM_WORDS;
use std::sync::atomic::{AtomicU64, Ordering};

/// Observed-address bitmap
///
/// Manages membership for all 2^32 addresses using 1 bit per address.
/// Memory usage: 512 MiB (2^32 / 8 bytes)
///
/// Bit `b` of word `w` is set iff address `(w << 6) | b` has been marked.
/// Bits only ever go from 0 to 1.
pub struct AddressSet {
    /// Bitmap storage (64 addresses per element)
    words: Vec<AtomicU64>,
}

impl AddressSet {
    /// Create a new bitmap with all bits set to 0
    pub fn new() -> Self {
        let words = (0..NUM_WORDS).map(|_| AtomicU64::new(0)).collect();
        Self { words }
    }

    /// Mark the address as seen (thread-safe)
    #[inline]
    pub fn mark(&self, addr: u32) {
        let index = (addr >> 6) as usize;
        let bit = 1u64 << (addr & 63);
        self.words[index].fetch_or(bit, Ordering::Relaxed);
    }

    /// Check if the address has been marked
    #[inline]
    pub fn contains(&self, addr: u32) -> bool {
        let index = (addr >> 6) as usize;
        let bit = 1u64 << (addr & 63);
        (self.words[index].load(Ordering::Relaxed) & bit) != 0
    }

    /// Count the number of marked addresses
    ///
    /// Sums the popcount of every word in one sequential pass. Only meaningful
    /// once every writer has been joined.
    pub fn count(&self) -> u64 {
        self.words
            .iter()
            .map(|word| word.load(Ordering::Relaxed).count_ones() as u64)
            .sum()
    }

    /// Number of 64-bit words backing the set
    pub fn word_count(&self) -> usize {
        self.words.len()
    }
}

impl Default for AddressSet {
    fn default() -> Self {
        Self::new()
    }
}
