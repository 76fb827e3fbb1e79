//! Memory-mapped input
//!
//! Maps the whole input read-only and splits it into segments that start and
//! end on line boundaries, so each segment can be parsed independently.

use memchr::memchr;
use memmap2::Mmap;
use std::fs::File;
use std::io;
use std::ops::Range;
use std::path::Path;

/// Read-only mapping of an input file
///
/// Zero-length files are not mapped; they expose an empty slice.
pub struct MappedInput {
    mmap: Option<Mmap>,
}

impl MappedInput {
    /// Map a file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or mapped.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Ok(Self { mmap: None });
        }

        // The mapping is only read; the input must not be truncated while counting.
        let mmap = unsafe { Mmap::map(&file)? };

        Ok(Self { mmap: Some(mmap) })
    }

    /// Mapped bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split `data` into ranges of roughly `target` bytes ending on line boundaries
///
/// Every range except possibly the last ends just after a `\n`. The ranges
/// are contiguous and cover all of `data`.
///
/// # Panics
///
/// Panics if `target` is zero.
pub fn line_aligned_segments(data: &[u8], target: usize) -> Vec<Range<usize>> {
    assert!(target > 0, "segment target must be > 0");

    let mut segments = Vec::with_capacity(data.len() / target + 1);
    let mut start = 0;

    while start < data.len() {
        let mut end = start.saturating_add(target).min(data.len());
        if end < data.len() {
            end = match memchr(b'\n', &data[end - 1..]) {
                Some(pos) => end + pos,
                None => data.len(),
            };
        }
        segments.push(start..end);
        start = end;
    }

    segments
}
