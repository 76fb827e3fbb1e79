//! Owned chunks of whole lines
//!
//! A `LineChunk` is the unit of work handed from the reader to a worker.
//! It owns its bytes and only ever contains complete lines: every line ends
//! in `\n`, except the very last line of the input when the file has no
//! trailing newline.

use memchr::memchr;

/// A batch of complete lines and the input offset of its first byte
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineChunk {
    offset: u64,
    data: Vec<u8>,
}

impl LineChunk {
    /// Wrap bytes that start at `offset` in the input
    pub fn new(offset: u64, data: Vec<u8>) -> Self {
        Self { offset, data }
    }

    /// Input offset of the first byte
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Raw bytes including line terminators
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Number of bytes in the chunk
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate over `(offset, line)` pairs with terminators stripped
    pub fn lines(&self) -> Lines<'_> {
        Lines::new(self.offset, &self.data)
    }
}

/// Iterator over the lines of a byte slice
///
/// Lines end in `\n` or `\r\n`; the terminator is stripped. A trailing `\n`
/// does not produce an extra empty line; empty lines in the middle are
/// yielded as empty slices.
#[derive(Debug, Clone)]
pub struct Lines<'a> {
    rest: &'a [u8],
    offset: u64,
}

impl<'a> Lines<'a> {
    /// Iterate over `bytes`, which start at `offset` in the input
    pub fn new(offset: u64, bytes: &'a [u8]) -> Self {
        Self {
            rest: bytes,
            offset,
        }
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = (u64, &'a [u8]);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }

        let offset = self.offset;
        let (line, consumed) = match memchr(b'\n', self.rest) {
            Some(pos) => (&self.rest[..pos], pos + 1),
            None => (self.rest, self.rest.len()),
        };
        self.rest = &self.rest[consumed..];
        self.offset += consumed as u64;

        let line = line.strip_suffix(b"\r").unwrap_or(line);

        Some((offset, line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(chunk: &LineChunk) -> Vec<(u64, &[u8])> {
        chunk.lines().collect()
    }

    #[test]
    fn test_lines_with_trailing_newline() {
        let chunk = LineChunk::new(0, b"1.2.3.4\n5.6.7.8\n".to_vec());
        assert_eq!(
            collect(&chunk),
            vec![(0, &b"1.2.3.4"[..]), (8, &b"5.6.7.8"[..])]
        );
    }

    #[test]
    fn test_lines_without_trailing_newline() {
        let chunk = LineChunk::new(100, b"9.9.9.9\n8.8.8.8".to_vec());
        assert_eq!(
            collect(&chunk),
            vec![(100, &b"9.9.9.9"[..]), (108, &b"8.8.8.8"[..])]
        );
    }

    #[test]
    fn test_lines_keep_inner_empty_lines() {
        let chunk = LineChunk::new(0, b"a\n\nb\n".to_vec());
        assert_eq!(
            collect(&chunk),
            vec![(0, &b"a"[..]), (2, &b""[..]), (3, &b"b"[..])]
        );
    }

    #[test]
    fn test_lines_strip_carriage_return() {
        let chunk = LineChunk::new(0, b"1.2.3.4\r\n1.2.3.5\n\r\n8.8.8.8\r".to_vec());
        assert_eq!(
            collect(&chunk),
            vec![
                (0, &b"1.2.3.4"[..]),
                (9, &b"1.2.3.5"[..]),
                (17, &b""[..]),
                (19, &b"8.8.8.8"[..])
            ]
        );
    }

    #[test]
    fn test_lines_strip_only_one_carriage_return() {
        let chunk = LineChunk::new(0, b"1.2.3.4\r\r\n".to_vec());
        assert_eq!(collect(&chunk), vec![(0, &b"1.2.3.4\r"[..])]);
    }

    #[test]
    fn test_lines_single_newline() {
        let chunk = LineChunk::new(0, b"\n".to_vec());
        assert_eq!(collect(&chunk), vec![(0, &b""[..])]);
    }

    #[test]
    fn test_lines_empty_chunk() {
        let chunk = LineChunk::new(7, Vec::new());
        assert!(chunk.is_empty());
        assert_eq!(chunk.lines().count(), 0);
    }
}
