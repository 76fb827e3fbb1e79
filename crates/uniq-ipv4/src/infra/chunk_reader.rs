//! Chunked line reader
//!
//! Reads a source in fixed-size increments and hands out chunks holding only
//! complete lines. The bytes after the last newline of a read (the carry) are
//! moved to the head of the next read buffer, so a line can span any number
//! of reads.

use crate::domain::lines::LineChunk;
use memchr::memrchr;
use std::fs::File;
use std::io::{self, ErrorKind, Read};
use std::path::Path;

/// Sequential reader producing [`LineChunk`]s
pub struct ChunkReader<R> {
    source: R,
    buffer_size: usize,
    /// Partial line left over from the previous read
    carry: Vec<u8>,
    /// Input offset of the first carried byte
    offset: u64,
    finished: bool,
}

impl ChunkReader<File> {
    /// Open a file for chunked reading
    pub fn open(path: impl AsRef<Path>, buffer_size: usize) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(file, buffer_size))
    }
}

impl<R: Read> ChunkReader<R> {
    /// Create a reader pulling `buffer_size` bytes per read call
    ///
    /// # Panics
    ///
    /// Panics if `buffer_size` is zero.
    pub fn new(source: R, buffer_size: usize) -> Self {
        assert!(buffer_size > 0, "buffer_size must be > 0");
        Self {
            source,
            buffer_size,
            carry: Vec::new(),
            offset: 0,
            finished: false,
        }
    }

    /// Total bytes handed out so far
    pub fn bytes_consumed(&self) -> u64 {
        self.offset
    }

    /// Read the next chunk of complete lines
    ///
    /// Returns `Ok(None)` once the input is exhausted. The last line of the
    /// input is returned even without a trailing newline.
    pub fn next_chunk(&mut self) -> io::Result<Option<LineChunk>> {
        while !self.finished {
            let mut buf = std::mem::take(&mut self.carry);
            let start = buf.len();
            buf.resize(start + self.buffer_size, 0);

            let read = read_retrying(&mut self.source, &mut buf[start..])?;
            buf.truncate(start + read);

            if read == 0 {
                self.finished = true;
                if buf.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(self.emit(buf)));
            }

            // The carry never holds a newline, so only the new bytes are searched.
            match memrchr(b'\n', &buf[start..]) {
                Some(pos) => {
                    let end = start + pos + 1;
                    let mut carry = Vec::with_capacity(buf.len() - end + self.buffer_size);
                    carry.extend_from_slice(&buf[end..]);
                    buf.truncate(end);
                    self.carry = carry;
                    return Ok(Some(self.emit(buf)));
                }
                None => self.carry = buf,
            }
        }

        Ok(None)
    }

    fn emit(&mut self, data: Vec<u8>) -> LineChunk {
        let chunk = LineChunk::new(self.offset, data);
        self.offset += chunk.len() as u64;
        chunk
    }
}

impl<R: Read> Iterator for ChunkReader<R> {
    type Item = io::Result<LineChunk>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_chunk() {
            Ok(Some(chunk)) => Some(Ok(chunk)),
            Ok(None) => None,
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

fn read_retrying(source: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match source.read(buf) {
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            result => return result,
        }
    }
}
