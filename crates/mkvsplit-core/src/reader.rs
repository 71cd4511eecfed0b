//! Fixed-size chunk reader over an arbitrary byte source.

use std::io::{ErrorKind, Read};

use crate::error::{Error, Result};

/// Default read size (64 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Pulls fixed-size chunks from a byte source until it is exhausted.
///
/// Short reads from the source are coalesced, so every chunk except the last
/// one is exactly `chunk_size` bytes long. The reader knows nothing about
/// markers or segments.
pub struct ChunkedReader<R> {
    source: R,
    buffer: Vec<u8>,
    bytes_read: u64,
    exhausted: bool,
}

impl<R: Read> ChunkedReader<R> {
    /// Create a reader using [`DEFAULT_CHUNK_SIZE`].
    pub fn new(source: R) -> Self {
        Self {
            source,
            buffer: vec![0u8; DEFAULT_CHUNK_SIZE],
            bytes_read: 0,
            exhausted: false,
        }
    }

    /// Create a reader with a custom chunk size.
    ///
    /// # Errors
    /// Returns [`Error::InvalidChunkSize`] if `chunk_size` is zero.
    pub fn with_chunk_size(source: R, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidChunkSize(chunk_size));
        }

        Ok(Self {
            source,
            buffer: vec![0u8; chunk_size],
            bytes_read: 0,
            exhausted: false,
        })
    }

    /// Read the next chunk.
    ///
    /// Returns `Ok(None)` once the source is exhausted. The returned slice is
    /// only valid until the next call.
    pub fn next_chunk(&mut self) -> Result<Option<&[u8]>> {
        if self.exhausted {
            return Ok(None);
        }

        let mut filled = 0;
        while filled < self.buffer.len() {
            match self.source.read(&mut self.buffer[filled..]) {
                Ok(0) => {
                    self.exhausted = true;
                    break;
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::SourceRead(e)),
            }
        }

        if filled == 0 {
            return Ok(None);
        }

        self.bytes_read += filled as u64;
        tracing::trace!(
            "Read chunk of {} bytes ({} total)",
            filled,
            self.bytes_read
        );

        Ok(Some(&self.buffer[..filled]))
    }

    /// Configured chunk size.
    pub fn chunk_size(&self) -> usize {
        self.buffer.len()
    }

    /// Total bytes handed out so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Recover the underlying source.
    pub fn into_inner(self) -> R {
        self.source
    }
}
