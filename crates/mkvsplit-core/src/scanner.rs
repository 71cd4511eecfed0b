//! Streaming EBML magic detection.
//!
//! [`MarkerScanner`] is fed arbitrary chunks and reports, in stream order,
//! either runs of plain bytes or marker occurrences. A marker split across two
//! chunks is detected through a carry buffer that never holds more than
//! `MARKER_LEN - 1` bytes. Matches never overlap: scanning resumes right after
//! the last byte of a match.

use std::convert::Infallible;
use std::io::Read;
use std::ops::Range;

use crate::error::Result;
use crate::reader::ChunkedReader;

/// EBML header ID that opens every Matroska/WebM fragment.
pub const EBML_MAGIC: [u8; 4] = [0x1A, 0x45, 0xDF, 0xA3];

/// Length of [`EBML_MAGIC`].
pub const MARKER_LEN: usize = EBML_MAGIC.len();

const CARRY_CAPACITY: usize = MARKER_LEN - 1;

/// Something the scanner found in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanEvent<'a> {
    /// Bytes that are known not to start a marker.
    Bytes(&'a [u8]),
    /// A marker starting at the given absolute stream offset.
    ///
    /// The marker bytes themselves are not repeated as a `Bytes` event.
    Marker { offset: u64 },
}

/// Incremental marker scanner with a bounded carry buffer.
#[derive(Debug, Clone, Default)]
pub struct MarkerScanner {
    carry: [u8; CARRY_CAPACITY],
    carry_len: usize,
    /// Stream offset of `carry[0]`, or of the next chunk when the carry is empty.
    window_start: u64,
    markers: u64,
}

impl MarkerScanner {
    /// Create a scanner positioned at stream offset 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan the next chunk.
    ///
    /// Events are delivered through `on_event` in stream order. If the
    /// callback fails, scanning stops and the error is returned as is.
    pub fn feed<E, F>(&mut self, chunk: &[u8], mut on_event: F) -> std::result::Result<(), E>
    where
        F: FnMut(ScanEvent<'_>) -> std::result::Result<(), E>,
    {
        let carry = self.carry;
        let window = Window {
            carry: &carry[..self.carry_len],
            chunk,
        };
        let len = window.len();

        // `cut`: first byte not yet reported. `pos`: next candidate match start.
        let mut cut = 0;
        let mut pos = 0;
        while pos + MARKER_LEN <= len {
            match window.find_from(pos) {
                Some(found) => {
                    window.emit(cut..found, &mut on_event)?;
                    self.markers += 1;
                    on_event(ScanEvent::Marker {
                        offset: self.window_start + found as u64,
                    })?;
                    pos = found + MARKER_LEN;
                    cut = pos;
                }
                None => {
                    pos = len + 1 - MARKER_LEN;
                    break;
                }
            }
        }
        window.emit(cut..pos, &mut on_event)?;

        let tail = len - pos;
        debug_assert!(tail <= CARRY_CAPACITY);
        let mut next = [0u8; CARRY_CAPACITY];
        for (k, slot) in next[..tail].iter_mut().enumerate() {
            *slot = window.byte(pos + k);
        }
        self.carry = next;
        self.carry_len = tail;
        self.window_start += pos as u64;

        Ok(())
    }

    /// Flush the carry buffer at end of stream.
    ///
    /// Whatever is still held cannot be a marker any more and is reported as
    /// plain bytes.
    pub fn finish<E, F>(&mut self, mut on_event: F) -> std::result::Result<(), E>
    where
        F: FnMut(ScanEvent<'_>) -> std::result::Result<(), E>,
    {
        let carry = self.carry;
        let held = self.carry_len;
        self.carry_len = 0;
        self.window_start += held as u64;

        if held > 0 {
            on_event(ScanEvent::Bytes(&carry[..held]))?;
        }
        Ok(())
    }

    /// Bytes held back because they might begin a marker.
    pub fn pending(&self) -> &[u8] {
        &self.carry[..self.carry_len]
    }

    /// Stream offset of the first byte not yet reported.
    pub fn position(&self) -> u64 {
        self.window_start
    }

    /// Number of markers found so far.
    pub fn markers_found(&self) -> u64 {
        self.markers
    }
}

/// Scan a whole source and return the offset of every marker.
pub fn marker_offsets<R: Read>(reader: &mut ChunkedReader<R>) -> Result<Vec<u64>> {
    let mut scanner = MarkerScanner::new();
    let mut offsets = Vec::new();
    let mut record = |event: ScanEvent<'_>| {
        if let ScanEvent::Marker { offset } = event {
            offsets.push(offset);
        }
        Ok::<(), Infallible>(())
    };

    while let Some(chunk) = reader.next_chunk()? {
        scanner
            .feed(chunk, &mut record)
            .unwrap_or_else(|never| match never {});
    }
    scanner
        .finish(&mut record)
        .unwrap_or_else(|never| match never {});

    tracing::debug!("Found {} markers in {} bytes", offsets.len(), reader.bytes_read());
    Ok(offsets)
}

/// Logical concatenation of the carry buffer and the current chunk.
struct Window<'a> {
    carry: &'a [u8],
    chunk: &'a [u8],
}

impl<'a> Window<'a> {
    fn len(&self) -> usize {
        self.carry.len() + self.chunk.len()
    }

    fn byte(&self, i: usize) -> u8 {
        match i.checked_sub(self.carry.len()) {
            Some(j) => self.chunk[j],
            None => self.carry[i],
        }
    }

    /// First marker starting at or after `start`. Requires `start + MARKER_LEN <= len`.
    fn find_from(&self, start: usize) -> Option<usize> {
        let carry_len = self.carry.len();
        let last = self.len() - MARKER_LEN;

        // Candidates that begin inside the carry straddle into the chunk.
        for p in start..carry_len.min(last + 1) {
            if (0..MARKER_LEN).all(|k| self.byte(p + k) == EBML_MAGIC[k]) {
                return Some(p);
            }
        }

        let from = start.max(carry_len) - carry_len;
        self.chunk
            .get(from..)?
            .windows(MARKER_LEN)
            .position(|w| w == &EBML_MAGIC[..])
            .map(|i| i + from + carry_len)
    }

    fn emit<E, F>(&self, range: Range<usize>, on_event: &mut F) -> std::result::Result<(), E>
    where
        F: FnMut(ScanEvent<'a>) -> std::result::Result<(), E>,
    {
        if range.is_empty() {
            return Ok(());
        }

        let carry_len = self.carry.len();
        if range.start < carry_len {
            on_event(ScanEvent::Bytes(
                &self.carry[range.start..range.end.min(carry_len)],
            ))?;
        }
        if range.end > carry_len {
            on_event(ScanEvent::Bytes(
                &self.chunk[range.start.max(carry_len) - carry_len..range.end - carry_len],
            ))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Trace {
        bytes: Vec<u8>,
        markers: Vec<u64>,
    }

    fn scan_in_chunks(data: &[u8], chunk_size: usize) -> (Trace, MarkerScanner) {
        let mut scanner = MarkerScanner::new();
        let mut trace = Trace::default();
        let mut on_event = |event: ScanEvent<'_>| {
            match event {
                ScanEvent::Bytes(b) => trace.bytes.extend_from_slice(b),
                ScanEvent::Marker { offset } => trace.markers.push(offset),
            }
            Ok::<(), Infallible>(())
        };

        for chunk in data.chunks(chunk_size) {
            scanner.feed(chunk, &mut on_event).unwrap();
            assert!(scanner.pending().len() < MARKER_LEN);
        }
        scanner.finish(&mut on_event).unwrap();
        (trace, scanner)
    }

    #[test]
    fn test_single_chunk_offsets() {
        let mut data = vec![0u8; 3];
        data.extend_from_slice(&EBML_MAGIC);
        data.extend_from_slice(&[7, 7]);
        data.extend_from_slice(&EBML_MAGIC);

        let (trace, scanner) = scan_in_chunks(&data, 1024);
        assert_eq!(trace.markers, vec![3, 9]);
        assert_eq!(trace.bytes, vec![0, 0, 0, 7, 7]);
        assert_eq!(scanner.markers_found(), 2);
        assert_eq!(scanner.position(), data.len() as u64);
    }

    #[test]
    fn test_every_chunk_size_finds_same_offsets() {
        let mut data = b"junk".to_vec();
        data.extend_from_slice(&EBML_MAGIC);
        data.extend_from_slice(&[0x1A, 0x45, 0x00, 0x1A]);
        data.extend_from_slice(&EBML_MAGIC);
        data.extend_from_slice(&EBML_MAGIC);
        data.push(0x1A);

        for chunk_size in 1..=data.len() {
            let (trace, _) = scan_in_chunks(&data, chunk_size);
            assert_eq!(trace.markers, vec![4, 12, 16], "chunk size {chunk_size}");
            assert_eq!(trace.bytes.len() + 3 * MARKER_LEN, data.len());
        }
    }

    #[test]
    fn test_straddling_marker_reported_once() {
        for split in 1..MARKER_LEN {
            let mut scanner = MarkerScanner::new();
            let mut markers = Vec::new();
            let mut on_event = |event: ScanEvent<'_>| {
                if let ScanEvent::Marker { offset } = event {
                    markers.push(offset);
                }
                Ok::<(), Infallible>(())
            };

            let mut first = vec![0xFFu8; 5];
            first.extend_from_slice(&EBML_MAGIC[..split]);
            scanner.feed(&first, &mut on_event).unwrap();
            assert!(scanner.pending().ends_with(&EBML_MAGIC[..split]));

            scanner.feed(&EBML_MAGIC[split..], &mut on_event).unwrap();
            scanner.feed(&[0xFF; 6], &mut on_event).unwrap();
            scanner.finish(&mut on_event).unwrap();

            assert_eq!(markers, vec![5], "split after {split} bytes");
        }
    }

    #[test]
    fn test_matches_do_not_overlap() {
        let data = EBML_MAGIC.repeat(5);
        let (trace, _) = scan_in_chunks(&data, 3);
        assert_eq!(trace.markers, vec![0, 4, 8, 12, 16]);
        assert!(trace.bytes.is_empty());
    }

    #[test]
    fn test_partial_marker_at_end_is_plain_bytes() {
        let data = [0x00, 0x1A, 0x45, 0xDF];
        let (trace, scanner) = scan_in_chunks(&data, 2);
        assert!(trace.markers.is_empty());
        assert_eq!(trace.bytes, data.to_vec());
        assert!(scanner.pending().is_empty());
    }

    #[test]
    fn test_callback_error_stops_scan() {
        let mut scanner = MarkerScanner::new();
        let mut data = vec![1u8, 2];
        data.extend_from_slice(&EBML_MAGIC);

        let result = scanner.feed(&data, |event| match event {
            ScanEvent::Marker { .. } => Err("stop"),
            ScanEvent::Bytes(_) => Ok(()),
        });
        assert_eq!(result, Err("stop"));
    }

    #[test]
    fn test_marker_offsets_helper() {
        let mut data = vec![0u8; 100];
        data.extend_from_slice(&EBML_MAGIC);
        data.extend_from_slice(&[0u8; 50]);
        data.extend_from_slice(&EBML_MAGIC);

        let mut reader =
            ChunkedReader::with_chunk_size(std::io::Cursor::new(data), 7).unwrap();
        assert_eq!(marker_offsets(&mut reader).unwrap(), vec![100, 154]);
    }
}
