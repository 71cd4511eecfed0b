//! Boundary segmenter.
//!
//! Drives the sink lifecycle from the events reported by the
//! [`MarkerScanner`]:
//!
//! - bytes before the first marker are discarded;
//! - every marker closes the open segment (if any) and opens the next one,
//!   and the marker bytes are written to the new segment;
//! - end of stream closes the open segment.
//!
//! At most one sink is open at a time and memory use does not grow with the
//! stream: one chunk plus the scanner's carry buffer.

use std::io::Read;

use crate::error::{Error, Result};
use crate::reader::ChunkedReader;
use crate::scanner::{MarkerScanner, ScanEvent, EBML_MAGIC};
use crate::sink::{SegmentSink, SinkFactory};

/// Final size of a closed segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentResult {
    /// Segment index (0-based, contiguous).
    pub index: u64,
    /// Size reported by the sink when it was closed.
    pub byte_count: u64,
}

struct OpenSegment<S> {
    index: u64,
    sink: S,
    written: u64,
}

impl<S: SegmentSink> OpenSegment<S> {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.sink
            .write_all(bytes)
            .map_err(|source| Error::SinkWrite {
                index: self.index,
                source,
            })?;
        self.written += bytes.len() as u64;
        Ok(())
    }

    fn close(self) -> Result<SegmentResult> {
        let index = self.index;
        let byte_count = self
            .sink
            .finish()
            .map_err(|source| Error::SinkWrite { index, source })?;

        if byte_count != self.written {
            tracing::warn!(
                "Segment {} sink reported {} bytes, {} were written",
                index,
                byte_count,
                self.written
            );
        }
        tracing::debug!("Closed segment {} ({} bytes)", index, byte_count);

        Ok(SegmentResult { index, byte_count })
    }
}

/// Streaming segmenter over sinks of type `S`.
///
/// Use [`Segmenter::push`] / [`Segmenter::finish`] when the caller owns the
/// chunks, or the [`process`] / [`process_with`] helpers to drive it from a
/// [`ChunkedReader`].
pub struct Segmenter<S> {
    scanner: MarkerScanner,
    current: Option<OpenSegment<S>>,
    next_index: u64,
    discarded: u64,
}

impl<S: SegmentSink> Default for Segmenter<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SegmentSink> Segmenter<S> {
    pub fn new() -> Self {
        Self {
            scanner: MarkerScanner::new(),
            current: None,
            next_index: 0,
            discarded: 0,
        }
    }

    /// Feed one chunk.
    ///
    /// `on_segment` is called for every segment closed by a marker in this
    /// chunk, before the next one is opened.
    pub fn push<F, C>(&mut self, chunk: &[u8], factory: &mut F, on_segment: &mut C) -> Result<()>
    where
        F: SinkFactory<Sink = S>,
        C: FnMut(SegmentResult),
    {
        let Self {
            scanner,
            current,
            next_index,
            discarded,
        } = self;

        scanner.feed(chunk, |event| -> Result<()> {
            let offset = match event {
                ScanEvent::Bytes(bytes) => return route(current, discarded, bytes),
                ScanEvent::Marker { offset } => offset,
            };

            if let Some(segment) = current.take() {
                on_segment(segment.close()?);
            }

            let index = *next_index;
            let sink = factory
                .open(index)
                .map_err(|source| Error::SinkOpen { index, source })?;
            *next_index += 1;
            tracing::debug!("Opened segment {} at offset {}", index, offset);

            let segment = current.insert(OpenSegment {
                index,
                sink,
                written: 0,
            });
            segment.write(&EBML_MAGIC)
        })
    }

    /// Signal end of stream.
    ///
    /// Routes the bytes still held by the scanner and closes the open segment.
    pub fn finish<C>(&mut self, on_segment: &mut C) -> Result<()>
    where
        C: FnMut(SegmentResult),
    {
        let Self {
            scanner,
            current,
            discarded,
            ..
        } = self;

        scanner.finish(|event| -> Result<()> {
            match event {
                ScanEvent::Bytes(bytes) => route(current, discarded, bytes),
                ScanEvent::Marker { .. } => Ok(()),
            }
        })?;

        if let Some(segment) = current.take() {
            on_segment(segment.close()?);
        }

        if self.next_index == 0 {
            tracing::debug!("No marker found, discarded {} bytes", self.discarded);
        } else if self.discarded > 0 {
            tracing::debug!("Discarded {} leading bytes", self.discarded);
        }
        Ok(())
    }

    /// Give up without closing the open sink.
    ///
    /// The sink is returned in whatever state the last write left it.
    pub fn abandon(self) -> Option<S> {
        self.current.map(|segment| segment.sink)
    }

    /// Number of segments opened so far.
    pub fn segments_opened(&self) -> u64 {
        self.next_index
    }

    /// Bytes dropped so far because no segment was open.
    pub fn discarded_bytes(&self) -> u64 {
        self.discarded
    }

    /// Whether a segment is currently open.
    pub fn has_open_segment(&self) -> bool {
        self.current.is_some()
    }
}

fn route<S: SegmentSink>(
    current: &mut Option<OpenSegment<S>>,
    discarded: &mut u64,
    bytes: &[u8],
) -> Result<()> {
    match current {
        Some(segment) => segment.write(bytes),
        None => {
            *discarded += bytes.len() as u64;
            Ok(())
        }
    }
}

/// Split everything `reader` yields and collect the segment results.
pub fn process<R, F>(reader: &mut ChunkedReader<R>, factory: &mut F) -> Result<Vec<SegmentResult>>
where
    R: Read,
    F: SinkFactory,
{
    let mut results = Vec::new();
    process_with(reader, factory, |result| results.push(result))?;
    Ok(results)
}

/// Split everything `reader` yields, reporting each segment as it closes.
///
/// On error, every result delivered to `on_segment` so far stays valid; the
/// segment that was open is left as last written.
///
/// Returns the number of segments produced.
pub fn process_with<R, F, C>(
    reader: &mut ChunkedReader<R>,
    factory: &mut F,
    mut on_segment: C,
) -> Result<u64>
where
    R: Read,
    F: SinkFactory,
    C: FnMut(SegmentResult),
{
    let mut segmenter = Segmenter::<F::Sink>::new();

    while let Some(chunk) = reader.next_chunk()? {
        segmenter.push(chunk, factory, &mut on_segment)?;
    }
    segmenter.finish(&mut on_segment)?;

    tracing::debug!(
        "Split {} bytes into {} segments",
        reader.bytes_read(),
        segmenter.segments_opened()
    );
    Ok(segmenter.segments_opened())
}
