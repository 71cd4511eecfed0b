//! Output sink abstraction.
//!
//! The segmenter never knows where segment bytes end up. It asks a
//! [`SinkFactory`] for a fresh [`SegmentSink`] every time a marker is found
//! and closes the previous one through [`SegmentSink::finish`].

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

/// Writable destination bound to exactly one segment.
pub trait SegmentSink {
    /// Append bytes to the segment.
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()>;

    /// Flush and close the sink, returning its final size in bytes.
    fn finish(self) -> io::Result<u64>;
}

/// Opens the sink for a given segment index.
pub trait SinkFactory {
    type Sink: SegmentSink;

    /// Open the sink for segment `index`.
    fn open(&mut self, index: u64) -> io::Result<Self::Sink>;
}

impl<S, F> SinkFactory for F
where
    S: SegmentSink,
    F: FnMut(u64) -> io::Result<S>,
{
    type Sink = S;

    fn open(&mut self, index: u64) -> io::Result<S> {
        self(index)
    }
}

/// Sink that drops every byte and only counts them.
#[derive(Debug, Default, Clone, Copy)]
pub struct CountingSink {
    written: u64,
}

impl CountingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SegmentSink for CountingSink {
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.written += buf.len() as u64;
        Ok(())
    }

    fn finish(self) -> io::Result<u64> {
        Ok(self.written)
    }
}

/// Factory that keeps every segment in memory.
///
/// Mostly useful for tests and benchmarks. Segments stay readable through
/// [`MemorySinkFactory::segments`] after the sinks have been closed.
#[derive(Debug, Default, Clone)]
pub struct MemorySinkFactory {
    segments: Rc<RefCell<Vec<Vec<u8>>>>,
}

impl MemorySinkFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Contents of every segment opened so far, by index.
    pub fn segments(&self) -> Vec<Vec<u8>> {
        self.segments.borrow().clone()
    }

    /// Number of sinks opened so far.
    pub fn opened(&self) -> usize {
        self.segments.borrow().len()
    }
}

impl SinkFactory for MemorySinkFactory {
    type Sink = MemorySink;

    fn open(&mut self, index: u64) -> io::Result<MemorySink> {
        let mut segments = self.segments.borrow_mut();
        if index != segments.len() as u64 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("expected segment {}, got {}", segments.len(), index),
            ));
        }
        segments.push(Vec::new());

        Ok(MemorySink {
            store: Rc::clone(&self.segments),
            slot: index as usize,
        })
    }
}

/// Sink handed out by [`MemorySinkFactory`].
#[derive(Debug)]
pub struct MemorySink {
    store: Rc<RefCell<Vec<Vec<u8>>>>,
    slot: usize,
}

impl SegmentSink for MemorySink {
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.store.borrow_mut()[self.slot].extend_from_slice(buf);
        Ok(())
    }

    fn finish(self) -> io::Result<u64> {
        Ok(self.store.borrow()[self.slot].len() as u64)
    }
}
