//! mkvsplit-core: streaming boundary detection for concatenated Matroska fragments
//!
//! Media retrieval APIs such as Kinesis Video Streams `GetMedia` return a
//! single byte stream made of back-to-back MKV fragments with no delimiter in
//! between. This crate cuts such a stream into one segment per fragment using
//! nothing but the EBML header ID (`1A 45 DF A3`) as a boundary heuristic.
//!
//! # Modules
//!
//! - `reader` - Fixed-size chunk reader over any [`std::io::Read`]
//! - `scanner` - Marker detection with a 3-byte carry buffer for matches that
//!   straddle chunk boundaries
//! - `segmenter` - Segment lifecycle: discards leading bytes, opens one sink
//!   per marker, reports the final size of every segment
//! - `sink` - Sink and sink factory traits plus in-memory implementations
//!
//! The container is never parsed. Four bytes equal to the magic inside frame
//! payload are treated as a boundary like any other.
//!
//! # Example
//!
//! ```
//! use std::io::Cursor;
//! use mkvsplit_core::{process, ChunkedReader, MemorySinkFactory, EBML_MAGIC};
//!
//! let mut stream = b"noise".to_vec();
//! stream.extend_from_slice(&EBML_MAGIC);
//! stream.extend_from_slice(b"first");
//! stream.extend_from_slice(&EBML_MAGIC);
//! stream.extend_from_slice(b"second");
//!
//! let mut reader = ChunkedReader::new(Cursor::new(stream));
//! let mut factory = MemorySinkFactory::new();
//! let results = process(&mut reader, &mut factory).unwrap();
//!
//! assert_eq!(results.len(), 2);
//! assert_eq!(results[0].byte_count, 9);
//! assert_eq!(results[1].byte_count, 10);
//! ```

pub mod error;
pub mod reader;
pub mod scanner;
pub mod segmenter;
pub mod sink;

pub use error::{Error, Result};
pub use reader::{ChunkedReader, DEFAULT_CHUNK_SIZE};
pub use scanner::{marker_offsets, MarkerScanner, ScanEvent, EBML_MAGIC, MARKER_LEN};
pub use segmenter::{process, process_with, SegmentResult, Segmenter};
pub use sink::{CountingSink, MemorySink, MemorySinkFactory, SegmentSink, SinkFactory};
