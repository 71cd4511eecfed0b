//! Error types for mkvsplit-core.

use std::io;
use thiserror::Error;

/// Result type for mkvsplit-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for mkvsplit-core operations.
///
/// Every variant carries the phase it happened in so callers can decide on
/// cleanup without inspecting the underlying I/O error.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading from the byte source failed.
    #[error("Source read failed: {0}")]
    SourceRead(#[source] io::Error),

    /// The sink factory could not open the sink for a segment.
    #[error("Failed to open sink for segment {index}: {source}")]
    SinkOpen {
        index: u64,
        #[source]
        source: io::Error,
    },

    /// Writing to (or closing) an open segment sink failed.
    #[error("Failed to write segment {index}: {source}")]
    SinkWrite {
        index: u64,
        #[source]
        source: io::Error,
    },

    /// A chunk size of zero was requested.
    #[error("Invalid chunk size: {0} (must be greater than zero)")]
    InvalidChunkSize(usize),
}

impl Error {
    /// Index of the segment involved in a sink failure, if any.
    pub fn segment_index(&self) -> Option<u64> {
        match self {
            Self::SinkOpen { index, .. } | Self::SinkWrite { index, .. } => Some(*index),
            Self::SourceRead(_) | Self::InvalidChunkSize(_) => None,
        }
    }

    /// Whether the failure came from the input side.
    pub fn is_source_error(&self) -> bool {
        matches!(self, Self::SourceRead(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::SourceRead(io::Error::other("pipe closed"));
        assert_eq!(err.to_string(), "Source read failed: pipe closed");

        let err = Error::SinkOpen {
            index: 3,
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "Failed to open sink for segment 3: denied");

        let err = Error::InvalidChunkSize(0);
        assert_eq!(
            err.to_string(),
            "Invalid chunk size: 0 (must be greater than zero)"
        );
    }

    #[test]
    fn test_error_phase_helpers() {
        let err = Error::SinkWrite {
            index: 7,
            source: io::Error::other("disk full"),
        };
        assert_eq!(err.segment_index(), Some(7));
        assert!(!err.is_source_error());

        let err = Error::SourceRead(io::Error::other("eof"));
        assert_eq!(err.segment_index(), None);
        assert!(err.is_source_error());
    }
}
