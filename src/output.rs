//! File-backed segment sinks.
//!
//! Segment `i` is written to `{prefix}_{i}.{extension}`, the naming used by
//! existing tooling around KVS `GetMedia` dumps.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use mkvsplit_core::{SegmentSink, SinkFactory};

/// Maps segment indices to output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNaming {
    prefix: PathBuf,
    extension: String,
}

impl OutputNaming {
    pub fn new(prefix: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            extension: extension.into(),
        }
    }

    /// Path of segment `index`.
    pub fn path_for(&self, index: u64) -> PathBuf {
        let mut name = OsString::from(self.prefix.as_os_str());
        name.push(format!("_{}.{}", index, self.extension));
        PathBuf::from(name)
    }

    /// Directory the segments land in (`.` for a bare prefix).
    pub fn output_dir(&self) -> &Path {
        match self.prefix.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

/// Opens one buffered file per segment.
#[derive(Debug)]
pub struct FileSinkFactory {
    naming: OutputNaming,
}

impl FileSinkFactory {
    /// Create the factory, making sure the output directory exists.
    pub fn create(naming: OutputNaming) -> io::Result<Self> {
        let dir = naming.output_dir();
        fs::create_dir_all(dir)?;
        tracing::debug!("Writing segments to {:?}", dir);
        Ok(Self { naming })
    }
}

impl SinkFactory for FileSinkFactory {
    type Sink = FileSink;

    fn open(&mut self, index: u64) -> io::Result<FileSink> {
        let path = self.naming.path_for(index);
        let file = File::create(&path)?;
        tracing::trace!("Opened {:?}", path);

        Ok(FileSink {
            writer: BufWriter::new(file),
        })
    }
}

/// Buffered writer for one segment file.
#[derive(Debug)]
pub struct FileSink {
    writer: BufWriter<File>,
}

impl SegmentSink for FileSink {
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        Write::write_all(&mut self.writer, buf)
    }

    /// Flushes the file and reports its size on disk.
    fn finish(self) -> io::Result<u64> {
        let file = self.writer.into_inner().map_err(|e| e.into_error())?;
        Ok(file.metadata()?.len())
    }
}
