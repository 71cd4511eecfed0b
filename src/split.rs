//! Split and scan commands, wired to concrete inputs and outputs.

use anyhow::{Context, Result};
use serde::Serialize;
use std::io;
use std::path::PathBuf;

use mkvsplit_core::{marker_offsets, process_with, ChunkedReader, CountingSink, SegmentResult};

use crate::config::SplitConfig;
use crate::input::{describe_input, open_input};
use crate::output::{FileSinkFactory, OutputNaming};
use crate::summary::format_file_size;

/// Options for a single split run.
#[derive(Debug, Clone)]
pub struct SplitOptions {
    /// Input file; stdin when `None`.
    pub input: Option<PathBuf>,
    pub output_prefix: PathBuf,
    pub extension: String,
    pub chunk_size: usize,
    /// Count segments without creating any files.
    pub dry_run: bool,
}

impl SplitOptions {
    pub fn from_config(config: &SplitConfig, input: Option<PathBuf>) -> Self {
        Self {
            input,
            output_prefix: config.output_prefix.clone(),
            extension: config.extension.clone(),
            chunk_size: config.chunk_size,
            dry_run: false,
        }
    }

    pub fn naming(&self) -> OutputNaming {
        OutputNaming::new(&self.output_prefix, &self.extension)
    }
}

/// One segment written (or, in a dry run, that would have been written).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedSegment {
    #[serde(flatten)]
    pub result: SegmentResult,
    pub path: PathBuf,
}

impl CreatedSegment {
    fn new(result: SegmentResult, naming: &OutputNaming) -> Self {
        Self {
            path: naming.path_for(result.index),
            result,
        }
    }

    pub fn byte_count(&self) -> u64 {
        self.result.byte_count
    }
}

/// Split the configured input into segment files.
///
/// Finding no EBML header is not an error: the result is simply empty.
pub fn run_split(options: &SplitOptions) -> Result<Vec<CreatedSegment>> {
    let source_name = describe_input(options.input.as_deref());
    let source = open_input(options.input.as_deref())?;
    let mut reader = ChunkedReader::with_chunk_size(source, options.chunk_size)?;

    let naming = options.naming();
    let mut created = Vec::new();
    let mut on_segment = |result: SegmentResult| {
        let segment = CreatedSegment::new(result, &naming);
        if options.dry_run {
            tracing::info!(
                "Would create: {} ({})",
                segment.path.display(),
                format_file_size(segment.byte_count())
            );
        } else {
            tracing::info!(
                "Created: {} ({})",
                segment.path.display(),
                format_file_size(segment.byte_count())
            );
        }
        created.push(segment);
    };

    let outcome = if options.dry_run {
        let mut factory = |_: u64| Ok::<_, io::Error>(CountingSink::new());
        process_with(&mut reader, &mut factory, &mut on_segment)
    } else {
        let mut factory = FileSinkFactory::create(naming.clone()).with_context(|| {
            format!(
                "Failed to create output directory: {:?}",
                naming.output_dir()
            )
        })?;
        process_with(&mut reader, &mut factory, &mut on_segment)
    };

    let count = outcome.map_err(|e| {
        let target = e.segment_index().map(|index| naming.path_for(index));
        let err = anyhow::Error::new(e);
        match target {
            Some(path) => err.context(format!("Failed to write segment file {:?}", path)),
            None => err.context(format!("Failed to read {}", source_name)),
        }
    })?;

    if count == 0 {
        tracing::error!("No MKV headers found.");
    }
    tracing::debug!(
        "Processed {} bytes from {}",
        reader.bytes_read(),
        source_name
    );

    Ok(created)
}

/// A marker found by [`run_scan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarkerHit {
    pub index: u64,
    pub offset: u64,
}

/// Report the offset of every EBML header without writing anything.
pub fn run_scan(input: Option<&std::path::Path>, chunk_size: usize) -> Result<Vec<MarkerHit>> {
    let source = open_input(input)?;
    let mut reader = ChunkedReader::with_chunk_size(source, chunk_size)?;
    let offsets = marker_offsets(&mut reader)
        .with_context(|| format!("Failed to read {}", describe_input(input)))?;

    Ok(offsets
        .into_iter()
        .enumerate()
        .map(|(index, offset)| MarkerHit {
            index: index as u64,
            offset,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mkvsplit_core::EBML_MAGIC;
    use std::fs;
    use tempfile::tempdir;

    fn sample_stream() -> Vec<u8> {
        let mut data = vec![0x11; 7];
        data.extend_from_slice(&EBML_MAGIC);
        data.extend_from_slice(&[0x22; 10]);
        data.extend_from_slice(&EBML_MAGIC);
        data.extend_from_slice(&[0x33; 5]);
        data
    }

    fn options(input: PathBuf, prefix: PathBuf) -> SplitOptions {
        SplitOptions {
            input: Some(input),
            output_prefix: prefix,
            extension: "mkv".to_string(),
            chunk_size: 3,
            dry_run: false,
        }
    }

    #[test]
    fn test_split_writes_segment_files() {
        let temp = tempdir().unwrap();
        let input = temp.path().join("stream.bin");
        fs::write(&input, sample_stream()).unwrap();

        let prefix = temp.path().join("out/part");
        let created = run_split(&options(input, prefix.clone())).unwrap();

        assert_eq!(created.len(), 2);
        assert_eq!(created[0].path, temp.path().join("out/part_0.mkv"));
        assert_eq!(created[0].byte_count(), 14);
        assert_eq!(created[1].byte_count(), 9);

        let second = fs::read(temp.path().join("out/part_1.mkv")).unwrap();
        assert_eq!(&second[..4], &EBML_MAGIC);
        assert_eq!(&second[4..], &[0x33; 5]);
    }

    #[test]
    fn test_dry_run_creates_nothing() {
        let temp = tempdir().unwrap();
        let input = temp.path().join("stream.bin");
        fs::write(&input, sample_stream()).unwrap();

        let mut opts = options(input, temp.path().join("out/part"));
        opts.dry_run = true;
        let created = run_split(&opts).unwrap();

        assert_eq!(created.len(), 2);
        assert!(!temp.path().join("out").exists());
    }

    #[test]
    fn test_no_headers_is_empty_success() {
        let temp = tempdir().unwrap();
        let input = temp.path().join("noise.bin");
        fs::write(&input, vec![0u8; 256]).unwrap();

        let created = run_split(&options(input, temp.path().join("part"))).unwrap();
        assert!(created.is_empty());
    }

    #[test]
    fn test_scan_reports_offsets() {
        let temp = tempdir().unwrap();
        let input = temp.path().join("stream.bin");
        fs::write(&input, sample_stream()).unwrap();

        let hits = run_scan(Some(&input), 2).unwrap();
        assert_eq!(
            hits,
            vec![
                MarkerHit {
                    index: 0,
                    offset: 7
                },
                MarkerHit {
                    index: 1,
                    offset: 21
                }
            ]
        );
    }

    #[test]
    fn test_created_segment_json_is_flat() {
        let segment = CreatedSegment::new(
            SegmentResult {
                index: 2,
                byte_count: 40,
            },
            &OutputNaming::new("out/part", "mkv"),
        );
        let value = serde_json::to_value(&segment).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "index": 2,
                "byte_count": 40,
                "path": "out/part_2.mkv",
            })
        );
    }

    #[test]
    fn test_zero_chunk_size_fails() {
        let temp = tempdir().unwrap();
        let input = temp.path().join("stream.bin");
        fs::write(&input, sample_stream()).unwrap();

        let mut opts = options(input, temp.path().join("part"));
        opts.chunk_size = 0;
        assert!(run_split(&opts).is_err());
    }
}
