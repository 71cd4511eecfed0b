use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use mkvsplit_core::DEFAULT_CHUNK_SIZE;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub split: SplitConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SplitConfig {
    /// Prefix for output files; `_<index>.<extension>` is appended
    #[serde(default = "default_output_prefix")]
    pub output_prefix: PathBuf,

    /// Bytes read from the input per chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Extension of output files, without the leading dot
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_output_prefix() -> PathBuf {
    PathBuf::from("./output/split_output")
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_extension() -> String {
    "mkv".to_string()
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            output_prefix: default_output_prefix(),
            chunk_size: default_chunk_size(),
            extension: default_extension(),
        }
    }
}
