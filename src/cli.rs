use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mkvsplit")]
#[command(
    author,
    version,
    about = "Splits concatenated MKV fragments (e.g., from KVS GetMedia) into separate files"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to input MKV stream. If omitted (or "-"), reads from stdin
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Prefix for output MKV files [default: ./output/split_output]
    #[arg(short, long)]
    pub output_prefix: Option<PathBuf>,

    /// Extension for output files [default: mkv]
    #[arg(long)]
    pub extension: Option<String>,

    /// Bytes read from the input at a time [default: 65536]
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Report segments without writing any files
    #[arg(long)]
    pub dry_run: bool,

    /// Only list EBML header offsets
    #[arg(long, conflicts_with = "dry_run")]
    pub scan: bool,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}
