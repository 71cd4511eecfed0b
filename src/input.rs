//! Input source selection.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Open the input stream: a file, or stdin when no path (or `-`) is given.
pub fn open_input(path: Option<&Path>) -> Result<Box<dyn Read>> {
    match path {
        Some(p) if p != Path::new("-") => {
            if !p.exists() {
                anyhow::bail!("Input file does not exist: {:?}", p);
            }
            let file =
                File::open(p).with_context(|| format!("Failed to open input file: {:?}", p))?;
            tracing::debug!("Reading from {:?}", p);
            Ok(Box::new(file))
        }
        _ => {
            tracing::info!("Reading from stdin...");
            Ok(Box::new(io::stdin().lock()))
        }
    }
}

/// Human-readable name of the input for log and error messages.
pub fn describe_input(path: Option<&Path>) -> String {
    match path {
        Some(p) if p != Path::new("-") => p.display().to_string(),
        _ => "<stdin>".to_string(),
    }
}
