//! mkvsplit - Split concatenated Matroska fragments into separate files
//!
//! The splitting engine lives in `mkvsplit-core`; this crate wires it to
//! files, stdin, configuration and the summary output. It is exposed as a
//! library for integration testing.

pub mod config;
pub mod input;
pub mod output;
pub mod split;
pub mod summary;
