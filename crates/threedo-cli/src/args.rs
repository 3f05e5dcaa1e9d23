//! Command-line argument definitions for the threedo CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the document and root definition, the
//! track-hash mode, conversion overrides and logging verbosity.

use clap::Parser;

/// Command-line arguments for the threedo converter
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input .3d file
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Name of the root definition
    #[arg(help = "Definition to convert")]
    pub root: String,

    /// Path to the JSON manifest to write
    pub output: Option<String>,

    /// Name of the track-hash definition; converts the document as a track
    #[arg(long)]
    pub hash: Option<String>,

    /// Factor applied to coordinates and switch distances
    #[arg(long)]
    pub scale: Option<f64>,

    /// Let a later definition replace an earlier one with the same name
    #[arg(long)]
    pub allow_dup: bool,

    /// Do not print the flavor listing
    #[arg(short, long)]
    pub silent: bool,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
