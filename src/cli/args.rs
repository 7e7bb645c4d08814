//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::Parser;
use std::path::PathBuf;

use crate::report::OutputFormat;

/// Libcheck - Reference and architecture audit for a directory of managed modules.
#[derive(Debug, Parser)]
#[command(name = "libcheck")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Example: libcheck /opt/app/lib Foo.* Bar.Service")]
pub struct Cli {
    /// Directory searched recursively for modules
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,

    /// Wildcard patterns (`*`, `?`) selecting the modules to inspect
    #[arg(value_name = "PATTERN", required = true, num_args = 1..)]
    pub patterns: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Hide files that could not be cataloged
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Path to a YAML config file
    #[arg(short, long, env = "LIBCHECK_CONFIG")]
    pub config: Option<PathBuf>,
}
