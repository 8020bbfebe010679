//! Command-line interface for media-resolver.
//!
//! This module provides CLI commands for resolving and searching media
//! entities against a catalog file.

mod commands;

pub use commands::{Cli, Commands, QueryArgs, run_command};
