//! CLI module - Command-line interface for the application.
//!
//! Provides commands for:
//! - `check` - Verify store connectivity and service construction

pub mod args;

pub use args::{CheckArgs, Cli, Commands};
