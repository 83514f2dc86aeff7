// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! CLI module for the `fallwatch` binary.
//!
//! This module contains argument parsing, terminal output helpers and the `frames` and
//! `text` command implementations.

// Modules
/// CLI arguments.
pub mod args;

/// Terminal output and tracing setup.
pub mod logging;

/// Frame replay and text classification commands.
pub mod replay;
