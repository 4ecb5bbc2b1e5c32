//! CLI module
//!
//! Command-line interface for working with feed definitions.
//!
//! # Commands
//!
//! - `validate` - Parse and validate a feed definition
//! - `read` - Walk a feed to exhaustion and print its items

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
