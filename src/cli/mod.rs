//! CLI module
//!
//! Command-line interface for walking paginated sources.
//!
//! # Commands
//!
//! - `fetch` - Stream every record of a source as JSON lines
//! - `validate` - Check a source definition without touching the network

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::{write_items, Runner};
