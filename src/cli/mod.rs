//! CLI layer for roomscribe.
//!
//! Provides the command-line interface using clap, with commands for
//! running the summary pipeline over an event stream and inspecting the
//! effective configuration.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::{OutputFormat, StdoutSink, WriterSink};
pub use parser::{Cli, Commands, RunArgs, SettingsArgs};
