//! Vigil CLI library.
//!
//! This library provides the core functionality for the Vigil command-line interface,
//! including configuration management, component wiring, command execution, and output
//! formatting.

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;

pub use app::App;
pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
