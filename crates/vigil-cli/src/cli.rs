//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Vigil CLI - Check and track domain trust verdicts.
#[derive(Debug, Parser)]
#[command(name = "vigil")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "VIGIL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log filter (e.g. "info", "vigil_sync=debug"); overrides RUST_LOG
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Use a session-scoped in-memory store instead of the database
    #[arg(long, global = true)]
    pub memory: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Human-readable output (default)
    Table,
    /// JSON output
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the verdict for a site, classifying it if it is not cached
    Check(TargetArgs),

    /// Show the cached verdict for a site without classifying it
    Lookup(TargetArgs),

    /// Drive badges from navigation events read on stdin
    Watch(WatchArgs),

    /// Drop cached verdicts so the next check reclassifies
    Evict(EvictArgs),

    /// Drop every cached verdict
    Clear,

    /// Purge expired verdicts
    Sweep(SweepArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments naming one site.
#[derive(Debug, Parser)]
pub struct TargetArgs {
    /// Page URL or bare domain (e.g. https://example.com/x or example.com)
    pub target: String,
}

/// Arguments for the watch command.
#[derive(Debug, Parser)]
pub struct WatchArgs {
    /// Do not open the popup when a page is unsafe
    #[arg(long)]
    pub no_popup: bool,
}

/// Arguments for the evict command.
#[derive(Debug, Parser)]
pub struct EvictArgs {
    /// Domains to evict
    #[arg(required = true)]
    pub domains: Vec<String>,
}

/// Arguments for the sweep command.
#[derive(Debug, Parser)]
pub struct SweepArgs {
    /// Keep sweeping on the configured interval until Ctrl+C
    #[arg(long)]
    pub daemon: bool,
}

/// Arguments for configuration management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}
