//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shopwright: run the Swag Labs storefront scenario suite
#[derive(Parser, Debug)]
#[command(name = "shopwright")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List scenarios
    List(ListArgs),

    /// Run scenarios
    Run(RunArgs),

    /// Show the resolved configuration
    Config(ConfigArgs),

    /// Kill lingering CDP browser processes
    Cleanup,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Filter by name fragment or tag
    #[arg(short, long)]
    pub filter: Option<String>,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Filter by name fragment or tag
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Session driver
    #[arg(short, long, default_value = "chromium")]
    pub driver: DriverArg,

    /// Concurrent scenarios (overrides WORKERS)
    #[arg(short = 'j', long)]
    pub workers: Option<usize>,

    /// Extra attempts per failing scenario (overrides RETRIES)
    #[arg(long)]
    pub retries: Option<u32>,

    /// Storefront base URL (overrides BASE_URL)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Run the browser without a window (overrides HEADLESS)
    #[arg(long, value_name = "BOOL", action = clap::ArgAction::Set)]
    pub headless: Option<bool>,

    /// Report format
    #[arg(short, long, default_value = "text")]
    pub report: ReportFormat,

    /// Directory for the report file and failure screenshots
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

/// Session driver choice
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverArg {
    /// In-memory storefront double
    Mock,
    /// Chromium over CDP
    Chromium,
}

/// Report format
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON
    Json,
}

impl ReportFormat {
    /// File extension for saved reports
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Json => "json",
        }
    }
}

/// Color argument
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorArg {
    /// Use colors when output is a terminal
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}
