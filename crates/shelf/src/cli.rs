//! Clap derive structures for the `shelf` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// shelf -- fetch and inspect product catalogs
#[derive(Debug, Parser)]
#[command(
    name = "shelf",
    version,
    about = "Fetch and inspect product catalogs from the command line",
    long_about = "Fetches a product catalog from an HTTP endpoint (or a built-in\n\
        simulated catalog) and renders it. Failed fetches are classified as\n\
        network, timeout, server or malformed-response errors and can be retried.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
#[allow(clippy::struct_excessive_bools)]
pub struct GlobalOpts {
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "SHELF_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Catalog endpoint URL (overrides profile)
    #[arg(long, short = 'e', env = "SHELF_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// Serve the built-in sample catalog instead of calling the endpoint
    #[arg(long, global = true)]
    pub simulate: bool,

    /// Simulate an unreachable server (implies --simulate)
    #[arg(long, global = true)]
    pub simulate_failure: bool,

    /// Artificial latency of the simulated catalog, in milliseconds
    #[arg(long, default_value = "1000", global = true, hide = true)]
    pub simulate_delay_ms: u64,

    /// Fetch deadline in milliseconds
    #[arg(
        long,
        env = "SHELF_TIMEOUT_MS",
        global = true,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_ms: Option<u64>,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "SHELF_INSECURE", global = true)]
    pub insecure: bool,

    /// Output format
    #[arg(long, short = 'o', env = "SHELF_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one item id per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the catalog once and print it
    #[command(alias = "ls")]
    List(ListArgs),

    /// Print every fetch state transition as it happens
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── list ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Retry a failed fetch up to N times before giving up
    #[arg(long, short = 'r', default_value = "0")]
    pub retries: u32,

    /// Never offer the interactive "Try again?" prompt
    #[arg(long)]
    pub no_prompt: bool,
}

// ── watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// After a failure, retry automatically after this many seconds
    #[arg(long, value_name = "SECS")]
    pub retry_every: Option<u64>,

    /// Stop after this many attempts
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_attempts: u32,
}

// ── config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Show the effective configuration
    Show,

    /// Create a starter config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

// ── completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
