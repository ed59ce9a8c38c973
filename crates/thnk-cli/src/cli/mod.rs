//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "thnk",
    bin_name = "thnk",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Make, but the recipes are prompts",
    long_about = "Thnk brings generated files up to date from a Thnkfile. \
                  Each rule names a target, the files it needs, and a prompt; \
                  only targets older than their inputs are regenerated.",
    after_help = "EXAMPLES:\n\
        \x20 thnk build\n\
        \x20 thnk build summary.json --force\n\
        \x20 thnk build greeting --data name=Jacob --model gpt-4o\n\
        \x20 thnk plan\n\
        \x20 thnk targets --format json",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Bring a target up to date.
    #[command(
        visible_alias = "b",
        about = "Generate out-of-date targets",
        after_help = "EXAMPLES:\n\
            \x20 thnk build                 # first rule in the Thnkfile\n\
            \x20 thnk build docs/api.md\n\
            \x20 thnk build --force --temperature 0.7"
    )]
    Build(BuildArgs),

    /// Show what `build` would do.
    #[command(
        visible_alias = "p",
        about = "Show the build plan without generating",
        after_help = "EXAMPLES:\n\
            \x20 thnk plan\n\
            \x20 thnk plan summary.json --force"
    )]
    Plan(PlanArgs),

    /// List declared targets.
    #[command(
        visible_alias = "ls",
        about = "List targets in the Thnkfile",
        after_help = "EXAMPLES:\n\
            \x20 thnk targets\n\
            \x20 thnk targets --format json"
    )]
    Targets(TargetsArgs),

    /// Initialise a Thnk configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 thnk init           # global config\n\
            \x20 thnk init --local   # ./thnk.toml"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 thnk completions bash > ~/.local/share/bash-completion/completions/thnk\n\
            \x20 thnk completions zsh  > ~/.zfunc/_thnk\n\
            \x20 thnk completions fish > ~/.config/fish/completions/thnk.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the Thnk configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 thnk config get backend.model\n\
            \x20 thnk config list\n\
            \x20 thnk config path"
    )]
    Config(ConfigCommands),
}

// ── build ─────────────────────────────────────────────────────────────────────

/// Arguments for `thnk build`.
#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Target to build; defaults to the first rule.
    #[arg(value_name = "TARGET", help = "Target to build")]
    pub target: Option<String>,

    /// Regenerate every reachable target regardless of timestamps.
    #[arg(long = "force", help = "Rebuild even up-to-date targets")]
    pub force: bool,

    /// Model for every generation in this run.
    #[arg(short = 'm', long = "model", value_name = "MODEL", help = "Override the model")]
    pub model: Option<String>,

    /// Sampling temperature for this run.
    #[arg(
        short = 't',
        long = "temperature",
        value_name = "FLOAT",
        help = "Override the sampling temperature"
    )]
    pub temperature: Option<f32>,

    /// Template data, highest precedence.
    #[arg(
        short = 'd',
        long = "data",
        value_name = "KEY=VALUE",
        value_parser = parse_key_value,
        help = "Template data (repeatable)"
    )]
    pub data: Vec<(String, String)>,

    /// Generation backend for this run.
    #[arg(long = "backend", value_enum, help = "Override the configured backend")]
    pub backend: Option<BackendKind>,
}

// ── plan ──────────────────────────────────────────────────────────────────────

/// Arguments for `thnk plan`.
#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Target to plan; defaults to the first rule.
    #[arg(value_name = "TARGET", help = "Target to plan")]
    pub target: Option<String>,

    /// Plan as if every target were stale.
    #[arg(long = "force", help = "Ignore timestamps")]
    pub force: bool,
}

// ── targets ───────────────────────────────────────────────────────────────────

/// Arguments for `thnk targets`.
#[derive(Debug, Args)]
pub struct TargetsArgs {
    /// Output format.
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,
}

/// Output format for the `targets` command.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table.
    Table,
    /// One name per line.
    List,
    /// JSON array.
    Json,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `thnk init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Write to `thnk.toml` in the current directory.
    #[arg(
        long = "local",
        help = "Create local configuration in current directory"
    )]
    pub local: bool,

    /// Overwrite an existing config file.
    #[arg(long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `thnk completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `thnk config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `backend.model`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the global configuration file.
    Path,
}

// ── value enums ───────────────────────────────────────────────────────────────

/// Generation backends selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum BackendKind {
    Openai,
    /// Offline: text targets receive their prompt, JSON targets a blank
    /// value shaped like the schema.
    Echo,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────
