//! Clap derive structures for the `solity` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::str::FromStr;

use clap::{Args, Parser, Subcommand, ValueEnum};
use solity_api::DeviceCommand;
use strum::IntoEnumIterator;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// solity -- control Solity LAVO smart locks from the command line
#[derive(Debug, Parser)]
#[command(
    name = "solity",
    version,
    about = "Control Solity LAVO smart locks from the command line",
    long_about = "Lock, unlock and monitor Solity LAVO smart locks through the\n\
        vendor cloud API. Credentials come from a config profile, flags,\n\
        environment variables or the system keyring.",
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
pub struct GlobalOpts {
    /// Config profile to use
    #[arg(long, short = 'p', env = "SOLITY_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Account e-mail (overrides profile)
    #[arg(long, short = 'u', env = "SOLITY_USERNAME", global = true)]
    pub username: Option<String>,

    /// Account password (prefer the keyring)
    #[arg(long, env = "SOLITY_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// API root URL (overrides profile)
    #[arg(long, env = "SOLITY_BASE_URL", global = true, hide = true)]
    pub base_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SOLITY_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds
    #[arg(long, env = "SOLITY_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
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
    /// List locks and send raw device commands
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Lock a device
    Lock(DeviceArg),

    /// Unlock a device
    Unlock(DeviceArg),

    /// Open a device (same as unlock)
    Open(DeviceArg),

    /// Show a device's activity log
    Logs {
        /// Device ID
        device: String,

        /// Page number (starts at 1)
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
    },

    /// Poll the account and print every state change
    Watch {
        /// Seconds between refreshes
        #[arg(long, short = 'i')]
        interval: Option<u64>,
    },

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct DeviceArg {
    /// Device ID
    pub device: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List locks on the account
    #[command(alias = "ls")]
    List,

    /// Ask a lock for its status
    Status {
        /// Device ID
        device: String,
    },

    /// Send a raw command code to a lock
    Command {
        /// Device ID
        device: String,

        /// Command code (get_status, open, close, connect_gateway,
        /// get_fingerprint, get_pwdinfo)
        #[arg(value_parser = parse_device_command)]
        command: DeviceCommand,
    },
}

fn parse_device_command(raw: &str) -> Result<DeviceCommand, String> {
    DeviceCommand::from_str(raw).map_err(|_| {
        let valid: Vec<&'static str> = DeviceCommand::iter().map(Into::into).collect();
        format!("unknown command '{raw}', expected one of: {}", valid.join(", "))
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration (secrets masked)
    Show,

    /// Store the active profile's password in the system keyring
    SetPassword,

    /// Print the config file path
    Path,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
