//! Clap derive structures for the `fabzone` CLI.
//!
//! Defines the command tree, global flags, and shared value enums. Only
//! depends on clap and clap_complete so build.rs can include it.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// fabzone -- batch Fibre Channel zoning for Brocade FOS switches
#[derive(Debug, Parser)]
#[command(
    name = "fabzone",
    version,
    about = "Apply and inspect Fibre Channel zoning over the FOS REST API",
    long_about = "Applies batches of zoning changes (aliases, zones, zone configurations)\n\
        to a Brocade FOS switch through its REST API, one transaction per batch.\n\n\
        Batches can be dry-run against a captured model (--test) or pushed as a\n\
        single full replace of the zone database (--bulk).",
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
    /// Switch profile to use
    #[arg(long, short = 'p', env = "FABZONE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Switch address, host or host:port (overrides profile)
    #[arg(long, short = 'a', env = "FABZONE_ADDRESS", global = true)]
    pub address: Option<String>,

    /// Login name (overrides profile)
    #[arg(long, short = 'u', env = "FABZONE_USER", global = true)]
    pub user: Option<String>,

    /// Transport security (overrides profile)
    #[arg(long, env = "FABZONE_SECURITY", global = true)]
    pub security: Option<SecurityArg>,

    /// Virtual fabric ID (overrides profile and batch file)
    #[arg(long, env = "FABZONE_FID", global = true)]
    pub fid: Option<u16>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "FABZONE_OUTPUT",
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

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "FABZONE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Value Enums ──────────────────────────────────────────────────────

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

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SecurityArg {
    /// Plain HTTP
    None,
    /// HTTPS verified against trusted roots
    Ca,
    /// HTTPS accepting the switch's self-signed certificate
    #[value(name = "self")]
    SelfSigned,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Apply a batch file of zoning changes
    Apply(ApplyArgs),

    /// Show the zoning database of a fabric
    #[command(alias = "get")]
    Show(ShowArgs),

    /// Manage configuration profiles
    #[command(alias = "cfg")]
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Apply ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Batch file (JSON or YAML); `-` reads JSON from stdin
    pub file: PathBuf,

    /// Validate against the captured model only; nothing is sent
    #[arg(long)]
    pub test: bool,

    /// Collect changes in the model and push them as one full replace
    #[arg(long)]
    pub bulk: bool,

    /// Allow changes to the effective configuration and skip no-op errors
    #[arg(long, overrides_with = "no_force")]
    pub force: bool,

    /// Refuse changes to the effective configuration
    #[arg(long, overrides_with = "force")]
    pub no_force: bool,
}

impl ApplyArgs {
    /// `Some` when a force flag was given on the command line.
    pub fn force_override(&self) -> Option<bool> {
        if self.no_force {
            Some(false)
        } else if self.force {
            Some(true)
        } else {
            None
        }
    }
}

// ── Show ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ShowArgs {
    #[command(subcommand)]
    pub command: ShowCommand,
}

#[derive(Debug, Subcommand)]
pub enum ShowCommand {
    /// List aliases and the zones using them
    #[command(alias = "ali")]
    Aliases,

    /// List zones
    Zones,

    /// List zone configurations
    #[command(alias = "cfgs")]
    Configs,

    /// Show the effective configuration and default zone access
    Effective,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration (passwords masked)
    Show,

    /// Set a value on the active profile
    Set {
        /// Profile key: address, username, security, fid, timeout, ca_cert
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a switch password in the system keyring
    SetPassword {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
