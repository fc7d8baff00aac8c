//! Clap derive structures for the `acisync` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::kind::KindName;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// acisync -- declarative state for Cisco APIC objects
#[derive(Debug, Parser)]
#[command(
    name = "acisync",
    version,
    about = "Reconcile declared APIC objects against a controller",
    long_about = "Keeps firmware groups, imported contracts and attachable entity\n\
        profiles on a Cisco APIC in line with a YAML manifest, tracking what\n\
        it manages in a local state file.",
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
    /// Controller profile to use
    #[arg(long, short = 'p', env = "ACISYNC_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Controller URL (overrides profile)
    #[arg(long, short = 'c', env = "ACISYNC_CONTROLLER", global = true)]
    pub controller: Option<String>,

    /// APIC session token (overrides profile)
    #[arg(long, env = "ACISYNC_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// State file (defaults to the configured state_file)
    #[arg(long, env = "ACISYNC_STATE", global = true)]
    pub state: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "ACISYNC_OUTPUT",
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

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "ACISYNC_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "ACISYNC_TIMEOUT", global = true)]
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
    /// Create, update or replace every resource in a manifest
    Apply(ApplyArgs),

    /// Re-read every tracked resource from the controller
    Refresh,

    /// Delete tracked resources from the controller
    #[command(alias = "rm")]
    Destroy(DestroyArgs),

    /// Start tracking an existing object by DN
    Import(ImportArgs),

    /// Fetch an object by name without tracking it
    #[command(alias = "get")]
    Lookup(LookupArgs),

    /// Show tracked resources
    #[command(alias = "ls")]
    Show(ShowArgs),

    /// Manage configuration profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  RESOURCES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Manifest file (YAML)
    #[arg(long, short = 'f')]
    pub file: PathBuf,

    /// Also destroy tracked resources missing from the manifest
    #[arg(long)]
    pub prune: bool,
}

#[derive(Debug, Args)]
pub struct DestroyArgs {
    /// Resource addresses to destroy (e.g. imported_contract.web)
    #[arg(required_unless_present = "all")]
    pub addresses: Vec<String>,

    /// Destroy every tracked resource
    #[arg(long, conflicts_with = "addresses")]
    pub all: bool,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Resource kind
    pub kind: KindName,

    /// Distinguished name of the existing object
    pub dn: String,

    /// State address (defaults to <kind>.<name>)
    #[arg(long)]
    pub address: Option<String>,
}

#[derive(Debug, Args)]
pub struct LookupArgs {
    /// Resource kind
    pub kind: KindName,

    /// Object name
    pub name: String,

    /// Parent DN, for kinds that live under a tenant
    #[arg(long)]
    pub parent: Option<String>,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Show a single resource in detail
    pub address: Option<String>,
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
    /// Print the config file path
    Path,

    /// Create initial config file with guided setup
    Init,

    /// Display current configuration (tokens redacted)
    Show,

    /// Set a profile value
    Set {
        /// Profile key (controller, token_env, ca_cert, insecure, timeout)
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

    /// Store a session token in the system keyring
    SetToken {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
