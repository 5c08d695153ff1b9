//! Clap derive structures for the `parkpro` CLI.
//!
//! Defines the command tree, global flags, and the small value enums the
//! commands accept. Kept free of workspace crates so build.rs can include it.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// parkpro -- parking-lot operator dashboard
#[derive(Debug, Parser)]
#[command(
    name = "parkpro",
    version,
    about = "Run a parking lot from the command line",
    long_about = "Run a parking lot from the command line: register vehicles,\n\
        time them out, and review billed history against a ParkPro\n\
        transaction store.\n\n\
        Parking is billed at ₱20 per started hour.",
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
    /// Store profile to use
    #[arg(long, short = 'p', env = "PARKPRO_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Transaction store base URL (overrides profile)
    #[arg(long, short = 'u', env = "PARKPRO_STORE_URL", global = true)]
    pub store_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "PARKPRO_OUTPUT",
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
    #[arg(long, short = 'k', env = "PARKPRO_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (default: none, or the profile's)
    #[arg(long, env = "PARKPRO_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
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

#[derive(Debug, Clone, Copy, ValueEnum)]
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
    /// Show the 25-slot grid and which slots are taken
    Slots,

    /// Register a vehicle entering the lot
    #[command(alias = "reg", alias = "r")]
    Register(RegisterArgs),

    /// Browse active and completed sessions, time vehicles out
    #[command(alias = "s")]
    Sessions(SessionsArgs),

    /// Completed-session ledger, reports and receipts
    #[command(alias = "h")]
    History(HistoryArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  REGISTER
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Any field left out is prompted for when stdin is a terminal.
#[derive(Debug, Args)]
pub struct RegisterArgs {
    /// Owner's full name
    #[arg(long)]
    pub owner: Option<String>,

    /// Vehicle make or model
    #[arg(long)]
    pub vehicle: Option<String>,

    /// Vehicle type (motorcycle, car, bike, e-bike, truck)
    #[arg(long = "type")]
    pub vehicle_type: Option<String>,

    /// Plate number, three letters then three digits (ABC123)
    #[arg(long)]
    pub plate: Option<String>,

    /// Entry time, YYYY-MM-DDTHH:MM (default: now)
    #[arg(long)]
    pub entry: Option<String>,

    /// Slot code A1..E5
    #[arg(long)]
    pub slot: Option<String>,

    /// Never prompt; missing fields fail validation
    #[arg(long)]
    pub no_input: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SESSIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SessionsArgs {
    #[command(subcommand)]
    pub command: SessionsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SessionsCommand {
    /// List sessions with live duration and charge
    #[command(alias = "ls")]
    List {
        /// Which sessions to show
        #[arg(long, short = 'f', value_enum, default_value = "all")]
        filter: FilterArg,

        /// Case-insensitive match on owner, vehicle, plate or slot
        #[arg(long, short = 's')]
        search: Option<String>,
    },

    /// Totals, occupancy and vehicle-type distribution
    Stats,

    /// Record a vehicle's exit
    #[command(alias = "out")]
    Timeout {
        /// Session ID
        id: String,

        /// Exit time, YYYY-MM-DDTHH:MM (default: now)
        #[arg(long)]
        exit: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FilterArg {
    All,
    Parked,
    Completed,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  HISTORY
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct HistoryArgs {
    #[command(subcommand)]
    pub command: HistoryCommand,
}

/// Search and sort flags shared by every history view.
#[derive(Debug, Args)]
pub struct LedgerArgs {
    /// Case-insensitive match on owner, vehicle, plate or slot
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Sort column
    #[arg(long, value_enum, default_value = "exit-time")]
    pub sort: SortArg,

    /// Ascending order (default: newest first)
    #[arg(long)]
    pub asc: bool,
}

#[derive(Debug, Subcommand)]
pub enum HistoryCommand {
    /// List history rows
    #[command(alias = "ls")]
    List(LedgerArgs),

    /// Session count, revenue and average duration over the full history
    Summary,

    /// Delete a session from the store
    #[command(alias = "rm")]
    Delete {
        /// Session ID
        id: String,
    },

    /// Write the ledger as a printable report
    Export {
        #[command(flatten)]
        ledger: LedgerArgs,

        #[arg(long, value_enum, default_value = "text")]
        format: DocumentFormat,

        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print a receipt for one session
    Receipt {
        /// Session ID
        id: String,

        #[arg(long, value_enum, default_value = "text")]
        format: DocumentFormat,

        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortArg {
    ExitTime,
    EntryTime,
    Owner,
    Vehicle,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DocumentFormat {
    Text,
    Html,
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

    /// Display current resolved configuration
    Show,

    /// Set a configuration value
    Set {
        /// Config key (dot-separated path, e.g., "profiles.lot-b.base_url")
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

    /// Print the config file location
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
