//! Clap derive structures for the `topomap` CLI.

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand, ValueEnum};

use topomap_core::Layout;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// topomap -- discover network topologies from an inventory and lay them out
#[derive(Debug, Parser)]
#[command(
    name = "topomap",
    version,
    about = "Discover network topologies from an inventory service and lay them out",
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
    /// Inventory profile to use
    #[arg(long, short = 'p', env = "TOPOMAP_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "TOPOMAP_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Inventory service URL (overrides profile)
    #[arg(long, short = 'i', env = "TOPOMAP_INVENTORY", global = true)]
    pub inventory: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "TOPOMAP_OUTPUT",
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

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Inventory query timeout in seconds (overrides profile)
    #[arg(long, global = true)]
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
    /// Run one discovery cycle and summarize what was found
    #[command(alias = "d")]
    Discover(DiscoverArgs),

    /// Discover, then print a view of the topology
    #[command(alias = "v")]
    View(ViewArgs),

    /// Project latitude/longitude onto the map canvas
    Project(ProjectArgs),

    /// Look up a city in the coordinate dataset
    City(CityArgs),

    /// Manage configuration profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Discovery ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Read inventory records from a JSON file instead of the service
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,

    /// Roll port links up into one link per device pair
    #[arg(long)]
    pub aggregate: bool,
}

#[derive(Debug, Args)]
pub struct DiscoverArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Debug, Args)]
pub struct ViewArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Layout: location, hierarchical, circular, radial, force-directed
    #[arg(long, short = 'l', default_value = "location")]
    pub layout: Layout,

    /// Bounding box in canvas coordinates: X,Y,X1,Y1
    #[arg(long, allow_hyphen_values = true)]
    pub bbox: Option<BBox>,
}

/// `X,Y,X1,Y1` view filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub x: f32,
    pub y: f32,
    pub x1: f32,
    pub y1: f32,
}

impl FromStr for BBox {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split(',')
            .map(|p| p.trim().parse::<f32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("invalid coordinate: {e}"))?;
        match parts.as_slice() {
            &[x, y, x1, y1] => Ok(Self { x, y, x1, y1 }),
            _ => Err(format!("expected 4 comma-separated numbers, got {}", parts.len())),
        }
    }
}

// ── Geo ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProjectArgs {
    /// Latitude in degrees (north positive)
    #[arg(allow_negative_numbers = true)]
    pub latitude: f64,

    /// Longitude in degrees (east positive)
    #[arg(allow_negative_numbers = true)]
    pub longitude: f64,
}

#[derive(Debug, Args)]
pub struct CityArgs {
    /// City key: "City, Region, Country"
    pub key: String,

    /// City CSV dataset (overrides config)
    #[arg(long)]
    pub dataset: Option<PathBuf>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,

    /// Show the effective configuration (tokens masked)
    Show,

    /// List configured profiles
    Profiles,

    /// Add or replace a profile
    Set(ConfigSetArgs),

    /// Make a profile the default
    Use {
        /// Profile name
        name: String,
    },
}

#[derive(Debug, Args)]
pub struct ConfigSetArgs {
    /// Profile name
    pub name: String,

    /// Inventory service base URL
    #[arg(long)]
    pub url: String,

    /// Service answering discovery queries
    #[arg(long, default_value = "inventory")]
    pub service: String,

    /// Service area
    #[arg(long, default_value_t = 0)]
    pub area: u8,

    /// Environment variable holding the bearer token
    #[arg(long)]
    pub token_env: Option<String>,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
