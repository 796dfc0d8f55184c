//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::domain::inference::Language;

/// Lab Assist - AI laboratory assistant for process recommendation,
/// maintenance triage and warehouse inventory
#[derive(Parser, Debug)]
#[command(name = "lab-assist")]
#[command(version)]
#[command(about = "AI laboratory assistant backed by Google Gemini")]
#[command(long_about = None)]
pub struct Cli {
    /// Response language
    #[arg(short = 'l', long, value_name = "LANG", global = true)]
    pub lang: Option<LanguageArg>,

    /// Hard stop for microphone captures (e.g., 30s, 1m, 2m30s)
    #[arg(long, value_name = "TIME", global = true)]
    pub max_duration: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Recommend deposition processes for an element
    Recommend {
        /// Target element or film (e.g., Ti, Al2O3)
        element: String,

        /// Local precursor to consider (repeatable; replaces the configured library)
        #[arg(short = 'p', long = "precursor", value_name = "NAME")]
        precursors: Vec<String>,
    },
    /// Triage maintenance tickets
    Ticket {
        #[command(subcommand)]
        action: TicketAction,
    },
    /// Manage warehouse inventory
    Inventory {
        #[command(subcommand)]
        action: InventoryAction,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum TicketAction {
    /// Analyze a ticket (reads stdin when TEXT is omitted)
    Analyze {
        /// Ticket text
        text: Option<String>,
    },
    /// Dictate a fault description from the microphone
    Dictate {
        /// Analyze the transcript as a ticket afterwards
        #[arg(long)]
        analyze: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum InventoryAction {
    /// Show current stock
    List,
    /// Register an item by voice
    Voice,
    /// Register an item from a label or invoice photo
    Scan {
        /// Image file (jpg, png, webp)
        image: PathBuf,
    },
    /// Inspect a camera frame of stored material
    Inspect {
        /// Image file (jpg, png, webp)
        image: PathBuf,
    },
    /// Generate a warehouse report
    Report {
        /// Brand, energy and gas-usage analytics instead of the stock report
        #[arg(long)]
        analytics: bool,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Language argument for clap ValueEnum
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LanguageArg {
    Zh,
    En,
}

impl From<LanguageArg> for Language {
    fn from(arg: LanguageArg) -> Self {
        match arg {
            LanguageArg::Zh => Language::Zh,
            LanguageArg::En => Language::En,
        }
    }
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "api_key",
    "language",
    "max_duration",
    "model_fast",
    "model_reasoning",
    "endpoint",
    "precursors",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
