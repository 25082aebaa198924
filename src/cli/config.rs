use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "page-engine",
    version,
    about = "Dynamic page configuration engine: validate, parse and inspect page configs"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Caller permission tokens, comma separated (overrides the config file)
    #[arg(long, global = true)]
    pub permissions: Option<String>,

    /// Path to config file (default: page-engine.yaml in current dir)
    #[arg(long, global = true)]
    pub config_file: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a page configuration document
    Validate {
        /// Path to the page config JSON file
        #[arg(long)]
        config: String,

        /// Output format: console, json
        #[arg(long, default_value = "console")]
        format: String,
    },

    /// Validate and parse a page configuration document
    Parse {
        /// Path to the page config JSON file
        #[arg(long)]
        config: String,

        /// Load auto-load data sources over HTTP after parsing
        #[arg(long, default_value_t = false)]
        load: bool,

        /// Output format: console, json
        #[arg(long, default_value = "console")]
        format: String,
    },

    /// Show collected data bindings and event configs
    Bindings {
        /// Path to the page config JSON file
        #[arg(long)]
        config: String,
    },

    /// Fetch a page config from the configuration service, then parse it
    Fetch {
        /// Page code to fetch
        #[arg(long)]
        page_code: String,

        /// Configuration service endpoint (overrides the config file)
        #[arg(long)]
        endpoint: Option<String>,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `page-engine.yaml`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub trace: TraceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub endpoint: Option<String>,

    #[serde(default = "default_two")]
    pub retries: u32,

    #[serde(default = "default_ttl")]
    pub cache_ttl_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            retries: 2,
            cache_ttl_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TraceConfig {
    /// JSONL trace file path; tracing is off when unset.
    pub path: Option<String>,
}

// Serde default helpers
fn default_two() -> u32 { 2 }
fn default_ttl() -> u64 { 300 }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("page-engine.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    }
}

/// Resolve the caller's permission tokens: CLI flag > config file.
pub fn resolve_permissions(cli: Option<&str>, config: &AppConfig) -> Vec<String> {
    match cli {
        Some(list) => list
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        None => config.permissions.clone(),
    }
}
