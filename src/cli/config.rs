use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "window-probe",
    version,
    about = "Resolve desktop windows, extract addressed accessibility trees, and click elements"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to the native extractor executable
    #[arg(long, global = true)]
    pub extractor: Option<String>,

    /// Path to config file (default: window-probe.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Append a JSONL trace of extractor invocations to this file
    #[arg(long, global = true)]
    pub trace: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the windows the extractor can see
    List,

    /// Extract window geometry, accessibility tree, and screenshot
    Extract {
        /// Fuzzy window query (app name, title, or fragments of either)
        #[arg(long)]
        query: Option<String>,

        /// Exact window identifier (skips fuzzy resolution)
        #[arg(long)]
        window_id: Option<String>,

        /// Output directory for window.png and tree.json (default: probe-out)
        #[arg(short, long)]
        out: Option<String>,
    },

    /// Extract a window and click one of its nodes by id
    Click {
        /// Fuzzy window query
        #[arg(long)]
        query: String,

        /// Node identifier as printed in tree.json (e.g. "1.2.1")
        #[arg(long)]
        node: String,

        /// Write annotated diagnostic screenshots
        #[arg(long, default_value_t = false)]
        annotate: bool,

        /// Output directory for diagnostic images (default: probe-out)
        #[arg(short, long)]
        out: Option<String>,
    },

    /// Bring a window to the foreground
    Focus {
        /// Fuzzy window query
        #[arg(long)]
        query: Option<String>,

        /// Exact window identifier
        #[arg(long)]
        window_id: Option<String>,
    },

    /// Capture a full display screenshot
    Capture {
        /// Capture the display showing this window (primary display if omitted)
        #[arg(long)]
        query: Option<String>,

        /// Output directory for display.png (default: probe-out)
        #[arg(short, long)]
        out: Option<String>,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `window-probe.yaml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub trace: TraceConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            extractor: ExtractorConfig::default(),
            output: OutputConfig::default(),
            session: SessionConfig::default(),
            trace: TraceConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExtractorConfig {
    /// Path to the native extractor executable.
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_out_dir")]
    pub dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: "probe-out".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Allow the single automatic retry after a permission failure.
    #[serde(default = "default_true")]
    pub auto_retry: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { auto_retry: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TraceConfig {
    /// JSONL trace file path, tracing disabled when absent.
    pub path: Option<String>,
}

// Serde default helpers
fn default_out_dir() -> String { "probe-out".to_string() }
fn default_true() -> bool { true }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("window-probe.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    }
}

// ============================================================================
// Merging CLI args with config
// ============================================================================

/// Resolve the extractor path: CLI flag > config file > environment.
pub fn resolve_extractor_path(cli: Option<&str>, config: &AppConfig) -> Option<String> {
    cli.map(str::to_string)
        .or_else(|| config.extractor.path.clone())
        .or_else(|| std::env::var("WINDOW_PROBE_EXTRACTOR").ok())
}

/// Resolve an output directory: CLI flag > config file default.
pub fn resolve_out_dir(cli: Option<&str>, config: &AppConfig) -> String {
    cli.map(str::to_string)
        .unwrap_or_else(|| config.output.dir.clone())
}
