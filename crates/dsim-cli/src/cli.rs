//! CLI argument definitions for the district simulator.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use dsim_core::ActiveView;

#[derive(Parser)]
#[command(
    name = "dsim",
    version,
    about = "District simulator - submit district metrics and explore the predictions",
    long_about = "Submit a CSV of district-level metrics to the prediction service and\n\
                  explore the result: predictions, risk map, demand forecast, feature\n\
                  insights and the narrative report."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Prediction service API base (overrides the settings file).
    #[arg(long = "api-url", env = "DSIM_API_URL", value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Request timeout in seconds (overrides the settings file).
    #[arg(long = "timeout", value_name = "SECONDS", global = true)]
    pub timeout: Option<u64>,

    /// Settings file to use instead of the default location.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Submit a CSV file and print the result.
    Simulate(SimulateArgs),

    /// Open an interactive workspace.
    Shell(ShellArgs),

    /// Preview the columns of a CSV file and check the mapping against them.
    Inspect(InspectArgs),

    /// Suggest a column mapping from a CSV header.
    Mapping(MappingArgs),

    /// Query a read-only dashboard endpoint.
    Fetch(FetchArgs),

    /// Check whether the prediction service is up.
    Health,

    /// Show or create the settings file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Where the mapping text comes from.
#[derive(Args, Default)]
pub struct MappingSource {
    /// Read the mapping text from this file.
    #[arg(long = "mapping", value_name = "PATH", conflicts_with = "mapping_json")]
    pub mapping_file: Option<PathBuf>,

    /// Use this mapping text as-is.
    #[arg(long = "mapping-json", value_name = "JSON")]
    pub mapping_json: Option<String>,

    /// Derive the mapping from the CSV header.
    #[arg(long = "suggest-mapping", conflicts_with_all = ["mapping_file", "mapping_json"])]
    pub suggest: bool,
}

#[derive(Args)]
pub struct SimulateArgs {
    /// CSV file to submit.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    #[command(flatten)]
    pub mapping: MappingSource,

    /// View to print (default: from settings, else table).
    #[arg(long = "view", value_name = "VIEW")]
    pub view: Option<ActiveView>,

    /// Print every view in tab order.
    #[arg(long = "all-views", conflicts_with = "view")]
    pub all_views: bool,

    /// Filter the predictions table by district or state.
    #[arg(long = "search", value_name = "TERM")]
    pub search: Option<String>,

    /// Print the sanitized response as JSON instead of tables.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct ShellArgs {
    /// CSV file to select on startup.
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub mapping: MappingSource,
}

#[derive(Args)]
pub struct InspectArgs {
    /// CSV file to preview.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Distinct sample values shown per column.
    #[arg(long = "samples", value_name = "N", default_value_t = 5)]
    pub samples: usize,

    #[command(flatten)]
    pub mapping: MappingSource,

    /// Print the preview as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct MappingArgs {
    /// CSV file whose header is matched.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Write the suggested mapping text to this file.
    #[arg(long = "write", value_name = "PATH")]
    pub write: Option<PathBuf>,
}

#[derive(Args)]
pub struct FetchArgs {
    #[arg(value_enum)]
    pub kind: FetchKind,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FetchKind {
    /// National actual vs. predicted trend.
    Forecast,
    /// District cluster points.
    Clusters,
    /// High-risk alerts.
    Anomalies,
    /// Model feature importance.
    Insights,
    /// Generated narrative report.
    Report,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective settings.
    Show,
    /// Print the settings file location.
    Path,
    /// Write a settings file with default values.
    Init {
        /// Replace an existing file.
        #[arg(long = "force")]
        force: bool,
    },
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
