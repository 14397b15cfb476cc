//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use observability::ObservabilityConfig;
use std::path::PathBuf;

/// Media Relay - stream movies through a backpressured relay
#[derive(Parser, Debug)]
#[command(
    name = "media-relay",
    author,
    version,
    about = "Streaming movie relay with backpressure and operation timing",
    long_about = "Streams the configured movie catalog through a flow-controlled relay.\n\n\
                  Each operation is timed; the resulting timer statistics are printed \n\
                  once the stream terminates."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "MEDIA_RELAY_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "MEDIA_RELAY_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Logging setup derived from `-v`/`-q` and `--log-format`
    ///
    /// `RUST_LOG` still takes precedence over the level chosen here.
    pub fn observability_config(&self) -> ObservabilityConfig {
        let default_log_level = if self.quiet {
            "warn"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        };

        ObservabilityConfig {
            log_format: self.log_format.clone().into(),
            default_log_level: default_log_level.to_string(),
            ..Default::default()
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream every movie in the catalog
    Get(StreamArgs),

    /// Stream the movies matching a search text
    Search(SearchArgs),

    /// Validate configuration file without streaming
    Validate(ValidateArgs),
}

/// Options shared by the streaming commands
#[derive(Args, Debug, Clone)]
pub struct StreamArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "media-relay.toml",
        env = "MEDIA_RELAY_CONFIG"
    )]
    pub config: PathBuf,

    /// Write length-delimited protobuf frames to this file instead of logging
    #[arg(short, long, env = "MEDIA_RELAY_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "MEDIA_RELAY_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `search` command
#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Text matched against title, tagline and summary
    pub text: String,

    #[command(flatten)]
    pub stream: StreamArgs,
}

/// Arguments for the `validate` command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "media-relay.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
