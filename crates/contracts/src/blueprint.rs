//! ServiceBlueprint - Config Loader output
//!
//! Describes the complete service configuration: metric naming, relay
//! buffering and the movie catalog.

use serde::{Deserialize, Serialize};

use crate::Movie;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete service blueprint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Service settings
    #[serde(default)]
    pub service: ServiceConfig,

    /// Relay buffering
    #[serde(default)]
    pub relay: RelayConfig,

    /// Movie catalog
    #[serde(default)]
    pub movies: Vec<Movie>,
}

/// Service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Prefix of the operation timer names
    #[serde(default = "default_metrics_prefix")]
    pub metrics_prefix: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            metrics_prefix: default_metrics_prefix(),
        }
    }
}

fn default_metrics_prefix() -> String {
    "media_relay.movies".to_string()
}

/// Relay buffering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Record channel capacity between producer and relay
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Framed output buffer size (bytes) above which the sink reports full
    #[serde(default = "default_write_high_water_bytes")]
    pub write_high_water_bytes: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            write_high_water_bytes: default_write_high_water_bytes(),
        }
    }
}

fn default_channel_capacity() -> usize {
    32
}

fn default_write_high_water_bytes() -> usize {
    64 * 1024
}
