//! Project-level configuration support
//!
//! Loads per-project configuration from a `veritype.toml` file in the
//! repository root. Values are used as supplied; range validation is the
//! caller's concern.
//!
//! # Configuration Format
//!
//! ```toml
//! # veritype.toml
//!
//! [thresholds]
//! base_threshold = 10.0
//! warn_threshold = 15.0
//! error_threshold = 25.0
//! interface_penalty = 20.0
//! performance_mode = true
//! ```

use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

/// Config file name looked up in the analyzed repository root
pub const CONFIG_FILE: &str = "veritype.toml";

/// Reporting policy for one analysis pass. Immutable once the pass starts.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleConfig {
    /// Minimum score requiring an explicit check on a plain type
    #[serde(default = "default_base_threshold")]
    pub base_threshold: f64,
    /// Severity tier, forwarded to the reporter
    #[serde(default = "default_warn_threshold")]
    pub warn_threshold: f64,
    /// Severity tier; also derives the accumulation ceiling
    #[serde(default = "default_error_threshold")]
    pub error_threshold: f64,
    /// Interface base score and its own reporting floor
    #[serde(default = "default_interface_penalty")]
    pub interface_penalty: f64,
    /// Enables ceiling-capped accumulation
    #[serde(default = "default_performance_mode")]
    pub performance_mode: bool,
}

fn default_base_threshold() -> f64 {
    10.0
}

fn default_warn_threshold() -> f64 {
    15.0
}

fn default_error_threshold() -> f64 {
    25.0
}

fn default_interface_penalty() -> f64 {
    20.0
}

fn default_performance_mode() -> bool {
    true
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            base_threshold: default_base_threshold(),
            warn_threshold: default_warn_threshold(),
            error_threshold: default_error_threshold(),
            interface_penalty: default_interface_penalty(),
            performance_mode: default_performance_mode(),
        }
    }
}

impl RuleConfig {
    /// Bound applied to intermediate accumulation under performance mode
    pub fn ceiling(&self) -> f64 {
        self.error_threshold * 2.0
    }
}

/// Top-level `veritype.toml` shape
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub thresholds: RuleConfig,
}

/// Load configuration from `repo_path/veritype.toml`, or an explicit file.
///
/// A missing file yields defaults; a malformed file is reported and
/// ignored rather than aborting the run.
pub fn load(repo_path: &Path, explicit: Option<&Path>) -> ProjectConfig {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => repo_path.join(CONFIG_FILE),
    };

    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(_) => {
            debug!("no config at {}, using defaults", path.display());
            return ProjectConfig::default();
        }
    };

    match toml::from_str(&content) {
        Ok(config) => {
            debug!("loaded config from {}", path.display());
            config
        }
        Err(e) => {
            warn!("ignoring malformed {}: {}", path.display(), e);
            ProjectConfig::default()
        }
    }
}
