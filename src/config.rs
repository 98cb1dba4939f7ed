//! Configuration for the `soc` binary and library callers
//!
//! Loaded from `soc.toml`:
//!
//! ```toml
//! [engine]
//! readout = "first-row"    # or "diagonal"
//! parallel = true
//! pivot_tolerance = 1e-12
//!
//! [output]
//! format = "json"          # or "text"
//! top = 5                  # only print the 5 most central nodes
//! ```
//!
//! Every key is optional. Command-line flags override the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

use crate::soc::SocOptions;

/// File name looked up by [`load_config`].
pub const CONFIG_FILE_NAME: &str = "soc.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocConfig {
    pub engine: SocOptions,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Limit the report to the N most central nodes.
    pub top: Option<usize>,
}

/// Parse a config file, failing on I/O or syntax errors.
pub fn load_config_file(path: &Path) -> Result<SocConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: SocConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(config)
}

/// Look for `soc.toml` in `dir`. A missing or broken file yields defaults;
/// a broken one is logged.
pub fn load_config(dir: &Path) -> SocConfig {
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        debug!("No {} found, using defaults", CONFIG_FILE_NAME);
        return SocConfig::default();
    }

    match load_config_file(&path) {
        Ok(config) => {
            debug!("Loaded config from {}", path.display());
            config
        }
        Err(e) => {
            warn!("Failed to load {}: {:#}", path.display(), e);
            SocConfig::default()
        }
    }
}
