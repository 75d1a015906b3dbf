//! Runtime configuration.
//!
//! Three layers, strongest last: built-in defaults, an optional TOML
//! config file, CLI flags. Resolution happens in main; this module
//! holds the file format and the defaults.

use crate::error::{LinkError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub use crate::cipher::resync::DEFAULT_WINDOW;
pub use crate::matcher::DEFAULT_THRESHOLD;

/// Optional TOML config file. Every field can also be given on the
/// command line, which wins.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub dictionary: Option<PathBuf>,
    pub window: Option<u64>,
    pub threshold: Option<f64>,
    pub tx_counter_file: Option<PathBuf>,
    pub rx_counter_file: Option<PathBuf>,
    pub connect: Option<String>,
    pub listen: Option<String>,
    pub device: Option<PathBuf>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| LinkError::Config(format!("cannot read {}: {e}", path.display())))?;
        toml::from_str(&contents)
            .map_err(|e| LinkError::Config(format!("bad config {}: {e}", path.display())))
    }
}

/// Default location for a per-side counter file, under the user data
/// dir. The two sides get distinct names and must never share one.
pub fn default_counter_file(side: &str) -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lumen")
        .join(format!("{side}_counter"))
}
