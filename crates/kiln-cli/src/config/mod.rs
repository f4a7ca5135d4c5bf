//! Configuration with multi-source loading.
//!
//! Merges defaults, `kiln.config.json`, `KILN_*` environment variables and
//! CLI arguments. Priority: CLI > Environment > File > Defaults

mod defaults;
mod loading;
mod tests;
mod validation;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use defaults::*;

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILE: &str = "kiln.config.json";

/// kiln configuration, loaded from kiln.config.json or CLI args.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct KilnConfig {
    /// Directory holding the built artifacts
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Listen address (an IP, or `localhost`)
    #[serde(default = "default_host")]
    pub host: String,

    /// First port of the search range
    #[serde(default = "default_port_start")]
    pub port_start: u16,

    /// Last port of the search range, inclusive
    #[serde(default = "default_port_end")]
    pub port_end: u16,

    /// Hide the live status board
    #[serde(default)]
    pub quiet: bool,

    /// Watcher debounce window in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Path fragments the watcher ignores
    #[serde(default = "default_watch_ignore")]
    pub watch_ignore: Vec<String>,
}

impl Default for KilnConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            host: default_host(),
            port_start: default_port_start(),
            port_end: default_port_end(),
            quiet: false,
            debounce_ms: default_debounce_ms(),
            watch_ignore: default_watch_ignore(),
        }
    }
}

impl KilnConfig {
    /// Port search range.
    pub fn ports(&self) -> std::ops::RangeInclusive<u16> {
        self.port_start..=self.port_end
    }
}
