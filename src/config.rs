//! Configuration for the indexing core.
//!
//! Layered configuration: defaults, then a TOML file, then environment
//! variables. Environment variables are prefixed with `TUCANA_` and use
//! double underscores to separate nested levels:
//! `TUCANA_INDEXING__PARALLEL_THREADS=8` sets `indexing.parallel_threads`.
//!
//! The crash shim has its own dedicated kill switch, `CCLS_CRASH_RECOVERY`,
//! which is read at call time rather than through this module (see
//! `indexing::crash`).

use std::collections::HashMap;
use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema.
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub indexing: IndexingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IndexingConfig {
    /// Number of indexer worker threads.
    #[serde(default = "default_parallel_threads")]
    pub parallel_threads: usize,

    /// Record hover/comment text on entities.
    #[serde(default = "default_true")]
    pub comments: bool,

    /// Arm the crash shim around frontend calls. `CCLS_CRASH_RECOVERY=0`
    /// overrides this to off regardless of the configured value.
    #[serde(default = "default_true")]
    pub crash_recovery: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default log level when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-module level overrides, e.g. `indexer = "debug"`.
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_version() -> u32 {
    1
}
fn default_parallel_threads() -> usize {
    num_cpus::get()
}
fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            indexing: IndexingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            parallel_threads: default_parallel_threads(),
            comments: true,
            crash_recovery: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Settings {
    /// Load configuration: defaults, then `tucana.toml` if present, then
    /// `TUCANA_*` environment variables.
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(PathBuf::from("tucana.toml"))
    }

    pub fn load_from(config_path: PathBuf) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("TUCANA_").map(|key| {
                key.as_str()
                    .to_lowercase()
                    .replace("__", ".")
                    .into()
            }))
            .extract()
    }
}
