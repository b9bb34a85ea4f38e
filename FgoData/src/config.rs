//! Run configuration (`fgodata.toml`)
//!
//! ```toml
//! data_dir = "data"
//!
//! [request]
//! interval_secs = 5.0
//! timeout_secs = 10.0
//!
//! [validation]
//! append_slots = 5
//! halt_on_error = false
//!
//! [merge]
//! default_item_id = 0
//! ```
//!
//! Every key is optional. Command-line flags override file values.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::ItemId;
use crate::store::{DataDir, load_text};
use crate::validate::ValidationRules;

/// Looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "fgodata.toml";

pub const DEFAULT_USER_AGENT: &str = concat!("fgodata/", env!("CARGO_PKG_VERSION"));

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_interval_secs() -> f64 {
    5.0
}

fn default_timeout_secs() -> f64 {
    10.0
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub request: RequestConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub merge: MergeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            request: RequestConfig::default(),
            validation: ValidationConfig::default(),
            merge: MergeConfig::default(),
        }
    }
}

/// Page request settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestConfig {
    /// Fixed pause between page requests
    #[serde(default = "default_interval_secs")]
    pub interval_secs: f64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl RequestConfig {
    /// Negative or non-finite values mean no pause
    pub fn interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.interval_secs).unwrap_or_default()
    }

    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_secs)
            .unwrap_or_else(|_| Duration::from_secs_f64(default_timeout_secs()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(flatten)]
    pub rules: ValidationRules,
    /// Stop a batch at the first failing record
    #[serde(default)]
    pub halt_on_error: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Id substituted for item names missing from `items.json`
    #[serde(default)]
    pub default_item_id: Option<ItemId>,
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        tracing::info!("Loaded config from {}", path.display());
        Self::from_toml(&text)
    }

    /// Load `path`, or `fgodata.toml` when present, or the defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match load_text(Path::new(DEFAULT_CONFIG_FILE))? {
            Some(text) => {
                tracing::info!("Loaded config from {}", DEFAULT_CONFIG_FILE);
                Self::from_toml(&text)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn data(&self) -> DataDir {
        DataDir::new(&self.data_dir)
    }
}
