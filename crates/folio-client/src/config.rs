//! `folio.toml` configuration.
//!
//! Resolution order for the file: explicit path > `FOLIO_CONFIG` > `./folio.toml`.
//! An explicit path must exist; the fallbacks quietly default when absent.

use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use folio_core::{
    DEFAULT_ENDPOINT, DEFAULT_ROOT_MARGIN, DEFAULT_THRESHOLD, SUCCESS_DWELL_SECS, WatchOptions,
};
use serde::{Deserialize, Serialize};

use crate::controller::ControllerOptions;
use crate::error::{ClientError, Result};

pub const CONFIG_ENV: &str = "FOLIO_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "folio.toml";
pub const DEFAULT_ACCESS_KEY_ENV: &str = "FOLIO_WEB3FORMS_KEY";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FolioConfig {
    pub contact: ContactConfig,
    pub lazy: LazyConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContactConfig {
    pub endpoint: String,
    pub success_dwell_secs: u64,
    pub timeout_secs: u64,
    /// Name of the environment variable holding the access key.
    pub access_key_env: String,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            success_dwell_secs: SUCCESS_DWELL_SECS,
            timeout_secs: 15,
            access_key_env: DEFAULT_ACCESS_KEY_ENV.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LazyConfig {
    pub root_margin: String,
    pub threshold: f64,
}

impl Default for LazyConfig {
    fn default() -> Self {
        Self {
            root_margin: DEFAULT_ROOT_MARGIN.to_string(),
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl FolioConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.watch_options()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            let content = fs::read_to_string(path)?;
            return Self::from_toml(&content);
        }
        let path = env::var(CONFIG_ENV)
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        match fs::read_to_string(&path) {
            Ok(content) => Self::from_toml(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn watch_options(&self) -> Result<WatchOptions> {
        WatchOptions::parse(&self.lazy.root_margin, self.lazy.threshold)
            .map_err(|e| ClientError::Config(e.to_string()))
    }

    /// `override_key` wins; otherwise the configured environment variable.
    pub fn access_key(&self, override_key: Option<&str>) -> Option<String> {
        override_key
            .map(str::to_string)
            .or_else(|| env::var(&self.contact.access_key_env).ok())
            .filter(|k| !k.trim().is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.contact.timeout_secs)
    }

    pub fn controller_options(&self, access_key: impl Into<String>) -> ControllerOptions {
        ControllerOptions::new(access_key)
            .with_dwell(Duration::from_secs(self.contact.success_dwell_secs))
    }
}
