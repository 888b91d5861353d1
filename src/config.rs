use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Optional config file, looked up relative to the working directory.
pub const CONFIG_FILE: &str = "Client.toml";

/// Prefix of the environment variables that override the config file.
pub const ENV_PREFIX: &str = "ELECTION_";

/// Client configuration, derived from `Client.toml` and `ELECTION_*`
/// environment variables, or constructed directly.
///
/// Fixed for the lifetime of the client it is passed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    base_url: String,
    #[serde(default = "default_storage_path")]
    storage_path: PathBuf,
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("storage.json")
}

impl ClientConfig {
    /// Configuration pointing at `base_url`, with default storage.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ConfigError> {
        Self {
            base_url: base_url.into(),
            storage_path: default_storage_path(),
        }
        .validated()
    }

    /// Load from the default config file and environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment())
    }

    /// The figment this client reads configuration from. Exposed so front
    /// ends can merge in their own sources, e.g. command-line flags.
    pub fn figment() -> Figment {
        Figment::from(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        figment.extract::<Self>()?.validated()
    }

    pub fn with_storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = path.into();
        self
    }

    fn validated(mut self) -> Result<Self, ConfigError> {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ConfigError::BaseUrl(self.base_url));
        }
        self.base_url = trimmed.to_string();
        Ok(self)
    }

    /// Backend base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Where the file-backed token store lives.
    pub fn storage_path(&self) -> &Path {
        &self.storage_path
    }

    /// Full URL of an API resource. All resources live under `<base>/api`.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }
}
