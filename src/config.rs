//! Carbon configuration: a TOML file overlaid by environment variables.
//!
//! Every section is optional. Deployments usually ship credentials through
//! the environment instead of the file:
//!
//! | Variable | Shape |
//! |---|---|
//! | `SERP_API_CREDENTIALS_JSON` | `{"keys":[{"address","key"}]}` |
//! | `DFS_API_CREDENTIALS_JSON` | `{"keys":[{"address","key"}]}` |
//! | `DFS_API_ADDRESS` | secondary endpoint URL |
//! | `INTERNAL_ACCOUNTS_JSON` | `{"accounts":[{"name","password","limit"}]}` |
//! | `CARBON_PUBLIC_LIMIT` | integer |

use std::path::{Path, PathBuf};

use carbon_resolve::{CredentialPool, ResolveConfig};
use serde::{Deserialize, Serialize};

use crate::accounts::{Account, AccountsDocument};
use crate::error::{CarbonError, Result};

/// Environment variable holding the primary provider credentials.
pub const ENV_PRIMARY_CREDENTIALS: &str = "SERP_API_CREDENTIALS_JSON";
/// Environment variable holding the secondary provider credentials.
pub const ENV_SECONDARY_CREDENTIALS: &str = "DFS_API_CREDENTIALS_JSON";
/// Environment variable overriding the secondary provider endpoint.
pub const ENV_SECONDARY_ENDPOINT: &str = "DFS_API_ADDRESS";
/// Environment variable holding the internal accounts.
pub const ENV_ACCOUNTS: &str = "INTERNAL_ACCOUNTS_JSON";
/// Environment variable overriding the public item limit.
pub const ENV_PUBLIC_LIMIT: &str = "CARBON_PUBLIC_LIMIT";

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CarbonConfig {
    /// Engine settings and provider credential pools.
    pub resolve: ResolveConfig,
    /// Maximum items per request for callers without an account.
    pub public_limit: usize,
    /// Internal accounts allowed to exceed the public limit.
    pub accounts: Vec<Account>,
}

impl Default for CarbonConfig {
    fn default() -> Self {
        Self {
            resolve: ResolveConfig::default(),
            public_limit: 100,
            accounts: Vec::new(),
        }
    }
}

impl CarbonConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CarbonError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| CarbonError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/carbon/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("carbon").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("carbon")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/carbon-config/config.toml")
        }
    }

    /// Load the file at `path` if it exists, then apply the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file or any set variable is invalid.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Self::default()
        };
        config.apply_env()?;
        Ok(config)
    }

    /// Build configuration from defaults and the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if any set variable is invalid.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Overlay values from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if any set variable is invalid.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|name| std::env::var(name).ok())
    }

    /// Overlay values read through `lookup`. Unset or blank variables are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CarbonError::Config`] naming the variable that failed to parse.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(json) = get(ENV_PRIMARY_CREDENTIALS) {
            self.resolve.primary = CredentialPool::from_json(&json)
                .map_err(|e| CarbonError::Config(format!("{ENV_PRIMARY_CREDENTIALS}: {e}")))?;
        }
        if let Some(json) = get(ENV_SECONDARY_CREDENTIALS) {
            self.resolve.secondary = CredentialPool::from_json(&json)
                .map_err(|e| CarbonError::Config(format!("{ENV_SECONDARY_CREDENTIALS}: {e}")))?;
        }
        if let Some(endpoint) = get(ENV_SECONDARY_ENDPOINT) {
            self.resolve.secondary_endpoint = endpoint.trim().to_string();
        }
        if let Some(json) = get(ENV_ACCOUNTS) {
            let doc: AccountsDocument = serde_json::from_str(&json)
                .map_err(|e| CarbonError::Config(format!("{ENV_ACCOUNTS}: {e}")))?;
            self.accounts = doc.accounts;
        }
        if let Some(raw) = get(ENV_PUBLIC_LIMIT) {
            self.public_limit = raw
                .trim()
                .parse()
                .map_err(|e| CarbonError::Config(format!("{ENV_PUBLIC_LIMIT}: {e}")))?;
        }
        Ok(())
    }

    /// Validates this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CarbonError::Resolve`] if the engine settings are invalid.
    pub fn validate(&self) -> Result<()> {
        self.resolve.validate()?;
        Ok(())
    }
}
