//! Resolution configuration with sensible defaults.
//!
//! [`ResolveConfig`] holds the credential pools for both providers and the
//! knobs controlling retries, timeouts and result depth.

use serde::{Deserialize, Serialize};

use crate::credentials::CredentialPool;
use crate::error::ResolveError;
use crate::types::Mode;

/// Default live endpoint of the secondary (per-item) provider.
pub const DEFAULT_SECONDARY_ENDPOINT: &str =
    "https://api.dataforseo.com/v3/serp/google/organic/live/regular";

/// Configuration for a resolution run.
///
/// Use [`Default::default()`] and override the credential pools.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Credentials for the batched primary provider; each entry carries its
    /// own endpoint.
    pub primary: CredentialPool,
    /// Credentials for the per-item secondary provider. An entry with an
    /// empty endpoint inherits [`ResolveConfig::secondary_endpoint`].
    pub secondary: CredentialPool,
    /// Endpoint used for secondary credentials that do not name one.
    pub secondary_endpoint: String,
    /// Maximum primary attempts, each with the next credential in rotation.
    pub max_attempts: usize,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Result depth requested per URL item.
    pub url_depth: u32,
    /// Result depth requested per keyword item.
    pub keyword_depth: u32,
    /// Custom User-Agent string. If `None`, the crate name and version are used.
    pub user_agent: Option<String>,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            primary: CredentialPool::default(),
            secondary: CredentialPool::default(),
            secondary_endpoint: DEFAULT_SECONDARY_ENDPOINT.to_string(),
            max_attempts: 10,
            timeout_seconds: 30,
            url_depth: 3,
            keyword_depth: 20,
            user_agent: None,
        }
    }
}

impl ResolveConfig {
    /// Result depth to request for `mode`.
    pub fn depth(&self, mode: Mode) -> u32 {
        match mode {
            Mode::Url => self.url_depth,
            Mode::Keyword => self.keyword_depth,
        }
    }

    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `max_attempts` must be greater than 0
    /// - `timeout_seconds` must be greater than 0
    /// - `url_depth` and `keyword_depth` must be greater than 0
    ///
    /// Credential pools are checked when a rotation is requested, not here.
    pub fn validate(&self) -> Result<(), ResolveError> {
        if self.max_attempts == 0 {
            return Err(ResolveError::Config(
                "max_attempts must be greater than 0".into(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(ResolveError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.url_depth == 0 || self.keyword_depth == 0 {
            return Err(ResolveError::Config(
                "url_depth and keyword_depth must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sensible_values() {
        let config = ResolveConfig::default();
        assert_eq!(config.max_attempts, 10);
        assert_eq!(config.timeout_seconds, 30);
        assert_eq!(config.url_depth, 3);
        assert_eq!(config.keyword_depth, 20);
        assert!(config.primary.is_empty());
        assert!(config.secondary.is_empty());
        assert_eq!(config.secondary_endpoint, DEFAULT_SECONDARY_ENDPOINT);
        assert!(config.user_agent.is_none());
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(ResolveConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_attempts_rejected() {
        let config = ResolveConfig {
            max_attempts: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_attempts"));
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = ResolveConfig {
            timeout_seconds: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_seconds"));
    }

    #[test]
    fn zero_depth_rejected() {
        let config = ResolveConfig {
            keyword_depth: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("depth"));
    }

    #[test]
    fn depth_per_mode() {
        let config = ResolveConfig::default();
        assert_eq!(config.depth(Mode::Url), 3);
        assert_eq!(config.depth(Mode::Keyword), 20);
    }

    #[test]
    fn partial_toml_like_json_uses_defaults() {
        let config: ResolveConfig =
            serde_json::from_str(r#"{"max_attempts": 4}"#).expect("deserialize");
        assert_eq!(config.max_attempts, 4);
        assert_eq!(config.timeout_seconds, 30);
    }
}
