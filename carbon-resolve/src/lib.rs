//! # carbon-resolve
//!
//! Multi-provider SERP resolution for carbon reports.
//!
//! A batch of submitted URLs or keywords is deduplicated, queried in one
//! batched request against a primary ranking-data provider, and whatever the
//! primary could not answer is retried one item at a time against a
//! secondary provider. Each item ends up in exactly one of two partitions:
//! a success with its matched results, or a fail with a reason.
//!
//! ## Design
//!
//! - Canonical keys collapse equivalent submissions (`www.`, extensions, separators)
//! - Primary credentials are rotated from a random start with a bounded retry ceiling
//! - The secondary provider only sees the residual, queried concurrently
//! - URL items match by registrable domain; keyword items keep organic results
//! - Per-item failures are recorded, never raised
//!
//! ## Security
//!
//! - Credential secrets are redacted from `Debug` output and never logged
//! - Queries are logged only at trace level

pub mod canonical;
pub mod config;
pub mod credentials;
pub mod error;
pub mod http;
pub mod matcher;
pub mod orchestrator;
pub mod provider;
pub mod providers;
pub mod set;
pub mod types;

pub use config::ResolveConfig;
pub use credentials::{Credential, CredentialPool};
pub use error::{ResolveError, Result};
pub use orchestrator::Resolver;
pub use provider::{PrimaryProvider, SecondaryProvider};
pub use set::{FailRecord, ItemSet, KeywordSet, Outcome, ResolutionSet, SuccessRecord, UrlSet};
pub use types::{Locale, MatchEntry, Mode, ProviderPayload, ResultEntry};

/// Resolve submitted values into success and fail partitions.
///
/// Values are canonicalised for `mode` and deduplicated before any
/// provider is called. Invalid URLs are recorded as fails up front.
///
/// # Errors
///
/// Returns [`ResolveError::NoCredentialsAvailable`] if the primary pool has
/// no usable credential, and [`ResolveError::Config`] if `config` is
/// invalid. Every other failure is recorded per item in the returned set.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> carbon_resolve::Result<()> {
/// use carbon_resolve::{Credential, CredentialPool, Locale, Mode, ResolveConfig};
///
/// let config = ResolveConfig {
///     primary: CredentialPool::new(vec![Credential::new("https://serp.example/api", "token")]),
///     ..Default::default()
/// };
/// let set = carbon_resolve::resolve(
///     ["https://www.example.com/blog/post.html"],
///     Mode::Url,
///     &Locale::new("us", "en"),
///     &config,
/// )
/// .await?;
/// for (_, record) in set.successes() {
///     println!("{} -> {:?}", record.original, record.suggested_match);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn resolve<I, T>(
    values: I,
    mode: Mode,
    locale: &Locale,
    config: &ResolveConfig,
) -> Result<ResolutionSet>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    orchestrator::resolve(values, mode, locale, config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolve_validates_config_zero_attempts() {
        let config = ResolveConfig {
            max_attempts: 0,
            ..Default::default()
        };
        let result = resolve(["rust"], Mode::Keyword, &Locale::new("us", "en"), &config).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("max_attempts"));
    }

    #[tokio::test]
    async fn resolve_validates_config_zero_timeout() {
        let config = ResolveConfig {
            timeout_seconds: 0,
            ..Default::default()
        };
        let result = resolve(["rust"], Mode::Keyword, &Locale::new("us", "en"), &config).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout"));
    }

    #[tokio::test]
    async fn resolve_without_credentials_is_fatal() {
        let result = resolve(
            ["https://example.com"],
            Mode::Url,
            &Locale::new("us", "en"),
            &ResolveConfig::default(),
        )
        .await;
        assert!(matches!(
            result,
            Err(ResolveError::NoCredentialsAvailable(_))
        ));
    }
}
