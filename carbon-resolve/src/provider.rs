//! Trait definitions for pluggable ranking-data providers.
//!
//! The primary provider answers one batched request for many keys; the
//! secondary provider answers one key per request. Both are queried with a
//! single credential per call. Retries and credential rotation live in the
//! orchestrator, not in implementations.

use std::collections::HashMap;
use std::future::Future;

use crate::credentials::Credential;
use crate::error::ResolveError;
use crate::types::{Locale, ProviderPayload};

/// A batched ranking-data provider.
///
/// All implementations must be `Send + Sync` so a resolver can be shared
/// across tasks.
pub trait PrimaryProvider: Send + Sync {
    /// Query every key in one request, authenticated with `credential`.
    ///
    /// Returns the payload for each key the provider answered. Keys the
    /// provider skipped are simply absent from the map.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] if the request fails, the provider answers
    /// with a non-2xx status, or the body cannot be decoded. The caller
    /// treats every error as a rejected attempt.
    fn query(
        &self,
        keys: &[String],
        locale: &Locale,
        depth: u32,
        credential: &Credential,
    ) -> impl Future<Output = Result<HashMap<String, ProviderPayload>, ResolveError>> + Send;

    /// Short provider name for logs.
    fn name(&self) -> &'static str;
}

/// A per-key ranking-data provider used for the residual after the primary.
pub trait SecondaryProvider: Send + Sync {
    /// Query a single key, authenticated with `credential`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::ProviderCallFailed`] or
    /// [`ResolveError::MalformedResponse`]; the caller records the key as
    /// failed and carries on with the others.
    fn resolve_one(
        &self,
        key: &str,
        locale: &Locale,
        depth: u32,
        credential: &Credential,
    ) -> impl Future<Output = Result<ProviderPayload, ResolveError>> + Send;

    /// Short provider name for logs.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResultEntry;

    /// A mock provider for testing trait bounds and async execution.
    struct MockPrimary {
        answers: HashMap<String, ProviderPayload>,
    }

    impl PrimaryProvider for MockPrimary {
        async fn query(
            &self,
            keys: &[String],
            _locale: &Locale,
            _depth: u32,
            _credential: &Credential,
        ) -> Result<HashMap<String, ProviderPayload>, ResolveError> {
            if self.answers.is_empty() {
                return Err(ResolveError::ProviderCallFailed("mock primary failure".into()));
            }
            Ok(keys
                .iter()
                .filter_map(|k| self.answers.get(k).map(|p| (k.clone(), p.clone())))
                .collect())
        }

        fn name(&self) -> &'static str {
            "mock-primary"
        }
    }

    struct MockSecondary;

    impl SecondaryProvider for MockSecondary {
        async fn resolve_one(
            &self,
            key: &str,
            _locale: &Locale,
            _depth: u32,
            _credential: &Credential,
        ) -> Result<ProviderPayload, ResolveError> {
            Ok(ProviderPayload::new(vec![ResultEntry {
                kind: "organic".into(),
                url: format!("https://{key}.example"),
                ..Default::default()
            }]))
        }

        fn name(&self) -> &'static str {
            "mock-secondary"
        }
    }

    fn credential() -> Credential {
        Credential::new("https://p.example", "token")
    }

    #[test]
    fn mocks_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MockPrimary>();
        assert_send_sync::<MockSecondary>();
    }

    #[tokio::test]
    async fn primary_returns_only_answered_keys() {
        let mut answers = HashMap::new();
        answers.insert("a".to_string(), ProviderPayload::default());
        let provider = MockPrimary { answers };

        let keys = vec!["a".to_string(), "b".to_string()];
        let result = provider
            .query(&keys, &Locale::new("us", "en"), 3, &credential())
            .await
            .expect("should succeed");
        assert_eq!(result.len(), 1);
        assert!(result.contains_key("a"));
    }

    #[tokio::test]
    async fn primary_propagates_errors() {
        let provider = MockPrimary {
            answers: HashMap::new(),
        };
        let err = provider
            .query(&["a".into()], &Locale::new("us", "en"), 3, &credential())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("mock primary failure"));
    }

    #[tokio::test]
    async fn secondary_returns_payload() {
        let payload = MockSecondary
            .resolve_one("rust", &Locale::new("us", "en"), 20, &credential())
            .await
            .expect("should succeed");
        assert_eq!(payload.entries[0].url, "https://rust.example");
        assert_eq!(MockSecondary.name(), "mock-secondary");
    }
}
