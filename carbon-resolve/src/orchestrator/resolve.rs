//! Two-tier resolution: batched primary query, then per-key fallback.
//!
//! # Pipeline
//!
//! 1. Take a rotation over the primary pool (fatal if no usable credential)
//! 2. Query the primary provider with every pending key, retrying across credentials
//! 3. Match each answered key: found ⇒ success, answered but unmatched ⇒ fail
//! 4. Fan out one secondary query per still-pending key with [`futures::future::join_all`]
//! 5. Match each secondary payload; anything not found fails
//!
//! Tasks in step 4 only return `(key, outcome)`. The resolution set is
//! mutated by the caller after the join.

use std::collections::HashMap;

use crate::config::ResolveConfig;
use crate::credentials::CredentialPool;
use crate::error::ResolveError;
use crate::matcher::match_payload;
use crate::provider::{PrimaryProvider, SecondaryProvider};
use crate::set::{ResolutionSet, REASON_NO_RESULTS};
use crate::types::{Locale, Mode, ProviderPayload};

use super::retry::query_with_retry;

/// Resolves item sets against an injected pair of providers.
#[derive(Debug)]
pub struct Resolver<P, S> {
    config: ResolveConfig,
    secondary_pool: CredentialPool,
    primary: P,
    secondary: S,
}

impl<P: PrimaryProvider, S: SecondaryProvider> Resolver<P, S> {
    /// Creates a resolver after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Config`] if the configuration is invalid.
    pub fn new(config: ResolveConfig, primary: P, secondary: S) -> Result<Self, ResolveError> {
        config.validate()?;
        let secondary_pool = config
            .secondary
            .with_default_endpoint(&config.secondary_endpoint);
        Ok(Self {
            config,
            secondary_pool,
            primary,
            secondary,
        })
    }

    /// The configuration this resolver was built with.
    pub fn config(&self) -> &ResolveConfig {
        &self.config
    }

    /// The injected primary provider.
    pub fn primary(&self) -> &P {
        &self.primary
    }

    /// The injected secondary provider.
    pub fn secondary(&self) -> &S {
        &self.secondary
    }

    /// Canonicalise `values` for `mode` and resolve them.
    ///
    /// # Errors
    ///
    /// See [`Resolver::resolve_set`].
    pub async fn resolve<I, T>(
        &self,
        values: I,
        mode: Mode,
        locale: &Locale,
    ) -> Result<ResolutionSet, ResolveError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.resolve_set(ResolutionSet::from_values(mode, values), locale)
            .await
    }

    /// Drive every pending key in `set` to success or fail.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::NoCredentialsAvailable`] if the primary pool
    /// has no usable credential. No provider is called in that case.
    /// Every other failure is recorded per key in the returned set.
    pub async fn resolve_set(
        &self,
        mut set: ResolutionSet,
        locale: &Locale,
    ) -> Result<ResolutionSet, ResolveError> {
        let rotation = self.config.primary.rotation()?;
        let depth = self.config.depth(set.mode());

        let keys = set.pending_keys();
        if keys.is_empty() {
            tracing::debug!("nothing pending, skipping providers");
            return Ok(set);
        }

        tracing::debug!(
            mode = %set.mode(),
            pending = keys.len(),
            country = %locale.country,
            language = %locale.language,
            "resolving with primary provider"
        );

        let payloads = match query_with_retry(
            &self.primary,
            &keys,
            locale,
            depth,
            rotation,
            self.config.max_attempts,
        )
        .await
        {
            Ok(payloads) => payloads,
            Err(err) => {
                tracing::warn!(error = %err, "primary provider exhausted, relying on fallback");
                HashMap::new()
            }
        };

        apply_primary(&mut set, &payloads);

        if set.is_complete() {
            return Ok(set);
        }

        self.run_fallback(&mut set, locale, depth).await;
        Ok(set)
    }

    async fn run_fallback(&self, set: &mut ResolutionSet, locale: &Locale, depth: u32) {
        let rotation = match self.secondary_pool.rotation() {
            Ok(rotation) => rotation,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    residual = set.pending_len(),
                    "secondary provider has no credentials, failing residual"
                );
                set.fail_remaining(REASON_NO_RESULTS);
                return;
            }
        };

        let residual = set.pending_keys();
        tracing::debug!(
            provider = self.secondary.name(),
            residual = residual.len(),
            "resolving residual with secondary provider"
        );

        let futures: Vec<_> = residual
            .into_iter()
            .enumerate()
            .map(|(i, key)| {
                let credential = rotation.nth_from_start(i);
                async move {
                    let result = self
                        .secondary
                        .resolve_one(&key, locale, depth, credential)
                        .await;
                    (key, result)
                }
            })
            .collect();

        let outcomes = futures::future::join_all(futures).await;

        for (key, outcome) in outcomes {
            match outcome {
                Ok(payload) => apply_match(set, &key, &payload),
                Err(err) => {
                    tracing::warn!(
                        provider = self.secondary.name(),
                        key = %key,
                        error = %err,
                        "secondary query failed"
                    );
                    set.fail(&key, REASON_NO_RESULTS);
                }
            }
        }
    }
}

/// Settle every pending key the primary answered; unanswered keys stay pending.
fn apply_primary(set: &mut ResolutionSet, payloads: &HashMap<String, ProviderPayload>) {
    for key in set.pending_keys() {
        if let Some(payload) = payloads.get(&key) {
            apply_match(set, &key, payload);
        }
    }
}

fn apply_match(set: &mut ResolutionSet, key: &str, payload: &ProviderPayload) {
    let Some(item) = set.pending_item(key) else {
        return;
    };
    let result = match_payload(item, payload);
    if result.found() {
        tracing::trace!(key, matches = result.matches.len(), "resolved");
        set.succeed(key, result.matches, result.suggested_match);
    } else {
        tracing::trace!(key, "no relevant match");
        set.fail(key, REASON_NO_RESULTS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::Credential;
    use crate::set::{Outcome, REASON_INVALID_URL};
    use crate::types::ResultEntry;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn organic(url: &str) -> ResultEntry {
        ResultEntry {
            kind: "organic".into(),
            title: "T".into(),
            url: url.into(),
            ..Default::default()
        }
    }

    /// Answers from a fixed table and counts calls.
    #[derive(Default)]
    struct TablePrimary {
        answers: HashMap<String, ProviderPayload>,
        calls: AtomicUsize,
    }

    impl PrimaryProvider for TablePrimary {
        async fn query(
            &self,
            keys: &[String],
            _locale: &Locale,
            _depth: u32,
            _credential: &Credential,
        ) -> Result<HashMap<String, ProviderPayload>, ResolveError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(keys
                .iter()
                .filter_map(|k| self.answers.get(k).map(|p| (k.clone(), p.clone())))
                .collect())
        }

        fn name(&self) -> &'static str {
            "table"
        }
    }

    #[derive(Default)]
    struct TableSecondary {
        answers: HashMap<String, ProviderPayload>,
        calls: AtomicUsize,
    }

    impl SecondaryProvider for TableSecondary {
        async fn resolve_one(
            &self,
            key: &str,
            _locale: &Locale,
            _depth: u32,
            _credential: &Credential,
        ) -> Result<ProviderPayload, ResolveError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answers
                .get(key)
                .cloned()
                .ok_or_else(|| ResolveError::ProviderCallFailed(format!("no task for {key}")))
        }

        fn name(&self) -> &'static str {
            "table-secondary"
        }
    }

    fn config() -> ResolveConfig {
        ResolveConfig {
            primary: CredentialPool::new(vec![Credential::new("https://primary.test", "k")]),
            secondary: CredentialPool::new(vec![Credential::new("", "login:pass")]),
            max_attempts: 2,
            ..ResolveConfig::default()
        }
    }

    #[tokio::test]
    async fn primary_answer_without_match_is_terminal() {
        let mut primary = TablePrimary::default();
        primary.answers.insert(
            "rust".into(),
            ProviderPayload::new(vec![organic("https://www.rust-lang.org")]),
        );
        primary
            .answers
            .insert("nothing here".into(), ProviderPayload::default());
        let resolver =
            Resolver::new(config(), primary, TableSecondary::default()).expect("resolver");

        let set = resolver
            .resolve(["rust", "nothing here"], Mode::Keyword, &Locale::new("us", "en"))
            .await
            .expect("resolve");

        assert_eq!(set.outcome("rust"), Some(Outcome::Success));
        assert_eq!(
            set.failure("nothing here").map(|f| f.reason.as_str()),
            Some(REASON_NO_RESULTS)
        );
        assert_eq!(resolver.secondary.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unanswered_keys_go_to_fallback() {
        let mut primary = TablePrimary::default();
        primary.answers.insert(
            "rust".into(),
            ProviderPayload::new(vec![organic("https://www.rust-lang.org")]),
        );
        let mut secondary = TableSecondary::default();
        secondary.answers.insert(
            "tokio".into(),
            ProviderPayload::new(vec![organic("https://tokio.rs")]),
        );
        let resolver = Resolver::new(config(), primary, secondary).expect("resolver");

        let set = resolver
            .resolve(["rust", "tokio", "serde"], Mode::Keyword, &Locale::new("us", "en"))
            .await
            .expect("resolve");

        assert_eq!(set.outcome("rust"), Some(Outcome::Success));
        assert_eq!(set.outcome("tokio"), Some(Outcome::Success));
        assert_eq!(set.outcome("serde"), Some(Outcome::Fail));
        assert!(set.is_complete());
        assert_eq!(resolver.secondary.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_secondary_pool_fails_residual() {
        let cfg = ResolveConfig {
            secondary: CredentialPool::default(),
            ..config()
        };
        let resolver = Resolver::new(cfg, TablePrimary::default(), TableSecondary::default())
            .expect("resolver");

        let set = resolver
            .resolve(["rust"], Mode::Keyword, &Locale::new("us", "en"))
            .await
            .expect("resolve");

        assert_eq!(set.outcome("rust"), Some(Outcome::Fail));
        assert_eq!(resolver.secondary.calls.load(Ordering::SeqCst), 0);
        // Both attempts were rejected as empty.
        assert_eq!(resolver.primary.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_primary_pool_is_fatal_before_any_call() {
        let cfg = ResolveConfig {
            primary: CredentialPool::default(),
            ..config()
        };
        let resolver = Resolver::new(cfg, TablePrimary::default(), TableSecondary::default())
            .expect("resolver");

        let err = resolver
            .resolve(["rust"], Mode::Keyword, &Locale::new("us", "en"))
            .await
            .unwrap_err();

        assert!(matches!(err, ResolveError::NoCredentialsAvailable(_)));
        assert_eq!(resolver.primary.calls.load(Ordering::SeqCst), 0);
        assert_eq!(resolver.secondary.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn only_invalid_urls_skip_providers() {
        let resolver = Resolver::new(config(), TablePrimary::default(), TableSecondary::default())
            .expect("resolver");

        let set = resolver
            .resolve(["not a url"], Mode::Url, &Locale::new("us", "en"))
            .await
            .expect("resolve");

        assert_eq!(
            set.failure("not a url").map(|f| f.reason.as_str()),
            Some(REASON_INVALID_URL)
        );
        assert_eq!(resolver.primary.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = ResolveConfig {
            max_attempts: 0,
            ..config()
        };
        let result = Resolver::new(cfg, TablePrimary::default(), TableSecondary::default());
        assert!(matches!(result, Err(ResolveError::Config(_))));
    }
}
