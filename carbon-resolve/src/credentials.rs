//! Provider credential pools and per-call rotation.
//!
//! A [`CredentialPool`] is an ordered list of endpoint/secret pairs. Each
//! resolution asks the pool for a fresh [`Rotation`], which starts at a
//! uniformly random usable entry and then walks the pool cyclically. The
//! pool itself is never mutated, so it can be shared across calls.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ResolveError;

/// One provider endpoint and the secret used to authenticate against it.
///
/// A secret of the form `user:password` is sent as HTTP basic auth; any
/// other secret is sent as a bearer token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Provider endpoint URL.
    #[serde(alias = "address")]
    pub endpoint: String,
    /// Authentication secret.
    #[serde(alias = "key")]
    pub secret: String,
}

impl Credential {
    /// Creates a credential.
    pub fn new(endpoint: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            secret: secret.into(),
        }
    }

    /// Returns `true` if both the endpoint and the secret are non-empty.
    pub fn is_usable(&self) -> bool {
        !self.endpoint.trim().is_empty() && !self.secret.trim().is_empty()
    }

    /// Attach this credential's authentication to a request.
    pub fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.secret.split_once(':') {
            Some((user, password)) => request.basic_auth(user, Some(password)),
            None => request.bearer_auth(&self.secret),
        }
    }
}

// Secrets never reach logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("endpoint", &self.endpoint)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// An ordered pool of provider credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPool {
    #[serde(alias = "keys")]
    credentials: Vec<Credential>,
    #[serde(skip)]
    fixed_start: Option<usize>,
}

impl CredentialPool {
    /// Creates a pool from credentials in rotation order.
    pub fn new(credentials: Vec<Credential>) -> Self {
        Self {
            credentials,
            fixed_start: None,
        }
    }

    /// Parse a pool from a JSON blob of the form
    /// `{"keys": [{"address": "...", "key": "..."}]}`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Config`] if the JSON cannot be decoded.
    pub fn from_json(json: &str) -> Result<Self, ResolveError> {
        serde_json::from_str(json)
            .map_err(|e| ResolveError::Config(format!("invalid credential JSON: {e}")))
    }

    /// Always start rotations at `index` (modulo the usable entries).
    pub fn with_start(mut self, index: usize) -> Self {
        self.fixed_start = Some(index);
        self
    }

    /// A copy of this pool where entries without an endpoint use `endpoint`.
    pub fn with_default_endpoint(&self, endpoint: &str) -> Self {
        let credentials = self
            .credentials
            .iter()
            .map(|c| {
                if c.endpoint.trim().is_empty() {
                    Credential::new(endpoint, c.secret.clone())
                } else {
                    c.clone()
                }
            })
            .collect();
        Self {
            credentials,
            fixed_start: self.fixed_start,
        }
    }

    /// All credentials, including unusable ones.
    pub fn credentials(&self) -> &[Credential] {
        &self.credentials
    }

    /// Returns `true` if the pool holds no credentials at all.
    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    /// Number of credentials with a non-empty endpoint and secret.
    pub fn usable_len(&self) -> usize {
        self.credentials.iter().filter(|c| c.is_usable()).count()
    }

    /// Start a new rotation over the usable credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::NoCredentialsAvailable`] if the pool is empty
    /// or no entry has both an endpoint and a secret.
    pub fn rotation(&self) -> Result<Rotation<'_>, ResolveError> {
        let usable: Vec<&Credential> = self.credentials.iter().filter(|c| c.is_usable()).collect();
        if usable.is_empty() {
            let reason = if self.credentials.is_empty() {
                "credential pool is empty"
            } else {
                "every credential has an empty endpoint or secret"
            };
            return Err(ResolveError::NoCredentialsAvailable(reason.into()));
        }

        let start = match self.fixed_start {
            Some(index) => index % usable.len(),
            None => rand::thread_rng().gen_range(0..usable.len()),
        };

        Ok(Rotation {
            usable,
            start,
            cursor: 0,
        })
    }
}

/// A cyclic walk over a pool's usable credentials.
///
/// The iterator never ends on its own; callers bound it by their retry
/// ceiling or by [`Rotation::len`] for a single pass.
#[derive(Debug, Clone)]
pub struct Rotation<'a> {
    usable: Vec<&'a Credential>,
    start: usize,
    cursor: usize,
}

impl<'a> Rotation<'a> {
    /// Number of distinct credentials in one full pass.
    pub fn len(&self) -> usize {
        self.usable.len()
    }

    /// A rotation always holds at least one credential.
    pub fn is_empty(&self) -> bool {
        self.usable.is_empty()
    }

    /// The credential `offset` steps after the rotation start, wrapping.
    pub fn nth_from_start(&self, offset: usize) -> &'a Credential {
        self.usable[(self.start + offset) % self.usable.len()]
    }
}

impl<'a> Iterator for Rotation<'a> {
    type Item = &'a Credential;

    fn next(&mut self) -> Option<Self::Item> {
        let credential = self.nth_from_start(self.cursor);
        self.cursor += 1;
        Some(credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(n: usize) -> CredentialPool {
        CredentialPool::new(
            (0..n)
                .map(|i| Credential::new(format!("https://p{i}.example"), format!("secret-{i}")))
                .collect(),
        )
    }

    #[test]
    fn empty_pool_has_no_rotation() {
        let err = CredentialPool::default().rotation().unwrap_err();
        assert!(matches!(err, ResolveError::NoCredentialsAvailable(_)));
    }

    #[test]
    fn unusable_entries_are_skipped() {
        let pool = CredentialPool::new(vec![
            Credential::new("", "secret"),
            Credential::new("https://ok.example", "secret"),
            Credential::new("https://nosecret.example", " "),
        ]);
        assert_eq!(pool.usable_len(), 1);
        let mut rotation = pool.rotation().expect("rotation");
        assert_eq!(rotation.len(), 1);
        assert_eq!(
            rotation.next().map(|c| c.endpoint.as_str()),
            Some("https://ok.example")
        );
    }

    #[test]
    fn all_unusable_is_no_credentials() {
        let pool = CredentialPool::new(vec![Credential::new("", ""), Credential::new("", "")]);
        let err = pool.rotation().unwrap_err();
        assert!(err.to_string().contains("empty endpoint or secret"));
    }

    #[test]
    fn rotation_is_cyclic_from_fixed_start() {
        let pool = pool(3).with_start(1);
        let order: Vec<&str> = pool
            .rotation()
            .expect("rotation")
            .take(5)
            .map(|c| c.endpoint.as_str())
            .collect();
        assert_eq!(
            order,
            vec![
                "https://p1.example",
                "https://p2.example",
                "https://p0.example",
                "https://p1.example",
                "https://p2.example",
            ]
        );
    }

    #[test]
    fn random_start_visits_every_credential_in_one_pass() {
        let pool = pool(4);
        for _ in 0..20 {
            let rotation = pool.rotation().expect("rotation");
            let pass = rotation.len();
            let mut seen: Vec<&str> = rotation.take(pass).map(|c| c.endpoint.as_str()).collect();
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), 4);
        }
    }

    #[test]
    fn fixed_start_wraps_modulo_len() {
        let pool = pool(2).with_start(5);
        let first = pool.rotation().expect("rotation").next().expect("credential");
        assert_eq!(first.endpoint, "https://p1.example");
    }

    #[test]
    fn from_json_accepts_address_key_shape() {
        let pool = CredentialPool::from_json(
            r#"{"keys": [{"address": "https://serp.example/api", "key": "user:pass"}]}"#,
        )
        .expect("parse");
        assert_eq!(pool.credentials().len(), 1);
        assert_eq!(pool.credentials()[0].endpoint, "https://serp.example/api");
        assert_eq!(pool.credentials()[0].secret, "user:pass");
    }

    #[test]
    fn from_json_rejects_garbage() {
        let err = CredentialPool::from_json("not json").unwrap_err();
        assert!(matches!(err, ResolveError::Config(_)));
    }

    #[test]
    fn default_endpoint_fills_blank_entries() {
        let pool = CredentialPool::new(vec![
            Credential::new("", "user:pass"),
            Credential::new("https://own.example", "token"),
        ])
        .with_default_endpoint("https://fallback.example");
        assert_eq!(pool.credentials()[0].endpoint, "https://fallback.example");
        assert_eq!(pool.credentials()[1].endpoint, "https://own.example");
        assert_eq!(pool.usable_len(), 2);
    }

    #[test]
    fn debug_redacts_secret() {
        let credential = Credential::new("https://p.example", "top-secret");
        let rendered = format!("{credential:?}");
        assert!(rendered.contains("https://p.example"));
        assert!(!rendered.contains("top-secret"));
    }
}
