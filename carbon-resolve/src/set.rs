//! Deduplicated item sets and the per-request resolution state.
//!
//! [`UrlSet`] and [`KeywordSet`] canonicalise raw submissions and collapse
//! duplicates (first occurrence wins). A [`ResolutionSet`] is built from
//! either one and tracks every key through `pending → success | fail`.

use std::collections::HashMap;

use serde::Serialize;

use crate::canonical::{canonicalize_keyword, canonicalize_url, UrlParts};
use crate::types::{MatchEntry, Mode};

/// Fail reason for submissions that are not usable URLs.
pub const REASON_INVALID_URL: &str = "not a valid URL";

/// Fail reason for items no provider found relevant results for.
pub const REASON_NO_RESULTS: &str = "no related results found";

/// One canonicalised submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// The value as submitted.
    pub original: String,
    /// Canonical dedup key, also sent to providers as the query.
    pub key: String,
    /// Domain and path keywords (URL mode only).
    pub url: Option<UrlParts>,
}

impl Item {
    /// Registrable domain results must belong to, if this is a URL item.
    pub fn base_domain(&self) -> Option<&str> {
        self.url.as_ref().map(|parts| parts.base_domain.as_str())
    }
}

/// Matches kept for an item that resolved successfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuccessRecord {
    /// The value as submitted.
    pub original: String,
    /// Matches in provider ranking order, bounded by [`Mode::match_cap`].
    pub matches: Vec<MatchEntry>,
    /// Matched URL closest to the original submission (URL mode only).
    pub suggested_match: Option<String>,
}

impl SuccessRecord {
    /// Matched URLs in ranking order.
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.matches.iter().map(|m| m.url.as_str())
    }
}

/// Why an item could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailRecord {
    /// The value as submitted.
    pub original: String,
    /// Human-readable reason.
    pub reason: String,
}

/// A collection of canonicalised items that can be resolved.
///
/// Implemented by [`UrlSet`] and [`KeywordSet`].
pub trait ItemSet {
    /// Which mode the items were canonicalised for.
    fn mode(&self) -> Mode;

    /// Canonicalise and add one raw submission. Duplicates are ignored.
    fn add(&mut self, raw: &str);

    /// Canonical keys in insertion order.
    fn keys(&self) -> Vec<String>;

    /// Look up the item stored under a canonical key.
    fn item(&self, key: &str) -> Option<&Item>;

    /// Submissions that failed canonicalisation, in insertion order.
    fn rejected(&self) -> &[FailRecord] {
        &[]
    }

    /// Add every value in order.
    fn extend<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        Self: Sized,
    {
        for value in values {
            self.add(value.as_ref());
        }
    }
}

/// Ordered, deduplicated storage shared by both set variants.
#[derive(Debug, Default)]
struct Entries {
    items: Vec<Item>,
    index: HashMap<String, usize>,
}

impl Entries {
    fn insert(&mut self, item: Item) {
        if self.index.contains_key(&item.key) {
            return;
        }
        self.index.insert(item.key.clone(), self.items.len());
        self.items.push(item);
    }

    fn keys(&self) -> Vec<String> {
        self.items.iter().map(|item| item.key.clone()).collect()
    }

    fn get(&self, key: &str) -> Option<&Item> {
        self.index.get(key).map(|&i| &self.items[i])
    }
}

/// Deduplicated URL submissions keyed by `base_domain + path keywords`.
#[derive(Debug, Default)]
pub struct UrlSet {
    entries: Entries,
    rejected: Vec<FailRecord>,
}

impl UrlSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ItemSet for UrlSet {
    fn mode(&self) -> Mode {
        Mode::Url
    }

    fn add(&mut self, raw: &str) {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return;
        }
        match canonicalize_url(trimmed) {
            Ok(parts) => self.entries.insert(Item {
                original: trimmed.to_string(),
                key: parts.key(),
                url: Some(parts),
            }),
            Err(err) => {
                tracing::debug!(error = %err, "rejected URL submission");
                if !self.rejected.iter().any(|r| r.original == trimmed) {
                    self.rejected.push(FailRecord {
                        original: trimmed.to_string(),
                        reason: REASON_INVALID_URL.to_string(),
                    });
                }
            }
        }
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys()
    }

    fn item(&self, key: &str) -> Option<&Item> {
        self.entries.get(key)
    }

    fn rejected(&self) -> &[FailRecord] {
        &self.rejected
    }
}

/// Deduplicated keyword submissions keyed by their trimmed text.
#[derive(Debug, Default)]
pub struct KeywordSet {
    entries: Entries,
}

impl KeywordSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ItemSet for KeywordSet {
    fn mode(&self) -> Mode {
        Mode::Keyword
    }

    fn add(&mut self, raw: &str) {
        if let Some(key) = canonicalize_keyword(raw) {
            self.entries.insert(Item {
                original: key.clone(),
                key,
                url: None,
            });
        }
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys()
    }

    fn item(&self, key: &str) -> Option<&Item> {
        self.entries.get(key)
    }
}

/// Where a key currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Not yet resolved.
    Pending,
    /// Resolved with at least one match.
    Success,
    /// Resolved without a usable match.
    Fail,
}

/// Resolution state for one request.
///
/// Records are keyed by canonical key; the submitted value is kept on each
/// record for display. A key lives in exactly one of the three collections,
/// and transitions out of `pending` are final.
///
/// Submissions rejected before canonicalisation have no key. They are kept
/// in their own list so their text never shadows, or is shadowed by, a
/// canonical key, and they are reported after the keyed fails.
#[derive(Debug, Clone)]
pub struct ResolutionSet {
    mode: Mode,
    order: Vec<String>,
    pending: HashMap<String, Item>,
    successes: HashMap<String, SuccessRecord>,
    fails: HashMap<String, FailRecord>,
    rejected: Vec<FailRecord>,
}

impl ResolutionSet {
    /// Creates an empty resolution set.
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            order: Vec::new(),
            pending: HashMap::new(),
            successes: HashMap::new(),
            fails: HashMap::new(),
            rejected: Vec::new(),
        }
    }

    /// Canonicalise `values` for `mode` and build the initial state.
    pub fn from_values<I, S>(mode: Mode, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        match mode {
            Mode::Url => {
                let mut set = UrlSet::new();
                set.extend(values);
                Self::from_item_set(&set)
            }
            Mode::Keyword => {
                let mut set = KeywordSet::new();
                set.extend(values);
                Self::from_item_set(&set)
            }
        }
    }

    /// Build the initial state from an already populated item set.
    ///
    /// Every canonical key becomes pending and every rejected submission
    /// becomes a fail.
    pub fn from_item_set(set: &dyn ItemSet) -> Self {
        let mut resolution = Self::new(set.mode());
        for key in set.keys() {
            if let Some(item) = set.item(&key) {
                resolution.insert_pending(item.clone());
            }
        }
        resolution.rejected = set.rejected().to_vec();
        resolution
    }

    fn insert_pending(&mut self, item: Item) {
        if self.outcome(&item.key).is_some() {
            return;
        }
        self.order.push(item.key.clone());
        self.pending.insert(item.key.clone(), item);
    }

    /// The mode this set was built for.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Pending keys in insertion order.
    pub fn pending_keys(&self) -> Vec<String> {
        self.order
            .iter()
            .filter(|key| self.pending.contains_key(*key))
            .cloned()
            .collect()
    }

    /// The pending item stored under `key`.
    pub fn pending_item(&self, key: &str) -> Option<&Item> {
        self.pending.get(key)
    }

    /// Number of pending items.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` once no key is pending.
    pub fn is_complete(&self) -> bool {
        self.pending.is_empty()
    }

    /// Current outcome of `key`, or `None` if the key is unknown.
    ///
    /// Canonical keys are checked first; otherwise a rejected submission with
    /// that exact text reports [`Outcome::Fail`].
    pub fn outcome(&self, key: &str) -> Option<Outcome> {
        if self.pending.contains_key(key) {
            Some(Outcome::Pending)
        } else if self.successes.contains_key(key) {
            Some(Outcome::Success)
        } else if self.fails.contains_key(key) || self.rejected_record(key).is_some() {
            Some(Outcome::Fail)
        } else {
            None
        }
    }

    fn rejected_record(&self, original: &str) -> Option<&FailRecord> {
        self.rejected.iter().find(|r| r.original == original)
    }

    /// Move a pending key to `successes`. Returns `false` if the key was not pending.
    pub fn succeed(
        &mut self,
        key: &str,
        matches: Vec<MatchEntry>,
        suggested_match: Option<String>,
    ) -> bool {
        let Some(item) = self.pending.remove(key) else {
            return false;
        };
        self.successes.insert(
            item.key,
            SuccessRecord {
                original: item.original,
                matches,
                suggested_match,
            },
        );
        true
    }

    /// Move a pending key to `fails`. Returns `false` if the key was not pending.
    pub fn fail(&mut self, key: &str, reason: impl Into<String>) -> bool {
        let Some(item) = self.pending.remove(key) else {
            return false;
        };
        self.fails.insert(
            item.key,
            FailRecord {
                original: item.original,
                reason: reason.into(),
            },
        );
        true
    }

    /// Fail every key still pending with the same reason.
    pub fn fail_remaining(&mut self, reason: &str) {
        for key in self.pending_keys() {
            self.fail(&key, reason);
        }
    }

    /// Successful records in insertion order.
    pub fn successes(&self) -> impl Iterator<Item = (&str, &SuccessRecord)> {
        self.order
            .iter()
            .filter_map(|key| self.successes.get(key).map(|r| (key.as_str(), r)))
    }

    /// Failed records in insertion order, followed by rejected submissions
    /// keyed by their submitted text.
    pub fn fails(&self) -> impl Iterator<Item = (&str, &FailRecord)> {
        self.order
            .iter()
            .filter_map(|key| self.fails.get(key).map(|r| (key.as_str(), r)))
            .chain(self.rejected.iter().map(|r| (r.original.as_str(), r)))
    }

    /// Submissions rejected before canonicalisation.
    pub fn rejected(&self) -> &[FailRecord] {
        &self.rejected
    }

    /// The success record for `key`.
    pub fn success(&self, key: &str) -> Option<&SuccessRecord> {
        self.successes.get(key)
    }

    /// The fail record for `key`, falling back to a rejected submission
    /// with that exact text.
    pub fn failure(&self, key: &str) -> Option<&FailRecord> {
        self.fails.get(key).or_else(|| self.rejected_record(key))
    }

    /// Number of successful keys.
    pub fn success_len(&self) -> usize {
        self.successes.len()
    }

    /// Number of failed keys plus rejected submissions.
    pub fn fail_len(&self) -> usize {
        self.fails.len() + self.rejected.len()
    }

    /// Total number of distinct keys and rejected submissions tracked.
    pub fn len(&self) -> usize {
        self.order.len() + self.rejected.len()
    }

    /// Returns `true` if nothing was submitted.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty() && self.rejected.is_empty()
    }
}
