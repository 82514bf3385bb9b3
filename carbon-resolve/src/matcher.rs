//! Matching provider payloads against the item that was searched for.
//!
//! URL items keep organic results on the same registrable domain (at most
//! 3) and pick the closest one by edit distance as the suggested match.
//! Keyword items keep every organic result with a URL (at most 10).
//! Entries that do not qualify are skipped, never treated as errors.

use crate::canonical::url_domain;
use crate::set::Item;
use crate::types::{MatchEntry, Mode, ProviderPayload};

/// Matches found for one item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    /// Matches in provider ranking order.
    pub matches: Vec<MatchEntry>,
    /// Closest matched URL to the submitted value (URL items only).
    pub suggested_match: Option<String>,
}

impl MatchResult {
    /// Returns `true` if at least one entry matched.
    pub fn found(&self) -> bool {
        !self.matches.is_empty()
    }
}

/// Match `payload` against `item`.
pub fn match_payload(item: &Item, payload: &ProviderPayload) -> MatchResult {
    match item.base_domain() {
        Some(domain) => {
            let matches = match_domain(domain, payload);
            let suggested_match = suggest(&item.original, &matches);
            MatchResult {
                matches,
                suggested_match,
            }
        }
        None => MatchResult {
            matches: match_keyword(payload),
            suggested_match: None,
        },
    }
}

/// Organic entries whose registrable domain equals `domain`, capped for URL mode.
pub fn match_domain(domain: &str, payload: &ProviderPayload) -> Vec<MatchEntry> {
    payload
        .entries
        .iter()
        .filter(|entry| entry.is_organic())
        .filter(|entry| url_domain(&entry.url).is_some_and(|d| d.eq_ignore_ascii_case(domain)))
        .take(Mode::Url.match_cap())
        .map(MatchEntry::from)
        .collect()
}

/// Organic entries with a non-empty URL, capped for keyword mode.
pub fn match_keyword(payload: &ProviderPayload) -> Vec<MatchEntry> {
    payload
        .entries
        .iter()
        .filter(|entry| entry.is_organic() && !entry.url.trim().is_empty())
        .take(Mode::Keyword.match_cap())
        .map(MatchEntry::from)
        .collect()
}

/// The matched URL with the smallest Levenshtein distance to `original`.
///
/// Ties go to the higher-ranked match.
pub fn suggest(original: &str, matches: &[MatchEntry]) -> Option<String> {
    matches
        .iter()
        .enumerate()
        .min_by_key(|(rank, m)| (strsim::levenshtein(original, &m.url), *rank))
        .map(|(_, m)| m.url.clone())
}
