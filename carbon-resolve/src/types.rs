//! Core types shared by the canonicaliser, providers, matcher and orchestrator.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// What kind of values a resolution batch contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Each item is a URL; results are matched by registrable domain.
    Url,
    /// Each item is a free-text keyword; every organic result is kept.
    Keyword,
}

impl Mode {
    /// Returns the lowercase wire name of this mode.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::Keyword => "keyword",
        }
    }

    /// Maximum number of matches kept per item.
    pub fn match_cap(&self) -> usize {
        match self {
            Self::Url => 3,
            Self::Keyword => 10,
        }
    }

    /// Parses a wire name (`"url"` or `"keyword"`), case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "url" => Some(Self::Url),
            "keyword" => Some(Self::Keyword),
            _ => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Country and language a search is localised to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale {
    /// ISO-3166 alpha-2 country code (any case).
    pub country: String,
    /// Language code, e.g. `"en"` or `"tr"`.
    pub language: String,
}

impl Locale {
    /// Creates a locale from a country and language code.
    pub fn new(country: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            language: language.into(),
        }
    }
}

/// A single ranked entry as returned by a provider.
///
/// Providers send `null` for fields that do not apply to a result kind, so
/// every field falls back to its default when missing or null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultEntry {
    /// 1-based rank reported by the provider (0 when absent).
    #[serde(default, alias = "rank_group", deserialize_with = "null_as_default")]
    pub rank: u32,
    /// Result kind, e.g. `"organic"`, `"paid"`, `"featured_snippet"`.
    #[serde(default, rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    /// Page title.
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Snippet or description.
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Result URL.
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ResultEntry {
    /// Returns `true` for natural (non-paid) listings.
    pub fn is_organic(&self) -> bool {
        self.kind.eq_ignore_ascii_case("organic")
    }
}

/// Every entry a provider returned for one key, in the provider's ranking order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderPayload {
    /// Ranked result entries.
    pub entries: Vec<ResultEntry>,
}

impl ProviderPayload {
    /// Creates a payload from ranked entries.
    pub fn new(entries: Vec<ResultEntry>) -> Self {
        Self { entries }
    }

    /// Returns `true` if the provider returned no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decode raw JSON entries, skipping any that are not objects of the
    /// expected shape.
    pub fn from_raw(raw: Vec<serde_json::Value>) -> Self {
        let entries = raw
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<ResultEntry>(value) {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::trace!(error = %err, "skipping malformed result entry");
                    None
                }
            })
            .collect();
        Self { entries }
    }
}

/// One matched result kept for a successful item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEntry {
    /// Page title (may be empty in URL mode).
    pub title: String,
    /// Snippet or description (may be empty in URL mode).
    pub description: String,
    /// Result URL.
    pub url: String,
}

impl From<&ResultEntry> for MatchEntry {
    fn from(entry: &ResultEntry) -> Self {
        Self {
            title: entry.title.clone(),
            description: entry.description.clone(),
            url: entry.url.clone(),
        }
    }
}
