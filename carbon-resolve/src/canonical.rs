//! Canonicalisation of submitted values into dedup keys.
//!
//! A URL is reduced to its registrable domain plus the keywords found in its
//! path, so that equivalent submissions (different subdomains, extensions,
//! or separators) collapse to the same key and the key itself is a usable
//! search query. Keywords are only trimmed.

use crate::error::ResolveError;
use url::{Host, Url};

/// Country-code top-level domains. A hostname ending in one of these keeps
/// three labels for its registrable domain (`example.co.uk`), provided it
/// has more than two labels.
const COUNTRY_TLDS: &[&str] = &[
    "ac", "ad", "ae", "af", "ag", "ai", "al", "am", "ao", "aq", "ar", "as", "at", "au", "aw",
    "ax", "az", "ba", "bb", "bd", "be", "bf", "bg", "bh", "bi", "bj", "bm", "bn", "bo", "bq",
    "br", "bs", "bt", "bw", "by", "bz", "ca", "cc", "cd", "cf", "cg", "ch", "ci", "ck", "cl",
    "cm", "cn", "co", "cr", "cu", "cv", "cw", "cx", "cy", "cz", "de", "dj", "dk", "dm", "do",
    "dz", "ec", "ee", "eg", "eh", "er", "es", "et", "eu", "fi", "fj", "fk", "fm", "fo", "fr",
    "ga", "gd", "ge", "gf", "gg", "gh", "gi", "gl", "gm", "gn", "gp", "gq", "gr", "gs", "gt",
    "gu", "gw", "gy", "hk", "hm", "hn", "hr", "ht", "hu", "id", "ie", "il", "im", "in", "io",
    "iq", "ir", "is", "it", "je", "jm", "jo", "jp", "ke", "kg", "kh", "ki", "km", "kn", "kp",
    "kr", "kw", "ky", "kz", "la", "lb", "lc", "li", "lk", "lr", "ls", "lt", "lu", "lv", "ly",
    "ma", "mc", "md", "me", "mg", "mh", "mk", "ml", "mm", "mn", "mo", "mp", "mq", "mr", "ms",
    "mt", "mu", "mv", "mw", "mx", "my", "mz", "na", "nc", "ne", "nf", "ng", "ni", "nl", "no",
    "np", "nr", "nu", "nz", "om", "pa", "pe", "pf", "pg", "ph", "pk", "pl", "pm", "pn", "pr",
    "ps", "pt", "pw", "py", "qa", "re", "ro", "rs", "ru", "rw", "sa", "sb", "sc", "sd", "se",
    "sg", "sh", "si", "sk", "sl", "sm", "sn", "so", "sr", "ss", "st", "su", "sv", "sx", "sy",
    "sz", "tc", "td", "tf", "tg", "th", "tj", "tk", "tl", "tm", "tn", "to", "tr", "tt", "tv",
    "tw", "tz", "ua", "ug", "uk", "us", "uy", "uz", "va", "vc", "ve", "vg", "vi", "vn", "vu",
    "wf", "ws", "ye", "yt", "za", "zm", "zw",
];

/// Characters that separate words in a URL path.
const PATH_SEPARATORS: &[char] = &['/', '\\', '-', '_', '.'];

/// File extensions dropped from path keywords.
const IGNORED_EXTENSIONS: &[&str] = &["html", "js", "php", "aspx"];

/// The pieces of a URL that identify it for matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParts {
    /// Registrable domain, e.g. `example.co.uk`.
    pub base_domain: String,
    /// Space-separated words from the path, e.g. `archlinux install`.
    pub path_keywords: String,
}

impl UrlParts {
    /// The canonical key: `base_domain`, followed by the path keywords when
    /// there are any.
    pub fn key(&self) -> String {
        if self.path_keywords.is_empty() {
            self.base_domain.clone()
        } else {
            format!("{} {}", self.base_domain, self.path_keywords)
        }
    }
}

/// Split a submitted URL into its registrable domain and path keywords.
///
/// # Errors
///
/// Returns [`ResolveError::InvalidInput`] if the value is not an absolute URL
/// with a scheme and a domain hostname of at least two labels (three when the
/// hostname ends in a country-code TLD and has more than two labels).
///
/// # Examples
///
/// ```
/// use carbon_resolve::canonical::canonicalize_url;
///
/// let parts = canonicalize_url("https://text.blog.example.co.uk/a-b.html").unwrap();
/// assert_eq!(parts.base_domain, "example.co.uk");
/// assert_eq!(parts.path_keywords, "a b");
/// ```
pub fn canonicalize_url(raw: &str) -> Result<UrlParts, ResolveError> {
    let parsed = Url::parse(raw.trim())
        .map_err(|e| ResolveError::InvalidInput(format!("not a valid URL: {e}")))?;

    let host = match parsed.host() {
        Some(Host::Domain(domain)) => domain.to_ascii_lowercase(),
        _ => {
            return Err(ResolveError::InvalidInput(
                "not a valid URL: missing domain hostname".into(),
            ))
        }
    };

    let base_domain = registrable_domain(&host).ok_or_else(|| {
        ResolveError::InvalidInput(format!("not a valid URL: hostname {host} is too short"))
    })?;

    Ok(UrlParts {
        base_domain,
        path_keywords: path_keywords(parsed.path()),
    })
}

/// Registrable domain of a hostname: its last two labels, or its last three
/// when the final label is a country-code TLD and there are more than two.
///
/// Returns `None` when the hostname has too few labels.
pub fn registrable_domain(host: &str) -> Option<String> {
    let labels: Vec<&str> = host
        .trim_end_matches('.')
        .split('.')
        .filter(|label| !label.is_empty())
        .collect();

    let last = labels.last()?.to_ascii_lowercase();
    let count = if labels.len() > 2 && COUNTRY_TLDS.contains(&last.as_str()) {
        3
    } else {
        2
    };

    if labels.len() < count {
        return None;
    }

    Some(labels[labels.len() - count..].join(".").to_ascii_lowercase())
}

/// Registrable domain of an arbitrary result URL, if it has one.
pub fn url_domain(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw.trim()).ok()?;
    match parsed.host()? {
        Host::Domain(domain) => registrable_domain(domain),
        _ => None,
    }
}

/// Canonical key for a keyword submission: the trimmed text, or `None` if
/// nothing is left after trimming.
pub fn canonicalize_keyword(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn path_keywords(path: &str) -> String {
    path.split(PATH_SEPARATORS)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter(|token| {
            !IGNORED_EXTENSIONS
                .iter()
                .any(|ext| token.eq_ignore_ascii_case(ext))
        })
        .collect::<Vec<_>>()
        .join(" ")
}
