//! Internal (privileged) accounts and per-caller item limits.
//!
//! Account passwords are stored as lowercase sha256 hex digests. A caller
//! that names no account is public and gets the public limit; a caller that
//! authenticates gets its account limit, where `-1` means unlimited.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Limit value meaning "no limit".
pub const UNLIMITED: i64 = -1;

/// One internal account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account name, matched exactly.
    pub name: String,
    /// sha256 hex digest of the password.
    pub password: String,
    /// Maximum items per request, or [`UNLIMITED`].
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    UNLIMITED
}

/// The JSON document carried by `INTERNAL_ACCOUNTS_JSON`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountsDocument {
    #[serde(default)]
    pub accounts: Vec<Account>,
}

/// Who is making a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    /// No account supplied.
    Public,
    /// Authenticated internal account.
    Privileged { name: String, limit: i64 },
}

/// Why authentication failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("password is empty")]
    MissingPassword,
    #[error("authorization is not valid")]
    Invalid,
}

impl Caller {
    /// Returns `true` for authenticated internal accounts.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Self::Privileged { .. })
    }

    /// Check `count` submitted items against this caller's limit.
    ///
    /// # Errors
    ///
    /// Returns the user-facing message when the limit is exceeded.
    pub fn check_limit(&self, count: usize, public_limit: usize) -> Result<(), String> {
        let limit = match self {
            Self::Public => public_limit,
            Self::Privileged { limit, .. } if *limit == UNLIMITED => return Ok(()),
            Self::Privileged { limit, .. } => usize::try_from(*limit).unwrap_or(0),
        };
        if count > limit {
            return Err(format!("you have more than {limit} items"));
        }
        Ok(())
    }
}

/// Lowercase sha256 hex digest of `password`.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Identify the caller from optional account credentials.
///
/// # Errors
///
/// Returns [`AuthError::MissingPassword`] when a name is given without a
/// password and [`AuthError::Invalid`] when no account matches.
pub fn authenticate(
    accounts: &[Account],
    name: Option<&str>,
    password: Option<&str>,
) -> Result<Caller, AuthError> {
    let Some(name) = name else {
        return Ok(Caller::Public);
    };
    let Some(password) = password else {
        return Err(AuthError::MissingPassword);
    };

    let digest = hash_password(password);
    accounts
        .iter()
        .find(|a| a.name == name && a.password.eq_ignore_ascii_case(&digest))
        .map(|a| {
            tracing::debug!(account = %a.name, limit = a.limit, "internal account authenticated");
            Caller::Privileged {
                name: a.name.clone(),
                limit: a.limit,
            }
        })
        .ok_or(AuthError::Invalid)
}
