//! Bounded retry of the primary provider across rotated credentials.
//!
//! Each attempt is classified as [`Attempt::Accepted`] or
//! [`Attempt::Rejected`]; the driver is a plain loop over at most
//! `max_attempts` attempts, each with the next credential in rotation.

use std::collections::HashMap;

use crate::credentials::Rotation;
use crate::error::ResolveError;
use crate::provider::PrimaryProvider;
use crate::types::{Locale, ProviderPayload};

/// Outcome of one primary attempt.
#[derive(Debug)]
pub enum Attempt {
    /// The provider returned usable data for at least one key.
    Accepted(HashMap<String, ProviderPayload>),
    /// The attempt failed or returned nothing usable.
    Rejected(String),
}

impl Attempt {
    /// Classify a raw provider result.
    ///
    /// A response is accepted only if at least one key has a non-empty
    /// result list; errors and all-empty responses are rejected.
    pub fn classify(result: Result<HashMap<String, ProviderPayload>, ResolveError>) -> Self {
        match result {
            Ok(payloads) if payloads.values().any(|p| !p.is_empty()) => Self::Accepted(payloads),
            Ok(payloads) => Self::Rejected(format!(
                "no results for any of {} returned keys",
                payloads.len()
            )),
            Err(err) => Self::Rejected(err.to_string()),
        }
    }
}

/// Query the primary provider until an attempt is accepted or
/// `max_attempts` is reached.
///
/// # Errors
///
/// Returns [`ResolveError::ProviderUnavailable`] when every attempt was
/// rejected. The last rejection reason is included in the message.
pub async fn query_with_retry<P: PrimaryProvider>(
    provider: &P,
    keys: &[String],
    locale: &Locale,
    depth: u32,
    rotation: Rotation<'_>,
    max_attempts: usize,
) -> Result<HashMap<String, ProviderPayload>, ResolveError> {
    let mut last_reason = String::from("no attempt made");

    for (attempt, credential) in rotation.take(max_attempts).enumerate() {
        let result = provider.query(keys, locale, depth, credential).await;

        match Attempt::classify(result) {
            Attempt::Accepted(payloads) => {
                tracing::debug!(
                    provider = provider.name(),
                    attempt = attempt + 1,
                    keys = payloads.len(),
                    "primary attempt accepted"
                );
                return Ok(payloads);
            }
            Attempt::Rejected(reason) => {
                tracing::warn!(
                    provider = provider.name(),
                    attempt = attempt + 1,
                    max_attempts,
                    endpoint = %credential.endpoint,
                    reason = %reason,
                    "primary attempt rejected"
                );
                last_reason = reason;
            }
        }
    }

    Err(ResolveError::ProviderUnavailable(format!(
        "{} rejected {max_attempts} attempts, last: {last_reason}",
        provider.name()
    )))
}
