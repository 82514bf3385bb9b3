//! Resolution orchestrator: primary with retry, fallback for the residual.
//!
//! [`Resolver`] is generic over the provider traits so tests can inject
//! mocks. [`resolve`] wires up the production SERP API and DataForSEO
//! clients.

pub mod resolve;
pub mod retry;

pub use resolve::Resolver;
pub use retry::{query_with_retry, Attempt};

use crate::config::ResolveConfig;
use crate::error::ResolveError;
use crate::providers::{DataForSeoProvider, SerpProvider};
use crate::set::ResolutionSet;
use crate::types::{Locale, Mode};

/// Resolve `values` with the production providers.
///
/// # Errors
///
/// Returns [`ResolveError::Config`] for an invalid configuration,
/// [`ResolveError::Http`] if an HTTP client cannot be built, and
/// [`ResolveError::NoCredentialsAvailable`] if the primary pool has no
/// usable credential.
pub async fn resolve<I, T>(
    values: I,
    mode: Mode,
    locale: &Locale,
    config: &ResolveConfig,
) -> Result<ResolutionSet, ResolveError>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    config.validate()?;
    let primary = SerpProvider::new(config)?;
    let secondary = DataForSeoProvider::new(config)?;
    let resolver = Resolver::new(config.clone(), primary, secondary)?;
    resolver.resolve(values, mode, locale).await
}
