//! Carbon: SERP alternative-URL and keyword reports.
//!
//! Callers submit a batch of URLs (or, for internal accounts, keywords)
//! together with a country and language. Each item is resolved against
//! search-engine result data and the outcome is returned as a two-table
//! report.
//!
//! # Architecture
//!
//! - **Request shell** (`request`): method/parameter checks, account auth, limits
//! - **Resolution** (`carbon-resolve`): dedup, primary provider with retry, fallback, matching
//! - **Report** (`report`): success/fail tables rendered as JSON or TSV
//! - **Host** (`host`): newline-delimited JSON over stdin/stdout

pub mod accounts;
pub mod config;
pub mod error;
pub mod host;
pub mod report;
pub mod request;

pub use config::CarbonConfig;
pub use error::{CarbonError, Result};
pub use report::{Format, Report};
pub use request::{Request, Response, handle};
