//! Concrete ranking-data provider clients.

pub mod dataforseo;
pub mod locations;
pub mod serp;

pub use dataforseo::DataForSeoProvider;
pub use serp::SerpProvider;
