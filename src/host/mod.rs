//! Host-facing contracts and the stdio bridge.

pub mod contract;
pub mod stdio;
