//! Landed-cost estimates for importing drones from the US into Argentina.
//!
//! The engine in [`domain`] is pure and synchronous. [`infra`] holds the
//! eBay listings client and the analysis stores that feed and consume it.

pub mod config;
pub mod domain;
pub mod infra;
pub mod util;
