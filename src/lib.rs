//! # order-digest
//!
//! Monthly summaries of delivered orders from the Zepto order history API.
//!
//! ## Usage
//!
//! ```bash
//! order-digest summary [--month N | --previous] [--format json] [--sort count --desc]
//! ```
//!
//! ## Modules
//!
//! - `abstractions` - Trait-based HTTP transport with a scripted mock
//! - `auth` - Session cookies and per-request signature derivation
//! - `cli` - Argument parsing and command handlers
//! - `client` - Single page fetch and response validation
//! - `config` - Configuration file and environment overrides
//! - `error` - Crate-wide error type
//! - `orders` - Order model, month filter, aggregator and pagination controller
//! - `report` - Sorting, per-day grouping and output formats
//! - `service` - The `OrderDigest` entry point with last-result-wins runs
//! - `testing` - Testing utilities and fixtures for comprehensive testing
pub mod abstractions;
pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod orders;
pub mod report;
pub mod service;

pub mod testing;

pub use error::{Error, Result};
pub use service::OrderDigest;

#[cfg(test)]
mod property_tests;
