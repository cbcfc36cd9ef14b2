//! Abstraction layers for external dependencies
//!
//! This module provides trait-based abstractions for the provider's HTTP API
//! to enable testing and dependency injection.

pub mod transport;

pub use transport::{MockTransport, OrderTransport, ReqwestTransport, TransportResponse};
