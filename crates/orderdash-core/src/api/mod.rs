//! REST API transport module for the dashboard backend.
//!
//! This module provides the `Transport` capability and the reqwest-backed
//! `ApiClient` implementing it, plus `DashboardApi`, the typed loaders for
//! customers, orders, users and aggregate statistics.
//!
//! The API authenticates with a session cookie; every request forwards the
//! caller's `Cookie` header through a `RequestContext`.

pub mod client;
pub mod dashboard;
pub mod error;

#[cfg(test)]
pub(crate) mod fake;

pub use client::{ApiClient, RequestContext, Transport};
pub use dashboard::DashboardApi;
pub use error::ApiError;
