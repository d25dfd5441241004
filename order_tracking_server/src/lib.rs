//! # Order Tracking Server
//! This module hosts the HTTP surface of the order tracking system. It is a thin plumbing layer: every handler
//! deserializes its request, calls into the engine's API objects and maps the outcome to an HTTP response. No
//! business rules live here.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! All functional routes live under the `/api` scope; see [routes](routes/index.html). A `/health` route is exposed
//! at the root for liveness checks.

pub mod config;
pub mod data_objects;
pub mod errors;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
