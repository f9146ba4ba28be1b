//! Axum integration for the warden credential engine.
//!
//! The engine itself is framework-agnostic; this crate supplies the HTTP
//! route handlers, the origin extractor, and the taxonomy-to-status mapping.

pub mod error;
pub mod extract;
pub mod routes;

pub use error::ApiError;
pub use extract::origin_from_headers;
