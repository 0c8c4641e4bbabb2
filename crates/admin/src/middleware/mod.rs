//! HTTP middleware and extractors for admin.
//!
//! # Layer Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with status and latency)
//! 3. Security headers (`X-Content-Type-Options: nosniff`)
//!
//! Store authentication is per handler through [`RequireStoreSession`].

pub mod auth;

pub use auth::{CONTEXT_PARAM, RequireStoreSession};
