//! Domain models for the admin app.
//!
//! Bundle records themselves live in `bundle_stock_core`; this module holds
//! request-scoped state that only the server needs.

pub mod session;

pub use session::{SessionResolver, SignedContextResolver, StoreSession};
