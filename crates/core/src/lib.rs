//! Bundle Stock Core - Shared domain types and bundle arithmetic.
//!
//! This crate provides the types used by every bundle stock component:
//! - `admin` - JSON API and admin page served inside the BigCommerce control panel
//! - `cli` - Command-line stock report
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. Everything that talks to BigCommerce lives in the admin crate and
//! feeds snapshots into the functions here.
//!
//! # Modules
//!
//! - [`types`] - Typed ids, the metafield contract, linked component parsing,
//!   bundle records and search filtering

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
