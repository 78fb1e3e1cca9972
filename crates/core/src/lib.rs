//! Nordic Aroma Core - Shared types library.
//!
//! This crate provides common types used across all Nordic Aroma components:
//! - `storefront` - Public-facing e-commerce service (shipping quotes,
//!   abandoned-cart recovery)
//! - `cli` - Command-line tools for migrations and maintenance
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, statuses,
//!   and recovery tokens

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
