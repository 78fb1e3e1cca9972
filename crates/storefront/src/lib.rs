//! Nordic Aroma Storefront library.
//!
//! This crate provides the storefront functionality as a library,
//! allowing it to be tested and reused.
//!
//! # Subsystems
//!
//! - [`shipping`] - Multi-carrier shipping-rate computation for the
//!   Swedish market (carrier catalog, postal zones, rate engine)
//! - [`services`] - Abandoned-cart reminder job, cart recovery resolver,
//!   and the recovery email sender
//! - [`db`] - `PostgreSQL` repositories behind narrow lookup/store traits
//! - [`routes`] - Thin JSON handlers delegating to the above

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod shipping;
pub mod state;
