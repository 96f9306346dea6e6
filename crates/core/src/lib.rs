//! Export Apparels Core - Shared types library.
//!
//! This crate provides common types used across the Export Apparels
//! storefront components:
//! - `storefront` - cart, catalog and order flow library
//! - `integration-tests` - cross-module test harness
//!
//! # Architecture
//!
//! The core crate contains only types and helpers - no I/O, no HTTP clients,
//! no storage access. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, emails, order statuses, and
//!   currency display helpers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
