//! Export Apparels storefront library.
//!
//! The storefront is a small apparel shop with manual WhatsApp fulfillment:
//! products live in a remote document store, the shopping cart lives in a
//! client-local durable slot, and a submitted order is written back to the
//! document store before the customer is handed off to the vendor's WhatsApp.
//!
//! # Modules
//!
//! - [`cart`] - the cart state machine and its persistence contract
//! - [`catalog`] - read-only document store client plus product filtering
//! - [`orders`] - order construction, submission, tracking and hand-off
//! - [`storage`] - durable key-value slot backends
//! - [`config`] - environment configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod orders;
pub mod storage;
