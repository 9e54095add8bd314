//! Rocket Cart Core - Cart value types and persistence codec.
//!
//! This crate provides the types shared by every Rocket Cart component:
//! - `cart` - The cart engine (`CartStore`, API client, storage)
//! - `cli` - The `rcart` command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! storage access, no HTTP clients. Every cart operation here returns a fresh
//! [`Cart`] value instead of mutating in place, so callers decide when a new
//! state becomes current.
//!
//! # Modules
//!
//! - [`types`] - Product IDs, prices, products, line items and the cart
//! - [`codec`] - JSON encoding of a cart for the durable storage slot

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod codec;
pub mod types;

pub use codec::CodecError;
pub use types::*;
