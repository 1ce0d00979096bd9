//! Kite Connect broker adapter.
//!
//! Talks to the Kite Connect v3 REST API: JSON envelopes for account data,
//! CSV dumps for instrument lists, and a checksum-signed token exchange for
//! the login flow.

pub mod client;
pub mod protocol;

pub use client::{KiteClient, KiteConfig};
