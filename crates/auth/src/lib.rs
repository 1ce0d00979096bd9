//! Interactive login: open the broker's login page, wait for the redirect to
//! land in the shared [`Session`](kitemcp_core::Session), then exchange the
//! authorization code for an access token.

pub mod browser;
pub mod handshake;

pub use browser::{Browser, NoBrowser, SystemBrowser};
pub use handshake::{run_handshake, HandshakeConfig, HandshakeError};
