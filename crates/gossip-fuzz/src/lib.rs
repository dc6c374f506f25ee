//! Fuzzing library for gossip-oauth.
//!
//! This crate provides fuzzing targets for the parsers that see attacker-controlled input:
//! the `Authorization: Basic` header and the client-supplied callback URL.
//!
//! # Usage
//!
//! ```bash
//! cd crates/gossip-fuzz
//! cargo +nightly fuzz run fuzz_basic_credentials -- -max_total_time=60
//! ```

pub use gossip_oauth::{credentials, urls};
