//! Host-testable library for keybridge.
//!
//! Everything that does not touch hardware lives here: framing, queues,
//! the cross-core channel, report emission, liveness supervision and the
//! diagnostic log. The embedded binary (`main.rs`, feature `embedded`)
//! wires these into the RP2040's two cores.
//!
//! Usage: `cargo test --lib` or `cargo test`
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main].

#![cfg_attr(not(test), no_std)]

// Must come first so the logging macros are visible to every module.
#[macro_use]
mod fmt;

pub mod bridge;
pub mod channel;
pub mod config;
pub mod diag;
pub mod emitter;
pub mod error;
pub mod hid;
pub mod liveness;
pub mod protocol;
pub mod queue;
pub mod ring;
pub mod time;

pub use error::Error;
