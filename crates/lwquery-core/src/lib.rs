//! lwquery core: lightweight server-query wire codec, state model, and errors.
//!
//! This crate defines the byte layout of the poll/state-response exchange and
//! the error surface shared by the client and tooling. It carries no socket or
//! runtime dependencies so it can be reused by responders and fuzzers alike.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Every malformed datagram surfaces as a `DecodeError` so a hostile or
//! corrupt peer can never take the caller down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared error and result types.
pub use error::{DecodeError, EncodeError, LwQueryError, Result, TransportError};
