//! lwquery client library entry.
//!
//! This crate wires the UDP transport, the core wire codec, config loading,
//! and report rendering into the `query_state` interface. It is consumed by
//! the binary (`main.rs`) and by integration tests.

pub mod config;
pub mod query;
pub mod report;
pub mod transport;

pub use query::{new_cookie, query_state, query_state_with};
pub use transport::QueryOptions;
