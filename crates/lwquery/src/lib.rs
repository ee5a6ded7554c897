//! Top-level facade crate for lwquery.
//!
//! Re-exports the wire codec and the client library so users can depend on a single crate.

pub mod core {
    pub use lwquery_core::*;
}

pub mod client {
    pub use lwquery_client::*;
}
