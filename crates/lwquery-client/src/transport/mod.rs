//! Transport layer (UDP).
//!
//! One query owns one socket for its whole retry loop; nothing is shared
//! between concurrent queries.

pub mod udp;

pub use udp::{send_query, QueryOptions, DEFAULT_RECV_TIMEOUT, MAX_DATAGRAM_LEN};
