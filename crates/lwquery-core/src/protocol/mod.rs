//! Lightweight query wire format.
//!
//! Every message is an envelope: `magic (u16) | message type (u8) | version (u8)`
//! followed by a type-specific payload. Poll requests end with a terminator
//! byte; state responses do not. All integers are little-endian.
//!
//! All parsers are panic-free: they read through `bytes::Buf` after checking
//! `remaining()`, so a short or hostile datagram becomes a `DecodeError`
//! instead of an out-of-bounds read.

pub mod envelope;
pub mod poll;
pub mod state;

pub use envelope::{MessageType, PROTOCOL_MAGIC, PROTOCOL_VERSION, TERMINATOR};
pub use poll::{decode_poll_request, encode_poll_request, PollRequest, POLL_REQUEST_LEN};
pub use state::{
    decode_state_response, peek_cookie, ServerState, ServerStateResponse, SubState,
    MIN_RESPONSE_LEN,
};
