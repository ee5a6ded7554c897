//! Poll request (client -> server).

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::envelope::{check_header, need, put_header, MessageType, HEADER_LEN, TERMINATOR};
use crate::error::DecodeError;

/// header + cookie + terminator.
pub const POLL_REQUEST_LEN: usize = HEADER_LEN + 8 + 1;

/// Poll for the server state. The cookie is an opaque correlation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollRequest {
    pub cookie: u64,
}

impl PollRequest {
    pub fn new(cookie: u64) -> Self {
        Self { cookie }
    }

    /// Encode into the exact 13-byte wire form. Total: fixed-width fields only.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(POLL_REQUEST_LEN);
        put_header(&mut buf, MessageType::PollState);
        buf.put_u64_le(self.cookie);
        buf.put_u8(TERMINATOR);
        buf.freeze()
    }
}

/// Encode a poll request for `cookie`.
pub fn encode_poll_request(cookie: u64) -> Bytes {
    PollRequest::new(cookie).encode()
}

/// Decode a poll request (responder side).
pub fn decode_poll_request(mut buf: &[u8]) -> Result<PollRequest, DecodeError> {
    check_header(&mut buf, MessageType::PollState)?;

    need(&buf, "cookie", 8)?;
    let cookie = buf.get_u64_le();

    need(&buf, "terminator", 1)?;
    let terminator = buf.get_u8();
    if terminator != TERMINATOR {
        return Err(DecodeError::InvalidTerminator { actual: terminator });
    }

    Ok(PollRequest { cookie })
}
