//! Envelope header shared by every message.

use bytes::{Buf, BufMut, BytesMut};

use crate::error::DecodeError;

/// Fixed magic at offset 0.
pub const PROTOCOL_MAGIC: u16 = 0xF6D5;
/// The only protocol version spoken.
pub const PROTOCOL_VERSION: u8 = 1;
/// Trailing byte of a poll request.
pub const TERMINATOR: u8 = 0x01;
/// magic + message type + version.
pub const HEADER_LEN: usize = 4;

/// Message discriminant at offset 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    PollState = 0,
    StateResponse = 1,
}

impl MessageType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(MessageType::PollState),
            1 => Some(MessageType::StateResponse),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Write the envelope header.
pub fn put_header(buf: &mut BytesMut, msg_type: MessageType) {
    buf.put_u16_le(PROTOCOL_MAGIC);
    buf.put_u8(msg_type.as_u8());
    buf.put_u8(PROTOCOL_VERSION);
}

/// Read and verify the envelope header, in wire order.
pub fn check_header<B: Buf>(buf: &mut B, expected: MessageType) -> Result<(), DecodeError> {
    need(buf, "magic", 2)?;
    let magic = buf.get_u16_le();
    if magic != PROTOCOL_MAGIC {
        return Err(DecodeError::InvalidMagic {
            expected: PROTOCOL_MAGIC,
            actual: magic,
        });
    }

    need(buf, "message type", 1)?;
    let msg_type = buf.get_u8();
    if msg_type != expected.as_u8() {
        return Err(DecodeError::UnexpectedMessageType {
            expected: expected.as_u8(),
            actual: msg_type,
        });
    }

    need(buf, "protocol version", 1)?;
    let version = buf.get_u8();
    if version != PROTOCOL_VERSION {
        return Err(DecodeError::UnsupportedVersion {
            expected: PROTOCOL_VERSION,
            actual: version,
        });
    }

    Ok(())
}

/// Fail with `TruncatedMessage` unless `needed` bytes remain.
pub(crate) fn need<B: Buf>(buf: &B, field: &'static str, needed: usize) -> Result<(), DecodeError> {
    if buf.remaining() < needed {
        return Err(DecodeError::TruncatedMessage {
            field,
            needed,
            remaining: buf.remaining(),
        });
    }
    Ok(())
}
