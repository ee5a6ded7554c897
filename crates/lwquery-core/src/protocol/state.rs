//! Server state response (server -> client).

use std::borrow::Cow;
use std::fmt;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::Serialize;

use super::envelope::{check_header, need, put_header, MessageType, HEADER_LEN};
use crate::error::{DecodeError, EncodeError};

/// Responses shorter than this are rejected before any field is read.
///
/// Note: the fixed fields actually span 26 bytes; anything between 22 and 26
/// fails on the first field that does not fit.
pub const MIN_RESPONSE_LEN: usize = 22;

/// id (u8) + version (u16).
const SUB_STATE_LEN: usize = 3;

/// header + cookie + state + net cl + flags + sub-state count + name length.
const FIXED_LEN: usize = HEADER_LEN + 8 + 1 + 4 + 8 + 1 + 2;

/// Server lifecycle state. Unknown discriminants are kept, not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerState {
    Offline,
    Idle,
    Loading,
    Playing,
    /// Discriminant this client does not know yet.
    Unknown(u8),
}

impl ServerState {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => ServerState::Offline,
            1 => ServerState::Idle,
            2 => ServerState::Loading,
            3 => ServerState::Playing,
            v => ServerState::Unknown(v),
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            ServerState::Offline => 0,
            ServerState::Idle => 1,
            ServerState::Loading => 2,
            ServerState::Playing => 3,
            ServerState::Unknown(v) => v,
        }
    }

    /// Display label; empty for unknown states.
    pub fn label(self) -> &'static str {
        match self {
            ServerState::Offline => "Offline",
            ServerState::Idle => "Idle",
            ServerState::Loading => "Loading",
            ServerState::Playing => "Playing",
            ServerState::Unknown(_) => "",
        }
    }
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Versioned subsystem marker reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubState {
    pub id: u8,
    pub version: u16,
}

/// Decoded state response. Lives for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerStateResponse {
    /// Echoed correlation value.
    pub cookie: u64,
    pub server_state: ServerState,
    /// Network build id (opaque).
    pub server_net_cl: u32,
    /// Flag bits (opaque).
    pub server_flags: u64,
    /// In wire order.
    pub sub_states: Vec<SubState>,
    /// Raw name bytes, may be empty.
    pub server_name: Bytes,
}

impl ServerStateResponse {
    /// Server name as text, replacing invalid UTF-8.
    pub fn name_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.server_name)
    }

    /// Exact encoded size.
    pub fn encoded_len(&self) -> usize {
        FIXED_LEN + self.sub_states.len() * SUB_STATE_LEN + self.server_name.len()
    }

    /// Encode into wire form (responder side).
    pub fn encode(&self) -> Result<Bytes, EncodeError> {
        let num_sub_states =
            u8::try_from(self.sub_states.len()).map_err(|_| EncodeError::FieldTooLarge {
                field: "sub_states",
                len: self.sub_states.len(),
                max: u8::MAX as usize,
            })?;
        let name_len =
            u16::try_from(self.server_name.len()).map_err(|_| EncodeError::FieldTooLarge {
                field: "server_name",
                len: self.server_name.len(),
                max: u16::MAX as usize,
            })?;

        let mut buf = BytesMut::with_capacity(self.encoded_len());
        put_header(&mut buf, MessageType::StateResponse);
        buf.put_u64_le(self.cookie);
        buf.put_u8(self.server_state.as_u8());
        buf.put_u32_le(self.server_net_cl);
        buf.put_u64_le(self.server_flags);
        buf.put_u8(num_sub_states);
        for s in &self.sub_states {
            buf.put_u8(s.id);
            buf.put_u16_le(s.version);
        }
        buf.put_u16_le(name_len);
        buf.put_slice(&self.server_name);
        Ok(buf.freeze())
    }
}

/// Decode a state response.
///
/// Strict forward-only parse: header, fixed fields, sub-states, name. The
/// buffer end is the hard limit; declared lengths that overrun it fail with
/// `TruncatedMessage`. Trailing bytes after the name are ignored.
pub fn decode_state_response(data: &[u8]) -> Result<ServerStateResponse, DecodeError> {
    if data.len() < MIN_RESPONSE_LEN {
        return Err(DecodeError::TruncatedMessage {
            field: "response",
            needed: MIN_RESPONSE_LEN,
            remaining: data.len(),
        });
    }

    let mut buf = data;
    check_header(&mut buf, MessageType::StateResponse)?;

    need(&buf, "cookie", 8)?;
    let cookie = buf.get_u64_le();

    need(&buf, "server state", 1)?;
    let server_state = ServerState::from_u8(buf.get_u8());

    need(&buf, "server net cl", 4)?;
    let server_net_cl = buf.get_u32_le();

    need(&buf, "server flags", 8)?;
    let server_flags = buf.get_u64_le();

    need(&buf, "sub-state count", 1)?;
    let num_sub_states = buf.get_u8() as usize;

    // Checked before allocating: the count is peer-controlled.
    need(&buf, "sub-states", num_sub_states * SUB_STATE_LEN)?;
    let mut sub_states = Vec::with_capacity(num_sub_states);
    for _ in 0..num_sub_states {
        let id = buf.get_u8();
        let version = buf.get_u16_le();
        sub_states.push(SubState { id, version });
    }

    need(&buf, "server name length", 2)?;
    let name_len = buf.get_u16_le() as usize;

    need(&buf, "server name", name_len)?;
    let server_name = buf.copy_to_bytes(name_len);

    if buf.has_remaining() {
        tracing::trace!(trailing = buf.remaining(), "ignoring bytes after server name");
    }

    Ok(ServerStateResponse {
        cookie,
        server_state,
        server_net_cl,
        server_flags,
        sub_states,
        server_name,
    })
}

/// Cookie of a state response, if the header is valid and the cookie present.
pub fn peek_cookie(data: &[u8]) -> Option<u64> {
    let mut buf = data;
    check_header(&mut buf, MessageType::StateResponse).ok()?;
    if buf.remaining() < 8 {
        return None;
    }
    Some(buf.get_u64_le())
}
