//! Shared error types across lwquery crates.

use thiserror::Error;

/// Stable error codes (used by diagnostics and test vectors).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Envelope magic did not match.
    InvalidMagic,
    /// Envelope carried another message type.
    UnexpectedMessageType,
    /// Unsupported protocol version.
    UnsupportedVersion,
    /// Buffer ended before a field could be read.
    TruncatedMessage,
    /// Poll request terminator byte was wrong.
    InvalidTerminator,
    /// A field does not fit its wire width.
    FieldTooLarge,
    /// Target address could not be resolved.
    ResolveFailed,
    /// Local datagram socket could not be opened.
    SocketOpenFailed,
    /// Request could not be sent.
    SendFailed,
    /// No usable response within the retry budget.
    RetriesExhausted,
    /// Invalid configuration.
    BadConfig,
}

impl ErrorCode {
    /// String representation used in logs and test vectors.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidMagic => "INVALID_MAGIC",
            ErrorCode::UnexpectedMessageType => "UNEXPECTED_MESSAGE_TYPE",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::TruncatedMessage => "TRUNCATED_MESSAGE",
            ErrorCode::InvalidTerminator => "INVALID_TERMINATOR",
            ErrorCode::FieldTooLarge => "FIELD_TOO_LARGE",
            ErrorCode::ResolveFailed => "RESOLVE_FAILED",
            ErrorCode::SocketOpenFailed => "SOCKET_OPEN_FAILED",
            ErrorCode::SendFailed => "SEND_FAILED",
            ErrorCode::RetriesExhausted => "RETRIES_EXHAUSTED",
            ErrorCode::BadConfig => "BAD_CONFIG",
        }
    }
}

/// Structural decode failures. Never defaulted, always surfaced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid magic, expected {expected:#06x}, got {actual:#06x}")]
    InvalidMagic { expected: u16, actual: u16 },
    #[error("unexpected message type, expected {expected}, got {actual}")]
    UnexpectedMessageType { expected: u8, actual: u8 },
    #[error("unsupported protocol version, expected {expected}, got {actual}")]
    UnsupportedVersion { expected: u8, actual: u8 },
    #[error("truncated message: {field} needs {needed} bytes, {remaining} remaining")]
    TruncatedMessage {
        field: &'static str,
        needed: usize,
        remaining: usize,
    },
    #[error("invalid terminator {actual:#04x}")]
    InvalidTerminator { actual: u8 },
}

/// Encode failures. Poll requests cannot fail; responses can carry
/// collections that overflow their length prefix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("{field} too large: {len} exceeds {max}")]
    FieldTooLarge {
        field: &'static str,
        len: usize,
        max: usize,
    },
}

/// Datagram exchange failures.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("resolve {address} failed: {reason}")]
    Resolve { address: String, reason: String },
    #[error("socket open failed: {0}")]
    SocketOpen(#[source] std::io::Error),
    #[error("send failed: {0}")]
    Send(#[source] std::io::Error),
    #[error("no response after {attempts} retries")]
    RetriesExhausted { attempts: usize },
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, LwQueryError>;

/// Unified error type used by core and client.
#[derive(Debug, Error)]
pub enum LwQueryError {
    #[error("decode: {0}")]
    Decode(#[from] DecodeError),
    #[error("encode: {0}")]
    Encode(#[from] EncodeError),
    #[error("transport: {0}")]
    Transport(#[from] TransportError),
    #[error("config: {0}")]
    Config(String),
}

impl LwQueryError {
    /// Map to a stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            LwQueryError::Decode(e) => match e {
                DecodeError::InvalidMagic { .. } => ErrorCode::InvalidMagic,
                DecodeError::UnexpectedMessageType { .. } => ErrorCode::UnexpectedMessageType,
                DecodeError::UnsupportedVersion { .. } => ErrorCode::UnsupportedVersion,
                DecodeError::TruncatedMessage { .. } => ErrorCode::TruncatedMessage,
                DecodeError::InvalidTerminator { .. } => ErrorCode::InvalidTerminator,
            },
            LwQueryError::Encode(EncodeError::FieldTooLarge { .. }) => ErrorCode::FieldTooLarge,
            LwQueryError::Transport(e) => match e {
                TransportError::Resolve { .. } => ErrorCode::ResolveFailed,
                TransportError::SocketOpen(_) => ErrorCode::SocketOpenFailed,
                TransportError::Send(_) => ErrorCode::SendFailed,
                TransportError::RetriesExhausted { .. } => ErrorCode::RetriesExhausted,
            },
            LwQueryError::Config(_) => ErrorCode::BadConfig,
        }
    }
}
