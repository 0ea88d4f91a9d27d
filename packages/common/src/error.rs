//! Codec errors for bridge message encoding and decoding

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CodecError {
    #[error("Message too short: expected at least {expected} bytes, got {got}")]
    TooShort { expected: usize, got: usize },

    #[error("Invalid message prefix")]
    InvalidPrefix,

    #[error("Unknown message type: {message_type}")]
    UnknownMessageType { message_type: u8 },

    #[error("Unsupported version {version} for message type {message_type}")]
    UnsupportedVersion { message_type: u8, version: u8 },

    #[error("Truncated payload: need {needed} bytes at offset {offset}")]
    TruncatedPayload { offset: usize, needed: usize },

    #[error("Payload has {remaining} trailing bytes")]
    TrailingBytes { remaining: usize },

    #[error("Invalid payload: {reason}")]
    InvalidPayload { reason: String },
}
