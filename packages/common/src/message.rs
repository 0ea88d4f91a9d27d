//! Bridge message envelope
//!
//! # Byte Layout
//! - Bytes 0-18:  "CL8Y_BRIDGE_MESSAGE" (19 bytes, wire prefix)
//! - Byte 19:     message type
//! - Byte 20:     message version
//! - Bytes 21-28: nonce (u64, big-endian)
//! - Byte 29:     source chain id
//! - Bytes 30-:   payload (type-specific, see `action`)
//!
//! The payload has no length field; it is everything after the header. The
//! typed payload decoders in `action` reject trailing bytes, which is where
//! over-long messages are caught.

use cosmwasm_schema::cw_serde;

use crate::error::CodecError;
use crate::hash::message_digest;

pub const BRIDGE_MESSAGE_PREFIX: &[u8] = b"CL8Y_BRIDGE_MESSAGE";

/// type (1) + version (1) + nonce (8) + source chain (1)
pub const MESSAGE_HEADER_LENGTH: usize = 11;

pub const TOKEN_TRANSFER_MESSAGE_VERSION: u8 = 1;
pub const COMMITTEE_BLOCKLIST_MESSAGE_VERSION: u8 = 1;
pub const EMERGENCY_BUTTON_MESSAGE_VERSION: u8 = 1;
pub const LIMIT_UPDATE_MESSAGE_VERSION: u8 = 1;
pub const UPDATE_TOKEN_PRICES_MESSAGE_VERSION: u8 = 1;
pub const ADD_TOKENS_MESSAGE_VERSION: u8 = 1;

/// Message types understood by this verifier.
///
/// Code 5 is the counterpart chain's contract-upgrade action and is never
/// verifiable here.
#[cw_serde]
#[derive(Copy, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum MessageType {
    TokenTransfer = 0,
    UpdateCommitteeBlocklist = 1,
    EmergencyButton = 2,
    LimitUpdate = 3,
    UpdateTokenPrices = 4,
    AddTokens = 6,
}

impl MessageType {
    pub const ALL: [MessageType; 6] = [
        MessageType::TokenTransfer,
        MessageType::UpdateCommitteeBlocklist,
        MessageType::EmergencyButton,
        MessageType::LimitUpdate,
        MessageType::UpdateTokenPrices,
        MessageType::AddTokens,
    ];

    /// The only version a decoder accepts for this type.
    pub fn version(self) -> u8 {
        match self {
            MessageType::TokenTransfer => TOKEN_TRANSFER_MESSAGE_VERSION,
            MessageType::UpdateCommitteeBlocklist => COMMITTEE_BLOCKLIST_MESSAGE_VERSION,
            MessageType::EmergencyButton => EMERGENCY_BUTTON_MESSAGE_VERSION,
            MessageType::LimitUpdate => LIMIT_UPDATE_MESSAGE_VERSION,
            MessageType::UpdateTokenPrices => UPDATE_TOKEN_PRICES_MESSAGE_VERSION,
            MessageType::AddTokens => ADD_TOKENS_MESSAGE_VERSION,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MessageType::TokenTransfer => "token_transfer",
            MessageType::UpdateCommitteeBlocklist => "update_committee_blocklist",
            MessageType::EmergencyButton => "emergency_button",
            MessageType::LimitUpdate => "limit_update",
            MessageType::UpdateTokenPrices => "update_token_prices",
            MessageType::AddTokens => "add_tokens",
        }
    }

    /// Governance actions originate on this chain; transfers originate elsewhere.
    pub fn is_governance(self) -> bool {
        !matches!(self, MessageType::TokenTransfer)
    }
}

impl TryFrom<u8> for MessageType {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        MessageType::ALL
            .into_iter()
            .find(|t| *t as u8 == value)
            .ok_or(CodecError::UnknownMessageType {
                message_type: value,
            })
    }
}

/// Raw, not yet authenticated bridge message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgeMessage {
    pub message_type: u8,
    pub version: u8,
    pub nonce: u64,
    pub source_chain: u8,
    pub payload: Vec<u8>,
}

impl BridgeMessage {
    /// Canonical wire bytes, prefix included.
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(
            BRIDGE_MESSAGE_PREFIX.len() + MESSAGE_HEADER_LENGTH + self.payload.len(),
        );
        bytes.extend_from_slice(BRIDGE_MESSAGE_PREFIX);
        bytes.push(self.message_type);
        bytes.push(self.version);
        bytes.extend_from_slice(&self.nonce.to_be_bytes());
        bytes.push(self.source_chain);
        bytes.extend_from_slice(&self.payload);
        bytes
    }

    /// Exact inverse of [`BridgeMessage::encode`].
    ///
    /// Unknown message types decode successfully so that the committee can
    /// reject them with a type error; known types must carry their version.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let min_len = BRIDGE_MESSAGE_PREFIX.len() + MESSAGE_HEADER_LENGTH;
        if bytes.len() < min_len {
            return Err(CodecError::TooShort {
                expected: min_len,
                got: bytes.len(),
            });
        }

        let (prefix, rest) = bytes.split_at(BRIDGE_MESSAGE_PREFIX.len());
        if prefix != BRIDGE_MESSAGE_PREFIX {
            return Err(CodecError::InvalidPrefix);
        }

        let message_type = rest[0];
        let version = rest[1];
        let mut nonce_bytes = [0u8; 8];
        nonce_bytes.copy_from_slice(&rest[2..10]);
        let source_chain = rest[10];
        let payload = rest[MESSAGE_HEADER_LENGTH..].to_vec();

        if let Ok(kind) = MessageType::try_from(message_type) {
            if version != kind.version() {
                return Err(CodecError::UnsupportedVersion {
                    message_type,
                    version,
                });
            }
        }

        Ok(Self {
            message_type,
            version,
            nonce: u64::from_be_bytes(nonce_bytes),
            source_chain,
            payload,
        })
    }

    pub fn kind(&self) -> Result<MessageType, CodecError> {
        MessageType::try_from(self.message_type)
    }

    pub fn digest(&self) -> [u8; 32] {
        message_digest(self)
    }
}
