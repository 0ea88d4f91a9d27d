//! Common - Canonical Bridge Message Codec for CL8Y Committee Bridges
//!
//! Every verifier of committee-signed bridge actions (the TerraClassic
//! contract, relayers, the counterpart chain) must agree byte-for-byte on how
//! a message is laid out and hashed. This package is the single definition of
//! that layout.
//!
//! # Wire format
//! ```text
//! "CL8Y_BRIDGE_MESSAGE" | type (1) | version (1) | nonce (8, BE) | source chain (1) | payload
//! ```
//!
//! # Signing digest
//! ```text
//! keccak256(intent (3) | wire bytes)
//! ```

pub mod action;
pub mod error;
pub mod hash;
pub mod message;

pub use action::{
    AddTokensPayload, BlocklistPayload, BlocklistType, BridgeAction, EmergencyOp,
    LimitUpdatePayload, TokenPrice, TokenTransferPayload,
};
pub use error::CodecError;
pub use hash::{bytes32_to_hex, keccak256, message_digest, Intent};
pub use message::{BridgeMessage, MessageType, BRIDGE_MESSAGE_PREFIX};
