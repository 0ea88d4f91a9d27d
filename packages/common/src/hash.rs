//! Hashing and signing-digest computation for committee verification
//!
//! The committee signs `keccak256(intent | encoded message)`. The encoded
//! message already starts with the wire prefix, so a signature carries two
//! layers of domain separation: the wire tag pins the protocol and the intent
//! pins what the key material is being used for.

use tiny_keccak::{Hasher, Keccak};

use crate::message::BridgeMessage;

/// Length of the intent prefix hashed in front of every signed message
pub const INTENT_PREFIX_LENGTH: usize = 3;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum IntentScope {
    BridgeAction = 1,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum IntentVersion {
    V0 = 0,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum AppId {
    Cl8yBridge = 0,
}

/// Signing intent: what a committee key is asserting when it signs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Intent {
    pub scope: IntentScope,
    pub version: IntentVersion,
    pub app_id: AppId,
}

impl Intent {
    pub fn bridge_action() -> Self {
        Self {
            scope: IntentScope::BridgeAction,
            version: IntentVersion::V0,
            app_id: AppId::Cl8yBridge,
        }
    }

    pub fn to_bytes(&self) -> [u8; INTENT_PREFIX_LENGTH] {
        [self.scope as u8, self.version as u8, self.app_id as u8]
    }
}

/// Compute keccak256 hash of arbitrary data
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// Digest the committee signs for `message`.
pub fn message_digest(message: &BridgeMessage) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(&Intent::bridge_action().to_bytes());
    hasher.update(&message.encode());
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// Convert 32-byte hash to hex string (for attributes/logging)
pub fn bytes32_to_hex(bytes: &[u8; 32]) -> String {
    format!("0x{}", hex::encode(bytes))
}
