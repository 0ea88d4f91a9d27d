//! Committee signature verification.
//!
//! A message is authorized when the summed weight of distinct, recognized
//! committee members that signed its digest reaches the threshold configured
//! for its message type. Verification is read-only; nonce handling and the
//! payload effects belong to the caller.
//!
//! Signatures are recoverable secp256k1 over the 32-byte digest:
//! `r (32) | s (32) | v (1)` with `v` in `{0, 1, 27, 28}`.

use bridge_common::BridgeMessage;
use cosmwasm_std::{Api, Binary, Storage};

use crate::error::ContractError;
use crate::state::{COMMITTEE_MEMBERS, MAX_COMMITTEE_MEMBERS, THRESHOLDS};

pub const SIGNATURE_LENGTH: usize = 65;
pub const COMPRESSED_KEY_LENGTH: usize = 33;

pub type CommitteeKey = [u8; COMPRESSED_KEY_LENGTH];

/// Keys already counted in one verification call, scanned linearly.
/// Capacity is the committee size bound.
struct SeenSigners {
    keys: [CommitteeKey; MAX_COMMITTEE_MEMBERS],
    len: usize,
}

impl SeenSigners {
    fn new() -> Self {
        Self {
            keys: [[0u8; COMPRESSED_KEY_LENGTH]; MAX_COMMITTEE_MEMBERS],
            len: 0,
        }
    }

    /// Returns false if `key` was already present.
    fn insert(&mut self, key: CommitteeKey) -> bool {
        if self.keys[..self.len].contains(&key) {
            return false;
        }
        // Only committee members reach this point and the committee never
        // exceeds MAX_COMMITTEE_MEMBERS distinct keys.
        if self.len == self.keys.len() {
            return false;
        }
        self.keys[self.len] = key;
        self.len += 1;
        true
    }
}

/// Verify `signatures` over `message` and return the counted weight.
pub fn verify_signatures(
    api: &dyn Api,
    storage: &dyn Storage,
    message: &BridgeMessage,
    signatures: &[Binary],
) -> Result<u64, ContractError> {
    // Unknown types fail closed before any signature work
    let required = THRESHOLDS
        .may_load(storage, message.message_type)?
        .ok_or(ContractError::UnsupportedMessageType {
            message_type: message.message_type,
        })?;

    let digest = message.digest();
    let mut seen = SeenSigners::new();
    let mut total_weight: u64 = 0;

    for signature in signatures {
        let key = recover_signer(api, &digest, signature)?;

        let member = COMMITTEE_MEMBERS
            .may_load(storage, &key)?
            .ok_or(ContractError::InvalidSignature)?;

        if !seen.insert(key) {
            return Err(ContractError::DuplicatedSignature {
                member: hex::encode(key),
            });
        }

        if !member.blocklisted {
            total_weight += u64::from(member.weight);
        }
    }

    if total_weight < required {
        return Err(ContractError::BelowThreshold {
            got: total_weight,
            required,
        });
    }

    Ok(total_weight)
}

/// Recover the compressed public key that produced `signature` over `digest`.
pub fn recover_signer(
    api: &dyn Api,
    digest: &[u8; 32],
    signature: &[u8],
) -> Result<CommitteeKey, ContractError> {
    if signature.len() != SIGNATURE_LENGTH {
        return Err(ContractError::InvalidSignature);
    }

    let recovery_param = match signature[64] {
        v @ (0 | 1) => v,
        v @ (27 | 28) => v - 27,
        _ => return Err(ContractError::InvalidSignature),
    };

    let uncompressed = api
        .secp256k1_recover_pubkey(digest, &signature[..64], recovery_param)
        .map_err(|_| ContractError::InvalidSignature)?;

    compress_public_key(&uncompressed).ok_or(ContractError::InvalidSignature)
}

/// SEC1 compression of a 65-byte uncompressed secp256k1 point.
pub fn compress_public_key(uncompressed: &[u8]) -> Option<CommitteeKey> {
    if uncompressed.len() != 65 || uncompressed[0] != 0x04 {
        return None;
    }
    let mut compressed = [0u8; COMPRESSED_KEY_LENGTH];
    compressed[0] = if uncompressed[64] & 1 == 0 { 0x02 } else { 0x03 };
    compressed[1..].copy_from_slice(&uncompressed[1..33]);
    Some(compressed)
}

/// Validate a configured member key: compressed SEC1 form only.
pub fn parse_member_key(bytes: &[u8]) -> Result<CommitteeKey, ContractError> {
    let key: CommitteeKey = bytes
        .try_into()
        .map_err(|_| ContractError::InvalidCommittee {
            reason: format!(
                "public key must be {} compressed bytes, got {}",
                COMPRESSED_KEY_LENGTH,
                bytes.len()
            ),
        })?;
    if key[0] != 0x02 && key[0] != 0x03 {
        return Err(ContractError::InvalidCommittee {
            reason: "public key must start with 0x02 or 0x03".to_string(),
        });
    }
    Ok(key)
}
