//! Error types for the CL8Y committee bridge contract
//!
//! Every variant aborts the whole execute call; the host rolls back all
//! storage writes made before the error.

use bridge_common::CodecError;
use cosmwasm_std::StdError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    // ========================================================================
    // Codec Errors
    // ========================================================================

    #[error("Malformed message: {reason}")]
    MalformedMessage { reason: String },

    // ========================================================================
    // Committee Errors
    // ========================================================================

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Duplicated signature from committee member {member}")]
    DuplicatedSignature { member: String },

    #[error("Signatures below threshold: got weight {got}, need {required}")]
    BelowThreshold { got: u64, required: u64 },

    #[error("Unsupported message type: {message_type}")]
    UnsupportedMessageType { message_type: u8 },

    #[error("Unknown committee member: {member}")]
    UnknownCommitteeMember { member: String },

    #[error("Blocklist update leaves active weight {active_weight} below threshold {required}")]
    CommitteeLockout { active_weight: u64, required: u64 },

    #[error("Invalid committee: {reason}")]
    InvalidCommittee { reason: String },

    #[error("Invalid threshold for message type {message_type}: {reason}")]
    InvalidThreshold { message_type: u8, reason: String },

    // ========================================================================
    // Nonce & Routing Errors
    // ========================================================================

    #[error("Stale nonce for message type {message_type}: got {nonce}, last accepted {last}")]
    StaleNonce {
        message_type: u8,
        nonce: u64,
        last: u64,
    },

    #[error("Unexpected chain id: expected {expected}, got {got}")]
    UnexpectedChainId { expected: u8, got: u8 },

    #[error("Cannot bridge to chain {chain_id}")]
    InvalidTargetChain { chain_id: u8 },

    #[error("Bridge is paused")]
    BridgePaused,

    // ========================================================================
    // Treasury Errors
    // ========================================================================

    #[error("Unsupported token type: {token}")]
    UnsupportedTokenType { token: String },

    #[error("Invalid upgrade authority for {token}: admin must be the bridge")]
    InvalidUpgradeAuthority { token: String },

    #[error("Mint authority for {token} has not been granted to the bridge")]
    MintAuthorityNotGranted { token: String },

    #[error("Token supply must be zero at registration: {token} has {supply}")]
    TokenSupplyNonZero { token: String, supply: String },

    #[error("Token already registered: {token}")]
    TokenAlreadyRegistered { token: String },

    #[error("Registration not found: {token}")]
    RegistrationNotFound { token: String },

    #[error("Token id already used: {token_id}")]
    TokenIdAlreadyUsed { token_id: u8 },

    #[error("Invalid notional value for token {token_id}")]
    InvalidNotionalValue { token_id: u8 },

    #[error("Unsupported token decimals: {decimals}")]
    InvalidDecimals { decimals: u8 },

    // ========================================================================
    // Transfer Errors
    // ========================================================================

    #[error("Transfer not found: chain {source_chain}, nonce {nonce}")]
    TransferNotFound { source_chain: u8, nonce: u64 },

    #[error("Transfer already claimed: chain {source_chain}, nonce {nonce}")]
    TransferAlreadyClaimed { source_chain: u8, nonce: u64 },

    #[error("Transfer limit exceeded for route from chain {source_chain}")]
    TransferLimitExceeded { source_chain: u8 },

    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    #[error("Invalid address: {reason}")]
    InvalidAddress { reason: String },
}

impl From<CodecError> for ContractError {
    fn from(err: CodecError) -> Self {
        ContractError::MalformedMessage {
            reason: err.to_string(),
        }
    }
}
