//! Message types for the CL8Y committee bridge contract
//!
//! Committee-authorized actions arrive as raw `BridgeMessage` bytes plus
//! signatures through `SubmitBridgeAction`; everything else is permissionless.

use bridge_common::BridgeAction;
use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Binary, Timestamp, Uint128};

use crate::state::{BridgeTokenMetadata, CommitteeMember, ForeignTokenRegistration};

// ============================================================================
// Instantiate & Migrate
// ============================================================================

/// Migrate message
#[cw_serde]
pub struct MigrateMsg {}

/// Genesis committee member
#[cw_serde]
pub struct MemberInit {
    /// Compressed secp256k1 public key (33 bytes)
    pub public_key: Binary,
    pub weight: u16,
}

/// Required weight for one message type
#[cw_serde]
pub struct ThresholdInit {
    pub message_type: u8,
    pub threshold: u64,
}

/// Initial daily limit for a route into this chain
#[cw_serde]
pub struct RouteLimitInit {
    pub source_chain: u8,
    /// Notional USD per 24h, 4 decimals
    pub limit: u64,
}

/// Instantiate message
#[cw_serde]
pub struct InstantiateMsg {
    /// Bridge chain id of this chain
    pub chain_id: u8,
    /// Genesis committee, 1 to 64 members
    pub members: Vec<MemberInit>,
    /// One entry per verifiable message type
    pub thresholds: Vec<ThresholdInit>,
    #[serde(default)]
    pub route_limits: Vec<RouteLimitInit>,
}

// ============================================================================
// Execute Messages
// ============================================================================

#[cw_serde]
pub enum ExecuteMsg {
    /// Submit a committee-signed bridge message
    ///
    /// Authorization: Anyone (the signatures authorize the action)
    SubmitBridgeAction {
        /// Encoded `BridgeMessage`, wire prefix included
        message: Binary,
        /// 65-byte recoverable secp256k1 signatures over the message digest
        signatures: Vec<Binary>,
    },

    /// Hand the bridge a cw20 token it mints exclusively
    ///
    /// Authorization: Anyone
    ///
    /// The bridge must be the token's sole minter and wasm admin and the
    /// supply must be zero. The admin is cleared on success.
    RegisterForeignToken { token: String },

    /// Mint an approved inbound transfer that was held back by the route limit
    ///
    /// Authorization: Anyone
    ClaimToken { source_chain: u8, nonce: u64 },

    /// Send supported tokens to another chain (called via cw20 send)
    Receive(cw20::Cw20ReceiveMsg),
}

/// Messages for cw20 receive hook
#[cw_serde]
pub enum ReceiveMsg {
    /// Burn the sent tokens and emit a transfer for `target_chain`
    SendToChain {
        target_chain: u8,
        /// Recipient account bytes on the target chain
        target_address: Binary,
    },
}

// ============================================================================
// Query Messages
// ============================================================================

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(ConfigResponse)]
    Config {},

    /// All committee members with weights and blocklist status
    #[returns(CommitteeResponse)]
    Committee {},

    #[returns(ThresholdResponse)]
    Threshold { message_type: u8 },

    /// Last accepted nonce for a message type, if any
    #[returns(LastNonceResponse)]
    LastNonce { message_type: u8 },

    #[returns(Option<TokenResponse>)]
    TokenByType { type_name: String },

    #[returns(Option<TokenResponse>)]
    TokenById { token_id: u8 },

    /// Notional USD value (4 decimals) of `amount` base units
    #[returns(NotionalValueResponse)]
    NotionalValue { token_id: u8, amount: u64 },

    #[returns(TokensResponse)]
    Tokens {
        start_after: Option<u8>,
        limit: Option<u32>,
    },

    #[returns(Option<ForeignTokenRegistration>)]
    PendingRegistration { type_name: String },

    #[returns(Option<TransferRecordResponse>)]
    TransferRecord { source_chain: u8, nonce: u64 },

    #[returns(RouteLimitResponse)]
    RouteLimit { source_chain: u8 },

    #[returns(OutgoingNonceResponse)]
    OutgoingNonce {},

    /// Decode a message and compute the digest the committee signs
    #[returns(MessageDigestResponse)]
    MessageDigest { message: Binary },
}

// ============================================================================
// Response Types
// ============================================================================

#[cw_serde]
pub struct ConfigResponse {
    pub chain_id: u8,
    pub paused: bool,
}

#[cw_serde]
pub struct CommitteeResponse {
    pub members: Vec<CommitteeMember>,
    /// Summed weight of members that are not blocklisted
    pub active_weight: u64,
}

#[cw_serde]
pub struct ThresholdResponse {
    pub message_type: u8,
    pub threshold: Option<u64>,
}

#[cw_serde]
pub struct LastNonceResponse {
    pub message_type: u8,
    pub nonce: Option<u64>,
}

#[cw_serde]
pub struct TokenResponse {
    pub type_name: String,
    pub metadata: BridgeTokenMetadata,
}

#[cw_serde]
pub struct TokensResponse {
    pub tokens: Vec<TokenResponse>,
}

#[cw_serde]
pub struct NotionalValueResponse {
    pub token_id: u8,
    pub value: Uint128,
}

#[cw_serde]
pub struct TransferRecordResponse {
    pub source_chain: u8,
    pub nonce: u64,
    pub token_id: u8,
    pub amount: u64,
    pub sender: Binary,
    pub recipient: Addr,
    pub approved_at: Timestamp,
    pub claimed: bool,
}

#[cw_serde]
pub struct RouteLimitResponse {
    pub source_chain: u8,
    pub limit: Option<u64>,
    /// Notional used in the window in effect now
    pub used: Uint128,
    pub window_start: Timestamp,
}

#[cw_serde]
pub struct OutgoingNonceResponse {
    /// Nonce the next outgoing transfer will carry
    pub nonce: u64,
}

#[cw_serde]
pub struct MessageDigestResponse {
    /// 0x-prefixed keccak256 digest
    pub digest: String,
    pub message_type: u8,
    pub nonce: u64,
    pub source_chain: u8,
    pub action: BridgeAction,
}
