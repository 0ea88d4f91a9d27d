//! State definitions for the CL8Y committee bridge contract
//!
//! Three groups of state: the committee (keys, weights, thresholds, nonces),
//! the treasury (mint authorities, waiting room, supported tokens) and the
//! transfer path (records, route limits, outgoing nonce).

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Binary, Timestamp, Uint128};
use cw_storage_plus::{Item, Map};

// ============================================================================
// Core Configuration
// ============================================================================

/// Contract configuration
#[cw_serde]
pub struct Config {
    /// Bridge chain id of this chain, as carried in message headers
    pub chain_id: u8,
    /// Whether transfers are halted by an emergency action
    pub paused: bool,
}

// ============================================================================
// Committee
// ============================================================================

/// A committee member and its voting weight
#[cw_serde]
pub struct CommitteeMember {
    /// Compressed secp256k1 public key (33 bytes)
    pub public_key: Binary,
    /// Additive stake units counted towards thresholds
    pub weight: u16,
    /// Blocklisted members still verify but contribute no weight
    pub blocklisted: bool,
}

// ============================================================================
// Treasury
// ============================================================================

/// Registry entry for a bridgeable token
#[cw_serde]
pub struct BridgeTokenMetadata {
    pub id: u8,
    /// 10^decimals of the token
    pub decimal_multiplier: u64,
    /// USD value of one whole token, 4 decimal places
    pub notional_value: u64,
    pub native_token: bool,
}

/// Registration waiting for committee approval
#[cw_serde]
pub struct ForeignTokenRegistration {
    pub type_name: String,
    pub decimals: u8,
    /// Contract whose upgrade authority was surrendered (cleared) at registration
    pub upgrade_authority: Addr,
}

/// Authority the bridge holds over a token. Deposited once, never withdrawn.
#[cw_serde]
pub enum MintAuthority {
    /// The bridge is the sole cw20 minter of `contract`
    Cw20Minter { contract: Addr },
}

impl MintAuthority {
    pub fn kind(&self) -> &'static str {
        match self {
            MintAuthority::Cw20Minter { .. } => "cw20_minter",
        }
    }
}

// ============================================================================
// Transfers
// ============================================================================

/// Inbound transfer approved by the committee
#[cw_serde]
pub struct TransferRecord {
    pub token_id: u8,
    pub amount: u64,
    /// Sender account on the source chain
    pub sender: Binary,
    pub recipient: Addr,
    pub approved_at: Timestamp,
    pub claimed: bool,
}

/// Fixed-window usage tracking for a route
#[cw_serde]
pub struct RouteWindow {
    /// Timestamp when the current window started
    pub window_start: Timestamp,
    /// Notional value (USD, 4 decimals) released in the current window
    pub used: Uint128,
}

// ============================================================================
// Constants
// ============================================================================

/// Contract name for cw2 migration info
pub const CONTRACT_NAME: &str = "crates.io:cl8y-committee-bridge";

/// Contract version for cw2 migration info
pub const CONTRACT_VERSION: &str = "1.0.0";

/// Upper bound on committee size (also the capacity of the signer seen-set)
pub const MAX_COMMITTEE_MEMBERS: usize = 64;

/// Largest decimals whose multiplier fits in u64
pub const MAX_TOKEN_DECIMALS: u8 = 19;

/// Transfer limit window in seconds (24 hours)
pub const TRANSFER_LIMIT_PERIOD: u64 = 86_400;

// ============================================================================
// Core State Storage
// ============================================================================

pub const CONFIG: Item<Config> = Item::new("config");

/// Key: compressed public key, Value: CommitteeMember
pub const COMMITTEE_MEMBERS: Map<&[u8], CommitteeMember> = Map::new("committee_members");

/// Key: message type, Value: minimum summed weight
pub const THRESHOLDS: Map<u8, u64> = Map::new("thresholds");

/// Key: message type, Value: last accepted nonce
pub const LAST_NONCES: Map<u8, u64> = Map::new("last_nonces");

// ============================================================================
// Treasury State
// ============================================================================

/// Key: token type name, Value: authority held by the bridge
pub const TREASURIES: Map<&str, MintAuthority> = Map::new("treasuries");

/// Key: token type name, Value: BridgeTokenMetadata
pub const SUPPORTED_TOKENS: Map<&str, BridgeTokenMetadata> = Map::new("supported_tokens");

/// Key: token id, Value: token type name
pub const ID_TO_TYPE: Map<u8, String> = Map::new("id_to_type");

/// Key: token type name, Value: pending registration
pub const WAITING_ROOM: Map<&str, ForeignTokenRegistration> = Map::new("waiting_room");

// ============================================================================
// Transfer State
// ============================================================================

/// Key: (source chain, nonce), Value: TransferRecord
pub const TRANSFER_RECORDS: Map<(u8, u64), TransferRecord> = Map::new("transfer_records");

/// Outgoing nonce counter (for burns towards other chains)
pub const OUTGOING_NONCE: Item<u64> = Item::new("outgoing_nonce");

/// Key: source chain, Value: 24h notional limit (USD, 4 decimals)
pub const ROUTE_LIMITS: Map<u8, u64> = Map::new("route_limits");

/// Key: source chain, Value: RouteWindow
pub const ROUTE_WINDOWS: Map<u8, RouteWindow> = Map::new("route_windows");
