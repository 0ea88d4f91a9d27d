//! CL8Y Committee Bridge Contract
//!
//! A weighted committee authorizes bridge actions by signing the canonical
//! `BridgeMessage` encoding from `bridge-common`. Relayers submit the message
//! bytes with signatures; the contract verifies them against per-type
//! thresholds and applies the action.
//!
//! # Inbound Flow
//! 1. Committee signs a `TokenTransfer` targeting this chain
//! 2. Relayer calls `SubmitBridgeAction`
//! 3. Tokens are minted if the route's daily limit admits the notional value,
//!    otherwise the transfer waits for `ClaimToken`
//!
//! # Outbound Flow
//! 1. User sends a supported cw20 with `SendToChain`
//! 2. Tokens are burned and a `token_deposited` event carries the encoded
//!    message for the committee to sign on the target chain
//!
//! # Token Registry
//! `RegisterForeignToken` deposits mint authority; the committee approves the
//! token with `AddTokens` and keeps its price current with `UpdateTokenPrices`.

pub mod committee;
pub mod contract;
pub mod error;
mod execute;
pub mod limiter;
pub mod msg;
mod query;
pub mod state;
pub mod treasury;

pub use crate::error::ContractError;
