//! Query handlers for the CL8Y committee bridge contract.

use bridge_common::{bytes32_to_hex, BridgeAction, BridgeMessage};
use cosmwasm_std::{Binary, Deps, Env, Order, StdError, StdResult};
use cw_storage_plus::Bound;

use crate::limiter::{current_window, notional_value};
use crate::msg::{
    CommitteeResponse, ConfigResponse, LastNonceResponse, MessageDigestResponse,
    NotionalValueResponse, OutgoingNonceResponse, RouteLimitResponse, ThresholdResponse,
    TokenResponse, TokensResponse, TransferRecordResponse,
};
use crate::state::{
    ForeignTokenRegistration, COMMITTEE_MEMBERS, CONFIG, ID_TO_TYPE, LAST_NONCES,
    OUTGOING_NONCE, ROUTE_LIMITS, SUPPORTED_TOKENS, THRESHOLDS, TRANSFER_RECORDS, WAITING_ROOM,
};

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 30;

// ============================================================================
// Committee Queries
// ============================================================================

pub fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(ConfigResponse {
        chain_id: config.chain_id,
        paused: config.paused,
    })
}

/// Committee size is bounded, so this returns every member.
pub fn query_committee(deps: Deps) -> StdResult<CommitteeResponse> {
    let members = COMMITTEE_MEMBERS
        .range(deps.storage, None, None, Order::Ascending)
        .map(|item| item.map(|(_, member)| member))
        .collect::<StdResult<Vec<_>>>()?;

    let active_weight = members
        .iter()
        .filter(|m| !m.blocklisted)
        .map(|m| u64::from(m.weight))
        .sum();

    Ok(CommitteeResponse {
        members,
        active_weight,
    })
}

pub fn query_threshold(deps: Deps, message_type: u8) -> StdResult<ThresholdResponse> {
    Ok(ThresholdResponse {
        message_type,
        threshold: THRESHOLDS.may_load(deps.storage, message_type)?,
    })
}

pub fn query_last_nonce(deps: Deps, message_type: u8) -> StdResult<LastNonceResponse> {
    Ok(LastNonceResponse {
        message_type,
        nonce: LAST_NONCES.may_load(deps.storage, message_type)?,
    })
}

/// Decode a message and return the digest the committee signs.
pub fn query_message_digest(message: Binary) -> StdResult<MessageDigestResponse> {
    let message =
        BridgeMessage::decode(&message).map_err(|e| StdError::generic_err(e.to_string()))?;
    let action =
        BridgeAction::from_message(&message).map_err(|e| StdError::generic_err(e.to_string()))?;

    Ok(MessageDigestResponse {
        digest: bytes32_to_hex(&message.digest()),
        message_type: message.message_type,
        nonce: message.nonce,
        source_chain: message.source_chain,
        action,
    })
}

// ============================================================================
// Token Registry Queries
// ============================================================================

pub fn query_token_by_type(deps: Deps, type_name: String) -> StdResult<Option<TokenResponse>> {
    Ok(SUPPORTED_TOKENS
        .may_load(deps.storage, &type_name)?
        .map(|metadata| TokenResponse {
            type_name,
            metadata,
        }))
}

pub fn query_token_by_id(deps: Deps, token_id: u8) -> StdResult<Option<TokenResponse>> {
    match ID_TO_TYPE.may_load(deps.storage, token_id)? {
        Some(type_name) => query_token_by_type(deps, type_name),
        None => Ok(None),
    }
}

pub fn query_notional_value(
    deps: Deps,
    token_id: u8,
    amount: u64,
) -> StdResult<NotionalValueResponse> {
    let token = query_token_by_id(deps, token_id)?
        .ok_or_else(|| StdError::not_found(format!("token id {}", token_id)))?;

    Ok(NotionalValueResponse {
        token_id,
        value: notional_value(&token.metadata, amount),
    })
}

/// Supported tokens ordered by token id.
pub fn query_tokens(
    deps: Deps,
    start_after: Option<u8>,
    limit: Option<u32>,
) -> StdResult<TokensResponse> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start = start_after.map(Bound::exclusive);

    let tokens = ID_TO_TYPE
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .map(|item| {
            let (_, type_name) = item?;
            let metadata = SUPPORTED_TOKENS.load(deps.storage, &type_name)?;
            Ok(TokenResponse {
                type_name,
                metadata,
            })
        })
        .collect::<StdResult<Vec<_>>>()?;

    Ok(TokensResponse { tokens })
}

pub fn query_pending_registration(
    deps: Deps,
    type_name: String,
) -> StdResult<Option<ForeignTokenRegistration>> {
    WAITING_ROOM.may_load(deps.storage, &type_name)
}

// ============================================================================
// Transfer Queries
// ============================================================================

pub fn query_transfer_record(
    deps: Deps,
    source_chain: u8,
    nonce: u64,
) -> StdResult<Option<TransferRecordResponse>> {
    Ok(TRANSFER_RECORDS
        .may_load(deps.storage, (source_chain, nonce))?
        .map(|record| TransferRecordResponse {
            source_chain,
            nonce,
            token_id: record.token_id,
            amount: record.amount,
            sender: record.sender,
            recipient: record.recipient,
            approved_at: record.approved_at,
            claimed: record.claimed,
        }))
}

pub fn query_route_limit(deps: Deps, env: Env, source_chain: u8) -> StdResult<RouteLimitResponse> {
    let window = current_window(deps.storage, env.block.time, source_chain)?;

    Ok(RouteLimitResponse {
        source_chain,
        limit: ROUTE_LIMITS.may_load(deps.storage, source_chain)?,
        used: window.used,
        window_start: window.window_start,
    })
}

pub fn query_outgoing_nonce(deps: Deps) -> StdResult<OutgoingNonceResponse> {
    Ok(OutgoingNonceResponse {
        nonce: OUTGOING_NONCE.may_load(deps.storage)?.unwrap_or_default(),
    })
}
