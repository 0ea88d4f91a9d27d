//! CL8Y Committee Bridge Contract - Entry Points
//!
//! The implementation is modularized into:
//! - `committee` - weighted signature verification
//! - `treasury` - token registry and mint/burn authority
//! - `limiter` - daily notional limits per route
//! - `execute/` - Execute message handlers
//! - `query` - Query message handlers

use bridge_common::MessageType;
use cosmwasm_std::{
    entry_point, to_json_binary, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdResult,
    Storage,
};
use cw2::set_contract_version;

use crate::committee::parse_member_key;
use crate::error::ContractError;
use crate::execute::{execute_claim_token, execute_receive, execute_submit_bridge_action};
use crate::msg::{ExecuteMsg, InstantiateMsg, MemberInit, MigrateMsg, QueryMsg, ThresholdInit};
use crate::query::{
    query_committee, query_config, query_last_nonce, query_message_digest, query_notional_value,
    query_outgoing_nonce, query_pending_registration, query_route_limit, query_threshold,
    query_token_by_id, query_token_by_type, query_tokens, query_transfer_record,
};
use crate::state::{
    CommitteeMember, Config, COMMITTEE_MEMBERS, CONFIG, CONTRACT_NAME, CONTRACT_VERSION,
    MAX_COMMITTEE_MEMBERS, OUTGOING_NONCE, ROUTE_LIMITS, THRESHOLDS,
};
use crate::treasury::register_foreign_token;

// ============================================================================
// Instantiate
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let total_weight = store_committee(deps.storage, &msg.members)?;
    store_thresholds(deps.storage, &msg.thresholds, total_weight)?;

    for route in &msg.route_limits {
        ROUTE_LIMITS.save(deps.storage, route.source_chain, &route.limit)?;
    }

    CONFIG.save(
        deps.storage,
        &Config {
            chain_id: msg.chain_id,
            paused: false,
        },
    )?;
    OUTGOING_NONCE.save(deps.storage, &0u64)?;

    Ok(Response::new()
        .add_attribute("method", "instantiate")
        .add_attribute("chain_id", msg.chain_id.to_string())
        .add_attribute("member_count", msg.members.len().to_string())
        .add_attribute("total_weight", total_weight.to_string()))
}

/// Validate and store the genesis committee, returning its total weight.
fn store_committee(
    storage: &mut dyn Storage,
    members: &[MemberInit],
) -> Result<u64, ContractError> {
    if members.is_empty() || members.len() > MAX_COMMITTEE_MEMBERS {
        return Err(ContractError::InvalidCommittee {
            reason: format!(
                "committee must have 1 to {} members, got {}",
                MAX_COMMITTEE_MEMBERS,
                members.len()
            ),
        });
    }

    let mut total_weight: u64 = 0;
    for member in members {
        let key = parse_member_key(&member.public_key)?;
        if member.weight == 0 {
            return Err(ContractError::InvalidCommittee {
                reason: format!("member {} has zero weight", hex::encode(key)),
            });
        }
        if COMMITTEE_MEMBERS.has(storage, &key) {
            return Err(ContractError::InvalidCommittee {
                reason: format!("duplicate member {}", hex::encode(key)),
            });
        }

        COMMITTEE_MEMBERS.save(
            storage,
            &key,
            &CommitteeMember {
                public_key: Binary::from(key.to_vec()),
                weight: member.weight,
                blocklisted: false,
            },
        )?;
        total_weight += u64::from(member.weight);
    }

    Ok(total_weight)
}

/// Every known message type needs a reachable, non-zero threshold.
fn store_thresholds(
    storage: &mut dyn Storage,
    thresholds: &[ThresholdInit],
    total_weight: u64,
) -> Result<(), ContractError> {
    for entry in thresholds {
        let invalid = |reason: &str| ContractError::InvalidThreshold {
            message_type: entry.message_type,
            reason: reason.to_string(),
        };

        MessageType::try_from(entry.message_type).map_err(|_| invalid("unknown message type"))?;
        if entry.threshold == 0 {
            return Err(invalid("threshold must be greater than zero"));
        }
        if entry.threshold > total_weight {
            return Err(invalid("threshold exceeds total committee weight"));
        }
        if THRESHOLDS.has(storage, entry.message_type) {
            return Err(invalid("threshold configured twice"));
        }

        THRESHOLDS.save(storage, entry.message_type, &entry.threshold)?;
    }

    for kind in MessageType::ALL {
        if !THRESHOLDS.has(storage, kind as u8) {
            return Err(ContractError::InvalidThreshold {
                message_type: kind as u8,
                reason: "missing threshold".to_string(),
            });
        }
    }

    Ok(())
}

// ============================================================================
// Execute
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        // Committee-signed actions
        ExecuteMsg::SubmitBridgeAction {
            message,
            signatures,
        } => execute_submit_bridge_action(deps, env, message, signatures),

        // Token registry
        ExecuteMsg::RegisterForeignToken { token } => register_foreign_token(deps, &env, token),

        // Transfers
        ExecuteMsg::ClaimToken {
            source_chain,
            nonce,
        } => execute_claim_token(deps, env, source_chain, nonce),
        ExecuteMsg::Receive(cw20_msg) => execute_receive(deps, env, info, cw20_msg),
    }
}

// ============================================================================
// Query
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        // Committee queries
        QueryMsg::Config {} => to_json_binary(&query_config(deps)?),
        QueryMsg::Committee {} => to_json_binary(&query_committee(deps)?),
        QueryMsg::Threshold { message_type } => {
            to_json_binary(&query_threshold(deps, message_type)?)
        }
        QueryMsg::LastNonce { message_type } => {
            to_json_binary(&query_last_nonce(deps, message_type)?)
        }
        QueryMsg::MessageDigest { message } => to_json_binary(&query_message_digest(message)?),

        // Token registry queries
        QueryMsg::TokenByType { type_name } => {
            to_json_binary(&query_token_by_type(deps, type_name)?)
        }
        QueryMsg::TokenById { token_id } => to_json_binary(&query_token_by_id(deps, token_id)?),
        QueryMsg::NotionalValue { token_id, amount } => {
            to_json_binary(&query_notional_value(deps, token_id, amount)?)
        }
        QueryMsg::Tokens { start_after, limit } => {
            to_json_binary(&query_tokens(deps, start_after, limit)?)
        }
        QueryMsg::PendingRegistration { type_name } => {
            to_json_binary(&query_pending_registration(deps, type_name)?)
        }

        // Transfer queries
        QueryMsg::TransferRecord {
            source_chain,
            nonce,
        } => to_json_binary(&query_transfer_record(deps, source_chain, nonce)?),
        QueryMsg::RouteLimit { source_chain } => {
            to_json_binary(&query_route_limit(deps, env, source_chain)?)
        }
        QueryMsg::OutgoingNonce {} => to_json_binary(&query_outgoing_nonce(deps)?),
    }
}

// ============================================================================
// Migrate
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    Ok(Response::new()
        .add_attribute("action", "migrate")
        .add_attribute("version", CONTRACT_VERSION))
}
