//! Committee-authorized actions.
//!
//! `SubmitBridgeAction` runs: decode envelope -> parse payload -> verify
//! signatures -> check and advance the per-type nonce -> apply.

use bridge_common::{
    bytes32_to_hex, BlocklistPayload, BlocklistType, BridgeAction, BridgeMessage, EmergencyOp,
    LimitUpdatePayload,
};
use cosmwasm_std::{Binary, DepsMut, Env, Event, Order, Response, StdResult, Storage};

use crate::committee::verify_signatures;
use crate::error::ContractError;
use crate::execute::transfer::approve_transfer;
use crate::state::{COMMITTEE_MEMBERS, CONFIG, LAST_NONCES, ROUTE_LIMITS, THRESHOLDS};
use crate::treasury::{approve_new_tokens, update_asset_notional_prices};

pub fn execute_submit_bridge_action(
    deps: DepsMut,
    env: Env,
    message: Binary,
    signatures: Vec<Binary>,
) -> Result<Response, ContractError> {
    let message = BridgeMessage::decode(&message)?;

    // Known types parse before any signature work; unknown types have no
    // threshold and fail in verification.
    let action = match message.kind() {
        Ok(_) => Some(BridgeAction::from_message(&message)?),
        Err(_) => None,
    };
    let signed_weight = verify_signatures(deps.api, deps.storage, &message, &signatures)?;
    let action = action.ok_or(ContractError::UnsupportedMessageType {
        message_type: message.message_type,
    })?;
    let kind = action.message_type();

    let mut config = CONFIG.load(deps.storage)?;
    if kind.is_governance() && message.source_chain != config.chain_id {
        return Err(ContractError::UnexpectedChainId {
            expected: config.chain_id,
            got: message.source_chain,
        });
    }

    consume_nonce(deps.storage, &message)?;

    let response = Response::new()
        .add_attribute("method", "submit_bridge_action")
        .add_attribute("message_type", kind.as_str())
        .add_attribute("nonce", message.nonce.to_string())
        .add_attribute("source_chain", message.source_chain.to_string())
        .add_attribute("digest", bytes32_to_hex(&message.digest()))
        .add_attribute("signed_weight", signed_weight.to_string());

    let applied = match action {
        BridgeAction::TokenTransfer(payload) => {
            approve_transfer(deps, &env, &config, &message, payload)?
        }
        BridgeAction::UpdateCommitteeBlocklist(payload) => {
            Response::new().add_event(update_blocklist(deps.storage, payload)?)
        }
        BridgeAction::EmergencyButton(op) => {
            config.paused = matches!(op, EmergencyOp::Pause);
            CONFIG.save(deps.storage, &config)?;
            Response::new().add_event(
                Event::new("emergency_op").add_attribute("paused", config.paused.to_string()),
            )
        }
        BridgeAction::LimitUpdate(LimitUpdatePayload {
            sending_chain,
            new_limit,
        }) => {
            ROUTE_LIMITS.save(deps.storage, sending_chain, &new_limit)?;
            Response::new().add_event(
                Event::new("limit_update")
                    .add_attribute("sending_chain", sending_chain.to_string())
                    .add_attribute("receiving_chain", config.chain_id.to_string())
                    .add_attribute("new_limit", new_limit.to_string()),
            )
        }
        BridgeAction::UpdateTokenPrices(prices) => {
            Response::new().add_events(update_asset_notional_prices(deps.storage, &prices)?)
        }
        BridgeAction::AddTokens(payload) => {
            Response::new().add_events(approve_new_tokens(deps.storage, &payload)?)
        }
    };

    Ok(response
        .add_submessages(applied.messages)
        .add_events(applied.events)
        .add_attributes(applied.attributes))
}

/// Reject replays and record `message.nonce` as the last accepted one.
///
/// Nonces only need to increase; gaps are allowed.
fn consume_nonce(storage: &mut dyn Storage, message: &BridgeMessage) -> Result<(), ContractError> {
    if let Some(last) = LAST_NONCES.may_load(storage, message.message_type)? {
        if message.nonce <= last {
            return Err(ContractError::StaleNonce {
                message_type: message.message_type,
                nonce: message.nonce,
                last,
            });
        }
    }
    LAST_NONCES.save(storage, message.message_type, &message.nonce)?;
    Ok(())
}

fn update_blocklist(
    storage: &mut dyn Storage,
    payload: BlocklistPayload,
) -> Result<Event, ContractError> {
    let blocklisted = payload.blocklist_type == BlocklistType::Blocklist;

    let mut members = Vec::with_capacity(payload.members.len());
    for key in &payload.members {
        let member = COMMITTEE_MEMBERS.may_load(storage, key)?.ok_or_else(|| {
            ContractError::UnknownCommitteeMember {
                member: hex::encode(key),
            }
        })?;
        members.push(member);
    }

    // The remaining active weight must still reach every threshold
    let active_weight = COMMITTEE_MEMBERS
        .range(storage, None, None, Order::Ascending)
        .map(|item| {
            item.map(|(key, member)| {
                let blocked = if payload.members.contains(&key) {
                    blocklisted
                } else {
                    member.blocklisted
                };
                if blocked {
                    0
                } else {
                    u64::from(member.weight)
                }
            })
        })
        .sum::<StdResult<u64>>()?;

    let mut required = 0;
    for item in THRESHOLDS.range(storage, None, None, Order::Ascending) {
        let (_, threshold) = item?;
        required = required.max(threshold);
    }
    if active_weight < required {
        return Err(ContractError::CommitteeLockout {
            active_weight,
            required,
        });
    }

    for mut member in members {
        member.blocklisted = blocklisted;
        COMMITTEE_MEMBERS.save(storage, &member.public_key, &member)?;
    }

    let keys: Vec<String> = payload.members.iter().map(hex::encode).collect();
    Ok(Event::new("blocklist_update")
        .add_attribute("blocklisted", blocklisted.to_string())
        .add_attribute("members", keys.join(","))
        .add_attribute("active_weight", active_weight.to_string()))
}
