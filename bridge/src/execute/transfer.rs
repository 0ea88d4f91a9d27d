//! Token transfer handlers.
//!
//! Inbound: a committee-approved `TokenTransfer` is recorded and minted at
//! once if the route limit admits it; otherwise anyone can retry later with
//! `ClaimToken`.
//!
//! Outbound: tokens sent through the cw20 `Receive` hook are burned and a
//! `TokenTransfer` message for the target chain is emitted for the committee.

use bridge_common::{bytes32_to_hex, BridgeAction, BridgeMessage, TokenTransferPayload};
use cosmwasm_std::{
    from_json, Binary, CanonicalAddr, DepsMut, Env, Event, MessageInfo, Response, Uint128,
};
use cw20::Cw20ReceiveMsg;

use crate::error::ContractError;
use crate::limiter::{check_and_consume_limit, notional_value};
use crate::msg::ReceiveMsg;
use crate::state::{
    Config, TransferRecord, CONFIG, OUTGOING_NONCE, SUPPORTED_TOKENS, TRANSFER_RECORDS,
};
use crate::treasury::{burn_msg, load_token, mint_msg};

/// Longest foreign address the one-byte length prefix can carry
const MAX_ADDRESS_LENGTH: usize = 255;

// ============================================================================
// Inbound
// ============================================================================

/// Apply a verified `TokenTransfer` addressed to this chain.
pub(crate) fn approve_transfer(
    deps: DepsMut,
    env: &Env,
    config: &Config,
    message: &BridgeMessage,
    payload: TokenTransferPayload,
) -> Result<Response, ContractError> {
    if config.paused {
        return Err(ContractError::BridgePaused);
    }

    if payload.target_chain != config.chain_id {
        return Err(ContractError::UnexpectedChainId {
            expected: config.chain_id,
            got: payload.target_chain,
        });
    }

    if payload.amount == 0 {
        return Err(ContractError::InvalidAmount {
            reason: "Amount must be greater than zero".to_string(),
        });
    }

    let (type_name, metadata) = load_token(deps.storage, payload.token_id)?;

    let recipient = deps
        .api
        .addr_humanize(&CanonicalAddr::from(payload.target_address.clone()))
        .map_err(|e| ContractError::InvalidAddress {
            reason: e.to_string(),
        })?;

    let key = (message.source_chain, message.nonce);

    let notional = notional_value(&metadata, payload.amount);
    let admitted =
        check_and_consume_limit(deps.storage, env.block.time, message.source_chain, notional)?;

    let record = TransferRecord {
        token_id: payload.token_id,
        amount: payload.amount,
        sender: Binary::from(payload.sender),
        recipient: recipient.clone(),
        approved_at: env.block.time,
        claimed: admitted,
    };
    TRANSFER_RECORDS.save(deps.storage, key, &record)?;

    let mut response = Response::new().add_event(
        Event::new("token_transfer_approved")
            .add_attribute("source_chain", message.source_chain.to_string())
            .add_attribute("nonce", message.nonce.to_string())
            .add_attribute("token", type_name)
            .add_attribute("recipient", recipient.as_str())
            .add_attribute("amount", payload.amount.to_string())
            .add_attribute("notional", notional.to_string()),
    );

    if admitted {
        response = response
            .add_message(mint_msg(
                deps.storage,
                payload.token_id,
                &recipient,
                payload.amount,
            )?)
            .add_event(claimed_event(message.source_chain, message.nonce, &record));
    }

    Ok(response)
}

/// Mint a recorded transfer once the route limit has room.
pub fn execute_claim_token(
    deps: DepsMut,
    env: Env,
    source_chain: u8,
    nonce: u64,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if config.paused {
        return Err(ContractError::BridgePaused);
    }

    let mut record = TRANSFER_RECORDS
        .may_load(deps.storage, (source_chain, nonce))?
        .ok_or(ContractError::TransferNotFound {
            source_chain,
            nonce,
        })?;
    if record.claimed {
        return Err(ContractError::TransferAlreadyClaimed {
            source_chain,
            nonce,
        });
    }

    let (_, metadata) = load_token(deps.storage, record.token_id)?;
    let notional = notional_value(&metadata, record.amount);
    if !check_and_consume_limit(deps.storage, env.block.time, source_chain, notional)? {
        return Err(ContractError::TransferLimitExceeded { source_chain });
    }

    record.claimed = true;
    TRANSFER_RECORDS.save(deps.storage, (source_chain, nonce), &record)?;

    let mint = mint_msg(deps.storage, record.token_id, &record.recipient, record.amount)?;

    Ok(Response::new()
        .add_message(mint)
        .add_event(claimed_event(source_chain, nonce, &record))
        .add_attribute("method", "claim_token")
        .add_attribute("source_chain", source_chain.to_string())
        .add_attribute("nonce", nonce.to_string()))
}

fn claimed_event(source_chain: u8, nonce: u64, record: &TransferRecord) -> Event {
    Event::new("token_claimed")
        .add_attribute("source_chain", source_chain.to_string())
        .add_attribute("nonce", nonce.to_string())
        .add_attribute("token_id", record.token_id.to_string())
        .add_attribute("recipient", record.recipient.as_str())
        .add_attribute("amount", record.amount.to_string())
}

// ============================================================================
// Outbound
// ============================================================================

/// cw20 receive hook; `info.sender` is the token contract.
pub fn execute_receive(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    cw20_msg: Cw20ReceiveMsg,
) -> Result<Response, ContractError> {
    let msg: ReceiveMsg = from_json(&cw20_msg.msg)?;

    match msg {
        ReceiveMsg::SendToChain {
            target_chain,
            target_address,
        } => send_to_chain(deps, info, cw20_msg, target_chain, target_address),
    }
}

fn send_to_chain(
    deps: DepsMut,
    info: MessageInfo,
    cw20_msg: Cw20ReceiveMsg,
    target_chain: u8,
    target_address: Binary,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if config.paused {
        return Err(ContractError::BridgePaused);
    }

    let type_name = info.sender.to_string();
    let metadata = SUPPORTED_TOKENS
        .may_load(deps.storage, &type_name)?
        .ok_or_else(|| ContractError::UnsupportedTokenType {
            token: type_name.clone(),
        })?;

    if target_chain == config.chain_id {
        return Err(ContractError::InvalidTargetChain {
            chain_id: target_chain,
        });
    }

    if target_address.is_empty() || target_address.len() > MAX_ADDRESS_LENGTH {
        return Err(ContractError::InvalidAddress {
            reason: format!(
                "target address must be 1 to {} bytes, got {}",
                MAX_ADDRESS_LENGTH,
                target_address.len()
            ),
        });
    }

    let amount = validate_amount(cw20_msg.amount)?;

    let sender = deps.api.addr_canonicalize(&cw20_msg.sender)?;

    let nonce = OUTGOING_NONCE.may_load(deps.storage)?.unwrap_or_default();
    OUTGOING_NONCE.save(deps.storage, &(nonce + 1))?;

    let action = BridgeAction::TokenTransfer(TokenTransferPayload {
        sender: sender.to_vec(),
        target_chain,
        target_address: target_address.to_vec(),
        token_id: metadata.id,
        amount,
    });
    let message = action.to_message(nonce, config.chain_id)?;

    let burn = burn_msg(deps.storage, &type_name, cw20_msg.amount)?;

    let event = Event::new("token_deposited")
        .add_attribute("nonce", nonce.to_string())
        .add_attribute("source_chain", config.chain_id.to_string())
        .add_attribute("target_chain", target_chain.to_string())
        .add_attribute("token_id", metadata.id.to_string())
        .add_attribute("sender", &cw20_msg.sender)
        .add_attribute("target_address", hex::encode(target_address.as_slice()))
        .add_attribute("amount", amount.to_string())
        .add_attribute("message", hex::encode(message.encode()))
        .add_attribute("digest", bytes32_to_hex(&message.digest()));

    Ok(Response::new()
        .add_message(burn)
        .add_event(event)
        .add_attribute("method", "send_to_chain")
        .add_attribute("nonce", nonce.to_string()))
}

/// Non-zero and representable in the u64 wire field.
fn validate_amount(amount: Uint128) -> Result<u64, ContractError> {
    if amount.is_zero() {
        return Err(ContractError::InvalidAmount {
            reason: "Amount must be greater than zero".to_string(),
        });
    }
    u64::try_from(amount.u128()).map_err(|_| ContractError::InvalidAmount {
        reason: format!("Amount {} exceeds u64", amount),
    })
}
