//! Transfer flow integration tests.
//!
//! Inbound transfers are minted when the route limit admits them and
//! otherwise wait for `ClaimToken`. Outbound transfers burn the sent tokens
//! and emit the message the committee signs for the target chain.

mod helpers;

use bridge_common::{
    bytes32_to_hex, BridgeAction, BridgeMessage, EmergencyOp, LimitUpdatePayload,
    TokenTransferPayload,
};
use cosmwasm_std::{to_json_binary, Addr, Binary, Uint128};
use cw20::{Cw20ExecuteMsg, Cw20QueryMsg, TokenInfoResponse};
use cw_multi_test::{AppResponse, Executor};

use committee_bridge::msg::{
    ExecuteMsg, LastNonceResponse, OutgoingNonceResponse, QueryMsg, ReceiveMsg,
    RouteLimitResponse, TransferRecordResponse,
};
use committee_bridge::ContractError;
use helpers::*;

/// Five whole tokens of a 6-decimal token
const FIVE_TOKENS: u64 = 5_000_000;
/// $5.0000 at $1 per token
const FIVE_DOLLARS: u64 = 50_000;

fn inbound(env: &TestEnv, token_id: u8, amount: u64) -> BridgeAction {
    BridgeAction::TokenTransfer(TokenTransferPayload {
        sender: vec![0xab; 20],
        target_chain: CHAIN_ID,
        target_address: env.canonical(&env.user),
        token_id,
        amount,
    })
}

/// Submit a transfer from `source_chain`, returning its nonce.
fn submit_from(
    env: &mut TestEnv,
    source_chain: u8,
    action: &BridgeAction,
) -> (u64, anyhow::Result<AppResponse>) {
    let mut message = env.message(action);
    message.source_chain = source_chain;
    let res = env.submit_signed(&message, &[0, 1, 2, 3]);
    (message.nonce, res)
}

fn record(env: &TestEnv, source_chain: u8, nonce: u64) -> Option<TransferRecordResponse> {
    env.query(&QueryMsg::TransferRecord {
        source_chain,
        nonce,
    })
}

fn claim(env: &mut TestEnv, source_chain: u8, nonce: u64) -> anyhow::Result<AppResponse> {
    let relayer = env.relayer.clone();
    let bridge = env.bridge.clone();
    env.app.execute_contract(
        relayer,
        bridge,
        &ExecuteMsg::ClaimToken {
            source_chain,
            nonce,
        },
        &[],
    )
}

fn set_limit(env: &mut TestEnv, sending_chain: u8, new_limit: u64) {
    env.submit(&BridgeAction::LimitUpdate(LimitUpdatePayload {
        sending_chain,
        new_limit,
    }))
    .unwrap();
}

fn send_to_chain(
    env: &mut TestEnv,
    token: &Addr,
    amount: u64,
    target_chain: u8,
    target_address: Vec<u8>,
) -> anyhow::Result<AppResponse> {
    let user = env.user.clone();
    env.app.execute_contract(
        user,
        token.clone(),
        &Cw20ExecuteMsg::Send {
            contract: env.bridge.to_string(),
            amount: Uint128::from(amount),
            msg: to_json_binary(&ReceiveMsg::SendToChain {
                target_chain,
                target_address: Binary::from(target_address),
            })
            .unwrap(),
        },
        &[],
    )
}

fn total_supply(env: &TestEnv, token: &Addr) -> Uint128 {
    let info: TokenInfoResponse = env
        .app
        .wrap()
        .query_wasm_smart(token, &Cw20QueryMsg::TokenInfo {})
        .unwrap();
    info.total_supply
}

// ============================================================================
// Inbound
// ============================================================================

#[test]
fn test_inbound_transfer_mints_to_recipient() {
    let mut env = setup();
    let token = env.supported_token(6, 1, 10_000);
    let action = inbound(&env, 1, FIVE_TOKENS);

    let (nonce, res) = submit_from(&mut env, ETH_CHAIN, &action);
    let res = res.unwrap();
    assert_eq!(
        event_attr(&res, "token_transfer_approved", "notional"),
        Some(FIVE_DOLLARS.to_string())
    );
    assert_eq!(
        event_attr(&res, "token_claimed", "recipient"),
        Some(env.user.to_string())
    );

    assert_eq!(env.balance(&token, &env.user), Uint128::from(FIVE_TOKENS));

    let stored = record(&env, ETH_CHAIN, nonce).unwrap();
    assert!(stored.claimed);
    assert_eq!(stored.recipient, env.user);
    assert_eq!(stored.sender, Binary::from(vec![0xab; 20]));
    assert_eq!(stored.amount, FIVE_TOKENS);

    let route: RouteLimitResponse = env.query(&QueryMsg::RouteLimit {
        source_chain: ETH_CHAIN,
    });
    assert_eq!(route.limit, Some(ETH_ROUTE_LIMIT));
    assert_eq!(route.used, Uint128::from(FIVE_DOLLARS));
}

#[test]
fn test_limit_exhaustion_holds_transfer_until_window_resets() {
    let mut env = setup();
    let token = env.supported_token(6, 1, 10_000);
    set_limit(&mut env, ETH_CHAIN, FIVE_DOLLARS + FIVE_DOLLARS / 2);

    let action = inbound(&env, 1, FIVE_TOKENS);
    let (_, res) = submit_from(&mut env, ETH_CHAIN, &action);
    res.unwrap();

    // Over the remaining daily room: recorded, not minted
    let (held, res) = submit_from(&mut env, ETH_CHAIN, &action);
    let res = res.unwrap();
    assert_eq!(count_events(&res, "token_transfer_approved"), 1);
    assert_eq!(count_events(&res, "token_claimed"), 0);
    assert!(!record(&env, ETH_CHAIN, held).unwrap().claimed);
    assert_eq!(env.balance(&token, &env.user), Uint128::from(FIVE_TOKENS));

    let err = root_error(claim(&mut env, ETH_CHAIN, held));
    assert_eq!(
        err,
        ContractError::TransferLimitExceeded {
            source_chain: ETH_CHAIN
        }
        .to_string()
    );

    env.advance_time(86_400);
    let res = claim(&mut env, ETH_CHAIN, held).unwrap();
    assert_eq!(count_events(&res, "token_claimed"), 1);
    assert!(record(&env, ETH_CHAIN, held).unwrap().claimed);
    assert_eq!(
        env.balance(&token, &env.user),
        Uint128::from(2 * FIVE_TOKENS)
    );

    let err = root_error(claim(&mut env, ETH_CHAIN, held));
    assert_eq!(
        err,
        ContractError::TransferAlreadyClaimed {
            source_chain: ETH_CHAIN,
            nonce: held
        }
        .to_string()
    );
}

#[test]
fn test_claim_unknown_transfer() {
    let mut env = setup();
    env.supported_token(6, 1, 10_000);

    let err = root_error(claim(&mut env, ETH_CHAIN, 42));
    assert_eq!(
        err,
        ContractError::TransferNotFound {
            source_chain: ETH_CHAIN,
            nonce: 42
        }
        .to_string()
    );
}

#[test]
fn test_unconfigured_route_waits_for_limit() {
    let mut env = setup();
    let token = env.supported_token(6, 1, 10_000);
    let action = inbound(&env, 1, FIVE_TOKENS);

    let (nonce, res) = submit_from(&mut env, 12, &action);
    res.unwrap();
    assert!(!record(&env, 12, nonce).unwrap().claimed);
    assert_eq!(env.balance(&token, &env.user), Uint128::zero());

    let route: RouteLimitResponse = env.query(&QueryMsg::RouteLimit { source_chain: 12 });
    assert_eq!(route.limit, None);

    let err = root_error(claim(&mut env, 12, nonce));
    assert_eq!(
        err,
        ContractError::TransferLimitExceeded { source_chain: 12 }.to_string()
    );

    set_limit(&mut env, 12, FIVE_DOLLARS);
    claim(&mut env, 12, nonce).unwrap();
    assert_eq!(env.balance(&token, &env.user), Uint128::from(FIVE_TOKENS));
}

#[test]
fn test_inbound_transfer_rejections() {
    let mut env = setup();
    env.supported_token(6, 1, 10_000);
    let last_nonce = |env: &TestEnv| -> Option<u64> {
        let res: LastNonceResponse = env.query(&QueryMsg::LastNonce { message_type: 0 });
        res.nonce
    };

    // Addressed to another chain
    let mut wrong_chain = inbound(&env, 1, FIVE_TOKENS);
    if let BridgeAction::TokenTransfer(payload) = &mut wrong_chain {
        payload.target_chain = 7;
    }
    let (_, res) = submit_from(&mut env, ETH_CHAIN, &wrong_chain);
    assert_eq!(
        root_error(res),
        ContractError::UnexpectedChainId {
            expected: CHAIN_ID,
            got: 7
        }
        .to_string()
    );

    // Unknown token id
    let unknown_token = inbound(&env, 9, FIVE_TOKENS);
    let (_, res) = submit_from(&mut env, ETH_CHAIN, &unknown_token);
    assert_eq!(
        root_error(res),
        ContractError::UnsupportedTokenType {
            token: "9".to_string()
        }
        .to_string()
    );

    // Zero amount
    let zero = inbound(&env, 1, 0);
    let (_, res) = submit_from(&mut env, ETH_CHAIN, &zero);
    assert!(root_error(res).starts_with("Invalid amount"));

    // None of the rejected messages consumed a nonce
    assert_eq!(last_nonce(&env), None);
}

#[test]
fn test_paused_bridge_blocks_transfers() {
    let mut env = setup();
    let token = env.supported_token(6, 1, 10_000);
    let action = inbound(&env, 1, FIVE_TOKENS);

    let (pending, res) = submit_from(&mut env, 12, &action);
    res.unwrap();

    env.submit(&BridgeAction::EmergencyButton(EmergencyOp::Pause))
        .unwrap();

    let (_, res) = submit_from(&mut env, ETH_CHAIN, &action);
    assert_eq!(root_error(res), ContractError::BridgePaused.to_string());

    set_limit(&mut env, 12, FIVE_DOLLARS);
    assert_eq!(
        root_error(claim(&mut env, 12, pending)),
        ContractError::BridgePaused.to_string()
    );

    env.submit(&BridgeAction::EmergencyButton(EmergencyOp::Unpause))
        .unwrap();
    claim(&mut env, 12, pending).unwrap();
    assert_eq!(env.balance(&token, &env.user), Uint128::from(FIVE_TOKENS));
}

// ============================================================================
// Outbound
// ============================================================================

#[test]
fn test_send_to_chain_burns_and_emits_message() {
    let mut env = setup();
    let token = env.supported_token(6, 1, 10_000);
    let action = inbound(&env, 1, FIVE_TOKENS);
    let (_, res) = submit_from(&mut env, ETH_CHAIN, &action);
    res.unwrap();

    let target_address = vec![0x11; 20];
    let res = send_to_chain(&mut env, &token, 2_000_000, ETH_CHAIN, target_address.clone()).unwrap();

    assert_eq!(env.balance(&token, &env.user), Uint128::new(3_000_000));
    assert_eq!(env.balance(&token, &env.bridge), Uint128::zero());
    assert_eq!(total_supply(&env, &token), Uint128::new(3_000_000));

    assert_eq!(
        event_attr(&res, "token_deposited", "nonce"),
        Some("0".to_string())
    );
    let encoded = hex::decode(event_attr(&res, "token_deposited", "message").unwrap()).unwrap();
    let message = BridgeMessage::decode(&encoded).unwrap();
    assert_eq!(message.nonce, 0);
    assert_eq!(message.source_chain, CHAIN_ID);
    assert_eq!(
        BridgeAction::from_message(&message).unwrap(),
        BridgeAction::TokenTransfer(TokenTransferPayload {
            sender: env.canonical(&env.user),
            target_chain: ETH_CHAIN,
            target_address,
            token_id: 1,
            amount: 2_000_000,
        })
    );
    assert_eq!(
        event_attr(&res, "token_deposited", "digest"),
        Some(bytes32_to_hex(&message.digest()))
    );

    let res = send_to_chain(&mut env, &token, 1_000_000, ETH_CHAIN, vec![0x22; 32]).unwrap();
    assert_eq!(
        event_attr(&res, "token_deposited", "nonce"),
        Some("1".to_string())
    );
    let outgoing: OutgoingNonceResponse = env.query(&QueryMsg::OutgoingNonce {});
    assert_eq!(outgoing.nonce, 2);
}

#[test]
fn test_send_to_chain_rejections() {
    let mut env = setup();
    let token = env.supported_token(6, 1, 10_000);
    let action = inbound(&env, 1, FIVE_TOKENS);
    let (_, res) = submit_from(&mut env, ETH_CHAIN, &action);
    res.unwrap();

    let err = root_error(send_to_chain(&mut env, &token, 1_000, CHAIN_ID, vec![0x11; 20]));
    assert_eq!(
        err,
        ContractError::InvalidTargetChain { chain_id: CHAIN_ID }.to_string()
    );

    let err = root_error(send_to_chain(&mut env, &token, 1_000, ETH_CHAIN, vec![]));
    assert!(err.starts_with("Invalid address"), "{}", err);

    // Tokens stay with the sender when the bridge rejects them
    assert_eq!(env.balance(&token, &env.user), Uint128::from(FIVE_TOKENS));

    // A token the bridge does not control
    let user = env.user.clone();
    let other = env.create_token(
        6,
        None,
        None,
        vec![cw20::Cw20Coin {
            address: user.to_string(),
            amount: Uint128::new(1_000),
        }],
    );
    let err = root_error(send_to_chain(&mut env, &other, 1_000, ETH_CHAIN, vec![0x11; 20]));
    assert_eq!(
        err,
        ContractError::UnsupportedTokenType {
            token: other.to_string()
        }
        .to_string()
    );

    let outgoing: OutgoingNonceResponse = env.query(&QueryMsg::OutgoingNonce {});
    assert_eq!(outgoing.nonce, 0);
}

#[test]
fn test_send_to_chain_while_paused() {
    let mut env = setup();
    let token = env.supported_token(6, 1, 10_000);
    let action = inbound(&env, 1, FIVE_TOKENS);
    let (_, res) = submit_from(&mut env, ETH_CHAIN, &action);
    res.unwrap();

    env.submit(&BridgeAction::EmergencyButton(EmergencyOp::Pause))
        .unwrap();
    let err = root_error(send_to_chain(&mut env, &token, 1_000, ETH_CHAIN, vec![0x11; 20]));
    assert_eq!(err, ContractError::BridgePaused.to_string());
}
