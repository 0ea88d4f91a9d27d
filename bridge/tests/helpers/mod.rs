//! Shared cw-multi-test setup: a bridge with a signing committee and cw20
//! tokens the bridge can mint.

#![allow(dead_code)]

use bridge_common::{AddTokensPayload, BridgeAction, BridgeMessage, MessageType};
use cosmwasm_std::{Addr, Api, Binary, Empty, Uint128};
use cw20::{BalanceResponse, Cw20Coin, Cw20QueryMsg, MinterResponse};
use cw_multi_test::{App, AppResponse, Contract, ContractWrapper, Executor};
use k256::ecdsa::SigningKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use serde::de::DeserializeOwned;

use committee_bridge::msg::{
    ExecuteMsg, InstantiateMsg, MemberInit, QueryMsg, RouteLimitInit, ThresholdInit,
};

/// Bridge chain id of the chain under test
pub const CHAIN_ID: u8 = 2;
/// Counterpart chain transfers arrive from
pub const ETH_CHAIN: u8 = 11;
/// $1,000,000 per day, 4 decimals
pub const ETH_ROUTE_LIMIT: u64 = 10_000_000_000;

pub fn contract_bridge() -> Box<dyn Contract<Empty>> {
    let contract = ContractWrapper::new(
        committee_bridge::contract::execute,
        committee_bridge::contract::instantiate,
        committee_bridge::contract::query,
    );
    Box::new(contract)
}

pub fn contract_cw20() -> Box<dyn Contract<Empty>> {
    let contract = ContractWrapper::new(
        cw20_base::contract::execute,
        cw20_base::contract::instantiate,
        cw20_base::contract::query,
    );
    Box::new(contract)
}

// ============================================================================
// Committee Keys
// ============================================================================

pub fn signer(seed: u8) -> SigningKey {
    SigningKey::from_slice(&[seed; 32]).unwrap()
}

pub fn public_key(key: &SigningKey) -> Binary {
    let point = k256::PublicKey::from(key.verifying_key()).to_encoded_point(true);
    Binary::from(point.as_bytes())
}

/// 65-byte `r | s | v` signature over the message digest
pub fn sign(key: &SigningKey, message: &BridgeMessage) -> Binary {
    let (signature, recovery_id) = key.sign_prehash_recoverable(&message.digest()).unwrap();
    let mut bytes = signature.to_bytes().to_vec();
    bytes.push(recovery_id.to_byte());
    Binary::from(bytes)
}

// ============================================================================
// Test Environment
// ============================================================================

pub struct TestEnv {
    pub app: App,
    pub bridge: Addr,
    pub committee: Vec<SigningKey>,
    pub relayer: Addr,
    pub user: Addr,
    pub cw20_code_id: u64,
    nonces: [u64; 7],
}

/// Four members of weight 100, every threshold 200
pub fn setup() -> TestEnv {
    TestEnv::new(&[100, 100, 100, 100], 200)
}

impl TestEnv {
    pub fn new(weights: &[u16], threshold: u64) -> Self {
        let mut app = App::default();
        let creator = Addr::unchecked("creator");

        let committee: Vec<SigningKey> = (1..=weights.len() as u8).map(signer).collect();
        let members = committee
            .iter()
            .zip(weights)
            .map(|(key, weight)| MemberInit {
                public_key: public_key(key),
                weight: *weight,
            })
            .collect();
        let thresholds = MessageType::ALL
            .iter()
            .map(|kind| ThresholdInit {
                message_type: *kind as u8,
                threshold,
            })
            .collect();

        let code_id = app.store_code(contract_bridge());
        let bridge = app
            .instantiate_contract(
                code_id,
                creator.clone(),
                &InstantiateMsg {
                    chain_id: CHAIN_ID,
                    members,
                    thresholds,
                    route_limits: vec![RouteLimitInit {
                        source_chain: ETH_CHAIN,
                        limit: ETH_ROUTE_LIMIT,
                    }],
                },
                &[],
                "cl8y-committee-bridge",
                Some(creator.to_string()),
            )
            .unwrap();

        let cw20_code_id = app.store_code(contract_cw20());

        TestEnv {
            app,
            bridge,
            committee,
            relayer: Addr::unchecked("relayer"),
            user: Addr::unchecked("user"),
            cw20_code_id,
            nonces: [0; 7],
        }
    }

    // ------------------------------------------------------------------------
    // Committee messages
    // ------------------------------------------------------------------------

    /// Wrap `action` with the next unused nonce for its type.
    ///
    /// Governance actions originate here; transfers arrive from `ETH_CHAIN`.
    pub fn message(&mut self, action: &BridgeAction) -> BridgeMessage {
        let kind = action.message_type();
        let nonce = self.nonces[kind as usize];
        self.nonces[kind as usize] += 1;
        let source_chain = if kind.is_governance() {
            CHAIN_ID
        } else {
            ETH_CHAIN
        };
        action.to_message(nonce, source_chain).unwrap()
    }

    pub fn submit_signed(
        &mut self,
        message: &BridgeMessage,
        signers: &[usize],
    ) -> anyhow::Result<AppResponse> {
        let signatures = signers
            .iter()
            .map(|i| sign(&self.committee[*i], message))
            .collect();
        self.submit_raw(Binary::from(message.encode()), signatures)
    }

    pub fn submit_raw(
        &mut self,
        message: Binary,
        signatures: Vec<Binary>,
    ) -> anyhow::Result<AppResponse> {
        self.app.execute_contract(
            self.relayer.clone(),
            self.bridge.clone(),
            &ExecuteMsg::SubmitBridgeAction {
                message,
                signatures,
            },
            &[],
        )
    }

    /// Sign with the whole committee and submit under the next nonce.
    pub fn submit(&mut self, action: &BridgeAction) -> anyhow::Result<AppResponse> {
        let message = self.message(action);
        let everyone: Vec<usize> = (0..self.committee.len()).collect();
        self.submit_signed(&message, &everyone)
    }

    // ------------------------------------------------------------------------
    // Tokens
    // ------------------------------------------------------------------------

    pub fn create_token(
        &mut self,
        decimals: u8,
        minter: Option<&Addr>,
        admin: Option<&Addr>,
        initial_balances: Vec<Cw20Coin>,
    ) -> Addr {
        self.app
            .instantiate_contract(
                self.cw20_code_id,
                Addr::unchecked("deployer"),
                &cw20_base::msg::InstantiateMsg {
                    name: "Bridged Token".to_string(),
                    symbol: "BRDG".to_string(),
                    decimals,
                    initial_balances,
                    mint: minter.map(|m| MinterResponse {
                        minter: m.to_string(),
                        cap: None,
                    }),
                    marketing: None,
                },
                &[],
                "bridged-token",
                admin.map(|a| a.to_string()),
            )
            .unwrap()
    }

    /// A fresh token that satisfies every registration requirement.
    pub fn bridgeable_token(&mut self, decimals: u8) -> Addr {
        let bridge = self.bridge.clone();
        self.create_token(decimals, Some(&bridge), Some(&bridge), vec![])
    }

    pub fn register(&mut self, token: &Addr) -> anyhow::Result<AppResponse> {
        self.app.execute_contract(
            self.user.clone(),
            self.bridge.clone(),
            &ExecuteMsg::RegisterForeignToken {
                token: token.to_string(),
            },
            &[],
        )
    }

    /// Register and approve a token under `token_id` at `price`.
    pub fn supported_token(&mut self, decimals: u8, token_id: u8, price: u64) -> Addr {
        let token = self.bridgeable_token(decimals);
        self.register(&token).unwrap();
        self.submit(&BridgeAction::AddTokens(AddTokensPayload {
            native: false,
            token_ids: vec![token_id],
            type_names: vec![token.to_string()],
            prices: vec![price],
        }))
        .unwrap();
        token
    }

    pub fn balance(&self, token: &Addr, owner: &Addr) -> Uint128 {
        let res: BalanceResponse = self
            .app
            .wrap()
            .query_wasm_smart(
                token,
                &Cw20QueryMsg::Balance {
                    address: owner.to_string(),
                },
            )
            .unwrap();
        res.balance
    }

    pub fn query<T: DeserializeOwned>(&self, msg: &QueryMsg) -> T {
        self.app.wrap().query_wasm_smart(&self.bridge, msg).unwrap()
    }

    /// Canonical bytes of a local account, as carried in transfer payloads.
    pub fn canonical(&self, addr: &Addr) -> Vec<u8> {
        self.app.api().addr_canonicalize(addr.as_str()).unwrap().to_vec()
    }

    pub fn advance_time(&mut self, seconds: u64) {
        self.app.update_block(|block| {
            block.time = block.time.plus_seconds(seconds);
            block.height += seconds / 5;
        });
    }
}

// ============================================================================
// Assertions
// ============================================================================

/// Innermost error message of a failed execution.
pub fn root_error(res: anyhow::Result<AppResponse>) -> String {
    res.unwrap_err().root_cause().to_string()
}

/// Attribute value of the first custom event of type `ty`.
pub fn event_attr(res: &AppResponse, ty: &str, key: &str) -> Option<String> {
    let wasm_ty = format!("wasm-{}", ty);
    res.events
        .iter()
        .filter(|e| e.ty == wasm_ty)
        .flat_map(|e| e.attributes.iter())
        .find(|a| a.key == key)
        .map(|a| a.value.clone())
}

pub fn count_events(res: &AppResponse, ty: &str) -> usize {
    let wasm_ty = format!("wasm-{}", ty);
    res.events.iter().filter(|e| e.ty == wasm_ty).count()
}
