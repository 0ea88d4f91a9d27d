//! Treasury and token registry.
//!
//! A token moves `Unregistered -> Waiting -> Supported`, forward only:
//!
//! 1. `register_foreign_token` (anyone): the bridge must already be the sole
//!    cw20 minter and the wasm admin of a zero-supply token. The admin is
//!    cleared so the token code is frozen, and the registration waits.
//! 2. `approve_new_tokens` (committee `AddTokens`): assigns the bridge token
//!    id and the initial notional price.
//!
//! Token type names are the bech32 address strings of the cw20 contracts.

use cosmwasm_std::{
    to_json_binary, Addr, CosmosMsg, DepsMut, Env, Event, Response, Storage, Uint128, WasmMsg,
};
use cw20::{Cw20ExecuteMsg, Cw20QueryMsg, MinterResponse, TokenInfoResponse};

use bridge_common::{AddTokensPayload, TokenPrice};

use crate::error::ContractError;
use crate::state::{
    BridgeTokenMetadata, ForeignTokenRegistration, MintAuthority, ID_TO_TYPE, MAX_TOKEN_DECIMALS,
    SUPPORTED_TOKENS, TREASURIES, WAITING_ROOM,
};

// ============================================================================
// Registration
// ============================================================================

/// Deposit the bridge's authority over a freshly created cw20 token.
pub fn register_foreign_token(
    deps: DepsMut,
    env: &Env,
    token: String,
) -> Result<Response, ContractError> {
    let token_addr = deps.api.addr_validate(&token)?;
    let type_name = token_addr.to_string();
    let bridge = env.contract.address.as_str();

    if WAITING_ROOM.has(deps.storage, &type_name)
        || SUPPORTED_TOKENS.has(deps.storage, &type_name)
        || TREASURIES.has(deps.storage, &type_name)
    {
        return Err(ContractError::TokenAlreadyRegistered { token: type_name });
    }

    // Sole, uncapped minter
    let minter: Option<MinterResponse> = deps
        .querier
        .query_wasm_smart(&token_addr, &Cw20QueryMsg::Minter {})?;
    match minter {
        Some(m) if m.minter == bridge && m.cap.is_none() => {}
        _ => return Err(ContractError::MintAuthorityNotGranted { token: type_name }),
    }

    let token_info: TokenInfoResponse = deps
        .querier
        .query_wasm_smart(&token_addr, &Cw20QueryMsg::TokenInfo {})?;
    if !token_info.total_supply.is_zero() {
        return Err(ContractError::TokenSupplyNonZero {
            token: type_name,
            supply: token_info.total_supply.to_string(),
        });
    }
    if token_info.decimals > MAX_TOKEN_DECIMALS {
        return Err(ContractError::InvalidDecimals {
            decimals: token_info.decimals,
        });
    }

    let contract_info = deps.querier.query_wasm_contract_info(&token_addr)?;
    if contract_info.admin.as_deref() != Some(bridge) {
        return Err(ContractError::InvalidUpgradeAuthority { token: type_name });
    }

    let authority = MintAuthority::Cw20Minter {
        contract: token_addr.clone(),
    };
    TREASURIES.save(deps.storage, &type_name, &authority)?;
    WAITING_ROOM.save(
        deps.storage,
        &type_name,
        &ForeignTokenRegistration {
            type_name: type_name.clone(),
            decimals: token_info.decimals,
            upgrade_authority: token_addr.clone(),
        },
    )?;

    // Freeze the token code: nobody can migrate it after this
    let freeze = WasmMsg::ClearAdmin {
        contract_addr: token_addr.to_string(),
    };

    let event = Event::new("token_registration")
        .add_attribute("type_name", &type_name)
        .add_attribute("decimals", token_info.decimals.to_string())
        .add_attribute("native_token", "false");

    Ok(Response::new()
        .add_message(freeze)
        .add_event(event)
        .add_attribute("method", "register_foreign_token")
        .add_attribute("token", type_name)
        .add_attribute("authority", authority.kind()))
}

// ============================================================================
// Committee Actions
// ============================================================================

/// Promote waiting registrations to supported tokens.
///
/// Every entry is checked before the first write.
pub fn approve_new_tokens(
    storage: &mut dyn Storage,
    payload: &AddTokensPayload,
) -> Result<Vec<Event>, ContractError> {
    let AddTokensPayload {
        native,
        token_ids,
        type_names,
        prices,
    } = payload;

    if token_ids.len() != type_names.len() || token_ids.len() != prices.len() {
        return Err(ContractError::MalformedMessage {
            reason: "token_ids, type_names and prices must have equal length".to_string(),
        });
    }

    let mut staged: Vec<(String, BridgeTokenMetadata)> = Vec::with_capacity(token_ids.len());
    for ((token_id, type_name), price) in token_ids.iter().zip(type_names).zip(prices) {
        if *price == 0 {
            return Err(ContractError::InvalidNotionalValue {
                token_id: *token_id,
            });
        }

        // Each registration is consumed at most once, also within a batch
        let registration = WAITING_ROOM
            .may_load(storage, type_name)?
            .filter(|_| !staged.iter().any(|(name, _)| name == type_name))
            .ok_or_else(|| ContractError::RegistrationNotFound {
                token: type_name.clone(),
            })?;

        if ID_TO_TYPE.has(storage, *token_id)
            || staged.iter().any(|(_, metadata)| metadata.id == *token_id)
        {
            return Err(ContractError::TokenIdAlreadyUsed {
                token_id: *token_id,
            });
        }

        if registration.decimals > MAX_TOKEN_DECIMALS {
            return Err(ContractError::InvalidDecimals {
                decimals: registration.decimals,
            });
        }

        staged.push((
            type_name.clone(),
            BridgeTokenMetadata {
                id: *token_id,
                decimal_multiplier: 10u64.pow(u32::from(registration.decimals)),
                notional_value: *price,
                native_token: *native,
            },
        ));
    }

    let mut events = Vec::with_capacity(staged.len());
    for (type_name, metadata) in staged {
        WAITING_ROOM.remove(storage, &type_name);
        SUPPORTED_TOKENS.save(storage, &type_name, &metadata)?;
        ID_TO_TYPE.save(storage, metadata.id, &type_name)?;

        events.push(
            Event::new("new_token")
                .add_attribute("token_id", metadata.id.to_string())
                .add_attribute("type_name", type_name)
                .add_attribute("native_token", metadata.native_token.to_string()),
        );
    }

    Ok(events)
}

/// Set notional prices for supported tokens, applied in batch order.
pub fn update_asset_notional_prices(
    storage: &mut dyn Storage,
    prices: &[TokenPrice],
) -> Result<Vec<Event>, ContractError> {
    let mut staged = Vec::with_capacity(prices.len());
    for entry in prices {
        if entry.price == 0 {
            return Err(ContractError::InvalidNotionalValue {
                token_id: entry.token_id,
            });
        }
        let type_name = ID_TO_TYPE.may_load(storage, entry.token_id)?.ok_or(
            ContractError::UnsupportedTokenType {
                token: entry.token_id.to_string(),
            },
        )?;
        staged.push((type_name, entry));
    }

    let mut events = Vec::with_capacity(staged.len());
    for (type_name, entry) in staged {
        let mut metadata = SUPPORTED_TOKENS.load(storage, &type_name)?;
        metadata.notional_value = entry.price;
        SUPPORTED_TOKENS.save(storage, &type_name, &metadata)?;

        events.push(
            Event::new("update_token_price")
                .add_attribute("token_id", entry.token_id.to_string())
                .add_attribute("new_price", entry.price.to_string()),
        );
    }

    Ok(events)
}

// ============================================================================
// Lookups & Mint/Burn
// ============================================================================

/// Type name and metadata of a supported token id.
pub fn load_token(
    storage: &dyn Storage,
    token_id: u8,
) -> Result<(String, BridgeTokenMetadata), ContractError> {
    let type_name =
        ID_TO_TYPE
            .may_load(storage, token_id)?
            .ok_or(ContractError::UnsupportedTokenType {
                token: token_id.to_string(),
            })?;
    let metadata = SUPPORTED_TOKENS.load(storage, &type_name)?;
    Ok((type_name, metadata))
}

/// cw20 contract the bridge mints and burns `type_name` through.
fn cw20_minter(storage: &dyn Storage, type_name: &str) -> Result<Addr, ContractError> {
    let authority = TREASURIES.may_load(storage, type_name)?.ok_or_else(|| {
        ContractError::UnsupportedTokenType {
            token: type_name.to_string(),
        }
    })?;
    match authority {
        MintAuthority::Cw20Minter { contract } => Ok(contract),
    }
}

/// Mint `amount` of a supported token to `recipient`.
pub fn mint_msg(
    storage: &dyn Storage,
    token_id: u8,
    recipient: &Addr,
    amount: u64,
) -> Result<CosmosMsg, ContractError> {
    let (type_name, _) = load_token(storage, token_id)?;
    let contract = cw20_minter(storage, &type_name)?;

    Ok(WasmMsg::Execute {
        contract_addr: contract.to_string(),
        msg: to_json_binary(&Cw20ExecuteMsg::Mint {
            recipient: recipient.to_string(),
            amount: Uint128::from(amount),
        })?,
        funds: vec![],
    }
    .into())
}

/// Burn `amount` of a supported token held by the bridge.
pub fn burn_msg(
    storage: &dyn Storage,
    type_name: &str,
    amount: Uint128,
) -> Result<CosmosMsg, ContractError> {
    if !SUPPORTED_TOKENS.has(storage, type_name) {
        return Err(ContractError::UnsupportedTokenType {
            token: type_name.to_string(),
        });
    }
    let contract = cw20_minter(storage, type_name)?;

    Ok(WasmMsg::Execute {
        contract_addr: contract.to_string(),
        msg: to_json_binary(&Cw20ExecuteMsg::Burn { amount })?,
        funds: vec![],
    }
    .into())
}
