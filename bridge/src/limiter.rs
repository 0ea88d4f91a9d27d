//! Daily notional transfer limits per route.
//!
//! A route is `source_chain -> this chain`. Each route has a limit in notional
//! USD (4 decimals) per fixed 24h window. The window opens with the first
//! transfer after the previous one expired.

use cosmwasm_std::{StdResult, Storage, Timestamp, Uint128};

use crate::state::{
    BridgeTokenMetadata, RouteWindow, ROUTE_LIMITS, ROUTE_WINDOWS, TRANSFER_LIMIT_PERIOD,
};

/// Notional USD value (4 decimals) of `amount` base units of a token.
pub fn notional_value(metadata: &BridgeTokenMetadata, amount: u64) -> Uint128 {
    Uint128::from(amount).multiply_ratio(metadata.notional_value, metadata.decimal_multiplier)
}

/// Consume `notional` from the route's window if it fits.
///
/// Returns false without writing when the route has no configured limit or
/// the window would overflow.
pub fn check_and_consume_limit(
    storage: &mut dyn Storage,
    now: Timestamp,
    source_chain: u8,
    notional: Uint128,
) -> StdResult<bool> {
    let Some(limit) = ROUTE_LIMITS.may_load(storage, source_chain)? else {
        return Ok(false);
    };

    let mut window = current_window(storage, now, source_chain)?;

    let new_used = window.used.checked_add(notional)?;
    if new_used > Uint128::from(limit) {
        return Ok(false);
    }

    window.used = new_used;
    ROUTE_WINDOWS.save(storage, source_chain, &window)?;

    Ok(true)
}

/// The window in effect at `now`, reset if the stored one expired.
pub fn current_window(
    storage: &dyn Storage,
    now: Timestamp,
    source_chain: u8,
) -> StdResult<RouteWindow> {
    let fresh = RouteWindow {
        window_start: now,
        used: Uint128::zero(),
    };
    let window = ROUTE_WINDOWS.may_load(storage, source_chain)?;

    Ok(match window {
        Some(w) if now.seconds() < w.window_start.seconds() + TRANSFER_LIMIT_PERIOD => w,
        _ => fresh,
    })
}
