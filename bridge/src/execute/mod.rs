//! Execute handlers for the CL8Y committee bridge contract.
//!
//! - `actions` - committee-signed `SubmitBridgeAction` and governance effects
//! - `transfer` - inbound approval and claim, outbound cw20 burn

mod actions;
mod transfer;

pub use actions::*;
pub use transfer::{execute_claim_token, execute_receive};
