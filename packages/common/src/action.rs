//! Typed bridge actions and their tightly packed payload encodings.
//!
//! All integers are big-endian. Variable-length fields carry a one-byte
//! length prefix, so no single field or list may exceed 255 entries.
//!
//! | Type | Payload |
//! |------|---------|
//! | TokenTransfer | `sender_len sender target_chain target_len target token_id amount(8)` |
//! | UpdateCommitteeBlocklist | `blocklist_type count (pubkey(33))*` |
//! | EmergencyButton | `op` |
//! | LimitUpdate | `sending_chain new_limit(8)` |
//! | UpdateTokenPrices | `count (token_id price(8))*` |
//! | AddTokens | `native count (token_id)* count (name_len name)* count (price(8))*` |

use cosmwasm_schema::cw_serde;

use crate::error::CodecError;
use crate::message::{BridgeMessage, MessageType};

/// Compressed secp256k1 public key length
pub const COMMITTEE_KEY_LENGTH: usize = 33;

#[cw_serde]
pub struct TokenTransferPayload {
    /// Sender account on the source chain (raw bytes)
    pub sender: Vec<u8>,
    /// Chain the tokens are delivered to
    pub target_chain: u8,
    /// Recipient account on the target chain (raw bytes)
    pub target_address: Vec<u8>,
    pub token_id: u8,
    /// Amount in the token's smallest unit
    pub amount: u64,
}

#[cw_serde]
#[derive(Copy, Eq)]
#[repr(u8)]
pub enum BlocklistType {
    Blocklist = 0,
    Unblocklist = 1,
}

#[cw_serde]
pub struct BlocklistPayload {
    pub blocklist_type: BlocklistType,
    /// Compressed committee public keys
    pub members: Vec<Vec<u8>>,
}

#[cw_serde]
#[derive(Copy, Eq)]
#[repr(u8)]
pub enum EmergencyOp {
    Pause = 0,
    Unpause = 1,
}

#[cw_serde]
pub struct LimitUpdatePayload {
    /// Source chain of the route being limited (route target is this chain)
    pub sending_chain: u8,
    /// New 24h notional limit (USD, 4 decimals)
    pub new_limit: u64,
}

#[cw_serde]
#[derive(Copy, Eq)]
pub struct TokenPrice {
    pub token_id: u8,
    /// Notional USD value per whole token (4 decimals)
    pub price: u64,
}

#[cw_serde]
pub struct AddTokensPayload {
    pub native: bool,
    pub token_ids: Vec<u8>,
    pub type_names: Vec<String>,
    pub prices: Vec<u64>,
}

#[cw_serde]
pub enum BridgeAction {
    TokenTransfer(TokenTransferPayload),
    UpdateCommitteeBlocklist(BlocklistPayload),
    EmergencyButton(EmergencyOp),
    LimitUpdate(LimitUpdatePayload),
    UpdateTokenPrices(Vec<TokenPrice>),
    AddTokens(AddTokensPayload),
}

impl BridgeAction {
    pub fn message_type(&self) -> MessageType {
        match self {
            BridgeAction::TokenTransfer(_) => MessageType::TokenTransfer,
            BridgeAction::UpdateCommitteeBlocklist(_) => MessageType::UpdateCommitteeBlocklist,
            BridgeAction::EmergencyButton(_) => MessageType::EmergencyButton,
            BridgeAction::LimitUpdate(_) => MessageType::LimitUpdate,
            BridgeAction::UpdateTokenPrices(_) => MessageType::UpdateTokenPrices,
            BridgeAction::AddTokens(_) => MessageType::AddTokens,
        }
    }

    /// Parse the typed action carried by an envelope.
    pub fn from_message(message: &BridgeMessage) -> Result<Self, CodecError> {
        let kind = message.kind()?;
        if message.version != kind.version() {
            return Err(CodecError::UnsupportedVersion {
                message_type: message.message_type,
                version: message.version,
            });
        }
        Self::decode_payload(kind, &message.payload)
    }

    /// Wrap this action in an envelope ready for encoding and signing.
    pub fn to_message(&self, nonce: u64, source_chain: u8) -> Result<BridgeMessage, CodecError> {
        let kind = self.message_type();
        Ok(BridgeMessage {
            message_type: kind as u8,
            version: kind.version(),
            nonce,
            source_chain,
            payload: self.encode_payload()?,
        })
    }

    pub fn decode_payload(kind: MessageType, payload: &[u8]) -> Result<Self, CodecError> {
        let mut reader = PayloadReader::new(payload);
        let action = match kind {
            MessageType::TokenTransfer => {
                let sender = reader.read_len_prefixed()?.to_vec();
                let target_chain = reader.read_u8()?;
                let target_address = reader.read_len_prefixed()?.to_vec();
                let token_id = reader.read_u8()?;
                let amount = reader.read_u64()?;
                if sender.is_empty() || target_address.is_empty() {
                    return Err(invalid("empty sender or target address"));
                }
                BridgeAction::TokenTransfer(TokenTransferPayload {
                    sender,
                    target_chain,
                    target_address,
                    token_id,
                    amount,
                })
            }
            MessageType::UpdateCommitteeBlocklist => {
                let blocklist_type = match reader.read_u8()? {
                    0 => BlocklistType::Blocklist,
                    1 => BlocklistType::Unblocklist,
                    other => return Err(invalid(&format!("blocklist type {}", other))),
                };
                let count = reader.read_u8()? as usize;
                if count == 0 {
                    return Err(invalid("empty blocklist update"));
                }
                let mut members = Vec::with_capacity(count);
                for _ in 0..count {
                    members.push(reader.read_bytes(COMMITTEE_KEY_LENGTH)?.to_vec());
                }
                BridgeAction::UpdateCommitteeBlocklist(BlocklistPayload {
                    blocklist_type,
                    members,
                })
            }
            MessageType::EmergencyButton => match reader.read_u8()? {
                0 => BridgeAction::EmergencyButton(EmergencyOp::Pause),
                1 => BridgeAction::EmergencyButton(EmergencyOp::Unpause),
                other => return Err(invalid(&format!("emergency op {}", other))),
            },
            MessageType::LimitUpdate => BridgeAction::LimitUpdate(LimitUpdatePayload {
                sending_chain: reader.read_u8()?,
                new_limit: reader.read_u64()?,
            }),
            MessageType::UpdateTokenPrices => {
                let count = reader.read_u8()? as usize;
                if count == 0 {
                    return Err(invalid("empty price update"));
                }
                let mut prices = Vec::with_capacity(count);
                for _ in 0..count {
                    prices.push(TokenPrice {
                        token_id: reader.read_u8()?,
                        price: reader.read_u64()?,
                    });
                }
                BridgeAction::UpdateTokenPrices(prices)
            }
            MessageType::AddTokens => {
                let native = match reader.read_u8()? {
                    0 => false,
                    1 => true,
                    other => return Err(invalid(&format!("native flag {}", other))),
                };

                let id_count = reader.read_u8()? as usize;
                let token_ids = reader.read_bytes(id_count)?.to_vec();

                let name_count = reader.read_u8()? as usize;
                let mut type_names = Vec::with_capacity(name_count);
                for _ in 0..name_count {
                    let raw = reader.read_len_prefixed()?;
                    let name = std::str::from_utf8(raw)
                        .map_err(|_| invalid("token type name is not utf-8"))?;
                    type_names.push(name.to_string());
                }

                let price_count = reader.read_u8()? as usize;
                let mut prices = Vec::with_capacity(price_count);
                for _ in 0..price_count {
                    prices.push(reader.read_u64()?);
                }

                if id_count == 0 || id_count != name_count || id_count != price_count {
                    return Err(invalid(&format!(
                        "counts must be equal and non-empty: {} ids, {} names, {} prices",
                        id_count, name_count, price_count
                    )));
                }
                BridgeAction::AddTokens(AddTokensPayload {
                    native,
                    token_ids,
                    type_names,
                    prices,
                })
            }
        };
        reader.finish()?;
        Ok(action)
    }

    pub fn encode_payload(&self) -> Result<Vec<u8>, CodecError> {
        let mut bytes = Vec::new();
        match self {
            BridgeAction::TokenTransfer(t) => {
                push_len_prefixed(&mut bytes, &t.sender)?;
                bytes.push(t.target_chain);
                push_len_prefixed(&mut bytes, &t.target_address)?;
                bytes.push(t.token_id);
                bytes.extend_from_slice(&t.amount.to_be_bytes());
            }
            BridgeAction::UpdateCommitteeBlocklist(b) => {
                bytes.push(b.blocklist_type as u8);
                bytes.push(count_byte(b.members.len())?);
                for member in &b.members {
                    if member.len() != COMMITTEE_KEY_LENGTH {
                        return Err(invalid("committee key must be 33 bytes"));
                    }
                    bytes.extend_from_slice(member);
                }
            }
            BridgeAction::EmergencyButton(op) => bytes.push(*op as u8),
            BridgeAction::LimitUpdate(l) => {
                bytes.push(l.sending_chain);
                bytes.extend_from_slice(&l.new_limit.to_be_bytes());
            }
            BridgeAction::UpdateTokenPrices(prices) => {
                bytes.push(count_byte(prices.len())?);
                for p in prices {
                    bytes.push(p.token_id);
                    bytes.extend_from_slice(&p.price.to_be_bytes());
                }
            }
            BridgeAction::AddTokens(a) => {
                bytes.push(a.native as u8);
                bytes.push(count_byte(a.token_ids.len())?);
                bytes.extend_from_slice(&a.token_ids);
                bytes.push(count_byte(a.type_names.len())?);
                for name in &a.type_names {
                    push_len_prefixed(&mut bytes, name.as_bytes())?;
                }
                bytes.push(count_byte(a.prices.len())?);
                for price in &a.prices {
                    bytes.extend_from_slice(&price.to_be_bytes());
                }
            }
        }
        Ok(bytes)
    }
}

fn invalid(reason: &str) -> CodecError {
    CodecError::InvalidPayload {
        reason: reason.to_string(),
    }
}

fn count_byte(len: usize) -> Result<u8, CodecError> {
    u8::try_from(len).map_err(|_| invalid(&format!("length {} exceeds 255", len)))
}

fn push_len_prefixed(bytes: &mut Vec<u8>, field: &[u8]) -> Result<(), CodecError> {
    bytes.push(count_byte(field.len())?);
    bytes.extend_from_slice(field);
    Ok(())
}

/// Forward-only cursor over a payload.
struct PayloadReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> PayloadReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(CodecError::TruncatedPayload {
                offset: self.offset,
                needed: len,
            })?;
        let data = self.data;
        let slice = &data[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.read_bytes(1)?[0])
    }

    fn read_u64(&mut self) -> Result<u64, CodecError> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.read_bytes(8)?);
        Ok(u64::from_be_bytes(buf))
    }

    fn read_len_prefixed(&mut self) -> Result<&'a [u8], CodecError> {
        let len = self.read_u8()? as usize;
        self.read_bytes(len)
    }

    fn finish(self) -> Result<(), CodecError> {
        let remaining = self.data.len() - self.offset;
        if remaining != 0 {
            return Err(CodecError::TrailingBytes { remaining });
        }
        Ok(())
    }
}
