//! The transfer-with-relay payload.
//!
//! This is the message the relayer attaches to a token bridge transfer. Its wire format is fixed:
//!
//! | offset | size | field                    |
//! |--------|------|--------------------------|
//! | 0      | 1    | payload id (always 1)    |
//! | 1      | 32   | target relayer fee       |
//! | 33     | 32   | to native token amount   |
//! | 65     | 32   | recipient                |
//!
//! Both amounts are big-endian uint256 values in wire precision. The recipient is kept as raw
//! bytes; interpreting it as a chain specific address is left to the caller.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::{
    require, Address, Amount, Error, Result, PAYLOAD_ID_TRANSFER_WITH_RELAY,
    TRANSFER_WITH_RELAY_LEN,
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
enum Message {
    #[serde(rename = "1")]
    TransferWithRelay {
        target_relayer_fee: Amount,
        to_native_token_amount: Amount,
        recipient: Address,
    },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransferWithRelay {
    /// Relayer fee owed on the target chain, normalized to wire precision.
    pub target_relayer_fee: U256,

    /// Amount of the transferred token to swap for native gas, normalized to wire precision.
    pub to_native_token_amount: U256,

    pub recipient: Address,
}

impl From<&TransferWithRelay> for Message {
    fn from(payload: &TransferWithRelay) -> Self {
        Message::TransferWithRelay {
            target_relayer_fee: payload.target_relayer_fee.into(),
            to_native_token_amount: payload.to_native_token_amount.into(),
            recipient: payload.recipient,
        }
    }
}

impl From<Message> for TransferWithRelay {
    fn from(msg: Message) -> Self {
        match msg {
            Message::TransferWithRelay {
                target_relayer_fee,
                to_native_token_amount,
                recipient,
            } => TransferWithRelay {
                target_relayer_fee: target_relayer_fee.to_u256(),
                to_native_token_amount: to_native_token_amount.to_u256(),
                recipient,
            },
        }
    }
}

impl TransferWithRelay {
    pub fn encode(&self) -> Result<Vec<u8>> {
        let buf = serde_wormhole::to_vec(&Message::from(self))?;
        debug_assert_eq!(buf.len(), TRANSFER_WITH_RELAY_LEN);

        Ok(buf)
    }

    /// Decodes the payload starting at `base_offset` of `buf`.
    ///
    /// The payload is usually embedded in a larger message, so the caller supplies where it
    /// starts and anything after the payload is ignored.
    pub fn decode(buf: &[u8], base_offset: usize) -> Result<Self> {
        let payload = buf.get(base_offset..).ok_or_else(|| {
            Error::InvalidInput(format!(
                "offset {base_offset} is past the end of a {} byte message",
                buf.len()
            ))
        })?;

        let &payload_id = payload
            .first()
            .ok_or_else(|| Error::InvalidInput("empty payload".into()))?;
        require!(
            payload_id == PAYLOAD_ID_TRANSFER_WITH_RELAY,
            Error::UnsupportedPayloadType(payload_id)
        );

        let (msg, _) = serde_wormhole::from_slice_with_payload::<Message>(payload)?;
        Ok(msg.into())
    }
}

/// Encodes a transfer-with-relay payload for `recipient`, given as 64 hex characters with an
/// optional `0x` prefix.
pub fn encode_transfer_with_relay(
    target_relayer_fee: U256,
    to_native_token_amount: U256,
    recipient: &str,
) -> Result<Vec<u8>> {
    TransferWithRelay {
        target_relayer_fee,
        to_native_token_amount,
        recipient: recipient.parse()?,
    }
    .encode()
}
