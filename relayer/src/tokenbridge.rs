//! The token bridge transfer that carries a relay payload.
//!
//! The relayer sends tokens with the token bridge's transfer-with-payload message and appends a
//! [`TransferWithRelay`] as the arbitrary payload, so the relay payload starts right after the
//! fixed size transfer header.

use serde::{Deserialize, Serialize};

use crate::{message::TransferWithRelay, require, Address, Amount, Chain, Error, Result};

/// Payload id of the token bridge's transfer-with-payload message.
pub const PAYLOAD_ID_TRANSFER_WITH_PAYLOAD: u8 = 3;

/// Encoded size of the transfer-with-payload header, which is also the offset of the relay
/// payload inside the token bridge message.
pub const TRANSFER_WITH_PAYLOAD_HEADER_LEN: usize = 1 + 32 + 32 + 2 + 32 + 2 + 32;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
enum Message {
    #[serde(rename = "3")]
    TransferWithPayload {
        amount: Amount,
        token_address: Address,
        token_chain: Chain,
        recipient: Address,
        recipient_chain: Chain,
        sender_address: Address,
        // The payload is directly appended to the message.
    },
}

/// Header of a token bridge transfer-with-payload message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferWithPayload {
    /// Transferred amount in wire precision.
    pub amount: Amount,
    pub token_address: Address,
    pub token_chain: Chain,
    /// The relayer contract on the target chain, which redeems the transfer.
    pub recipient: Address,
    pub recipient_chain: Chain,
    /// The relayer contract on the source chain.
    pub sender_address: Address,
}

impl From<Message> for TransferWithPayload {
    fn from(msg: Message) -> Self {
        let Message::TransferWithPayload {
            amount,
            token_address,
            token_chain,
            recipient,
            recipient_chain,
            sender_address,
        } = msg;

        TransferWithPayload {
            amount,
            token_address,
            token_chain,
            recipient,
            recipient_chain,
            sender_address,
        }
    }
}

impl TransferWithPayload {
    fn to_message(&self) -> Message {
        Message::TransferWithPayload {
            amount: self.amount,
            token_address: self.token_address,
            token_chain: self.token_chain,
            recipient: self.recipient,
            recipient_chain: self.recipient_chain,
            sender_address: self.sender_address,
        }
    }

    /// Encodes the header followed by `payload`.
    pub fn encode_with_relay(&self, payload: &TransferWithRelay) -> Result<Vec<u8>> {
        let mut buf = serde_wormhole::to_vec(&self.to_message())?;
        debug_assert_eq!(buf.len(), TRANSFER_WITH_PAYLOAD_HEADER_LEN);

        buf.extend(payload.encode()?);
        Ok(buf)
    }
}

/// Splits a token bridge transfer-with-payload message into its header and relay payload.
pub fn parse_transfer_with_relay(buf: &[u8]) -> Result<(TransferWithPayload, TransferWithRelay)> {
    let &payload_id = buf
        .first()
        .ok_or_else(|| Error::InvalidInput("empty token bridge message".into()))?;
    require!(
        payload_id == PAYLOAD_ID_TRANSFER_WITH_PAYLOAD,
        Error::UnsupportedPayloadType(payload_id)
    );

    let (msg, payload) = serde_wormhole::from_slice_with_payload::<Message>(buf)?;
    let relay = TransferWithRelay::decode(payload, 0)?;

    Ok((msg.into(), relay))
}
