//! Both ends of a relayed transfer: the payload built when tokens leave a chain and the split of
//! funds when the relayer redeems them on the other side.

use alloy_primitives::U256;

use crate::{
    message::TransferWithRelay,
    normalize::{denormalize_amount, normalize_amount, truncate_amount},
    require,
    swap::NativeSwap,
    Address, Chain, Error, Result,
};

/// Returns true if `address` on `chain` can receive a relayed transfer sent from `local_chain`.
pub fn valid_foreign_address(local_chain: Chain, chain: Chain, address: &Address) -> bool {
    u16::from(chain) != 0 && chain != local_chain && !address.is_zero()
}

/// A transfer about to leave `local_chain`. Amounts are in the token's smallest unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundTransfer {
    pub local_chain: Chain,
    pub amount: U256,
    pub to_native_token_amount: U256,
    pub decimals: u8,
    /// Result of [`calculate_relayer_fee_in_token`](crate::fee::calculate_relayer_fee_in_token)
    /// for the target chain.
    pub relayer_fee: U256,
    pub recipient_chain: Chain,
    pub recipient: Address,
}

/// Validates an outbound transfer and builds the payload that goes with it. Every amount in the
/// payload is normalized to the wire precision.
pub fn prepare_transfer(transfer: &OutboundTransfer) -> Result<TransferWithRelay> {
    let decimals = transfer.decimals;

    require!(
        !truncate_amount(transfer.amount, decimals)?.is_zero(),
        Error::InvalidInput("amount is zero after truncation to wire precision".into())
    );
    require!(
        valid_foreign_address(
            transfer.local_chain,
            transfer.recipient_chain,
            &transfer.recipient
        ),
        Error::InvalidRecipient(format!(
            "{} on chain {}",
            transfer.recipient, transfer.recipient_chain
        ))
    );

    let to_native_token_amount = normalize_amount(transfer.to_native_token_amount, decimals);
    require!(
        transfer.to_native_token_amount.is_zero() || !to_native_token_amount.is_zero(),
        Error::InvalidInput("to native token amount is below wire precision".into())
    );

    let target_relayer_fee = normalize_amount(transfer.relayer_fee, decimals);

    let amount = normalize_amount(transfer.amount, decimals);
    let required = to_native_token_amount
        .checked_add(target_relayer_fee)
        .ok_or(Error::Overflow("to native token amount plus relayer fee"))?;
    require!(
        amount > required,
        Error::InsufficientFunds { amount, required }
    );

    Ok(TransferWithRelay {
        target_relayer_fee,
        to_native_token_amount,
        recipient: transfer.recipient,
    })
}

/// How the tokens of an inbound relayed transfer are split when it is redeemed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Redemption {
    /// Tokens sent to the recipient.
    pub recipient_amount: U256,

    /// Tokens sent to the relayer's fee recipient: the relayer fee plus the tokens swapped for
    /// native gas.
    pub fee_recipient_amount: U256,

    /// Tokens swapped for native gas.
    pub token_amount_in: U256,

    /// Native gas the relayer pays the recipient.
    pub native_amount_out: U256,
}

impl Redemption {
    /// Splits `transfer_amount`, in wire precision, according to `payload`.
    ///
    /// When the recipient redeems the transfer itself everything goes to the recipient. `swap` is
    /// `None` when the chain does not offer native swaps for the token, such as wrapped SOL,
    /// which is unwrapped instead.
    pub fn compute(
        transfer_amount: U256,
        payload: &TransferWithRelay,
        decimals: u8,
        swap: Option<NativeSwap<'_>>,
        self_redemption: bool,
    ) -> Result<Self> {
        let amount = denormalize_amount(transfer_amount, decimals)?;
        if self_redemption {
            return Ok(Redemption {
                recipient_amount: amount,
                ..Default::default()
            });
        }

        let relayer_fee = denormalize_amount(payload.target_relayer_fee, decimals)?;
        let to_native_token_amount = denormalize_amount(payload.to_native_token_amount, decimals)?;

        let (token_amount_in, native_amount_out) = match swap {
            Some(swap) => swap.native_swap_amounts(to_native_token_amount)?,
            None => (U256::ZERO, U256::ZERO),
        };

        let fee_recipient_amount = token_amount_in
            .checked_add(relayer_fee)
            .ok_or(Error::Overflow("fee recipient amount"))?;
        let recipient_amount =
            amount
                .checked_sub(fee_recipient_amount)
                .ok_or(Error::InsufficientFunds {
                    amount,
                    required: fee_recipient_amount,
                })?;

        Ok(Redemption {
            recipient_amount,
            fee_recipient_amount,
            token_amount_in,
            native_amount_out,
        })
    }
}
