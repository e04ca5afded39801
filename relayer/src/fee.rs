//! Conversion of the USD-denominated relayer fee into token units.

use alloy_primitives::U256;

use crate::{
    normalize::pow10,
    require,
    state::{RelayerFeeConfig, TokenMetadata},
    Error, Result,
};

/// Computes the relayer fee, in the token's smallest unit, charged for sending `token` to
/// `fee.target_chain`:
///
/// ```text
/// 10^token_decimals * relayer_fee_usd * swap_rate_precision
/// ---------------------------------------------------------
///           swap_rate * relayer_fee_precision
/// ```
///
/// All multiplications happen before the single truncating division, matching the on-chain
/// programs. A zero swap rate or precision means the route is not configured and yields
/// [`Error::DivisionByZero`].
pub fn calculate_relayer_fee_in_token(
    token: &TokenMetadata,
    fee: &RelayerFeeConfig,
    token_decimals: u8,
) -> Result<U256> {
    require!(!token.swap_rate.is_zero(), Error::DivisionByZero("swap rate"));
    require!(
        !token.swap_rate_precision.is_zero(),
        Error::DivisionByZero("swap rate precision")
    );
    require!(
        !fee.relayer_fee_precision.is_zero(),
        Error::DivisionByZero("relayer fee precision")
    );

    let numerator = pow10(token_decimals.into())
        .and_then(|scale| scale.checked_mul(fee.relayer_fee_usd))
        .and_then(|n| n.checked_mul(token.swap_rate_precision))
        .ok_or(Error::Overflow("relayer fee numerator"))?;
    let denominator = token
        .swap_rate
        .checked_mul(fee.relayer_fee_precision)
        .ok_or(Error::Overflow("relayer fee denominator"))?;

    Ok(numerator / denominator)
}
