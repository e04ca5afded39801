//! Conversion between a token's native decimals and the 8 decimal wire precision.
//!
//! The token bridge truncates every amount to [`WIRE_DECIMALS`] before it leaves the source
//! chain, so tokens with more decimals lose their low order digits in transit. The relayer
//! payload follows the same rule for its fee and native swap amounts.

use alloy_primitives::U256;

use crate::{Error, Result, WIRE_DECIMALS};

/// Returns `10^exp`, or `None` if it does not fit in 256 bits.
pub(crate) fn pow10(exp: u32) -> Option<U256> {
    U256::from(10u8).checked_pow(U256::from(exp))
}

fn scale(decimals: u8) -> Option<Option<U256>> {
    match decimals.saturating_sub(WIRE_DECIMALS) {
        0 => None,
        diff => Some(pow10(diff.into())),
    }
}

/// Rescales `amount` from `decimals` to the wire precision, truncating toward zero.
pub fn normalize_amount(amount: U256, decimals: u8) -> U256 {
    match scale(decimals) {
        None => amount,
        Some(Some(divisor)) => amount / divisor,
        // Any 256-bit amount divided by a divisor wider than 256 bits is zero.
        Some(None) => U256::ZERO,
    }
}

/// Rescales a wire amount back to `decimals`. Fails with [`Error::Overflow`] instead of
/// wrapping when the result does not fit in 256 bits.
pub fn denormalize_amount(amount: U256, decimals: u8) -> Result<U256> {
    match scale(decimals) {
        None => Ok(amount),
        Some(_) if amount.is_zero() => Ok(amount),
        Some(factor) => factor
            .and_then(|f| amount.checked_mul(f))
            .ok_or(Error::Overflow("denormalized amount")),
    }
}

/// The amount that actually arrives on the other side of the bridge: `amount` with every digit
/// below the wire precision dropped. Always `<= amount` and idempotent.
pub fn truncate_amount(amount: U256, decimals: u8) -> Result<U256> {
    denormalize_amount(normalize_amount(amount, decimals), decimals)
}

/// Width of the native integer type that holds amounts on a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AmountWidth {
    /// Solana and Sui token amounts.
    U64,
    /// EVM token amounts.
    U256,
}

impl AmountWidth {
    pub fn max(self) -> U256 {
        match self {
            AmountWidth::U64 => U256::from(u64::MAX),
            AmountWidth::U256 => U256::MAX,
        }
    }

    /// Checks that `amount` is representable on a chain of this width.
    pub fn check(self, amount: U256, what: &'static str) -> Result<U256> {
        if amount > self.max() {
            Err(Error::Overflow(what))
        } else {
            Ok(amount)
        }
    }
}

/// Parses a base 10 amount. Amounts are unsigned on every chain, so a sign is rejected.
pub fn parse_amount(s: &str) -> Result<U256> {
    let s = s.trim();
    crate::require!(
        !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()),
        Error::InvalidInput(format!("not an unsigned base 10 amount: {s:?}"))
    );

    U256::from_str_radix(s, 10).map_err(|_| Error::Overflow("parsed amount"))
}
