//! Native gas swap quotes.
//!
//! A recipient may ask for part of an inbound transfer to be swapped for native gas, paid by the
//! relayer at the registered swap rates. [`NativeSwap`] mirrors the arithmetic the Solana relayer
//! program runs when it completes such a transfer; the EVM and Sui programs follow the same
//! formulas. Whatever quote is obtained, [`cap_native_amount_out`] and [`cap_swap_amount_in`] are
//! the final clamps applied before a quote is handed to a caller.

use std::cmp::Ordering;

use alloy_primitives::U256;

use crate::{
    normalize::{pow10, AmountWidth},
    require,
    state::TokenMetadata,
    Error, Result,
};

/// Checked arithmetic whose intermediates are bounded the way the on-chain program bounds them:
/// 64-bit chains compute in `u128`, EVM chains in `uint256`.
#[derive(Debug, Clone, Copy)]
struct Checked {
    width: AmountWidth,
}

impl Checked {
    fn bound(&self) -> U256 {
        match self.width {
            AmountWidth::U64 => U256::from(u128::MAX),
            AmountWidth::U256 => U256::MAX,
        }
    }

    fn fit(&self, v: Option<U256>, what: &'static str) -> Result<U256> {
        v.filter(|v| *v <= self.bound()).ok_or(Error::Overflow(what))
    }

    fn mul(&self, a: U256, b: U256, what: &'static str) -> Result<U256> {
        self.fit(a.checked_mul(b), what)
    }

    fn pow10(&self, exp: u8, what: &'static str) -> Result<U256> {
        self.fit(pow10(exp.into()), what)
    }

    fn div(&self, a: U256, b: U256, what: &'static str) -> Result<U256> {
        a.checked_div(b).ok_or(Error::DivisionByZero(what))
    }
}

/// Swap of `token` for the native gas token of the chain the transfer completes on.
#[derive(Debug, Clone, Copy)]
pub struct NativeSwap<'a> {
    /// The transferred token.
    pub token: &'a TokenMetadata,

    /// The native gas token as registered with the relayer. Its swap rate is the USD price of
    /// native gas and its decimals are the native decimals (9 for SOL, 18 for ETH).
    pub native: &'a TokenMetadata,

    /// Native integer width of the chain the swap executes on.
    pub width: AmountWidth,
}

impl NativeSwap<'_> {
    fn checked(&self) -> Checked {
        Checked { width: self.width }
    }

    /// Price of native gas in units of the token, scaled by the token's swap rate precision.
    pub fn native_swap_rate(&self) -> Result<U256> {
        let c = self.checked();
        require!(!self.token.swap_rate.is_zero(), Error::DivisionByZero("swap rate"));

        let rate = c.mul(
            self.token.swap_rate_precision,
            self.native.swap_rate,
            "native swap rate",
        )?;
        let rate = c.div(rate, self.token.swap_rate, "swap rate")?;

        // A zero rate means the relayer state is grossly misconfigured.
        require!(!rate.is_zero(), Error::DivisionByZero("native swap rate"));
        self.width.check(rate, "native swap rate")
    }

    /// The largest token amount that can be swapped without exceeding the native swap cap.
    pub fn max_swap_amount_in(&self) -> Result<U256> {
        let rate = self.native_swap_rate()?;
        self.max_swap_amount_in_at(rate)
    }

    fn max_swap_amount_in_at(&self, rate: U256) -> Result<U256> {
        let c = self.checked();
        let decimals = self.token.chain_local_decimals;
        let native_decimals = self.native.chain_local_decimals;
        let precision = self.token.swap_rate_precision;
        let max_native = self.token.max_native_swap_amount;

        let amount = match decimals.cmp(&native_decimals) {
            Ordering::Greater => {
                let scaled = c.mul(max_native, rate, "max swap amount in")?;
                let scaled = c.mul(
                    scaled,
                    c.pow10(decimals - native_decimals, "max swap amount in")?,
                    "max swap amount in",
                )?;
                c.div(scaled, precision, "swap rate precision")?
            }
            _ => {
                let scaled = c.mul(max_native, rate, "max swap amount in")?;
                let divisor = c.mul(
                    c.pow10(native_decimals - decimals, "max swap amount in")?,
                    precision,
                    "max swap amount in",
                )?;
                c.div(scaled, divisor, "swap rate precision")?
            }
        };

        self.width.check(amount, "max swap amount in")
    }

    /// Returns `(token_amount_in, native_amount_out)` for a request to swap
    /// `to_native_token_amount` of the token. The request is reduced to
    /// [`max_swap_amount_in`](Self::max_swap_amount_in) if it exceeds it, and both amounts are
    /// zero if the native amount out rounds down to zero.
    pub fn native_swap_amounts(&self, to_native_token_amount: U256) -> Result<(U256, U256)> {
        if to_native_token_amount.is_zero() || self.token.max_native_swap_amount.is_zero() {
            return Ok((U256::ZERO, U256::ZERO));
        }

        let c = self.checked();
        let rate = self.native_swap_rate()?;
        let max_in = self.max_swap_amount_in_at(rate)?;
        let amount_in = cap_swap_amount_in(max_in, to_native_token_amount);

        let decimals = self.token.chain_local_decimals;
        let native_decimals = self.native.chain_local_decimals;
        let precision = self.token.swap_rate_precision;

        let amount_out = match decimals.cmp(&native_decimals) {
            Ordering::Greater => {
                let scaled = c.mul(precision, amount_in, "native amount out")?;
                let divisor = c.mul(
                    rate,
                    c.pow10(decimals - native_decimals, "native amount out")?,
                    "native amount out",
                )?;
                c.div(scaled, divisor, "native swap rate")?
            }
            _ => {
                let scaled = c.mul(precision, amount_in, "native amount out")?;
                let scaled = c.mul(
                    scaled,
                    c.pow10(native_decimals - decimals, "native amount out")?,
                    "native amount out",
                )?;
                c.div(scaled, rate, "native swap rate")?
            }
        };

        if amount_out.is_zero() {
            return Ok((U256::ZERO, U256::ZERO));
        }

        Ok((amount_in, self.width.check(amount_out, "native amount out")?))
    }
}

/// Clamps a native amount out to the token's configured swap cap. The cap is a risk limit and
/// always has the final word, whatever the quote says.
pub fn cap_native_amount_out(quote: U256, token: &TokenMetadata) -> U256 {
    quote.min(token.max_native_swap_amount)
}

/// Clamps the token amount offered for a swap to both what the relayer can supply and what the
/// user asked for.
pub fn cap_swap_amount_in(
    max_swap_amount_in: U256,
    requested_to_native_token_amount: U256,
) -> U256 {
    max_swap_amount_in.min(requested_to_native_token_amount)
}

#[cfg(test)]
mod test {
    use super::*;

    const SWAP_RATE_PRECISION: u64 = 100_000_000;

    fn token(decimals: u8, swap_rate: u64, max_native_swap_amount: u64) -> TokenMetadata {
        TokenMetadata {
            chain_local_decimals: decimals,
            swap_rate: swap_rate.into(),
            swap_rate_precision: SWAP_RATE_PRECISION.into(),
            max_native_swap_amount: max_native_swap_amount.into(),
        }
    }

    fn sol(swap_rate: u64) -> TokenMetadata {
        token(9, swap_rate, 0)
    }

    fn swap<'a>(token: &'a TokenMetadata, native: &'a TokenMetadata) -> NativeSwap<'a> {
        NativeSwap {
            token,
            native,
            width: AmountWidth::U64,
        }
    }

    #[test]
    fn native_swap_rate() {
        let native = sol(420_000_000_000);
        let mut registered = token(9, 1_000_000_000, 1_000_000_000);
        assert_eq!(
            swap(&registered, &native).native_swap_rate().unwrap(),
            U256::from(42_000_000_000u64)
        );

        registered.swap_rate = 6_900_000_000u64.into();
        assert_eq!(
            swap(&registered, &native).native_swap_rate().unwrap(),
            U256::from(6_086_956_521u64)
        );

        // Rounds down to zero.
        let native = sol(1);
        assert!(matches!(
            swap(&registered, &native).native_swap_rate(),
            Err(Error::DivisionByZero("native swap rate"))
        ));

        // Does not fit in 64 bits.
        registered.swap_rate = U256::from(1);
        let native = sol(u64::MAX);
        assert!(matches!(
            swap(&registered, &native).native_swap_rate(),
            Err(Error::Overflow(_))
        ));

        registered.swap_rate = U256::ZERO;
        assert!(matches!(
            swap(&registered, &native).native_swap_rate(),
            Err(Error::DivisionByZero("swap rate"))
        ));
    }

    #[test]
    fn max_swap_amount_in() {
        // $10.00 token, 1 SOL cap, SOL at $4,200.00.
        let native = sol(420_000_000_000);
        let cases = [
            (10, 4_200_000_000_000u64),
            (9, 420_000_000_000),
            (8, 42_000_000_000),
        ];
        for (decimals, expected) in cases {
            let registered = token(decimals, 1_000_000_000, 1_000_000_000);
            assert_eq!(
                swap(&registered, &native).max_swap_amount_in().unwrap(),
                U256::from(expected),
                "decimals {decimals}"
            );
        }

        let registered = token(9, 1_000_000_000, 1_000_000);
        assert_eq!(
            swap(&registered, &native).max_swap_amount_in().unwrap(),
            U256::from(420_000_000u64)
        );
    }

    #[test]
    fn max_swap_amount_in_overflow() {
        let registered = TokenMetadata {
            swap_rate_precision: U256::from(1),
            ..token(9, 1, 1_000_000_000)
        };
        let err = swap(&registered, &sol(0))
            .max_swap_amount_in_at(u64::MAX.into())
            .unwrap_err();
        assert!(matches!(err, Error::Overflow(_)));
    }

    #[test]
    fn native_swap_amounts() {
        // $10.00 token, 10 SOL cap, SOL at $420.00.
        let native = sol(42_000_000_000);
        let one_token = U256::from(10_000_000_000u64);
        let cases = [(10, 23_809_523u64), (9, 238_095_238), (8, 2_380_952_380)];
        for (decimals, expected) in cases {
            let registered = token(decimals, 1_000_000_000, 10_000_000_000);
            let (amount_in, amount_out) = swap(&registered, &native)
                .native_swap_amounts(one_token)
                .unwrap();
            assert_eq!(amount_in, one_token, "decimals {decimals}");
            assert_eq!(amount_out, U256::from(expected), "decimals {decimals}");
        }
    }

    #[test]
    fn native_swap_amounts_zero() {
        let native = sol(42_000_000_000);
        let mut registered = token(10, 1_000_000_000, 10_000_000_000);
        assert_eq!(
            swap(&registered, &native)
                .native_swap_amounts(U256::ZERO)
                .unwrap(),
            (U256::ZERO, U256::ZERO)
        );

        // Rounds toward zero.
        assert_eq!(
            swap(&registered, &native)
                .native_swap_amounts(U256::from(1))
                .unwrap(),
            (U256::ZERO, U256::ZERO)
        );

        registered.max_native_swap_amount = U256::ZERO;
        assert_eq!(
            swap(&registered, &native)
                .native_swap_amounts(10_000_000_000u64.into())
                .unwrap(),
            (U256::ZERO, U256::ZERO)
        );
    }

    #[test]
    fn native_swap_amounts_capped() {
        // 1 SOL cap; asking for far more than 42 tokens buys exactly 1 SOL.
        let native = sol(42_000_000_000);
        let registered = token(10, 1_000_000_000, 1_000_000_000);
        let (amount_in, amount_out) = swap(&registered, &native)
            .native_swap_amounts(6_900_000_000_000u64.into())
            .unwrap();
        assert_eq!(amount_in, U256::from(420_000_000_000u64));
        assert_eq!(amount_out, U256::from(1_000_000_000u64));
        assert!(amount_out <= registered.max_native_swap_amount);
    }

    #[test]
    fn native_swap_amounts_overflow() {
        let registered = token(10, 100_000_000, u64::MAX);
        let native = sol(100_000_000);
        assert!(matches!(
            swap(&registered, &native).native_swap_amounts(u64::MAX.into()),
            Err(Error::Overflow(_))
        ));

        let registered = TokenMetadata {
            swap_rate_precision: U256::from(1),
            ..token(8, 100_000_000, u64::MAX)
        };
        let native = sol(u64::MAX);
        assert!(swap(&registered, &native)
            .native_swap_amounts(u64::MAX.into())
            .is_err());
    }

    #[test]
    fn wide_chain_does_not_overflow() {
        // 18 decimal token and native gas at equal prices, with a cap of 10^12 ETH.
        let registered = TokenMetadata {
            max_native_swap_amount: pow10(30).unwrap(),
            ..token(18, 100_000_000, 0)
        };
        let native = token(18, 100_000_000, 0);
        let requested = pow10(29).unwrap() * U256::from(5);

        let narrow = NativeSwap {
            token: &registered,
            native: &native,
            width: AmountWidth::U64,
        };
        assert!(matches!(
            narrow.native_swap_amounts(requested),
            Err(Error::Overflow(_))
        ));

        let wide = NativeSwap {
            width: AmountWidth::U256,
            ..narrow
        };
        assert_eq!(
            wide.native_swap_amounts(requested).unwrap(),
            (requested, requested)
        );
    }

    #[test]
    fn caps() {
        let registered = token(8, 1, 500);
        assert_eq!(cap_native_amount_out(U256::from(499u64), &registered), U256::from(499u64));
        assert_eq!(cap_native_amount_out(U256::from(501u64), &registered), U256::from(500u64));
        assert_eq!(cap_native_amount_out(U256::MAX, &registered), U256::from(500u64));

        assert_eq!(cap_swap_amount_in(U256::from(10u64), U256::from(7u64)), U256::from(7u64));
        assert_eq!(cap_swap_amount_in(U256::from(10u64), U256::from(70u64)), U256::from(10u64));
    }
}
