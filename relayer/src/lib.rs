//! Off-chain primitives for the Wormhole token bridge relayer.
//!
//! The relayer programs on EVM, Solana and Sui charge a USD-denominated fee for delivering a
//! token transfer and optionally swap a slice of the transferred token for native gas on the
//! target chain. This crate mirrors their arithmetic bit for bit so that tooling can quote fees
//! and build payloads that the on-chain programs will accept. It includes:
//!
//! - Normalization of amounts to and from the 8 decimal wire precision.
//! - Conversion of the USD relayer fee into token units.
//! - Native swap quotes, clamped by the per-token swap cap.
//! - The transfer-with-relay payload codec and the token bridge envelope around it.
//! - A read-only query interface for fetching on-chain snapshots.

#![deny(unused_results)]

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

pub mod config;
pub mod error;
pub mod fee;
pub mod message;
pub mod normalize;
pub mod query;
pub mod state;
pub mod swap;
pub mod tokenbridge;
pub mod transfer;

pub use {
    alloy_primitives::U256,
    config::ChainFamily,
    error::{Error, Result},
    message::TransferWithRelay,
    query::{Quoter, RelayerQuery},
    state::{RelayerFeeConfig, TokenMetadata},
    wormhole_supported_chains::Chain,
};

/// Token amounts cross chain boundaries with this many decimals.
pub const WIRE_DECIMALS: u8 = 8;

/// Payload id of the transfer-with-relay message.
pub const PAYLOAD_ID_TRANSFER_WITH_RELAY: u8 = 1;

/// Encoded size of the transfer-with-relay message: payload id, two amounts and a recipient.
pub const TRANSFER_WITH_RELAY_LEN: usize = 1 + 32 + 32 + 32;

/// Wormhole specifies addresses as 32 bytes. Addresses that are shorter, for example 20 byte
/// Ethereum addresses, are left zero padded to 32.
#[derive(
    Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct Address(pub [u8; 32]);

impl Address {
    pub fn is_zero(&self) -> bool {
        self.0 == [0; 32]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{b:02x}")?;
        }

        Ok(())
    }
}

/// Parses 64 hex characters, optionally prefixed with `0x`.
impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        if digits.len() != 64 {
            return Err(Error::InvalidRecipient(format!(
                "expected 64 hex characters, found {}",
                digits.len()
            )));
        }

        let mut buf = [0u8; 32];
        hex::decode_to_slice(digits, &mut buf)
            .map_err(|e| Error::InvalidRecipient(e.to_string()))?;

        Ok(Address(buf))
    }
}

impl From<[u8; 32]> for Address {
    fn from(bytes: [u8; 32]) -> Self {
        Address(bytes)
    }
}

/// Wormhole specifies an amount as a uint256 encoded in big-endian order.
#[derive(
    Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct Amount(pub [u8; 32]);

impl From<U256> for Amount {
    fn from(value: U256) -> Self {
        Amount(value.to_be_bytes())
    }
}

impl Amount {
    pub fn to_u256(self) -> U256 {
        U256::from_be_bytes(self.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn address_from_hex() {
        let s = "000000000000000000000000beefface00000000000000000000000000000001";
        let addr: Address = s.parse().unwrap();
        assert_eq!(addr.0[12..16], [0xbe, 0xef, 0xfa, 0xce]);
        assert_eq!(addr.0[31], 1);
        assert_eq!(addr.to_string(), s);

        let prefixed: Address = format!("0x{s}").parse().unwrap();
        assert_eq!(addr, prefixed);
    }

    #[test]
    fn address_wrong_length() {
        let inputs = [
            String::new(),
            "0x".into(),
            "beefface".into(),
            "ab".repeat(33),
            format!("0x{}", "ab".repeat(31)),
        ];

        for s in &inputs {
            let err = s
                .parse::<Address>()
                .expect_err("parsed an address of the wrong length");
            assert!(matches!(err, Error::InvalidRecipient(_)), "{s}: {err}");
        }
    }

    #[test]
    fn address_not_hex() {
        let s = "zz".repeat(32);
        assert!(matches!(
            s.parse::<Address>(),
            Err(Error::InvalidRecipient(_))
        ));
    }

    #[test]
    fn amount_big_endian() {
        let amount = Amount::from(U256::from(0x0102u64));
        assert_eq!(amount.0[30..], [0x01, 0x02]);
        assert!(amount.0[..30].iter().all(|&b| b == 0));
        assert_eq!(amount.to_u256(), U256::from(0x0102u64));

        let max = Amount::from(U256::MAX);
        assert_eq!(max.0, [0xff; 32]);
        assert_eq!(max.to_u256(), U256::MAX);
    }
}
