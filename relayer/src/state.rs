//! Snapshots of relayer state read from chain.
//!
//! These are fetched right before a computation and never cached, since the owner may update
//! swap rates and fees between reads.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::Chain;

/// A token registered with the relayer.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct TokenMetadata {
    /// Decimals of the token on the chain the snapshot was read from.
    pub chain_local_decimals: u8,

    /// USD conversion rate scaled by `swap_rate_precision`. A rate of $15 with a precision of
    /// 1000000 is stored as 15000000.
    pub swap_rate: U256,

    pub swap_rate_precision: U256,

    /// Maximum amount of native gas, in the native token's smallest unit, that may be swapped
    /// for this token in one transfer.
    pub max_native_swap_amount: U256,
}

/// The USD relayer fee charged for delivering to `target_chain`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RelayerFeeConfig {
    pub target_chain: Chain,

    /// Relayer fee in USD, scaled by `relayer_fee_precision`.
    pub relayer_fee_usd: U256,

    pub relayer_fee_precision: U256,
}
