use alloy_primitives::U256;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced while computing fees and quotes or while encoding and decoding payloads.
///
/// Every error is returned to the immediate caller; nothing here is retried.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),

    /// A swap rate or precision is zero, i.e. the route is not configured for relaying.
    #[error("division by zero: {0} is not configured")]
    DivisionByZero(&'static str),

    #[error("unsupported payload type {0}")]
    UnsupportedPayloadType(u8),

    #[error("arithmetic overflow while computing {0}")]
    Overflow(&'static str),

    #[error("insufficient funds: amount {amount} does not cover {required}")]
    InsufficientFunds { amount: U256, required: U256 },

    #[error("remote query failed: {0:#}")]
    RemoteQueryFailure(#[source] anyhow::Error),

    #[error("malformed payload")]
    Malformed(#[from] serde_wormhole::Error),
}

/// Returns early with the given error if the condition does not hold.
#[macro_export]
macro_rules! require {
    ($expr:expr, $err:expr) => {
        if !$expr {
            return Err($err);
        }
    };
}
