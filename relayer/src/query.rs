//! Fetch-then-compute against on-chain relayer state.
//!
//! [`RelayerQuery`] is the read-only view of the relayer programs that the quoting functions
//! need. Every call goes to the chain: snapshots are never cached because the owner can update
//! swap rates and fees at any time. Failed queries are surfaced as
//! [`Error::RemoteQueryFailure`] without retrying.

use std::{collections::HashMap, fmt::Display};

use alloy_primitives::U256;
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::{
    config::{ChainFamily, RelayerConfig},
    fee::calculate_relayer_fee_in_token,
    normalize::AmountWidth,
    state::{RelayerFeeConfig, TokenMetadata},
    swap::{cap_native_amount_out, cap_swap_amount_in, NativeSwap},
    Address, Chain, Error, Result,
};

/// Read-only access to the relayer programs. Implementations must not mutate chain state; the
/// swap quotes are simulated calls.
#[async_trait]
pub trait RelayerQuery: Send + Sync {
    /// The registration of `token` with the relayer on `chain`.
    async fn token_metadata(&self, chain: Chain, token: &Address)
        -> anyhow::Result<TokenMetadata>;

    /// The USD fee the relayer on `source` charges for delivering to `target`.
    async fn relayer_fee(&self, source: Chain, target: Chain) -> anyhow::Result<RelayerFeeConfig>;

    /// Native gas, in the smallest native unit, paid out for swapping `to_native_token_amount`
    /// of `token` on `chain`.
    async fn native_swap_quote(
        &self,
        chain: Chain,
        token: &Address,
        to_native_token_amount: U256,
    ) -> anyhow::Result<U256>;

    /// The largest amount of `token` the relayer on `chain` accepts for a native swap.
    async fn max_swap_amount_in(&self, chain: Chain, token: &Address) -> anyhow::Result<U256>;
}

#[async_trait]
impl<Q: RelayerQuery + ?Sized> RelayerQuery for &Q {
    async fn token_metadata(
        &self,
        chain: Chain,
        token: &Address,
    ) -> anyhow::Result<TokenMetadata> {
        (**self).token_metadata(chain, token).await
    }

    async fn relayer_fee(&self, source: Chain, target: Chain) -> anyhow::Result<RelayerFeeConfig> {
        (**self).relayer_fee(source, target).await
    }

    async fn native_swap_quote(
        &self,
        chain: Chain,
        token: &Address,
        to_native_token_amount: U256,
    ) -> anyhow::Result<U256> {
        (**self)
            .native_swap_quote(chain, token, to_native_token_amount)
            .await
    }

    async fn max_swap_amount_in(&self, chain: Chain, token: &Address) -> anyhow::Result<U256> {
        (**self).max_swap_amount_in(chain, token).await
    }
}

fn remote<T>(res: anyhow::Result<T>, what: impl FnOnce() -> String) -> Result<T> {
    res.map_err(|e| {
        let e = e.context(format!("failed to query {}", what()));
        warn!(error = ?e, "relayer query failed");
        Error::RemoteQueryFailure(e)
    })
}

/// Rejects an on-chain value that cannot be represented on the chain that returned it.
fn check_width(value: U256, width: AmountWidth, what: impl Display) -> Result<U256> {
    if value > width.max() {
        return Err(Error::RemoteQueryFailure(anyhow!(
            "{what} {value} does not fit the chain's native amount type"
        )));
    }

    Ok(value)
}

/// Quotes fees and native swaps from freshly fetched relayer state.
#[derive(Debug, Clone)]
pub struct Quoter<Q> {
    query: Q,
    config: RelayerConfig,
}

impl<Q: RelayerQuery> Quoter<Q> {
    pub fn new(query: Q, config: RelayerConfig) -> Self {
        Quoter { query, config }
    }

    fn family(&self, chain: Chain) -> Result<ChainFamily> {
        self.config
            .chain(chain)
            .map(|c| c.family)
            .or_else(|| ChainFamily::of(chain))
            .ok_or_else(|| Error::InvalidInput(format!("relayer is not deployed on {chain}")))
    }

    async fn token_metadata(&self, chain: Chain, token: &Address) -> Result<TokenMetadata> {
        let meta = remote(
            self.query.token_metadata(chain, token).await,
            || format!("token {token} on {chain}"),
        )?;
        debug!(
            %chain,
            %token,
            swap_rate = %meta.swap_rate,
            max_native_swap_amount = %meta.max_native_swap_amount,
            "fetched token metadata"
        );

        Ok(meta)
    }

    /// The relayer fee, in the smallest unit of `token`, for sending it from `source` to
    /// `target`.
    pub async fn relayer_fee_in_token(
        &self,
        source: Chain,
        target: Chain,
        token: &Address,
    ) -> Result<U256> {
        let width = self.family(source)?.width();
        let meta = self.token_metadata(source, token).await?;
        let fee = remote(
            self.query.relayer_fee(source, target).await,
            || format!("relayer fee from {source} to {target}"),
        )?;
        debug!(%source, %target, relayer_fee_usd = %fee.relayer_fee_usd, "fetched relayer fee");

        let amount = calculate_relayer_fee_in_token(&meta, &fee, meta.chain_local_decimals)?;
        width.check(amount, "relayer fee")
    }

    /// Native gas paid out on `chain` for swapping `to_native_token_amount` of `token`. The
    /// result never exceeds the token's `max_native_swap_amount`, whatever the simulated quote.
    pub async fn calculate_swap_quote(
        &self,
        chain: Chain,
        token: &Address,
        to_native_token_amount: U256,
    ) -> Result<U256> {
        let width = self.family(chain)?.width();
        let meta = self.token_metadata(chain, token).await?;
        let quote = remote(
            self.query
                .native_swap_quote(chain, token, to_native_token_amount)
                .await,
            || format!("native swap quote for {token} on {chain}"),
        )?;
        let quote = check_width(quote, width, "native swap quote")?;

        let capped = cap_native_amount_out(quote, &meta);
        if capped < quote {
            warn!(
                %chain,
                %token,
                %quote,
                max_native_swap_amount = %meta.max_native_swap_amount,
                "native swap quote exceeds the swap cap"
            );
        }

        Ok(capped)
    }

    /// The amount of `token` to offer for a native swap on `chain`: the relayer's maximum, or
    /// `to_native_token_amount` if that is smaller.
    pub async fn calculate_max_swap_amount_in(
        &self,
        chain: Chain,
        token: &Address,
        to_native_token_amount: U256,
    ) -> Result<U256> {
        let width = self.family(chain)?.width();
        let max_in = remote(
            self.query.max_swap_amount_in(chain, token).await,
            || format!("max swap amount in for {token} on {chain}"),
        )?;
        let max_in = check_width(max_in, width, "max swap amount in")?;
        debug!(%chain, %token, %max_in, "fetched max swap amount in");

        Ok(cap_swap_amount_in(max_in, to_native_token_amount))
    }
}

/// Relayer state held in memory, answering queries with the same arithmetic as the Solana
/// relayer program.
#[derive(Debug, Default, Clone)]
pub struct Snapshot {
    tokens: HashMap<(Chain, Address), TokenMetadata>,
    native: HashMap<Chain, (ChainFamily, TokenMetadata)>,
    fees: HashMap<(Chain, Chain), RelayerFeeConfig>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, chain: Chain, token: Address, meta: TokenMetadata) -> Self {
        let _ = self.tokens.insert((chain, token), meta);
        self
    }

    /// Registers the native gas token of `chain`, whose relayer program belongs to `family`.
    /// Its swap rate prices native gas in USD.
    pub fn with_native(mut self, chain: Chain, family: ChainFamily, meta: TokenMetadata) -> Self {
        let _ = self.native.insert(chain, (family, meta));
        self
    }

    pub fn with_relayer_fee(mut self, source: Chain, fee: RelayerFeeConfig) -> Self {
        let _ = self.fees.insert((source, fee.target_chain), fee);
        self
    }

    fn token(&self, chain: Chain, token: &Address) -> anyhow::Result<&TokenMetadata> {
        self.tokens
            .get(&(chain, *token))
            .with_context(|| format!("token {token} is not registered on {chain}"))
    }

    fn native_swap(&self, chain: Chain, token: &Address) -> anyhow::Result<NativeSwap<'_>> {
        let (family, native) = self
            .native
            .get(&chain)
            .with_context(|| format!("no native token registered on {chain}"))?;

        Ok(NativeSwap {
            token: self.token(chain, token)?,
            native,
            width: family.width(),
        })
    }
}

#[async_trait]
impl RelayerQuery for Snapshot {
    async fn token_metadata(
        &self,
        chain: Chain,
        token: &Address,
    ) -> anyhow::Result<TokenMetadata> {
        self.token(chain, token).cloned()
    }

    async fn relayer_fee(&self, source: Chain, target: Chain) -> anyhow::Result<RelayerFeeConfig> {
        self.fees
            .get(&(source, target))
            .cloned()
            .with_context(|| format!("no relayer fee from {source} to {target}"))
    }

    async fn native_swap_quote(
        &self,
        chain: Chain,
        token: &Address,
        to_native_token_amount: U256,
    ) -> anyhow::Result<U256> {
        let (_, amount_out) = self
            .native_swap(chain, token)?
            .native_swap_amounts(to_native_token_amount)?;
        Ok(amount_out)
    }

    async fn max_swap_amount_in(&self, chain: Chain, token: &Address) -> anyhow::Result<U256> {
        Ok(self.native_swap(chain, token)?.max_swap_amount_in()?)
    }
}
