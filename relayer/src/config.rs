//! Per chain relayer settings.

use std::collections::HashSet;

use anyhow::{bail, ensure, Context};
use serde::{Deserialize, Serialize};

use crate::{normalize::AmountWidth, Chain};

/// The family of on-chain relayer programs a chain runs. Each family has its own native amount
/// width.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
    Evm,
    Solana,
    Sui,
}

impl ChainFamily {
    /// Returns the family of a well known chain, or `None` if the relayer is not deployed there.
    pub fn of(chain: Chain) -> Option<Self> {
        match chain {
            Chain::Solana => Some(ChainFamily::Solana),
            Chain::Sui => Some(ChainFamily::Sui),
            Chain::Ethereum
            | Chain::Bsc
            | Chain::Polygon
            | Chain::Avalanche
            | Chain::Fantom
            | Chain::Celo
            | Chain::Moonbeam
            | Chain::Arbitrum
            | Chain::Optimism => Some(ChainFamily::Evm),
            _ => None,
        }
    }

    pub fn width(self) -> AmountWidth {
        match self {
            ChainFamily::Evm => AmountWidth::U256,
            ChainFamily::Solana | ChainFamily::Sui => AmountWidth::U64,
        }
    }
}

/// Settings for one chain the relayer is deployed on.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    pub chain: Chain,

    pub family: ChainFamily,

    /// Byte offset of the relay payload inside the token bridge message delivered to this chain.
    #[serde(default = "default_payload_offset")]
    pub payload_offset: usize,
}

fn default_payload_offset() -> usize {
    crate::tokenbridge::TRANSFER_WITH_PAYLOAD_HEADER_LEN
}

/// Settings for every chain the relayer is deployed on.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct RelayerConfig {
    pub chains: Vec<ChainConfig>,
}

impl RelayerConfig {
    pub fn from_json(s: &str) -> anyhow::Result<Self> {
        let cfg: RelayerConfig =
            serde_json::from_str(s).context("failed to parse relayer config")?;
        cfg.validate()?;

        Ok(cfg)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let mut seen = HashSet::new();
        for c in &self.chains {
            if !seen.insert(c.chain) {
                bail!("chain {} is configured more than once", c.chain);
            }

            if let Some(family) = ChainFamily::of(c.chain) {
                ensure!(
                    family == c.family,
                    "{} is a {family:?} chain, not {:?}",
                    c.chain,
                    c.family
                );
            }
        }

        Ok(())
    }

    pub fn chain(&self, chain: Chain) -> Option<&ChainConfig> {
        self.chains.iter().find(|c| c.chain == chain)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn families() {
        assert_eq!(ChainFamily::of(Chain::Ethereum), Some(ChainFamily::Evm));
        assert_eq!(ChainFamily::of(Chain::Avalanche), Some(ChainFamily::Evm));
        assert_eq!(ChainFamily::of(Chain::Solana), Some(ChainFamily::Solana));
        assert_eq!(ChainFamily::of(Chain::Sui), Some(ChainFamily::Sui));
        assert_eq!(ChainFamily::of(Chain::Unknown(0xfffe)), None);

        assert_eq!(ChainFamily::Evm.width(), AmountWidth::U256);
        assert_eq!(ChainFamily::Sui.width(), AmountWidth::U64);
    }

    #[test]
    fn defaults() {
        let cfg = RelayerConfig::from_json(
            r#"{
                "chains": [
                    { "chain": 1, "family": "solana" },
                    { "chain": 2, "family": "evm", "payload_offset": 0 }
                ]
            }"#,
        )
        .unwrap();

        let sol = cfg.chain(Chain::Solana).unwrap();
        assert_eq!(sol.payload_offset, 133);
        assert_eq!(cfg.chain(Chain::Ethereum).unwrap().payload_offset, 0);

        assert!(cfg.chain(Chain::Sui).is_none());
    }

    #[test]
    fn duplicate_chain() {
        let err = RelayerConfig::from_json(
            r#"{ "chains": [{ "chain": 2, "family": "evm" }, { "chain": 2, "family": "evm" }] }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("more than once"), "{err:#}");
    }

    #[test]
    fn unknown_chain_needs_family() {
        let cfg = RelayerConfig::from_json(
            r#"{ "chains": [{ "chain": 65000, "family": "sui" }] }"#,
        )
        .unwrap();
        assert_eq!(cfg.chain(Chain::Unknown(65000)).unwrap().family, ChainFamily::Sui);

        assert!(RelayerConfig::from_json(r#"{ "chains": [{ "chain": 65000 }] }"#).is_err());
    }

    #[test]
    fn wrong_family() {
        assert!(RelayerConfig::from_json(r#"{ "chains": [{ "chain": 1, "family": "evm" }] }"#)
            .is_err());
    }

    #[test]
    fn not_json() {
        let err = RelayerConfig::from_json("chains = []").unwrap_err();
        assert!(format!("{err:#}").starts_with("failed to parse relayer config"));
    }
}
