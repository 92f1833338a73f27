//! Solana cluster tags

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cluster a request targets. Serialized with the tags wallets and explorers use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Network {
    #[default]
    #[serde(rename = "devnet")]
    Devnet,
    #[serde(rename = "testnet")]
    Testnet,
    #[serde(rename = "mainnet-beta", alias = "mainnet")]
    MainnetBeta,
    #[serde(rename = "localnet")]
    Localnet,
}

impl Network {
    pub const ALL: [Network; 4] = [
        Network::Devnet,
        Network::Testnet,
        Network::MainnetBeta,
        Network::Localnet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Devnet => "devnet",
            Network::Testnet => "testnet",
            Network::MainnetBeta => "mainnet-beta",
            Network::Localnet => "localnet",
        }
    }

    /// Public RPC endpoint used when configuration does not override it
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Network::Devnet => "https://api.devnet.solana.com",
            Network::Testnet => "https://api.testnet.solana.com",
            Network::MainnetBeta => "https://api.mainnet-beta.solana.com",
            Network::Localnet => "http://localhost:8899",
        }
    }

    /// Faucets only exist on test clusters
    pub fn allows_airdrop(&self) -> bool {
        !matches!(self, Network::MainnetBeta)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "devnet" => Ok(Network::Devnet),
            "testnet" => Ok(Network::Testnet),
            "mainnet-beta" | "mainnet" => Ok(Network::MainnetBeta),
            "localnet" | "localhost" => Ok(Network::Localnet),
            other => Err(format!("Unknown network: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_tags_and_aliases() {
        assert_eq!("devnet".parse::<Network>().unwrap(), Network::Devnet);
        assert_eq!("Mainnet".parse::<Network>().unwrap(), Network::MainnetBeta);
        assert_eq!("mainnet-beta".parse::<Network>().unwrap(), Network::MainnetBeta);
        assert_eq!("localhost".parse::<Network>().unwrap(), Network::Localnet);
        assert!("solana".parse::<Network>().is_err());
    }

    #[test]
    fn serde_uses_cluster_tags() {
        let json = serde_json::to_string(&Network::MainnetBeta).unwrap();
        assert_eq!(json, "\"mainnet-beta\"");

        let parsed: Network = serde_json::from_str("\"mainnet\"").unwrap();
        assert_eq!(parsed, Network::MainnetBeta);
    }

    #[test]
    fn airdrop_only_on_test_clusters() {
        assert!(Network::Devnet.allows_airdrop());
        assert!(Network::Localnet.allows_airdrop());
        assert!(!Network::MainnetBeta.allows_airdrop());
    }
}
