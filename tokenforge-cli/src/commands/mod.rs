// Command modules for the tokenforge CLI

pub mod ops;
pub mod token;
pub mod utils;
pub mod wallet;

use crate::api_client::ApiClient;
use anyhow::Result;
use solana_sdk::signature::{Keypair, Signer};
use tokenforge_core::{LightRpcClient, Network};

/// Settings shared by every command
pub struct Context {
    pub api: ApiClient,
    pub network: Network,
    pub rpc_url: String,
    pub wallet_path: String,
}

impl Context {
    pub fn new(
        api_url: &str,
        network: Network,
        rpc_url: Option<String>,
        wallet_path: String,
    ) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(api_url)?,
            network,
            rpc_url: rpc_url.unwrap_or_else(|| network.default_rpc_url().to_string()),
            wallet_path,
        })
    }

    pub fn wallet(&self) -> Result<Keypair> {
        utils::load_keypair(&self.wallet_path)
    }

    /// Wallet address given explicitly, or the configured wallet's
    pub fn address_or_wallet(&self, address: Option<String>) -> Result<String> {
        match address {
            Some(address) => Ok(utils::parse_pubkey(&address)?.to_string()),
            None => Ok(self.wallet()?.pubkey().to_string()),
        }
    }

    pub fn rpc(&self) -> LightRpcClient {
        LightRpcClient::new(self.rpc_url.clone())
    }
}
