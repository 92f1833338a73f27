//! One RPC client per cluster

use crate::config::SolanaConfig;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokenforge_core::{LightRpcClient, Network, SolanaRpc};

#[derive(Clone)]
pub struct RpcPool {
    clients: HashMap<Network, Arc<dyn SolanaRpc>>,
}

impl RpcPool {
    pub fn from_config(config: &SolanaConfig) -> Self {
        let connect = Duration::from_secs(config.connect_timeout_secs);
        let read = Duration::from_secs(config.read_timeout_secs);

        let clients = Network::ALL
            .iter()
            .map(|network| {
                let client = LightRpcClient::with_timeouts(config.rpc_url(*network), connect, read)
                    .with_commitment(config.commitment.clone());
                (*network, Arc::new(client) as Arc<dyn SolanaRpc>)
            })
            .collect();

        Self { clients }
    }

    /// Same client for every network
    pub fn uniform(client: Arc<dyn SolanaRpc>) -> Self {
        let clients = Network::ALL
            .iter()
            .map(|network| (*network, client.clone()))
            .collect();
        Self { clients }
    }

    pub fn get(&self, network: Network) -> Arc<dyn SolanaRpc> {
        match self.clients.get(&network) {
            Some(client) => client.clone(),
            // Every constructor fills all networks
            None => Arc::new(LightRpcClient::new(network.default_rpc_url())),
        }
    }
}
