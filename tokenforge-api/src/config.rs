//! Configuration management for the tokenforge API
//!
//! Values come from a TOML file (every section optional), then environment
//! overrides, then validation.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokenforge_core::Network;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// `development` or `production`; production hides internal error detail
    pub environment: String,
    #[validate]
    pub api: ApiConfig,
    #[validate]
    pub database: DatabaseConfig,
    #[validate]
    pub redis: RedisConfig,
    #[validate]
    pub solana: SolanaConfig,
    #[validate]
    pub cache: CacheConfig,
    #[validate]
    pub airdrop: AirdropConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ApiConfig {
    pub bind_address: String,
    /// Allowed CORS origin; any origin when unset
    #[validate(url)]
    pub client_url: Option<String>,
    #[validate(range(min = 5, max = 300))]
    pub request_timeout_secs: u64,
    #[validate(range(min = 1, max = 100))]
    pub max_request_size_mb: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL URL; the in-memory store is used when unset
    #[validate(url)]
    pub url: Option<String>,
    #[validate(range(min = 1, max = 100))]
    pub max_connections: u32,
    #[validate(range(min = 1, max = 300))]
    pub acquire_timeout_secs: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RedisConfig {
    /// Redis URL; an in-process cache is used when unset
    #[validate(url)]
    pub url: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub key_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SolanaConfig {
    #[validate(url)]
    pub devnet_url: String,
    #[validate(url)]
    pub testnet_url: String,
    #[validate(url)]
    pub mainnet_url: String,
    #[validate(url)]
    pub localnet_url: String,
    pub commitment: String,
    #[validate(range(min = 1, max = 60))]
    pub connect_timeout_secs: u64,
    #[validate(range(min = 1, max = 120))]
    pub read_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CacheConfig {
    #[validate(range(min = 1, max = 3600))]
    pub token_ttl_secs: u64,
    #[validate(range(min = 16, max = 1_000_000))]
    pub max_entries: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AirdropConfig {
    #[validate(range(min = 0.001, max = 5.0))]
    pub max_sol: f64,
    #[validate(range(max = 86_400))]
    pub cooldown_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub log_level: String,
    pub structured_logging: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:5000".to_string(),
            client_url: None,
            request_timeout_secs: 30,
            max_request_size_mb: 1,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            acquire_timeout_secs: 10,
            run_migrations: true,
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: None,
            key_prefix: "tokenforge".to_string(),
        }
    }
}

impl Default for SolanaConfig {
    fn default() -> Self {
        Self {
            devnet_url: Network::Devnet.default_rpc_url().to_string(),
            testnet_url: Network::Testnet.default_rpc_url().to_string(),
            mainnet_url: Network::MainnetBeta.default_rpc_url().to_string(),
            localnet_url: Network::Localnet.default_rpc_url().to_string(),
            commitment: "confirmed".to_string(),
            connect_timeout_secs: 10,
            read_timeout_secs: 30,
        }
    }
}

impl SolanaConfig {
    pub fn rpc_url(&self, network: Network) -> &str {
        match network {
            Network::Devnet => &self.devnet_url,
            Network::Testnet => &self.testnet_url,
            Network::MainnetBeta => &self.mainnet_url,
            Network::Localnet => &self.localnet_url,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            token_ttl_secs: 30,
            max_entries: 10_000,
        }
    }
}

impl Default for AirdropConfig {
    fn default() -> Self {
        Self {
            max_sol: 2.0,
            cooldown_secs: 60,
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            structured_logging: false,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup; empty values are ignored
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("APP_ENV") {
            self.environment = v;
        }
        if let Some(v) = get("BIND_ADDRESS") {
            self.api.bind_address = v;
        }
        if let Some(v) = get("CLIENT_URL") {
            self.api.client_url = Some(v);
        }
        if let Some(v) = get("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Some(v) = get("REDIS_URL") {
            self.redis.url = Some(v);
        }
        if let Some(v) = get("SOLANA_DEVNET_URL") {
            self.solana.devnet_url = v;
        }
        if let Some(v) = get("SOLANA_TESTNET_URL") {
            self.solana.testnet_url = v;
        }
        if let Some(v) = get("SOLANA_MAINNET_URL") {
            self.solana.mainnet_url = v;
        }
        if let Some(v) = get("SOLANA_LOCALNET_URL") {
            self.solana.localnet_url = v;
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(|e| anyhow!("Invalid configuration: {}", e))?;

        self.api
            .bind_address
            .parse::<SocketAddr>()
            .map_err(|e| anyhow!("Invalid bind address {}: {}", self.api.bind_address, e))?;

        if !matches!(self.solana.commitment.as_str(), "processed" | "confirmed" | "finalized") {
            return Err(anyhow!("Unknown commitment level: {}", self.solana.commitment));
        }
        Ok(())
    }
}
