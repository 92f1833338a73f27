//! Persistence for token metadata, the transaction log and users
//!
//! Everything stored here is advisory: the chain is the source of truth, and
//! handlers wrap store calls in [`best_effort`] so a database outage never
//! fails a request.

pub mod memory;
pub mod postgres;

use crate::config::DatabaseConfig;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tokenforge_core::{
    wire::{ConfirmAction, TransactionType},
    Network,
};
use tracing::{info, warn};
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Token created through the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    pub mint_address: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    /// Initial supply in UI units, as requested
    pub supply: String,
    pub owner: String,
    pub mint_authority: String,
    pub freeze_authority: Option<String>,
    pub metadata: Option<Value>,
    pub network: Network,
    pub created_at: DateTime<Utc>,
}

/// One prepared (and later confirmed) token operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionLog {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    pub mint: String,
    pub from_address: Option<String>,
    pub to_address: Option<String>,
    /// UI units
    pub amount: String,
    pub decimals: Option<u8>,
    /// None until the client reports the confirmed signature
    pub signature: Option<String>,
    pub network: Network,
    pub meta: Value,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl TransactionLog {
    /// A log entry for a transaction that has been prepared but not yet signed
    pub fn pending(tx_type: TransactionType, mint: impl Into<String>, network: Network) -> Self {
        Self {
            id: Uuid::new_v4(),
            tx_type,
            mint: mint.into(),
            from_address: None,
            to_address: None,
            amount: "0".to_string(),
            decimals: None,
            signature: None,
            network,
            meta: Value::Object(Default::default()),
            created_at: Utc::now(),
            confirmed_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub wallet_address: String,
    pub created_at: DateTime<Utc>,
    pub profile: Value,
}

/// Signature reported by a client for a previously prepared operation
#[derive(Debug, Clone)]
pub struct LogConfirmation {
    pub mint: String,
    pub signature: String,
    pub tx_type: TransactionType,
    pub network: Network,
    pub amount: Option<String>,
    pub from_address: Option<String>,
    pub to_address: Option<String>,
    pub meta: Option<Value>,
}

impl LogConfirmation {
    /// Log inserted when no pending entry matched
    pub fn into_log(self) -> TransactionLog {
        let now = Utc::now();
        TransactionLog {
            id: Uuid::new_v4(),
            tx_type: self.tx_type,
            mint: self.mint,
            from_address: self.from_address,
            to_address: self.to_address,
            amount: self.amount.unwrap_or_else(|| "0".to_string()),
            decimals: None,
            signature: Some(self.signature),
            network: self.network,
            meta: self
                .meta
                .filter(Value::is_object)
                .unwrap_or_else(|| Value::Object(Default::default())),
            created_at: now,
            confirmed_at: Some(now),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfirmOutcome {
    pub action: ConfirmAction,
    pub log: TransactionLog,
}

#[derive(Debug, Clone, Default)]
pub struct LogPage {
    pub logs: Vec<TransactionLog>,
    pub total: u64,
}

/// Shallow-merge an object `patch` into `base`, like jsonb `||`.
///
/// A missing or non-object `base` is treated as `{}`. Non-object patches are ignored.
pub fn merge_meta(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => base.extend(patch),
        (base, patch @ Value::Object(_)) => *base = patch,
        _ => {}
    }
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Record a new token; an existing mint address is left untouched
    async fn insert_token(&self, token: &TokenRecord) -> Result<()>;

    async fn get_token(&self, mint_address: &str) -> Result<Option<TokenRecord>>;

    async fn get_tokens(&self, mint_addresses: &[String]) -> Result<Vec<TokenRecord>>;

    /// Tokens created by `owner`, newest first
    async fn list_tokens_by_owner(&self, owner: &str, network: Network) -> Result<Vec<TokenRecord>>;

    /// Create the user on first sight; returns the stored record
    async fn upsert_user(&self, wallet_address: &str) -> Result<UserRecord>;

    async fn get_user(&self, wallet_address: &str) -> Result<Option<UserRecord>>;

    async fn insert_transaction_log(&self, log: &TransactionLog) -> Result<()>;

    /// Patch the newest pending log matching mint/type/network (and sender,
    /// when given) with the signature, or insert a new confirmed log.
    async fn confirm_transaction_log(&self, confirmation: LogConfirmation) -> Result<ConfirmOutcome>;

    /// Logs for a mint, newest first. `page` is 1-based.
    async fn list_transaction_logs(
        &self,
        mint: &str,
        network: Network,
        page: u32,
        limit: u32,
    ) -> Result<LogPage>;

    async fn health_check(&self) -> Result<()>;
}

/// Await a store operation, logging and returning `fallback` on failure
pub async fn best_effort<T, F>(operation: &str, future: F, fallback: T) -> T
where
    F: Future<Output = Result<T>>,
{
    match future.await {
        Ok(value) => value,
        Err(e) => {
            warn!(operation, error = %e, "Database operation failed, continuing without it");
            fallback
        }
    }
}

/// Open the configured store: PostgreSQL when a URL is set, memory otherwise
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn TokenStore>> {
    match &config.url {
        Some(url) => {
            let store = PostgresStore::connect(url, config).await?;
            if config.run_migrations {
                store.migrate().await?;
            }
            info!("Connected to PostgreSQL");
            Ok(Arc::new(store))
        }
        None => {
            warn!("No database URL configured, metadata is kept in memory only");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
