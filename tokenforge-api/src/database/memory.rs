//! In-process store used when no database is configured, and in tests

use super::{
    merge_meta, ConfirmOutcome, LogConfirmation, LogPage, TokenRecord, TokenStore,
    TransactionLog, UserRecord,
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use tokenforge_core::{wire::ConfirmAction, Network};
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    tokens: HashMap<String, TokenRecord>,
    users: HashMap<String, UserRecord>,
    logs: Vec<TransactionLog>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored log, oldest first
    pub async fn all_logs(&self) -> Vec<TransactionLog> {
        self.tables.read().await.logs.clone()
    }
}

#[async_trait]
impl TokenStore for MemoryStore {
    async fn insert_token(&self, token: &TokenRecord) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables
            .tokens
            .entry(token.mint_address.clone())
            .or_insert_with(|| token.clone());
        Ok(())
    }

    async fn get_token(&self, mint_address: &str) -> Result<Option<TokenRecord>> {
        Ok(self.tables.read().await.tokens.get(mint_address).cloned())
    }

    async fn get_tokens(&self, mint_addresses: &[String]) -> Result<Vec<TokenRecord>> {
        let tables = self.tables.read().await;
        Ok(mint_addresses
            .iter()
            .filter_map(|mint| tables.tokens.get(mint).cloned())
            .collect())
    }

    async fn list_tokens_by_owner(&self, owner: &str, network: Network) -> Result<Vec<TokenRecord>> {
        let tables = self.tables.read().await;
        let mut tokens: Vec<TokenRecord> = tables
            .tokens
            .values()
            .filter(|t| t.owner == owner && t.network == network)
            .cloned()
            .collect();
        tokens.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tokens)
    }

    async fn upsert_user(&self, wallet_address: &str) -> Result<UserRecord> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .entry(wallet_address.to_string())
            .or_insert_with(|| UserRecord {
                wallet_address: wallet_address.to_string(),
                created_at: Utc::now(),
                profile: Value::Object(Default::default()),
            });
        Ok(user.clone())
    }

    async fn get_user(&self, wallet_address: &str) -> Result<Option<UserRecord>> {
        Ok(self.tables.read().await.users.get(wallet_address).cloned())
    }

    async fn insert_transaction_log(&self, log: &TransactionLog) -> Result<()> {
        self.tables.write().await.logs.push(log.clone());
        Ok(())
    }

    async fn confirm_transaction_log(&self, confirmation: LogConfirmation) -> Result<ConfirmOutcome> {
        let mut tables = self.tables.write().await;

        if let Some(existing) = tables
            .logs
            .iter()
            .find(|log| log.signature.as_deref() == Some(confirmation.signature.as_str()))
        {
            return Ok(ConfirmOutcome {
                action: ConfirmAction::Unchanged,
                log: existing.clone(),
            });
        }

        // Logs are appended in creation order, so the last match is the newest
        let pending = tables.logs.iter_mut().rev().find(|log| {
            log.signature.is_none()
                && log.mint == confirmation.mint
                && log.tx_type == confirmation.tx_type
                && log.network == confirmation.network
                && confirmation
                    .from_address
                    .as_ref()
                    .map_or(true, |from| log.from_address.as_ref() == Some(from))
        });

        if let Some(log) = pending {
            log.signature = Some(confirmation.signature);
            log.confirmed_at = Some(Utc::now());
            if let Some(meta) = confirmation.meta {
                merge_meta(&mut log.meta, meta);
            }
            return Ok(ConfirmOutcome {
                action: ConfirmAction::Updated,
                log: log.clone(),
            });
        }

        let log = confirmation.into_log();
        tables.logs.push(log.clone());
        Ok(ConfirmOutcome {
            action: ConfirmAction::Created,
            log,
        })
    }

    async fn list_transaction_logs(
        &self,
        mint: &str,
        network: Network,
        page: u32,
        limit: u32,
    ) -> Result<LogPage> {
        let tables = self.tables.read().await;
        let matching: Vec<&TransactionLog> = tables
            .logs
            .iter()
            .rev()
            .filter(|log| log.mint == mint && log.network == network)
            .collect();

        let offset = (page.max(1) as usize - 1) * limit as usize;
        let logs = matching
            .iter()
            .skip(offset)
            .take(limit as usize)
            .map(|log| (*log).clone())
            .collect();

        Ok(LogPage {
            logs,
            total: matching.len() as u64,
        })
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
