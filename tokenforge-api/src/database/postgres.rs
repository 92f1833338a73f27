//! PostgreSQL store with runtime queries (no compile-time checking)

use super::{
    ConfirmOutcome, LogConfirmation, LogPage, TokenRecord, TokenStore, TransactionLog, UserRecord,
};
use crate::config::DatabaseConfig;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use tokenforge_core::{wire::ConfirmAction, Network};

#[derive(Clone)]
pub struct PostgresStore {
    pub pool: PgPool,
}

fn parse_network(value: &str) -> Result<Network> {
    value.parse().map_err(|e: String| anyhow!(e))
}

fn token_from_row(row: &PgRow) -> Result<TokenRecord> {
    Ok(TokenRecord {
        mint_address: row.try_get("mint_address")?,
        name: row.try_get("name")?,
        symbol: row.try_get("symbol")?,
        decimals: row.try_get::<i16, _>("decimals")? as u8,
        supply: row.try_get("supply")?,
        owner: row.try_get("owner")?,
        mint_authority: row.try_get("mint_authority")?,
        freeze_authority: row.try_get("freeze_authority")?,
        metadata: row.try_get("metadata")?,
        network: parse_network(row.try_get("network")?)?,
        created_at: row.try_get("created_at")?,
    })
}

fn log_from_row(row: &PgRow) -> Result<TransactionLog> {
    let tx_type: &str = row.try_get("tx_type")?;
    Ok(TransactionLog {
        id: row.try_get("id")?,
        tx_type: tx_type.parse().map_err(|e: String| anyhow!(e))?,
        mint: row.try_get("mint")?,
        from_address: row.try_get("from_address")?,
        to_address: row.try_get("to_address")?,
        amount: row.try_get("amount")?,
        decimals: row
            .try_get::<Option<i16>, _>("decimals")?
            .map(|d| d as u8),
        signature: row.try_get("signature")?,
        network: parse_network(row.try_get("network")?)?,
        meta: row.try_get("meta")?,
        created_at: row.try_get("created_at")?,
        confirmed_at: row.try_get("confirmed_at")?,
    })
}

fn user_from_row(row: &PgRow) -> Result<UserRecord> {
    Ok(UserRecord {
        wallet_address: row.try_get("wallet_address")?,
        created_at: row.try_get("created_at")?,
        profile: row.try_get("profile")?,
    })
}

impl PostgresStore {
    pub async fn connect(database_url: &str, config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Apply the bundled schema migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn insert_log_row(&self, log: &TransactionLog) -> Result<()> {
        let query = r#"
            INSERT INTO transaction_logs (
                id, tx_type, mint, from_address, to_address, amount, decimals,
                signature, network, meta, created_at, confirmed_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#;

        sqlx::query(query)
            .bind(log.id)
            .bind(log.tx_type.as_str())
            .bind(&log.mint)
            .bind(&log.from_address)
            .bind(&log.to_address)
            .bind(&log.amount)
            .bind(log.decimals.map(|d| d as i16))
            .bind(&log.signature)
            .bind(log.network.as_str())
            .bind(&log.meta)
            .bind(log.created_at)
            .bind(log.confirmed_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl TokenStore for PostgresStore {
    async fn insert_token(&self, token: &TokenRecord) -> Result<()> {
        let query = r#"
            INSERT INTO tokens (
                mint_address, name, symbol, decimals, supply, owner,
                mint_authority, freeze_authority, metadata, network, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (mint_address) DO NOTHING
        "#;

        sqlx::query(query)
            .bind(&token.mint_address)
            .bind(&token.name)
            .bind(&token.symbol)
            .bind(token.decimals as i16)
            .bind(&token.supply)
            .bind(&token.owner)
            .bind(&token.mint_authority)
            .bind(&token.freeze_authority)
            .bind(&token.metadata)
            .bind(token.network.as_str())
            .bind(token.created_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn get_token(&self, mint_address: &str) -> Result<Option<TokenRecord>> {
        let row = sqlx::query("SELECT * FROM tokens WHERE mint_address = $1")
            .bind(mint_address)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(token_from_row).transpose()
    }

    async fn get_tokens(&self, mint_addresses: &[String]) -> Result<Vec<TokenRecord>> {
        if mint_addresses.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query("SELECT * FROM tokens WHERE mint_address = ANY($1)")
            .bind(mint_addresses)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(token_from_row).collect()
    }

    async fn list_tokens_by_owner(&self, owner: &str, network: Network) -> Result<Vec<TokenRecord>> {
        let query = r#"
            SELECT * FROM tokens
            WHERE owner = $1 AND network = $2
            ORDER BY created_at DESC
        "#;

        let rows = sqlx::query(query)
            .bind(owner)
            .bind(network.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(token_from_row).collect()
    }

    async fn upsert_user(&self, wallet_address: &str) -> Result<UserRecord> {
        // The no-op update makes RETURNING yield the existing row on conflict
        let query = r#"
            INSERT INTO users (wallet_address, created_at, profile)
            VALUES ($1, NOW(), '{}'::jsonb)
            ON CONFLICT (wallet_address) DO UPDATE SET wallet_address = EXCLUDED.wallet_address
            RETURNING *
        "#;

        let row = sqlx::query(query)
            .bind(wallet_address)
            .fetch_one(&self.pool)
            .await?;

        user_from_row(&row)
    }

    async fn get_user(&self, wallet_address: &str) -> Result<Option<UserRecord>> {
        let row = sqlx::query("SELECT * FROM users WHERE wallet_address = $1")
            .bind(wallet_address)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn insert_transaction_log(&self, log: &TransactionLog) -> Result<()> {
        self.insert_log_row(log).await
    }

    async fn confirm_transaction_log(&self, confirmation: LogConfirmation) -> Result<ConfirmOutcome> {
        let existing = sqlx::query("SELECT * FROM transaction_logs WHERE signature = $1")
            .bind(&confirmation.signature)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(row) = existing {
            return Ok(ConfirmOutcome {
                action: ConfirmAction::Unchanged,
                log: log_from_row(&row)?,
            });
        }

        let query = r#"
            UPDATE transaction_logs
            SET signature = $1,
                confirmed_at = NOW(),
                meta = COALESCE(meta, '{}'::jsonb) || $2::jsonb
            WHERE id = (
                SELECT id FROM transaction_logs
                WHERE signature IS NULL
                  AND mint = $3
                  AND tx_type = $4
                  AND network = $5
                  AND ($6::text IS NULL OR from_address = $6)
                ORDER BY created_at DESC
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING *
        "#;

        let meta_patch = confirmation
            .meta
            .clone()
            .filter(Value::is_object)
            .unwrap_or_else(|| Value::Object(Default::default()));

        let updated = sqlx::query(query)
            .bind(&confirmation.signature)
            .bind(&meta_patch)
            .bind(&confirmation.mint)
            .bind(confirmation.tx_type.as_str())
            .bind(confirmation.network.as_str())
            .bind(&confirmation.from_address)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(row) = updated {
            return Ok(ConfirmOutcome {
                action: ConfirmAction::Updated,
                log: log_from_row(&row)?,
            });
        }

        let log = confirmation.into_log();
        self.insert_log_row(&log).await?;
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
        let offset = (page.max(1) as i64 - 1) * limit as i64;

        let rows = sqlx::query(
            r#"
            SELECT * FROM transaction_logs
            WHERE mint = $1 AND network = $2
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(mint)
        .bind(network.as_str())
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM transaction_logs WHERE mint = $1 AND network = $2",
        )
        .bind(mint)
        .bind(network.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(LogPage {
            logs: rows.iter().map(log_from_row).collect::<Result<_>>()?,
            total: total.max(0) as u64,
        })
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
