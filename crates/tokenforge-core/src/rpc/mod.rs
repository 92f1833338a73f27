//! Solana JSON-RPC access
//!
//! `SolanaRpc` is the seam between the API/CLI and the cluster; production code
//! uses [`LightRpcClient`], tests plug in their own implementation.

mod client;

pub use client::LightRpcClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use solana_sdk::{
    account::Account, hash::Hash, pubkey::Pubkey, signature::Signature,
    transaction::Transaction,
};
use thiserror::Error;

/// RPC failures, classified by what a caller can do about them
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RpcError {
    #[error("RPC rate limited: {0}")]
    RateLimited(String),

    #[error("Blockhash not found: {0}")]
    BlockhashNotFound(String),

    #[error("Transaction already processed: {0}")]
    AlreadyProcessed(String),

    #[error("RPC error {code}: {message}")]
    Node { code: i64, message: String },

    #[error("Connection failed: {0}")]
    Transport(String),

    #[error("Invalid RPC response: {0}")]
    Decode(String),
}

impl RpcError {
    /// Sort a node error into a variant by inspecting its message.
    ///
    /// Nodes report these conditions only as free text.
    pub fn classify(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_ascii_lowercase();

        if code == 429 || lower.contains("too many requests") || lower.contains("rate limit") {
            RpcError::RateLimited(message)
        } else if lower.contains("already been processed") || lower.contains("alreadyprocessed") {
            RpcError::AlreadyProcessed(message)
        } else if lower.contains("blockhash not found") || lower.contains("blockhashnotfound") {
            RpcError::BlockhashNotFound(message)
        } else {
            RpcError::Node { code, message }
        }
    }

    /// Whether resubmitting with a fresh blockhash may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RpcError::RateLimited(_) | RpcError::BlockhashNotFound(_) | RpcError::Transport(_)
        )
    }
}

pub type RpcResult<T> = Result<T, RpcError>;

/// Token amount as returned by `getTokenSupply`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiTokenAmount {
    pub amount: String,
    pub decimals: u8,
    pub ui_amount_string: String,
}

impl UiTokenAmount {
    pub fn raw(&self) -> u64 {
        self.amount.parse().unwrap_or(0)
    }
}

/// Entry of `getTokenLargestAccounts`
#[derive(Debug, Clone, PartialEq)]
pub struct LargestTokenAccount {
    pub address: Pubkey,
    pub amount: UiTokenAmount,
}

/// Entry of `getSignatureStatuses`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureStatus {
    pub slot: u64,
    pub confirmations: Option<u64>,
    pub err: Option<serde_json::Value>,
    pub confirmation_status: Option<String>,
}

impl SignatureStatus {
    /// Reached `confirmed` or `finalized` commitment
    pub fn is_confirmed(&self) -> bool {
        matches!(
            self.confirmation_status.as_deref(),
            Some("confirmed") | Some("finalized")
        ) || (self.confirmation_status.is_none() && self.confirmations.is_none())
    }

    pub fn failed(&self) -> bool {
        self.err.as_ref().map(|e| !e.is_null()).unwrap_or(false)
    }
}

#[async_trait]
pub trait SolanaRpc: Send + Sync {
    async fn get_latest_blockhash(&self) -> RpcResult<Hash>;

    async fn get_account(&self, pubkey: &Pubkey) -> RpcResult<Option<Account>>;

    async fn get_multiple_accounts(&self, pubkeys: &[Pubkey]) -> RpcResult<Vec<Option<Account>>>;

    /// Lamport balance
    async fn get_balance(&self, pubkey: &Pubkey) -> RpcResult<u64>;

    async fn get_minimum_balance_for_rent_exemption(&self, data_len: usize) -> RpcResult<u64>;

    /// Token accounts owned by `owner`, optionally filtered to one mint
    async fn get_token_accounts_by_owner(
        &self,
        owner: &Pubkey,
        mint: Option<&Pubkey>,
    ) -> RpcResult<Vec<(Pubkey, Account)>>;

    async fn get_token_largest_accounts(&self, mint: &Pubkey) -> RpcResult<Vec<LargestTokenAccount>>;

    async fn get_token_supply(&self, mint: &Pubkey) -> RpcResult<UiTokenAmount>;

    async fn request_airdrop(&self, pubkey: &Pubkey, lamports: u64) -> RpcResult<Signature>;

    async fn send_transaction(&self, transaction: &Transaction) -> RpcResult<Signature>;

    async fn get_signature_statuses(
        &self,
        signatures: &[Signature],
    ) -> RpcResult<Vec<Option<SignatureStatus>>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_node_messages() {
        assert!(matches!(
            RpcError::classify(-32002, "Transaction simulation failed: This transaction has already been processed"),
            RpcError::AlreadyProcessed(_)
        ));
        assert!(matches!(
            RpcError::classify(-32002, "Transaction simulation failed: Blockhash not found"),
            RpcError::BlockhashNotFound(_)
        ));
        assert!(matches!(RpcError::classify(429, "slow down"), RpcError::RateLimited(_)));
        assert!(matches!(
            RpcError::classify(-32603, "Internal error"),
            RpcError::Node { code: -32603, .. }
        ));
    }

    #[test]
    fn only_transient_errors_are_retryable() {
        assert!(RpcError::BlockhashNotFound(String::new()).is_retryable());
        assert!(RpcError::Transport(String::new()).is_retryable());
        assert!(!RpcError::AlreadyProcessed(String::new()).is_retryable());
        assert!(!RpcError::Node { code: 1, message: String::new() }.is_retryable());
    }

    #[test]
    fn signature_status_commitment() {
        let status: SignatureStatus = serde_json::from_value(serde_json::json!({
            "slot": 10,
            "confirmations": 3,
            "err": null,
            "confirmationStatus": "confirmed"
        }))
        .unwrap();
        assert!(status.is_confirmed());
        assert!(!status.failed());

        let processed = SignatureStatus {
            confirmation_status: Some("processed".to_string()),
            ..status
        };
        assert!(!processed.is_confirmed());
    }
}
