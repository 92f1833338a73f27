//! JSON bodies exchanged between the HTTP API and its clients
//!
//! Field names are camelCase on the wire.

use crate::network::Network;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Kind of token operation recorded in the transaction log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Create,
    Mint,
    Burn,
    Transfer,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Create => "create",
            TransactionType::Mint => "mint",
            TransactionType::Burn => "burn",
            TransactionType::Transfer => "transfer",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(TransactionType::Create),
            "mint" => Ok(TransactionType::Mint),
            "burn" => Ok(TransactionType::Burn),
            "transfer" => Ok(TransactionType::Transfer),
            other => Err(format!("Unknown transaction type: {}", other)),
        }
    }
}

/// Optional social metadata attached to a token; unknown keys are kept
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discord: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTokenRequest {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    /// Initial supply in UI units
    pub supply: String,
    pub owner_wallet: String,
    pub mint_public_key: String,
    #[serde(default)]
    pub network: Network,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<TokenMetadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub mint: String,
    pub from_wallet: String,
    pub to_wallet: String,
    pub amount: String,
    /// Looked up on-chain when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
    #[serde(default)]
    pub network: Network,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintRequest {
    pub mint: String,
    /// Mint authority, also the fee payer
    pub owner_wallet: String,
    /// Defaults to the owner
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_wallet: Option<String>,
    pub amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
    #[serde(default)]
    pub network: Network,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurnRequest {
    pub mint: String,
    pub owner_wallet: String,
    pub amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
    #[serde(default)]
    pub network: Network,
}

/// An unsigned transaction ready for client-side signing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedTransaction {
    /// Base64 bincode-serialized transaction
    pub transaction: String,
    pub blockhash: String,
    /// Addresses that must sign, fee payer first
    pub signers: Vec<String>,
    pub instructions: Vec<String>,
    /// Pending transaction-log entry, when it could be recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTokenResponse {
    #[serde(flatten)]
    pub prepared: PreparedTransaction,
    pub mint_address: String,
    pub associated_token_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenOperationResponse {
    #[serde(flatten)]
    pub prepared: PreparedTransaction,
    pub mint: String,
    /// Raw amount in base units
    pub raw_amount: String,
    pub decimals: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmTransactionRequest {
    pub mint: String,
    pub signature: String,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default)]
    pub network: Network,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

/// How the confirmation was recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmAction {
    /// A pending log was patched with the signature
    Updated,
    /// No pending log matched; a new one was inserted
    Created,
    /// The signature was already recorded
    Unchanged,
    /// The database was unavailable
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmTransactionResponse {
    pub success: bool,
    pub action: ConfirmAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_id: Option<String>,
    pub signature: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDetails {
    pub address: String,
    pub network: Network,
    pub decimals: u8,
    /// Raw on-chain supply
    pub supply: String,
    pub ui_supply: String,
    pub mint_authority: Option<String>,
    pub freeze_authority: Option<String>,
    pub is_initialized: bool,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub owner: Option<String>,
    pub metadata: Option<TokenMetadata>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerTokenAccount {
    pub account: String,
    pub mint: String,
    pub amount: String,
    pub ui_amount: String,
    pub decimals: Option<u8>,
    pub name: Option<String>,
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenHolder {
    pub address: String,
    pub owner: Option<String>,
    pub amount: String,
    pub ui_amount: String,
    /// Share of total supply in percent
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub address: String,
    pub lamports: u64,
    pub sol: f64,
    pub network: Network,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirdropRequest {
    pub address: String,
    /// SOL, defaults to 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default)]
    pub network: Network,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirdropResponse {
    pub signature: String,
    pub amount: f64,
    pub lamports: u64,
    pub network: Network,
}

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_request_uses_camel_case_and_default_network() {
        let request: CreateTokenRequest = serde_json::from_value(json!({
            "name": "Forge",
            "symbol": "FRG",
            "decimals": 6,
            "supply": "1000",
            "ownerWallet": "owner",
            "mintPublicKey": "mint",
            "metadata": { "website": "https://forge.example", "tags": ["a"] }
        }))
        .unwrap();

        assert_eq!(request.network, Network::Devnet);
        let metadata = request.metadata.unwrap();
        assert_eq!(metadata.website.as_deref(), Some("https://forge.example"));
        assert_eq!(metadata.extra["tags"], json!(["a"]));
    }

    #[test]
    fn confirm_request_reads_type_field() {
        let request: ConfirmTransactionRequest = serde_json::from_value(json!({
            "mint": "m",
            "signature": "s",
            "type": "burn",
            "network": "mainnet-beta"
        }))
        .unwrap();
        assert_eq!(request.tx_type, TransactionType::Burn);
        assert_eq!(request.network, Network::MainnetBeta);
    }

    #[test]
    fn create_response_flattens_prepared_fields() {
        let response = CreateTokenResponse {
            prepared: PreparedTransaction {
                transaction: "AQ==".into(),
                blockhash: "hash".into(),
                signers: vec!["a".into()],
                instructions: vec![],
                log_id: None,
            },
            mint_address: "mint".into(),
            associated_token_address: "ata".into(),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["transaction"], "AQ==");
        assert_eq!(value["mintAddress"], "mint");
        assert!(value.get("logId").is_none());
    }
}
