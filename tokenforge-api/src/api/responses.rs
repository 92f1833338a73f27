//! API response types specific to the server

use crate::database::{TokenRecord, TransactionLog};
use serde::{Deserialize, Serialize};
use tokenforge_core::{
    wire::{OwnerTokenAccount, TokenHolder},
    Network,
};

/// Tokens created by one wallet
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokensResponse {
    pub owner: String,
    pub network: Network,
    pub tokens: Vec<TokenRecord>,
}

/// Token accounts held by one wallet
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerTokensResponse {
    pub owner: String,
    pub network: Network,
    pub tokens: Vec<OwnerTokenAccount>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenHoldersResponse {
    pub mint: String,
    pub network: Network,
    pub decimals: u8,
    /// Raw on-chain supply
    pub supply: String,
    pub holders: Vec<TokenHolder>,
}

/// One page of a mint's transaction log, newest first
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionLogPage {
    pub transactions: Vec<TransactionLog>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub pages: u64,
}
