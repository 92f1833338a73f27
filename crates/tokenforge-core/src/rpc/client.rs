//! Lightweight Solana RPC client
//!
//! Implements only the JSON-RPC methods tokenforge needs, over `ureq`,
//! avoiding the heavy dependency chain of solana-client.

use super::{LargestTokenAccount, RpcError, RpcResult, SignatureStatus, SolanaRpc, UiTokenAmount};
use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};
use solana_sdk::{
    account::Account, hash::Hash, pubkey::Pubkey, signature::Signature,
    transaction::Transaction,
};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Lightweight RPC client for one cluster endpoint
#[derive(Clone)]
pub struct LightRpcClient {
    url: String,
    commitment: String,
    agent: ureq::Agent,
}

/// RPC response wrapper
#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// `{ context, value }` envelope used by most account methods
#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

/// Account data response from RPC
#[derive(Debug, Deserialize)]
struct AccountInfo {
    lamports: u64,
    data: (String, String), // (data, encoding)
    owner: String,
    executable: bool,
    #[serde(rename = "rentEpoch")]
    rent_epoch: u64,
}

impl AccountInfo {
    fn into_account(self) -> RpcResult<Account> {
        if self.data.1 != "base64" {
            return Err(RpcError::Decode(format!("Unsupported data encoding: {}", self.data.1)));
        }
        let data = base64::engine::general_purpose::STANDARD
            .decode(&self.data.0)
            .map_err(|e| RpcError::Decode(format!("Failed to decode account data: {}", e)))?;

        Ok(Account {
            lamports: self.lamports,
            data,
            owner: parse_pubkey(&self.owner)?,
            executable: self.executable,
            rent_epoch: self.rent_epoch,
        })
    }
}

#[derive(Debug, Deserialize)]
struct KeyedAccount {
    pubkey: String,
    account: AccountInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LargestAccountEntry {
    address: String,
    amount: String,
    decimals: u8,
    ui_amount_string: String,
}

#[derive(Debug, Deserialize)]
struct BlockhashValue {
    blockhash: String,
}

fn parse_pubkey(s: &str) -> RpcResult<Pubkey> {
    Pubkey::from_str(s).map_err(|e| RpcError::Decode(format!("Failed to parse pubkey {}: {}", s, e)))
}

fn parse_signature(s: &str) -> RpcResult<Signature> {
    Signature::from_str(s)
        .map_err(|e| RpcError::Decode(format!("Failed to parse signature {}: {}", s, e)))
}

impl LightRpcClient {
    /// Create a new lightweight RPC client
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_timeouts(url, Duration::from_secs(10), Duration::from_secs(30))
    }

    pub fn with_timeouts(url: impl Into<String>, connect: Duration, read: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(connect)
            .timeout_read(read)
            .build();

        Self {
            url: url.into(),
            commitment: "confirmed".to_string(),
            agent,
        }
    }

    pub fn with_commitment(mut self, commitment: impl Into<String>) -> Self {
        self.commitment = commitment.into();
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Make a JSON-RPC call
    async fn call<T>(&self, method: &str, params: Value) -> RpcResult<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let request_body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params
        });

        debug!("RPC call: {} with params: {:?}", method, params);

        // ureq is sync
        let response_body = tokio::task::spawn_blocking({
            let agent = self.agent.clone();
            let url = self.url.clone();
            let body = request_body.to_string();

            move || -> RpcResult<String> {
                match agent
                    .post(&url)
                    .set("Content-Type", "application/json")
                    .send_string(&body)
                {
                    Ok(response) => response
                        .into_string()
                        .map_err(|e| RpcError::Transport(e.to_string())),
                    Err(ureq::Error::Status(code, response)) => {
                        let text = response.into_string().unwrap_or_default();
                        Err(RpcError::classify(code as i64, format!("HTTP {}: {}", code, text)))
                    }
                    Err(ureq::Error::Transport(e)) => Err(RpcError::Transport(e.to_string())),
                }
            }
        })
        .await
        .map_err(|e| RpcError::Transport(format!("RPC task failed: {}", e)))??;

        let rpc_response: RpcResponse<T> = serde_json::from_str(&response_body)
            .map_err(|e| RpcError::Decode(format!("{}: {}", method, e)))?;

        if let Some(error) = rpc_response.error {
            return Err(RpcError::classify(error.code, error.message));
        }

        rpc_response
            .result
            .ok_or_else(|| RpcError::Decode(format!("No result in {} response", method)))
    }

    fn account_config(&self) -> Value {
        json!({
            "encoding": "base64",
            "commitment": self.commitment
        })
    }
}

#[async_trait]
impl SolanaRpc for LightRpcClient {
    async fn get_latest_blockhash(&self) -> RpcResult<Hash> {
        let response: WithContext<BlockhashValue> = self
            .call("getLatestBlockhash", json!([{ "commitment": self.commitment }]))
            .await?;

        response
            .value
            .blockhash
            .parse()
            .map_err(|e| RpcError::Decode(format!("Failed to parse blockhash: {}", e)))
    }

    async fn get_account(&self, pubkey: &Pubkey) -> RpcResult<Option<Account>> {
        let params = json!([pubkey.to_string(), self.account_config()]);
        let response: WithContext<Option<AccountInfo>> = self.call("getAccountInfo", params).await?;

        response.value.map(AccountInfo::into_account).transpose()
    }

    async fn get_multiple_accounts(&self, pubkeys: &[Pubkey]) -> RpcResult<Vec<Option<Account>>> {
        if pubkeys.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = pubkeys.iter().map(|k| k.to_string()).collect();
        let params = json!([keys, self.account_config()]);
        let response: WithContext<Vec<Option<AccountInfo>>> =
            self.call("getMultipleAccounts", params).await?;

        response
            .value
            .into_iter()
            .map(|info| info.map(AccountInfo::into_account).transpose())
            .collect()
    }

    async fn get_balance(&self, pubkey: &Pubkey) -> RpcResult<u64> {
        let params = json!([pubkey.to_string(), { "commitment": self.commitment }]);
        let response: WithContext<u64> = self.call("getBalance", params).await?;
        Ok(response.value)
    }

    async fn get_minimum_balance_for_rent_exemption(&self, data_len: usize) -> RpcResult<u64> {
        self.call("getMinimumBalanceForRentExemption", json!([data_len]))
            .await
    }

    async fn get_token_accounts_by_owner(
        &self,
        owner: &Pubkey,
        mint: Option<&Pubkey>,
    ) -> RpcResult<Vec<(Pubkey, Account)>> {
        let filter = match mint {
            Some(mint) => json!({ "mint": mint.to_string() }),
            None => json!({ "programId": spl_token::id().to_string() }),
        };

        let params = json!([owner.to_string(), filter, self.account_config()]);
        let response: WithContext<Vec<KeyedAccount>> =
            self.call("getTokenAccountsByOwner", params).await?;

        response
            .value
            .into_iter()
            .map(|keyed| Ok((parse_pubkey(&keyed.pubkey)?, keyed.account.into_account()?)))
            .collect()
    }

    async fn get_token_largest_accounts(&self, mint: &Pubkey) -> RpcResult<Vec<LargestTokenAccount>> {
        let params = json!([mint.to_string(), { "commitment": self.commitment }]);
        let response: WithContext<Vec<LargestAccountEntry>> =
            self.call("getTokenLargestAccounts", params).await?;

        response
            .value
            .into_iter()
            .map(|entry| {
                Ok(LargestTokenAccount {
                    address: parse_pubkey(&entry.address)?,
                    amount: UiTokenAmount {
                        amount: entry.amount,
                        decimals: entry.decimals,
                        ui_amount_string: entry.ui_amount_string,
                    },
                })
            })
            .collect()
    }

    async fn get_token_supply(&self, mint: &Pubkey) -> RpcResult<UiTokenAmount> {
        let params = json!([mint.to_string(), { "commitment": self.commitment }]);
        let response: WithContext<UiTokenAmount> = self.call("getTokenSupply", params).await?;
        Ok(response.value)
    }

    async fn request_airdrop(&self, pubkey: &Pubkey, lamports: u64) -> RpcResult<Signature> {
        let params = json!([pubkey.to_string(), lamports, { "commitment": self.commitment }]);
        let signature: String = self.call("requestAirdrop", params).await?;
        parse_signature(&signature)
    }

    async fn send_transaction(&self, transaction: &Transaction) -> RpcResult<Signature> {
        let serialized = bincode::serialize(transaction)
            .map_err(|e| RpcError::Decode(format!("Failed to serialize transaction: {}", e)))?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(serialized);

        let params = json!([
            encoded,
            {
                "encoding": "base64",
                "preflightCommitment": self.commitment
            }
        ]);

        let signature: String = self.call("sendTransaction", params).await?;
        parse_signature(&signature)
    }

    async fn get_signature_statuses(
        &self,
        signatures: &[Signature],
    ) -> RpcResult<Vec<Option<SignatureStatus>>> {
        let sigs: Vec<String> = signatures.iter().map(|s| s.to_string()).collect();
        let params = json!([sigs, { "searchTransactionHistory": true }]);
        let response: WithContext<Vec<Option<SignatureStatus>>> =
            self.call("getSignatureStatuses", params).await?;
        Ok(response.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rpc_client_creation() {
        let client = LightRpcClient::new("http://localhost:8899").with_commitment("finalized");
        assert_eq!(client.url(), "http://localhost:8899");
        assert_eq!(client.commitment, "finalized");
    }

    #[test]
    fn account_info_decodes_base64_data() {
        let info: AccountInfo = serde_json::from_value(json!({
            "lamports": 1461600,
            "data": ["AQID", "base64"],
            "owner": spl_token::id().to_string(),
            "executable": false,
            "rentEpoch": 18446744073709551615u64
        }))
        .unwrap();

        let account = info.into_account().unwrap();
        assert_eq!(account.data, vec![1, 2, 3]);
        assert_eq!(account.owner, spl_token::id());
    }

    #[test]
    fn account_info_rejects_other_encodings() {
        let info = AccountInfo {
            lamports: 0,
            data: ("".to_string(), "base58".to_string()),
            owner: Pubkey::default().to_string(),
            executable: false,
            rent_epoch: 0,
        };
        assert!(matches!(info.into_account(), Err(RpcError::Decode(_))));
    }

    #[tokio::test]
    async fn unreachable_node_is_a_transport_error() {
        let client = LightRpcClient::with_timeouts(
            "http://127.0.0.1:1",
            Duration::from_millis(200),
            Duration::from_millis(200),
        );
        let result = client.get_latest_blockhash().await;
        assert!(matches!(result, Err(RpcError::Transport(_))));
    }
}
