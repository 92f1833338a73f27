//! Shared fixtures for API tests

#![allow(dead_code)]

use anyhow::anyhow;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use solana_program::{program_option::COption, program_pack::Pack};
use solana_sdk::{
    account::Account, hash::Hash, pubkey::Pubkey, signature::Signature, transaction::Transaction,
};
use spl_token::state::{Account as TokenAccount, AccountState, Mint};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokenforge_api::{
    api::create_app,
    cache::MemoryCache,
    database::{
        ConfirmOutcome, LogConfirmation, LogPage, TokenRecord, TokenStore, TransactionLog,
        UserRecord,
    },
    rpc::RpcPool,
    ApiState, ServiceConfig,
};
use tokenforge_core::{
    rpc::{LargestTokenAccount, RpcResult, SignatureStatus, UiTokenAmount},
    amount::format_ui_amount,
    Network, RpcError, SolanaRpc,
};
use tower::ServiceExt; // for `oneshot`

pub const RENT_LAMPORTS: u64 = 1_461_600;

/// In-memory cluster answering the RPC calls the API makes
pub struct MockRpc {
    pub blockhash: Hash,
    accounts: Mutex<HashMap<Pubkey, Account>>,
    balances: Mutex<HashMap<Pubkey, u64>>,
    airdrop_error: Mutex<Option<RpcError>>,
    pub airdrops: Mutex<Vec<(Pubkey, u64)>>,
}

impl Default for MockRpc {
    fn default() -> Self {
        Self {
            blockhash: Hash::new_unique(),
            accounts: Mutex::new(HashMap::new()),
            balances: Mutex::new(HashMap::new()),
            airdrop_error: Mutex::new(None),
            airdrops: Mutex::new(Vec::new()),
        }
    }
}

impl MockRpc {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_mint(&self, mint: Pubkey, authority: Pubkey, supply: u64, decimals: u8) {
        let state = Mint {
            mint_authority: COption::Some(authority),
            supply,
            decimals,
            is_initialized: true,
            freeze_authority: COption::Some(authority),
        };
        let mut data = vec![0u8; Mint::LEN];
        Mint::pack(state, &mut data).unwrap();
        self.insert_account(mint, spl_token::id(), data);
    }

    pub fn add_token_account(&self, address: Pubkey, mint: Pubkey, owner: Pubkey, amount: u64) {
        let state = TokenAccount {
            mint,
            owner,
            amount,
            delegate: COption::None,
            state: AccountState::Initialized,
            is_native: COption::None,
            delegated_amount: 0,
            close_authority: COption::None,
        };
        let mut data = vec![0u8; TokenAccount::LEN];
        TokenAccount::pack(state, &mut data).unwrap();
        self.insert_account(address, spl_token::id(), data);
    }

    pub fn add_system_account(&self, address: Pubkey) {
        self.insert_account(address, solana_sdk::system_program::id(), Vec::new());
    }

    pub fn set_balance(&self, address: Pubkey, lamports: u64) {
        self.balances.lock().unwrap().insert(address, lamports);
    }

    pub fn fail_airdrops_with(&self, error: RpcError) {
        *self.airdrop_error.lock().unwrap() = Some(error);
    }

    fn insert_account(&self, address: Pubkey, owner: Pubkey, data: Vec<u8>) {
        self.accounts.lock().unwrap().insert(
            address,
            Account {
                lamports: RENT_LAMPORTS,
                data,
                owner,
                executable: false,
                rent_epoch: 0,
            },
        );
    }

    fn token_accounts(&self) -> Vec<(Pubkey, Account, TokenAccount)> {
        self.accounts
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, account)| account.owner == spl_token::id())
            .filter_map(|(address, account)| {
                TokenAccount::unpack(&account.data)
                    .ok()
                    .map(|token| (*address, account.clone(), token))
            })
            .collect()
    }
}

#[async_trait]
impl SolanaRpc for MockRpc {
    async fn get_latest_blockhash(&self) -> RpcResult<Hash> {
        Ok(self.blockhash)
    }

    async fn get_account(&self, pubkey: &Pubkey) -> RpcResult<Option<Account>> {
        Ok(self.accounts.lock().unwrap().get(pubkey).cloned())
    }

    async fn get_multiple_accounts(&self, pubkeys: &[Pubkey]) -> RpcResult<Vec<Option<Account>>> {
        let accounts = self.accounts.lock().unwrap();
        Ok(pubkeys.iter().map(|key| accounts.get(key).cloned()).collect())
    }

    async fn get_balance(&self, pubkey: &Pubkey) -> RpcResult<u64> {
        Ok(self.balances.lock().unwrap().get(pubkey).copied().unwrap_or(0))
    }

    async fn get_minimum_balance_for_rent_exemption(&self, _data_len: usize) -> RpcResult<u64> {
        Ok(RENT_LAMPORTS)
    }

    async fn get_token_accounts_by_owner(
        &self,
        owner: &Pubkey,
        mint: Option<&Pubkey>,
    ) -> RpcResult<Vec<(Pubkey, Account)>> {
        Ok(self
            .token_accounts()
            .into_iter()
            .filter(|(_, _, token)| token.owner == *owner)
            .filter(|(_, _, token)| mint.map_or(true, |m| token.mint == *m))
            .map(|(address, account, _)| (address, account))
            .collect())
    }

    async fn get_token_largest_accounts(&self, mint: &Pubkey) -> RpcResult<Vec<LargestTokenAccount>> {
        let decimals = self.get_token_supply(mint).await?.decimals;
        let mut accounts: Vec<LargestTokenAccount> = self
            .token_accounts()
            .into_iter()
            .filter(|(_, _, token)| token.mint == *mint)
            .map(|(address, _, token)| LargestTokenAccount {
                address,
                amount: UiTokenAmount {
                    amount: token.amount.to_string(),
                    decimals,
                    ui_amount_string: format_ui_amount(token.amount, decimals),
                },
            })
            .collect();
        accounts.sort_by(|a, b| b.amount.raw().cmp(&a.amount.raw()));
        Ok(accounts)
    }

    async fn get_token_supply(&self, mint: &Pubkey) -> RpcResult<UiTokenAmount> {
        let account = self
            .get_account(mint)
            .await?
            .ok_or_else(|| RpcError::Node {
                code: -32602,
                message: "Invalid param: could not find account".to_string(),
            })?;
        let state = Mint::unpack(&account.data).map_err(|e| RpcError::Decode(e.to_string()))?;
        Ok(UiTokenAmount {
            amount: state.supply.to_string(),
            decimals: state.decimals,
            ui_amount_string: format_ui_amount(state.supply, state.decimals),
        })
    }

    async fn request_airdrop(&self, pubkey: &Pubkey, lamports: u64) -> RpcResult<Signature> {
        if let Some(error) = self.airdrop_error.lock().unwrap().clone() {
            return Err(error);
        }
        self.airdrops.lock().unwrap().push((*pubkey, lamports));
        Ok(Signature::new_unique())
    }

    async fn send_transaction(&self, transaction: &Transaction) -> RpcResult<Signature> {
        Ok(transaction.signatures[0])
    }

    async fn get_signature_statuses(
        &self,
        signatures: &[Signature],
    ) -> RpcResult<Vec<Option<SignatureStatus>>> {
        Ok(vec![None; signatures.len()])
    }
}

/// Store whose every call fails, as when the database is down
pub struct FailingStore;

#[async_trait]
impl TokenStore for FailingStore {
    async fn insert_token(&self, _token: &TokenRecord) -> anyhow::Result<()> {
        Err(anyhow!("database unavailable"))
    }

    async fn get_token(&self, _mint_address: &str) -> anyhow::Result<Option<TokenRecord>> {
        Err(anyhow!("database unavailable"))
    }

    async fn get_tokens(&self, _mint_addresses: &[String]) -> anyhow::Result<Vec<TokenRecord>> {
        Err(anyhow!("database unavailable"))
    }

    async fn list_tokens_by_owner(
        &self,
        _owner: &str,
        _network: Network,
    ) -> anyhow::Result<Vec<TokenRecord>> {
        Err(anyhow!("database unavailable"))
    }

    async fn upsert_user(&self, _wallet_address: &str) -> anyhow::Result<UserRecord> {
        Err(anyhow!("database unavailable"))
    }

    async fn get_user(&self, _wallet_address: &str) -> anyhow::Result<Option<UserRecord>> {
        Err(anyhow!("database unavailable"))
    }

    async fn insert_transaction_log(&self, _log: &TransactionLog) -> anyhow::Result<()> {
        Err(anyhow!("database unavailable"))
    }

    async fn confirm_transaction_log(
        &self,
        _confirmation: LogConfirmation,
    ) -> anyhow::Result<ConfirmOutcome> {
        Err(anyhow!("database unavailable"))
    }

    async fn list_transaction_logs(
        &self,
        _mint: &str,
        _network: Network,
        _page: u32,
        _limit: u32,
    ) -> anyhow::Result<LogPage> {
        Err(anyhow!("database unavailable"))
    }

    async fn health_check(&self) -> anyhow::Result<()> {
        Err(anyhow!("database unavailable"))
    }
}

pub fn test_app(rpc: Arc<MockRpc>, store: Arc<dyn TokenStore>) -> Router {
    test_app_with_config(rpc, store, ServiceConfig::default())
}

pub fn test_app_with_config(
    rpc: Arc<MockRpc>,
    store: Arc<dyn TokenStore>,
    config: ServiceConfig,
) -> Router {
    let state = ApiState::new(
        config,
        store,
        RpcPool::uniform(rpc),
        Arc::new(MemoryCache::new(1024)),
    );
    create_app(state).unwrap()
}

/// Send a request and decode the JSON response body
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}
