//! Token creation and read handlers

use super::{
    fetch_mint, parse_pubkey, prepare_transaction, ApiState, NetworkQuery, OwnerTokensResponse,
    TokenHoldersResponse, TokensResponse, TransactionLogPage,
};
use crate::cache::{get_json, set_json};
use crate::database::{best_effort, LogPage, TokenRecord, TransactionLog};
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    response::Json,
};
use chrono::Utc;
use serde::Deserialize;
use solana_program::{program_option::COption, program_pack::Pack};
use solana_sdk::pubkey::Pubkey;
use spl_token::state::{Account as TokenAccount, Mint};
use std::collections::HashMap;
use tokenforge_core::{
    amount::{format_ui_amount, parse_ui_amount, validate_decimals},
    instructions::{
        associated_token_address, build_create_token, mint_account_len, CreateTokenParams,
    },
    wire::{
        CreateTokenRequest, CreateTokenResponse, OwnerTokenAccount, TokenDetails, TokenHolder,
        TokenMetadata, TransactionType,
    },
    Network,
};
use tracing::{debug, info};
use validator::Validate;

const MAX_NAME_LEN: usize = 32;
const MAX_SYMBOL_LEN: usize = 10;

fn validate_create_request(request: &CreateTokenRequest) -> ApiResult<()> {
    let name = request.name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        return Err(ApiError::validation(format!(
            "Token name must be 1 to {} characters",
            MAX_NAME_LEN
        )));
    }

    let symbol = request.symbol.trim();
    if symbol.is_empty() || symbol.chars().count() > MAX_SYMBOL_LEN {
        return Err(ApiError::validation(format!(
            "Token symbol must be 1 to {} characters",
            MAX_SYMBOL_LEN
        )));
    }

    validate_decimals(request.decimals)?;
    Ok(())
}

fn option_key(key: COption<Pubkey>) -> Option<String> {
    match key {
        COption::Some(key) => Some(key.to_string()),
        COption::None => None,
    }
}

/// Prepare the transaction creating a new token
pub async fn create_token(
    State(state): State<ApiState>,
    payload: Result<Json<CreateTokenRequest>, JsonRejection>,
) -> ApiResult<Json<CreateTokenResponse>> {
    let Json(request) = payload?;
    validate_create_request(&request)?;

    let owner = parse_pubkey(&request.owner_wallet, "owner wallet")?;
    let mint = parse_pubkey(&request.mint_public_key, "mint public key")?;
    let initial_supply = parse_ui_amount(&request.supply, request.decimals)?;
    let network = request.network;
    let rpc = state.rpc(network);

    if rpc.get_account(&mint).await?.is_some() {
        return Err(ApiError::validation(format!(
            "Account {} already exists; generate a new mint keypair",
            mint
        )));
    }

    let rent_lamports = rpc
        .get_minimum_balance_for_rent_exemption(mint_account_len())
        .await?;

    let prepared = build_create_token(&CreateTokenParams {
        owner,
        mint,
        decimals: request.decimals,
        initial_supply,
        rent_lamports,
    })?;

    let mut log = TransactionLog::pending(TransactionType::Create, mint.to_string(), network);
    log.from_address = Some(owner.to_string());
    log.to_address = Some(owner.to_string());
    log.amount = request.supply.trim().to_string();
    log.decimals = Some(request.decimals);

    let transaction = prepare_transaction(&state, rpc.as_ref(), &prepared, log).await?;

    let metadata = request
        .metadata
        .as_ref()
        .and_then(|m| serde_json::to_value(m).ok());

    let record = TokenRecord {
        mint_address: mint.to_string(),
        name: request.name.trim().to_string(),
        symbol: request.symbol.trim().to_uppercase(),
        decimals: request.decimals,
        supply: request.supply.trim().to_string(),
        owner: owner.to_string(),
        mint_authority: owner.to_string(),
        freeze_authority: Some(owner.to_string()),
        metadata,
        network,
        created_at: Utc::now(),
    };

    best_effort("insert_token", state.store.insert_token(&record), ()).await;
    best_effort(
        "upsert_user",
        async { state.store.upsert_user(&owner.to_string()).await.map(|_| ()) },
        (),
    )
    .await;

    info!(
        mint = %mint,
        owner = %owner,
        network = %network,
        "Prepared token creation"
    );

    Ok(Json(CreateTokenResponse {
        prepared: transaction,
        mint_address: mint.to_string(),
        associated_token_address: associated_token_address(&owner, &mint).to_string(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub owner: Option<String>,
    #[serde(default)]
    pub network: Network,
}

/// Tokens created through the API by one wallet
pub async fn list_tokens(
    State(state): State<ApiState>,
    query: Result<Query<OwnerQuery>, QueryRejection>,
) -> ApiResult<Json<TokensResponse>> {
    let Query(query) = query?;
    let owner = query
        .owner
        .ok_or_else(|| ApiError::validation("Query parameter owner is required"))?;
    let owner = parse_pubkey(&owner, "owner")?.to_string();

    let tokens = best_effort(
        "list_tokens_by_owner",
        state.store.list_tokens_by_owner(&owner, query.network),
        Vec::new(),
    )
    .await;

    Ok(Json(TokensResponse {
        owner,
        network: query.network,
        tokens,
    }))
}

/// On-chain mint state merged with stored metadata
pub async fn get_token(
    State(state): State<ApiState>,
    Path(address): Path<String>,
    query: Result<Query<NetworkQuery>, QueryRejection>,
) -> ApiResult<Json<TokenDetails>> {
    let Query(NetworkQuery { network }) = query?;
    let mint = parse_pubkey(&address, "mint address")?;

    let cache_key = state.keys.token(network, &mint.to_string());
    if let Some(details) = get_json::<TokenDetails>(state.cache.as_ref(), &cache_key).await {
        debug!("Cache hit for {}", cache_key);
        return Ok(Json(details));
    }

    let rpc = state.rpc(network);
    let mint_state = fetch_mint(rpc.as_ref(), &mint).await?;
    let record = best_effort("get_token", state.store.get_token(&mint.to_string()), None).await;

    let details = token_details(mint, network, &mint_state, record);
    set_json(state.cache.as_ref(), &cache_key, &details, state.token_ttl()).await;

    Ok(Json(details))
}

fn token_details(
    mint: Pubkey,
    network: Network,
    mint_state: &Mint,
    record: Option<TokenRecord>,
) -> TokenDetails {
    let (name, symbol, owner, metadata, created_at) = match record {
        Some(record) => (
            Some(record.name),
            Some(record.symbol),
            Some(record.owner),
            record
                .metadata
                .and_then(|m| serde_json::from_value::<TokenMetadata>(m).ok()),
            Some(record.created_at.to_rfc3339()),
        ),
        None => (None, None, None, None, None),
    };

    TokenDetails {
        address: mint.to_string(),
        network,
        decimals: mint_state.decimals,
        supply: mint_state.supply.to_string(),
        ui_supply: format_ui_amount(mint_state.supply, mint_state.decimals),
        mint_authority: option_key(mint_state.mint_authority),
        freeze_authority: option_key(mint_state.freeze_authority),
        is_initialized: mint_state.is_initialized,
        name,
        symbol,
        owner,
        metadata,
        created_at,
    }
}

/// Token accounts held by a wallet, with names for tokens created here
pub async fn get_owner_tokens(
    State(state): State<ApiState>,
    Path(address): Path<String>,
    query: Result<Query<NetworkQuery>, QueryRejection>,
) -> ApiResult<Json<OwnerTokensResponse>> {
    let Query(NetworkQuery { network }) = query?;
    let owner = parse_pubkey(&address, "wallet address")?;
    let rpc = state.rpc(network);

    let accounts: Vec<(Pubkey, TokenAccount)> = rpc
        .get_token_accounts_by_owner(&owner, None)
        .await?
        .into_iter()
        .filter_map(|(address, account)| {
            TokenAccount::unpack(&account.data)
                .ok()
                .map(|token| (address, token))
        })
        .collect();

    let mut mints: Vec<Pubkey> = accounts.iter().map(|(_, token)| token.mint).collect();
    mints.sort();
    mints.dedup();

    let decimals: HashMap<Pubkey, u8> = if mints.is_empty() {
        HashMap::new()
    } else {
        rpc.get_multiple_accounts(&mints)
            .await?
            .into_iter()
            .zip(mints.iter())
            .filter_map(|(account, mint)| {
                let account = account?;
                Mint::unpack(&account.data).ok().map(|m| (*mint, m.decimals))
            })
            .collect()
    };

    let mint_strings: Vec<String> = mints.iter().map(|m| m.to_string()).collect();
    let records: HashMap<String, TokenRecord> =
        best_effort("get_tokens", state.store.get_tokens(&mint_strings), Vec::new())
            .await
            .into_iter()
            .map(|record| (record.mint_address.clone(), record))
            .collect();

    let tokens = accounts
        .into_iter()
        .map(|(address, token)| {
            let mint = token.mint.to_string();
            let decimals = decimals.get(&token.mint).copied();
            let record = records.get(&mint);
            OwnerTokenAccount {
                account: address.to_string(),
                ui_amount: format_ui_amount(token.amount, decimals.unwrap_or(0)),
                amount: token.amount.to_string(),
                decimals,
                name: record.map(|r| r.name.clone()),
                symbol: record.map(|r| r.symbol.clone()),
                mint,
            }
        })
        .collect();

    Ok(Json(OwnerTokensResponse {
        owner: owner.to_string(),
        network,
        tokens,
    }))
}

/// Largest holders of a mint with their share of supply
pub async fn get_token_holders(
    State(state): State<ApiState>,
    Path(address): Path<String>,
    query: Result<Query<NetworkQuery>, QueryRejection>,
) -> ApiResult<Json<TokenHoldersResponse>> {
    let Query(NetworkQuery { network }) = query?;
    let mint = parse_pubkey(&address, "mint address")?;
    let rpc = state.rpc(network);

    let mint_state = fetch_mint(rpc.as_ref(), &mint).await?;
    let largest = rpc.get_token_largest_accounts(&mint).await?;

    let addresses: Vec<Pubkey> = largest.iter().map(|entry| entry.address).collect();
    let owners: Vec<Option<String>> = if addresses.is_empty() {
        Vec::new()
    } else {
        rpc.get_multiple_accounts(&addresses)
            .await?
            .into_iter()
            .map(|account| {
                account
                    .and_then(|a| TokenAccount::unpack(&a.data).ok())
                    .map(|token| token.owner.to_string())
            })
            .collect()
    };

    let supply = mint_state.supply;
    let holders = largest
        .into_iter()
        .enumerate()
        .filter(|(_, entry)| entry.amount.raw() > 0)
        .map(|(i, entry)| {
            let raw = entry.amount.raw();
            let percentage = if supply == 0 {
                0.0
            } else {
                raw as f64 / supply as f64 * 100.0
            };
            TokenHolder {
                address: entry.address.to_string(),
                owner: owners.get(i).cloned().flatten(),
                amount: raw.to_string(),
                ui_amount: format_ui_amount(raw, mint_state.decimals),
                percentage,
            }
        })
        .collect();

    Ok(Json(TokenHoldersResponse {
        mint: mint.to_string(),
        network,
        decimals: mint_state.decimals,
        supply: supply.to_string(),
        holders,
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    #[validate(range(min = 1))]
    pub page: u32,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100))]
    pub limit: u32,
    #[serde(default)]
    pub network: Network,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

/// Paginated transaction log of a mint, newest first
pub async fn get_token_transactions(
    State(state): State<ApiState>,
    Path(address): Path<String>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Json<TransactionLogPage>> {
    let Query(query) = query?;
    query.validate()?;
    let mint = parse_pubkey(&address, "mint address")?;

    let page = best_effort(
        "list_transaction_logs",
        state
            .store
            .list_transaction_logs(&mint.to_string(), query.network, query.page, query.limit),
        LogPage::default(),
    )
    .await;

    let pages = page.total.div_ceil(query.limit as u64);
    Ok(Json(TransactionLogPage {
        transactions: page.logs,
        total: page.total,
        page: query.page,
        limit: query.limit,
        pages,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, symbol: &str, decimals: u8) -> CreateTokenRequest {
        CreateTokenRequest {
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals,
            supply: "1".to_string(),
            owner_wallet: Pubkey::new_unique().to_string(),
            mint_public_key: Pubkey::new_unique().to_string(),
            network: Network::Devnet,
            metadata: None,
        }
    }

    #[test]
    fn create_request_limits() {
        assert!(validate_create_request(&request("Forge", "FRG", 6)).is_ok());
        assert!(validate_create_request(&request("  ", "FRG", 6)).is_err());
        assert!(validate_create_request(&request("Forge", "TOOLONGSYMBOL", 6)).is_err());
        assert!(validate_create_request(&request(&"x".repeat(33), "FRG", 6)).is_err());
        assert!(validate_create_request(&request("Forge", "FRG", 10)).is_err());
    }

    #[test]
    fn details_merge_stored_metadata() {
        let mint = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let mint_state = Mint {
            mint_authority: COption::Some(owner),
            supply: 1_500_000,
            decimals: 6,
            is_initialized: true,
            freeze_authority: COption::None,
        };
        let record = TokenRecord {
            mint_address: mint.to_string(),
            name: "Forge".into(),
            symbol: "FRG".into(),
            decimals: 6,
            supply: "1.5".into(),
            owner: owner.to_string(),
            mint_authority: owner.to_string(),
            freeze_authority: None,
            metadata: Some(serde_json::json!({ "website": "https://forge.example" })),
            network: Network::Devnet,
            created_at: Utc::now(),
        };

        let details = token_details(mint, Network::Devnet, &mint_state, Some(record));
        assert_eq!(details.ui_supply, "1.5");
        assert_eq!(details.mint_authority, Some(owner.to_string()));
        assert!(details.freeze_authority.is_none());
        assert_eq!(details.name.as_deref(), Some("Forge"));
        assert_eq!(
            details.metadata.and_then(|m| m.website).as_deref(),
            Some("https://forge.example")
        );

        let bare = token_details(mint, Network::Devnet, &mint_state, None);
        assert!(bare.name.is_none());
    }
}
