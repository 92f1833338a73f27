//! Transfer, mint and burn preparation, and signature confirmation

use super::{parse_pubkey, prepare_transaction, resolve_decimals, ApiState};
use crate::cache::invalidate;
use crate::database::{best_effort, LogConfirmation, TransactionLog};
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use solana_sdk::signature::Signature;
use std::str::FromStr;
use tokenforge_core::{
    amount::{format_ui_amount, parse_positive_ui_amount, parse_ui_amount},
    instructions::{build_burn, build_mint, build_transfer},
    wire::{
        BurnRequest, ConfirmAction, ConfirmTransactionRequest, ConfirmTransactionResponse,
        MintRequest, TokenOperationResponse, TransactionType, TransferRequest,
    },
};
use tracing::info;

/// Prepare a transfer; the sender's balance is not checked here
pub async fn prepare_transfer(
    State(state): State<ApiState>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> ApiResult<Json<TokenOperationResponse>> {
    let Json(request) = payload?;
    let mint = parse_pubkey(&request.mint, "mint address")?;
    let from = parse_pubkey(&request.from_wallet, "sender wallet")?;
    let to = parse_pubkey(&request.to_wallet, "recipient wallet")?;
    let network = request.network;
    let rpc = state.rpc(network);

    let decimals = resolve_decimals(rpc.as_ref(), &mint, request.decimals).await?;
    let raw_amount = parse_positive_ui_amount(&request.amount, decimals)?;
    let prepared = build_transfer(&mint, &from, &to, raw_amount, decimals)?;

    let mut log = TransactionLog::pending(TransactionType::Transfer, mint.to_string(), network);
    log.from_address = Some(from.to_string());
    log.to_address = Some(to.to_string());
    log.amount = format_ui_amount(raw_amount, decimals);
    log.decimals = Some(decimals);

    let transaction = prepare_transaction(&state, rpc.as_ref(), &prepared, log).await?;
    info!(mint = %mint, from = %from, to = %to, raw_amount, "Prepared transfer");

    Ok(Json(TokenOperationResponse {
        prepared: transaction,
        mint: mint.to_string(),
        raw_amount: raw_amount.to_string(),
        decimals,
    }))
}

/// Prepare minting new supply, signed by the mint authority
pub async fn prepare_mint(
    State(state): State<ApiState>,
    payload: Result<Json<MintRequest>, JsonRejection>,
) -> ApiResult<Json<TokenOperationResponse>> {
    let Json(request) = payload?;
    let mint = parse_pubkey(&request.mint, "mint address")?;
    let authority = parse_pubkey(&request.owner_wallet, "owner wallet")?;
    let destination = match &request.destination_wallet {
        Some(wallet) => parse_pubkey(wallet, "destination wallet")?,
        None => authority,
    };
    let network = request.network;
    let rpc = state.rpc(network);

    let decimals = resolve_decimals(rpc.as_ref(), &mint, request.decimals).await?;
    let raw_amount = parse_positive_ui_amount(&request.amount, decimals)?;
    let prepared = build_mint(&mint, &authority, &destination, raw_amount, decimals)?;

    let mut log = TransactionLog::pending(TransactionType::Mint, mint.to_string(), network);
    log.from_address = Some(authority.to_string());
    log.to_address = Some(destination.to_string());
    log.amount = format_ui_amount(raw_amount, decimals);
    log.decimals = Some(decimals);

    let transaction = prepare_transaction(&state, rpc.as_ref(), &prepared, log).await?;
    info!(mint = %mint, destination = %destination, raw_amount, "Prepared mint");

    Ok(Json(TokenOperationResponse {
        prepared: transaction,
        mint: mint.to_string(),
        raw_amount: raw_amount.to_string(),
        decimals,
    }))
}

/// Prepare burning tokens from the owner's associated account
pub async fn prepare_burn(
    State(state): State<ApiState>,
    payload: Result<Json<BurnRequest>, JsonRejection>,
) -> ApiResult<Json<TokenOperationResponse>> {
    let Json(request) = payload?;
    let mint = parse_pubkey(&request.mint, "mint address")?;
    let owner = parse_pubkey(&request.owner_wallet, "owner wallet")?;
    let network = request.network;
    let rpc = state.rpc(network);

    let decimals = resolve_decimals(rpc.as_ref(), &mint, request.decimals).await?;
    let raw_amount = parse_positive_ui_amount(&request.amount, decimals)?;
    let prepared = build_burn(&mint, &owner, raw_amount, decimals)?;

    let mut log = TransactionLog::pending(TransactionType::Burn, mint.to_string(), network);
    log.from_address = Some(owner.to_string());
    log.amount = format_ui_amount(raw_amount, decimals);
    log.decimals = Some(decimals);

    let transaction = prepare_transaction(&state, rpc.as_ref(), &prepared, log).await?;
    info!(mint = %mint, owner = %owner, raw_amount, "Prepared burn");

    Ok(Json(TokenOperationResponse {
        prepared: transaction,
        mint: mint.to_string(),
        raw_amount: raw_amount.to_string(),
        decimals,
    }))
}

/// Record the signature of a confirmed transaction
pub async fn confirm_transaction(
    State(state): State<ApiState>,
    payload: Result<Json<ConfirmTransactionRequest>, JsonRejection>,
) -> ApiResult<Json<ConfirmTransactionResponse>> {
    let Json(request) = payload?;
    let mint = parse_pubkey(&request.mint, "mint address")?;
    let signature = Signature::from_str(request.signature.trim())
        .map_err(|_| ApiError::validation(format!("Invalid signature: {}", request.signature)))?;

    if let Some(amount) = &request.amount {
        // Any non-negative decimal is accepted; precision is the mint's concern
        parse_ui_amount(amount, tokenforge_core::amount::MAX_DECIMALS)?;
    }
    let from_address = request
        .from
        .as_deref()
        .map(|from| parse_pubkey(from, "sender").map(|p| p.to_string()))
        .transpose()?;
    let to_address = request
        .to
        .as_deref()
        .map(|to| parse_pubkey(to, "recipient").map(|p| p.to_string()))
        .transpose()?;

    let confirmation = LogConfirmation {
        mint: mint.to_string(),
        signature: signature.to_string(),
        tx_type: request.tx_type,
        network: request.network,
        amount: request.amount.map(|a| a.trim().to_string()),
        from_address,
        to_address,
        meta: request.meta,
    };

    let outcome = best_effort(
        "confirm_transaction_log",
        async { state.store.confirm_transaction_log(confirmation).await.map(Some) },
        None,
    )
    .await;

    invalidate(
        state.cache.as_ref(),
        &state.keys.token(request.network, &mint.to_string()),
    )
    .await;

    let (action, log_id) = match outcome {
        Some(outcome) => (outcome.action, Some(outcome.log.id.to_string())),
        None => (ConfirmAction::Skipped, None),
    };

    info!(
        mint = %mint,
        signature = %signature,
        tx_type = %request.tx_type,
        ?action,
        "Recorded transaction confirmation"
    );

    Ok(Json(ConfirmTransactionResponse {
        success: true,
        action,
        log_id,
        signature: signature.to_string(),
    }))
}
