//! SOL balance and faucet handlers

use super::{parse_pubkey, ApiState, NetworkQuery};
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    response::Json,
};
use std::time::Duration;
use tokenforge_core::{
    amount::{lamports_to_sol, LAMPORTS_PER_SOL},
    wire::{AirdropRequest, AirdropResponse, BalanceResponse},
    RpcError,
};
use tracing::{info, warn};

const DEFAULT_AIRDROP_SOL: f64 = 1.0;

pub async fn get_balance(
    State(state): State<ApiState>,
    Path(address): Path<String>,
    query: Result<Query<NetworkQuery>, QueryRejection>,
) -> ApiResult<Json<BalanceResponse>> {
    let Query(NetworkQuery { network }) = query?;
    let wallet = parse_pubkey(&address, "wallet address")?;

    let lamports = state.rpc(network).get_balance(&wallet).await?;

    Ok(Json(BalanceResponse {
        address: wallet.to_string(),
        lamports,
        sol: lamports_to_sol(lamports),
        network,
    }))
}

/// Convert a requested SOL amount into lamports, enforcing the faucet limit
fn airdrop_lamports(amount: Option<f64>, max_sol: f64) -> ApiResult<(f64, u64)> {
    let sol = amount.unwrap_or(DEFAULT_AIRDROP_SOL);
    if !sol.is_finite() || sol <= 0.0 {
        return Err(ApiError::validation("Airdrop amount must be greater than zero"));
    }
    if sol > max_sol {
        return Err(ApiError::validation(format!(
            "Airdrop amount cannot exceed {} SOL",
            max_sol
        )));
    }
    Ok((sol, (sol * LAMPORTS_PER_SOL as f64).round() as u64))
}

/// Request test SOL; refused on mainnet and rate limited per wallet
pub async fn request_airdrop(
    State(state): State<ApiState>,
    payload: Result<Json<AirdropRequest>, JsonRejection>,
) -> ApiResult<Json<AirdropResponse>> {
    let Json(request) = payload?;
    let network = request.network;

    if !network.allows_airdrop() {
        return Err(ApiError::validation(format!(
            "Airdrops are not available on {}",
            network
        )));
    }

    let wallet = parse_pubkey(&request.address, "wallet address")?;
    let (sol, lamports) = airdrop_lamports(request.amount, state.config.airdrop.max_sol)?;

    let cooldown = Duration::from_secs(state.config.airdrop.cooldown_secs);
    let cooldown_key = state.keys.airdrop(network, &wallet.to_string());
    if !cooldown.is_zero() {
        let now = chrono::Utc::now().timestamp().to_string();
        match state.cache.set_if_absent(&cooldown_key, now, cooldown).await {
            Ok(true) => {}
            Ok(false) => {
                return Err(ApiError::RateLimited(format!(
                    "Airdrop already requested for {}; try again in {} seconds",
                    wallet,
                    cooldown.as_secs()
                )))
            }
            Err(e) => warn!("Airdrop cooldown check failed, allowing request: {}", e),
        }
    }

    let signature = match state.rpc(network).request_airdrop(&wallet, lamports).await {
        Ok(signature) => signature,
        Err(e) => {
            // Keep the cooldown only when the faucet itself throttled the request
            if !cooldown.is_zero() && !matches!(e, RpcError::RateLimited(_)) {
                crate::cache::invalidate(state.cache.as_ref(), &cooldown_key).await;
            }
            return Err(e.into());
        }
    };

    info!(wallet = %wallet, network = %network, lamports, "Airdrop requested");

    Ok(Json(AirdropResponse {
        signature: signature.to_string(),
        amount: sol,
        lamports,
        network,
    }))
}
