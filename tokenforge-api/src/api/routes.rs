//! API route definitions

use super::{operations::*, tokens::*, wallet::*, ApiState};
use axum::{
    routing::{get, post},
    Router,
};

/// Token creation and read routes
pub fn create_token_routes() -> Router<ApiState> {
    Router::new()
        .route("/api/tokens", post(create_token).get(list_tokens))
        .route("/api/tokens/owner/:address", get(get_owner_tokens))
        .route("/api/tokens/:address", get(get_token))
        .route("/api/tokens/:address/holders", get(get_token_holders))
        .route("/api/tokens/:address/transactions", get(get_token_transactions))
}

/// Routes preparing transfer/mint/burn transactions and recording their signatures
pub fn create_operation_routes() -> Router<ApiState> {
    Router::new()
        .route("/api/tokens/transfer", post(prepare_transfer))
        .route("/api/tokens/mint", post(prepare_mint))
        .route("/api/tokens/burn", post(prepare_burn))
        .route("/api/tokens/transactions/confirm", post(confirm_transaction))
}

pub fn create_wallet_routes() -> Router<ApiState> {
    Router::new()
        .route("/api/wallet/balance/:address", get(get_balance))
        .route("/api/wallet/airdrop", post(request_airdrop))
}
