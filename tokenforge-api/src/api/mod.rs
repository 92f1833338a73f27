//! HTTP API preparing unsigned token transactions

mod operations;
mod responses;
mod routes;
mod tokens;
mod wallet;

pub use responses::*;
pub use routes::*;

use crate::cache::{Cache, CacheKeys};
use crate::config::ServiceConfig;
use crate::database::{best_effort, TokenStore, TransactionLog};
use crate::error::{ApiError, ApiResult, RedactedError};
use crate::rpc::RpcPool;
use anyhow::Result;
use axum::{
    extract::State,
    http::HeaderValue,
    middleware,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use solana_program::program_pack::Pack;
use solana_sdk::pubkey::Pubkey;
use spl_token::state::Mint;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokenforge_core::{
    codec::{encode_transaction, unsigned_transaction},
    instructions::PreparedInstructions,
    wire::PreparedTransaction,
    Network, SolanaRpc,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Shared API state
#[derive(Clone)]
pub struct ApiState {
    pub config: Arc<ServiceConfig>,
    pub store: Arc<dyn TokenStore>,
    pub rpc: RpcPool,
    pub cache: Arc<dyn Cache>,
    pub keys: CacheKeys,
    /// Replace 5xx detail with a generic message (production)
    pub hide_internal_errors: bool,
}

impl ApiState {
    pub fn new(
        config: ServiceConfig,
        store: Arc<dyn TokenStore>,
        rpc: RpcPool,
        cache: Arc<dyn Cache>,
    ) -> Self {
        let keys = CacheKeys::new(config.redis.key_prefix.clone());
        let hide_internal_errors = config.is_production();
        Self {
            config: Arc::new(config),
            store,
            rpc,
            cache,
            keys,
            hide_internal_errors,
        }
    }

    pub fn rpc(&self, network: Network) -> Arc<dyn SolanaRpc> {
        self.rpc.get(network)
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.config.cache.token_ttl_secs)
    }
}

/// Build the router with its middleware stack
pub fn create_app(state: ApiState) -> Result<Router> {
    let cors = match &state.config.api.client_url {
        Some(origin) => CorsLayer::new()
            .allow_origin(HeaderValue::from_str(origin)?)
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::permissive(),
    };

    let request_timeout = Duration::from_secs(state.config.api.request_timeout_secs);
    let body_limit = state.config.api.max_request_size_mb * 1024 * 1024;

    let app = Router::new()
        .merge(create_token_routes())
        .merge(create_operation_routes())
        .merge(create_wallet_routes())
        .route("/health", get(health_handler))
        .layer(middleware::map_response_with_state(
            state.clone(),
            redact_internal_errors,
        ))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(body_limit))
                .layer(TimeoutLayer::new(request_timeout))
                .layer(cors),
        );

    Ok(app)
}

async fn redact_internal_errors(State(state): State<ApiState>, response: Response) -> Response {
    if !state.hide_internal_errors {
        return response;
    }
    match response.extensions().get::<RedactedError>().cloned() {
        Some(RedactedError(body)) => (response.status(), Json(body)).into_response(),
        None => response,
    }
}

/// Serve until `shutdown` resolves
pub async fn start_server<F>(state: ApiState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let bind_address = state.config.api.bind_address.clone();
    let app = create_app(state)?;

    let listener = TcpListener::bind(&bind_address).await?;
    info!("API server listening on {}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("API server stopped");
    Ok(())
}

/// Health check handler
async fn health_handler(State(state): State<ApiState>) -> Json<Value> {
    let database = match state.store.health_check().await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::warn!("Database health check failed: {}", e);
            "unavailable"
        }
    };

    Json(json!({
        "status": if database == "ok" { "healthy" } else { "degraded" },
        "database": database,
        "timestamp": chrono::Utc::now().timestamp(),
        "service": "tokenforge-api"
    }))
}

/// `?network=` on read endpoints
#[derive(Debug, Default, Deserialize)]
pub struct NetworkQuery {
    #[serde(default)]
    pub network: Network,
}

pub(crate) fn parse_pubkey(value: &str, field: &str) -> ApiResult<Pubkey> {
    Pubkey::from_str(value.trim())
        .map_err(|_| ApiError::validation(format!("Invalid {}: {}", field, value)))
}

/// Fetch and decode an SPL mint; 404 when the account does not exist
pub(crate) async fn fetch_mint(rpc: &dyn SolanaRpc, mint: &Pubkey) -> ApiResult<Mint> {
    let account = rpc
        .get_account(mint)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Token {} not found", mint)))?;

    if account.owner != spl_token::id() {
        return Err(ApiError::validation(format!(
            "Account {} is not an SPL token mint",
            mint
        )));
    }

    Mint::unpack(&account.data)
        .map_err(|_| ApiError::validation(format!("Account {} is not an SPL token mint", mint)))
}

/// Decimals from the request, or from the mint account when omitted
pub(crate) async fn resolve_decimals(
    rpc: &dyn SolanaRpc,
    mint: &Pubkey,
    provided: Option<u8>,
) -> ApiResult<u8> {
    match provided {
        Some(decimals) => Ok(tokenforge_core::amount::validate_decimals(decimals)?),
        None => Ok(fetch_mint(rpc, mint).await?.decimals),
    }
}

/// Attach a recent blockhash, encode, and record the pending log entry.
///
/// The log write is best-effort: when it fails `log_id` is simply absent.
pub(crate) async fn prepare_transaction(
    state: &ApiState,
    rpc: &dyn SolanaRpc,
    prepared: &PreparedInstructions,
    log: TransactionLog,
) -> ApiResult<PreparedTransaction> {
    let blockhash = rpc.get_latest_blockhash().await?;
    let transaction = unsigned_transaction(&prepared.instructions, &prepared.fee_payer, blockhash);
    let encoded = encode_transaction(&transaction)?;

    let log_id = best_effort(
        "insert_transaction_log",
        async {
            state.store.insert_transaction_log(&log).await?;
            Ok::<_, anyhow::Error>(Some(log.id.to_string()))
        },
        None,
    )
    .await;

    Ok(PreparedTransaction {
        transaction: encoded,
        blockhash: blockhash.to_string(),
        signers: prepared.signers.iter().map(|s| s.to_string()).collect(),
        instructions: prepared.summary.clone(),
        log_id,
    })
}
