//! tokenforge API library
//!
//! Prepares unsigned SPL token transactions for client-side signing, records
//! token metadata and a transaction log, and serves read queries that merge
//! on-chain state with stored metadata.

pub mod api;
pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod rpc;

pub use api::{create_app, start_server, ApiState};
pub use config::ServiceConfig;
pub use error::{ApiError, ApiResult};
