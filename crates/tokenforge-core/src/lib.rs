//! tokenforge core library
//!
//! Shared between the HTTP API and the command line client: network tags,
//! UI amount math, SPL Token instruction builders, the base64 transaction
//! codec, a lightweight JSON-RPC client and the sign/submit/confirm loop.

pub mod amount;
pub mod codec;
pub mod error;
pub mod instructions;
pub mod network;
pub mod rpc;
pub mod submit;
pub mod wire;

pub use error::{AmountError, BuildError, CodecError};
pub use network::Network;
pub use rpc::{LightRpcClient, RpcError, SolanaRpc};
