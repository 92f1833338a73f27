//! Sign, submit and confirm a prepared transaction with bounded retries
//!
//! Each attempt fetches a fresh blockhash, re-signs, sends and polls the
//! signature status until it is confirmed, fails on-chain, or the attempt
//! times out. Attempts are separated by a linearly growing backoff, and the
//! last signature gets one more status check before giving up.

use crate::rpc::{RpcError, SolanaRpc};
use solana_sdk::{
    signature::{Signature, Signer},
    transaction::Transaction,
};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct ConfirmPolicy {
    pub max_attempts: u32,
    /// Sleep `backoff_step * attempt` between attempts (2s, 4s, 6s by default)
    pub backoff_step: Duration,
    pub attempt_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for ConfirmPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_step: Duration::from_secs(2),
            attempt_timeout: Duration::from_secs(15),
            poll_interval: Duration::from_secs(1),
        }
    }
}

impl ConfirmPolicy {
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_step * attempt
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmed {
    pub signature: Signature,
    pub attempts: u32,
    /// The node reported the transaction as already processed instead of confirming it
    pub already_processed: bool,
}

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("Failed to sign transaction: {0}")]
    Signing(String),

    #[error("Transaction {signature} failed on-chain: {error}")]
    Failed { signature: Signature, error: String },

    #[error("Transaction {signature} rejected: {source}")]
    Rejected {
        signature: Signature,
        #[source]
        source: RpcError,
    },

    #[error("Transaction {signature} not confirmed after {attempts} attempts ({last_error}); check it on an explorer before retrying")]
    Unconfirmed {
        signature: Signature,
        attempts: u32,
        last_error: String,
    },
}

impl SubmitError {
    /// Signature to show the user for manual verification
    pub fn signature(&self) -> Option<Signature> {
        match self {
            SubmitError::Signing(_) => None,
            SubmitError::Failed { signature, .. }
            | SubmitError::Rejected { signature, .. }
            | SubmitError::Unconfirmed { signature, .. } => Some(*signature),
        }
    }
}

enum PollOutcome {
    Confirmed,
    Failed(String),
}

async fn poll_status<R: SolanaRpc + ?Sized>(
    rpc: &R,
    signature: &Signature,
    interval: Duration,
) -> PollOutcome {
    loop {
        match rpc.get_signature_statuses(&[*signature]).await {
            Ok(statuses) => {
                if let Some(Some(status)) = statuses.into_iter().next() {
                    if status.failed() {
                        let error = status
                            .err
                            .map(|e| e.to_string())
                            .unwrap_or_else(|| "unknown error".to_string());
                        return PollOutcome::Failed(error);
                    }
                    if status.is_confirmed() {
                        return PollOutcome::Confirmed;
                    }
                }
            }
            Err(e) => debug!("Status poll for {} failed: {}", signature, e),
        }
        tokio::time::sleep(interval).await;
    }
}

/// Whether a signature from an earlier attempt landed after all
async fn landed<R: SolanaRpc + ?Sized>(rpc: &R, signature: &Signature) -> bool {
    matches!(
        rpc.get_signature_statuses(&[*signature]).await,
        Ok(statuses) if statuses.first().and_then(|s| s.as_ref()).map(|s| s.is_confirmed() && !s.failed()).unwrap_or(false)
    )
}

/// Sign `transaction` with `signers` and drive it to confirmation.
///
/// `signers` must cover every required signature (ephemeral keys such as a
/// new mint keypair plus the wallet).
pub async fn sign_and_confirm<R: SolanaRpc + ?Sized>(
    rpc: &R,
    mut transaction: Transaction,
    signers: &[&dyn Signer],
    policy: &ConfirmPolicy,
) -> Result<Confirmed, SubmitError> {
    let mut last_signature = Signature::default();
    let mut last_error = String::from("no attempt made");
    let max_attempts = policy.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        if attempt > 1 {
            let delay = policy.backoff(attempt - 1);
            warn!(
                "Attempt {} failed ({}), retrying in {:?}",
                attempt - 1,
                last_error,
                delay
            );
            tokio::time::sleep(delay).await;

            if last_signature != Signature::default() && landed(rpc, &last_signature).await {
                info!("Transaction {} confirmed late", last_signature);
                return Ok(Confirmed {
                    signature: last_signature,
                    attempts: attempt - 1,
                    already_processed: false,
                });
            }
        }

        let blockhash = match rpc.get_latest_blockhash().await {
            Ok(hash) => hash,
            Err(e) if e.is_retryable() => {
                last_error = e.to_string();
                continue;
            }
            Err(e) => {
                return Err(SubmitError::Rejected {
                    signature: last_signature,
                    source: e,
                })
            }
        };

        transaction
            .try_sign(signers, blockhash)
            .map_err(|e| SubmitError::Signing(e.to_string()))?;
        let signature = transaction.signatures[0];
        last_signature = signature;
        debug!("Attempt {}: sending {}", attempt, signature);

        match rpc.send_transaction(&transaction).await {
            Ok(_) => {}
            Err(RpcError::AlreadyProcessed(_)) => {
                info!("Transaction {} already processed", signature);
                return Ok(Confirmed {
                    signature,
                    attempts: attempt,
                    already_processed: true,
                });
            }
            Err(e) if e.is_retryable() => {
                last_error = e.to_string();
                continue;
            }
            Err(e) => return Err(SubmitError::Rejected { signature, source: e }),
        }

        match tokio::time::timeout(
            policy.attempt_timeout,
            poll_status(rpc, &signature, policy.poll_interval),
        )
        .await
        {
            Ok(PollOutcome::Confirmed) => {
                info!("Transaction {} confirmed on attempt {}", signature, attempt);
                return Ok(Confirmed {
                    signature,
                    attempts: attempt,
                    already_processed: false,
                });
            }
            Ok(PollOutcome::Failed(error)) => return Err(SubmitError::Failed { signature, error }),
            Err(_) => {
                last_error = format!("confirmation timed out after {:?}", policy.attempt_timeout);
            }
        }
    }

    if last_signature != Signature::default() && landed(rpc, &last_signature).await {
        info!("Transaction {} confirmed after the last attempt", last_signature);
        return Ok(Confirmed {
            signature: last_signature,
            attempts: max_attempts,
            already_processed: false,
        });
    }

    Err(SubmitError::Unconfirmed {
        signature: last_signature,
        attempts: max_attempts,
        last_error,
    })
}
