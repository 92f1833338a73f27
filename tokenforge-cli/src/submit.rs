// Sign a prepared transaction, submit it, and report the signature back to the API

use crate::commands::{
    utils::{error, info, success, warn},
    Context,
};
use anyhow::{bail, Result};
use serde_json::json;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Signature, Signer},
    transaction::Transaction,
};
use tokenforge_core::{
    codec::decode_transaction,
    submit::{sign_and_confirm, ConfirmPolicy},
    wire::{ConfirmTransactionRequest, PreparedTransaction, TransactionType},
};

/// What to record in the transaction log once confirmed
pub struct LogDetails {
    pub mint: String,
    pub tx_type: TransactionType,
    pub amount: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Required signers the given keys do not cover
pub fn missing_signers(transaction: &Transaction, signers: &[Pubkey]) -> Vec<Pubkey> {
    let required = transaction.message.header.num_required_signatures as usize;
    transaction
        .message
        .account_keys
        .iter()
        .take(required)
        .filter(|key| !signers.contains(key))
        .copied()
        .collect()
}

pub async fn submit_prepared(
    ctx: &Context,
    prepared: &PreparedTransaction,
    signers: &[&dyn Signer],
    details: LogDetails,
) -> Result<Signature> {
    let transaction = decode_transaction(&prepared.transaction)?;

    let available: Vec<Pubkey> = signers.iter().map(|s| s.pubkey()).collect();
    let missing = missing_signers(&transaction, &available);
    if !missing.is_empty() {
        let missing: Vec<String> = missing.iter().map(|k| k.to_string()).collect();
        bail!("Transaction needs signatures from {}", missing.join(", "));
    }

    for step in &prepared.instructions {
        info(step);
    }
    info("Signing and submitting transaction...");

    let rpc = ctx.rpc();
    let confirmed = match sign_and_confirm(&rpc, transaction, signers, &ConfirmPolicy::default()).await {
        Ok(confirmed) => confirmed,
        Err(e) => {
            if let Some(signature) = e.signature().filter(|s| *s != Signature::default()) {
                error(&format!(
                    "Last signature: {} (check it on an explorer before retrying)",
                    signature
                ));
            }
            return Err(e.into());
        }
    };

    if confirmed.already_processed {
        info("The cluster reported the transaction as already processed");
    }
    success(&format!("Confirmed: {}", confirmed.signature));

    let request = ConfirmTransactionRequest {
        mint: details.mint,
        signature: confirmed.signature.to_string(),
        tx_type: details.tx_type,
        amount: details.amount,
        from: details.from,
        to: details.to,
        network: ctx.network,
        meta: Some(json!({
            "attempts": confirmed.attempts,
            "alreadyProcessed": confirmed.already_processed,
            "logId": prepared.log_id,
        })),
    };

    match ctx.api.confirm(&request).await {
        Ok(response) => tracing::debug!("Transaction log {:?}", response.action),
        Err(e) => warn(&format!("Failed to record signature with the API: {}", e)),
    }

    Ok(confirmed.signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::{hash::Hash, signature::Keypair};
    use tokenforge_core::{codec::unsigned_transaction, instructions::build_transfer};

    #[test]
    fn reports_uncovered_signers() {
        let mint = Pubkey::new_unique();
        let from = Keypair::new();
        let to = Pubkey::new_unique();
        let prepared = build_transfer(&mint, &from.pubkey(), &to, 10, 0).unwrap();
        let transaction =
            unsigned_transaction(&prepared.instructions, &prepared.fee_payer, Hash::new_unique());

        assert!(missing_signers(&transaction, &[from.pubkey()]).is_empty());
        assert_eq!(missing_signers(&transaction, &[to]), vec![from.pubkey()]);
    }
}
