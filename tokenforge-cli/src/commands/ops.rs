// Mint, burn and transfer commands

use anyhow::Result;
use clap::Args;
use solana_sdk::signature::Signer;
use tokenforge_core::wire::{BurnRequest, MintRequest, TransactionType, TransferRequest};

use super::utils::{info, parse_pubkey, success};
use super::Context;
use crate::submit::{submit_prepared, LogDetails};

#[derive(Args)]
pub struct MintCmd {
    /// Mint address
    mint: String,

    /// Amount in UI units
    amount: String,

    /// Recipient wallet (defaults to the configured wallet)
    #[arg(long)]
    to: Option<String>,

    /// Token decimals (looked up on-chain when omitted)
    #[arg(long)]
    decimals: Option<u8>,
}

#[derive(Args)]
pub struct BurnCmd {
    /// Mint address
    mint: String,

    /// Amount in UI units
    amount: String,

    #[arg(long)]
    decimals: Option<u8>,
}

#[derive(Args)]
pub struct TransferCmd {
    /// Mint address
    mint: String,

    /// Recipient wallet
    to: String,

    /// Amount in UI units
    amount: String,

    #[arg(long)]
    decimals: Option<u8>,
}

pub async fn mint(cmd: MintCmd, ctx: &Context) -> Result<()> {
    let wallet = ctx.wallet()?;
    let mint = parse_pubkey(&cmd.mint)?.to_string();
    let destination = match cmd.to {
        Some(to) => parse_pubkey(&to)?.to_string(),
        None => wallet.pubkey().to_string(),
    };
    info(&format!("Minting {} of {} to {}...", cmd.amount, mint, destination));

    let response = ctx
        .api
        .mint(&MintRequest {
            mint: mint.clone(),
            owner_wallet: wallet.pubkey().to_string(),
            destination_wallet: Some(destination.clone()),
            amount: cmd.amount.clone(),
            decimals: cmd.decimals,
            network: ctx.network,
        })
        .await?;

    submit_prepared(
        ctx,
        &response.prepared,
        &[&wallet],
        LogDetails {
            mint,
            tx_type: TransactionType::Mint,
            amount: Some(cmd.amount.clone()),
            from: Some(wallet.pubkey().to_string()),
            to: Some(destination),
        },
    )
    .await?;

    success(&format!("Minted {} ({} raw units)", cmd.amount, response.raw_amount));
    Ok(())
}

pub async fn burn(cmd: BurnCmd, ctx: &Context) -> Result<()> {
    let wallet = ctx.wallet()?;
    let mint = parse_pubkey(&cmd.mint)?.to_string();
    info(&format!("Burning {} of {}...", cmd.amount, mint));

    let response = ctx
        .api
        .burn(&BurnRequest {
            mint: mint.clone(),
            owner_wallet: wallet.pubkey().to_string(),
            amount: cmd.amount.clone(),
            decimals: cmd.decimals,
            network: ctx.network,
        })
        .await?;

    submit_prepared(
        ctx,
        &response.prepared,
        &[&wallet],
        LogDetails {
            mint,
            tx_type: TransactionType::Burn,
            amount: Some(cmd.amount.clone()),
            from: Some(wallet.pubkey().to_string()),
            to: None,
        },
    )
    .await?;

    success(&format!("Burned {} ({} raw units)", cmd.amount, response.raw_amount));
    Ok(())
}

pub async fn transfer(cmd: TransferCmd, ctx: &Context) -> Result<()> {
    let wallet = ctx.wallet()?;
    let mint = parse_pubkey(&cmd.mint)?.to_string();
    let to = parse_pubkey(&cmd.to)?.to_string();
    info(&format!("Transferring {} of {} to {}...", cmd.amount, mint, to));

    let response = ctx
        .api
        .transfer(&TransferRequest {
            mint: mint.clone(),
            from_wallet: wallet.pubkey().to_string(),
            to_wallet: to.clone(),
            amount: cmd.amount.clone(),
            decimals: cmd.decimals,
            network: ctx.network,
        })
        .await?;

    submit_prepared(
        ctx,
        &response.prepared,
        &[&wallet],
        LogDetails {
            mint,
            tx_type: TransactionType::Transfer,
            amount: Some(cmd.amount.clone()),
            from: Some(wallet.pubkey().to_string()),
            to: Some(to),
        },
    )
    .await?;

    success(&format!("Transferred {} ({} raw units)", cmd.amount, response.raw_amount));
    Ok(())
}
