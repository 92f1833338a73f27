// Wallet balance and airdrop commands

use anyhow::Result;
use clap::{Args, Subcommand};
use std::time::Duration;
use tokenforge_core::wire::AirdropRequest;

use super::utils::{info, success, warn};
use super::Context;

const WATCH_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Args)]
pub struct WalletCmd {
    #[command(subcommand)]
    command: WalletSubcommand,
}

#[derive(Subcommand)]
enum WalletSubcommand {
    /// Show the SOL balance of a wallet (defaults to the configured wallet)
    Balance {
        address: Option<String>,

        /// Refresh every 30 seconds until interrupted
        #[arg(long)]
        watch: bool,
    },

    /// Request test SOL from the faucet (not available on mainnet-beta)
    Airdrop {
        /// Amount of SOL
        #[arg(long, default_value = "1")]
        amount: f64,

        address: Option<String>,
    },
}

async fn print_balance(ctx: &Context, address: &str) -> Result<()> {
    let balance = ctx.api.balance(address, ctx.network).await?;
    info(&format!(
        "{}: {} SOL ({} lamports) on {}",
        balance.address, balance.sol, balance.lamports, balance.network
    ));
    Ok(())
}

pub async fn execute(cmd: WalletCmd, ctx: &Context) -> Result<()> {
    match cmd.command {
        WalletSubcommand::Balance { address, watch } => {
            let address = ctx.address_or_wallet(address)?;
            if !watch {
                return print_balance(ctx, &address).await;
            }

            let mut interval = tokio::time::interval(WATCH_INTERVAL);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if let Err(e) = print_balance(ctx, &address).await {
                            warn(&format!("Balance refresh failed: {}", e));
                        }
                    }
                    _ = tokio::signal::ctrl_c() => {
                        info("Stopped watching");
                        return Ok(());
                    }
                }
            }
        }

        WalletSubcommand::Airdrop { amount, address } => {
            let address = ctx.address_or_wallet(address)?;
            info(&format!("Requesting {} SOL for {} on {}...", amount, address, ctx.network));

            let response = ctx
                .api
                .airdrop(&AirdropRequest {
                    address: address.clone(),
                    amount: Some(amount),
                    network: ctx.network,
                })
                .await?;

            success(&format!(
                "Airdropped {} SOL ({} lamports)",
                response.amount, response.lamports
            ));
            info(&format!("Signature: {}", response.signature));
            Ok(())
        }
    }
}
