// Token creation and lookup commands

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use serde_json::Value;
use solana_sdk::signature::{Keypair, Signer};
use tokenforge_core::wire::{CreateTokenRequest, TokenMetadata, TransactionType};

use super::utils::{info, parse_pubkey, success};
use super::Context;
use crate::submit::{submit_prepared, LogDetails};

#[derive(Args)]
pub struct TokenCmd {
    #[command(subcommand)]
    command: TokenSubcommand,
}

#[derive(Subcommand)]
enum TokenSubcommand {
    /// Create a new SPL token owned by the wallet
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        symbol: String,

        #[arg(long, default_value = "9")]
        decimals: u8,

        /// Initial supply in UI units, minted to the wallet
        #[arg(long, default_value = "0")]
        supply: String,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        image: Option<String>,

        #[arg(long)]
        website: Option<String>,

        #[arg(long)]
        twitter: Option<String>,

        #[arg(long)]
        telegram: Option<String>,

        #[arg(long)]
        discord: Option<String>,
    },

    /// Show on-chain state and stored metadata of a token
    Info {
        /// Mint address
        mint: String,
    },

    /// List tokens created by a wallet (defaults to the configured wallet)
    List {
        #[arg(long)]
        owner: Option<String>,
    },

    /// List token accounts held by a wallet
    Accounts {
        #[arg(long)]
        owner: Option<String>,
    },

    /// Show the largest holders of a token
    Holders {
        mint: String,
    },

    /// Show the recorded transactions of a token
    History {
        mint: String,

        #[arg(long, default_value = "1")]
        page: u32,

        #[arg(long, default_value = "10")]
        limit: u32,
    },
}

fn text<'a>(value: &'a Value, key: &str) -> &'a str {
    value[key].as_str().unwrap_or("-")
}

pub async fn execute(cmd: TokenCmd, ctx: &Context) -> Result<()> {
    match cmd.command {
        TokenSubcommand::Create {
            name,
            symbol,
            decimals,
            supply,
            description,
            image,
            website,
            twitter,
            telegram,
            discord,
        } => {
            let wallet = ctx.wallet()?;
            let mint = Keypair::new();
            info(&format!("Creating token {} ({}) on {}...", name, symbol, ctx.network));
            info(&format!("Mint address: {}", mint.pubkey()));

            let metadata = TokenMetadata {
                description,
                image,
                website,
                twitter,
                telegram,
                discord,
                ..Default::default()
            };
            let has_metadata = metadata != TokenMetadata::default();

            let request = CreateTokenRequest {
                name,
                symbol,
                decimals,
                supply: supply.clone(),
                owner_wallet: wallet.pubkey().to_string(),
                mint_public_key: mint.pubkey().to_string(),
                network: ctx.network,
                metadata: has_metadata.then_some(metadata),
            };

            let response = ctx.api.create_token(&request).await?;
            if response.mint_address != mint.pubkey().to_string() {
                bail!(
                    "API prepared a transaction for mint {} instead of {}",
                    response.mint_address,
                    mint.pubkey()
                );
            }

            submit_prepared(
                ctx,
                &response.prepared,
                &[&mint, &wallet],
                LogDetails {
                    mint: response.mint_address.clone(),
                    tx_type: TransactionType::Create,
                    amount: Some(supply),
                    from: Some(wallet.pubkey().to_string()),
                    to: Some(wallet.pubkey().to_string()),
                },
            )
            .await?;

            success(&format!("Token created! Mint: {}", response.mint_address));
            info(&format!("Token account: {}", response.associated_token_address));
            Ok(())
        }

        TokenSubcommand::Info { mint } => {
            let mint = parse_pubkey(&mint)?.to_string();
            let details = ctx.api.token(&mint, ctx.network).await?;

            info(&format!("Mint: {}", details.address));
            if let (Some(name), Some(symbol)) = (&details.name, &details.symbol) {
                info(&format!("Name: {} ({})", name, symbol));
            }
            info(&format!("Decimals: {}", details.decimals));
            info(&format!("Supply: {}", details.ui_supply));
            info(&format!(
                "Mint authority: {}",
                details.mint_authority.as_deref().unwrap_or("none")
            ));
            info(&format!(
                "Freeze authority: {}",
                details.freeze_authority.as_deref().unwrap_or("none")
            ));
            if let Some(website) = details.metadata.as_ref().and_then(|m| m.website.as_ref()) {
                info(&format!("Website: {}", website));
            }
            Ok(())
        }

        TokenSubcommand::List { owner } => {
            let owner = ctx.address_or_wallet(owner)?;
            let response = ctx.api.created_tokens(&owner, ctx.network).await?;
            let tokens = response["tokens"].as_array().cloned().unwrap_or_default();

            info(&format!("{} token(s) created by {}", tokens.len(), owner));
            for token in &tokens {
                println!(
                    "  {}  {:<10} {:<24} supply {}",
                    text(token, "mintAddress"),
                    text(token, "symbol"),
                    text(token, "name"),
                    text(token, "supply")
                );
            }
            Ok(())
        }

        TokenSubcommand::Accounts { owner } => {
            let owner = ctx.address_or_wallet(owner)?;
            let response = ctx.api.owner_tokens(&owner, ctx.network).await?;
            let tokens = response["tokens"].as_array().cloned().unwrap_or_default();

            info(&format!("{} token account(s) held by {}", tokens.len(), owner));
            for token in &tokens {
                println!(
                    "  {}  {:>20}  {}",
                    text(token, "mint"),
                    text(token, "uiAmount"),
                    token["symbol"].as_str().unwrap_or("")
                );
            }
            Ok(())
        }

        TokenSubcommand::Holders { mint } => {
            let mint = parse_pubkey(&mint)?.to_string();
            let response = ctx.api.holders(&mint, ctx.network).await?;
            let holders = response["holders"].as_array().cloned().unwrap_or_default();

            info(&format!("Largest holders of {}", mint));
            for holder in &holders {
                println!(
                    "  {}  {:>20}  {:>6.2}%",
                    text(holder, "owner"),
                    text(holder, "uiAmount"),
                    holder["percentage"].as_f64().unwrap_or(0.0)
                );
            }
            Ok(())
        }

        TokenSubcommand::History { mint, page, limit } => {
            let mint = parse_pubkey(&mint)?.to_string();
            let response = ctx.api.transactions(&mint, ctx.network, page, limit).await?;
            let transactions = response["transactions"].as_array().cloned().unwrap_or_default();

            info(&format!(
                "Page {} of {} ({} transaction(s))",
                page,
                response["pages"].as_u64().unwrap_or(0),
                response["total"].as_u64().unwrap_or(0)
            ));
            for tx in &transactions {
                println!(
                    "  {:<8} {:>16}  {}",
                    text(tx, "type"),
                    text(tx, "amount"),
                    tx["signature"].as_str().unwrap_or("(pending)")
                );
            }
            Ok(())
        }
    }
}
