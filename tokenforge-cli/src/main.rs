// CLI client for the tokenforge API
//
// Asks the API to prepare token transactions, signs them locally with the
// wallet (and any new mint keypair), submits and confirms them, then reports
// the signature back so the API can complete its transaction log.

mod api_client;
mod commands;
mod submit;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::Context;
use tokenforge_core::Network;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tokenforge")]
#[command(about = "Create and manage SPL tokens through the tokenforge API", long_about = None)]
#[command(version)]
struct Cli {
    /// tokenforge API base URL
    #[arg(long, env = "TOKENFORGE_API_URL", default_value = "http://localhost:5000")]
    api_url: String,

    /// Cluster: devnet, testnet, mainnet-beta or localnet
    #[arg(long, default_value = "devnet")]
    network: Network,

    /// RPC URL used to submit transactions (defaults to the cluster's public endpoint)
    #[arg(long)]
    rpc_url: Option<String>,

    /// Path to wallet keypair file
    #[arg(long, default_value = "~/.config/solana/id.json")]
    wallet: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create and inspect tokens
    Token(commands::token::TokenCmd),

    /// Mint new supply (wallet must be the mint authority)
    Mint(commands::ops::MintCmd),

    /// Burn tokens from the wallet
    Burn(commands::ops::BurnCmd),

    /// Transfer tokens from the wallet
    Transfer(commands::ops::TransferCmd),

    /// SOL balance and faucet
    Wallet(commands::wallet::WalletCmd),
}

fn init_logging() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let ctx = Context::new(&cli.api_url, cli.network, cli.rpc_url, cli.wallet)?;

    let result = match cli.command {
        Commands::Token(cmd) => commands::token::execute(cmd, &ctx).await,
        Commands::Mint(cmd) => commands::ops::mint(cmd, &ctx).await,
        Commands::Burn(cmd) => commands::ops::burn(cmd, &ctx).await,
        Commands::Transfer(cmd) => commands::ops::transfer(cmd, &ctx).await,
        Commands::Wallet(cmd) => commands::wallet::execute(cmd, &ctx).await,
    };

    if let Err(e) = result {
        commands::utils::error(&format!("{:#}", e));
        std::process::exit(1);
    }
    Ok(())
}
