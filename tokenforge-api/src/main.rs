//! tokenforge API server

use anyhow::Result;
use clap::Parser;
use tokenforge_api::{api, cache, database, rpc::RpcPool, ApiState, ServiceConfig};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tokenforge-api")]
#[command(about = "HTTP API preparing unsigned SPL token transactions")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "tokenforge.toml")]
    config: String,

    /// Override log level
    #[arg(long)]
    log_level: Option<String>,

    /// Dry run mode (validate config and exit)
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_found = std::path::Path::new(&cli.config).exists();
    let mut config = if config_found {
        ServiceConfig::from_file(&cli.config)?
    } else {
        ServiceConfig::default()
    };
    config.apply_env();

    if let Some(log_level) = cli.log_level {
        config.monitoring.log_level = log_level;
    }

    init_logging(&config)?;

    if !config_found {
        warn!("Config file not found, using defaults: {}", cli.config);
    }

    info!("Starting tokenforge API");
    config.validate()?;
    info!(
        environment = %config.environment,
        bind_address = %config.api.bind_address,
        database = config.database.url.is_some(),
        redis = config.redis.url.is_some(),
        "Configuration validated successfully"
    );

    if cli.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        return Ok(());
    }

    let store = database::connect(&config.database).await?;
    let cache = cache::connect(&config.redis, &config.cache).await?;
    let rpc = RpcPool::from_config(&config.solana);

    let state = ApiState::new(config, store, rpc, cache);
    api::start_server(state, async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received shutdown signal");
    })
    .await?;

    info!("Shutting down tokenforge API");
    Ok(())
}

fn init_logging(config: &ServiceConfig) -> Result<()> {
    let log_level = config
        .monitoring
        .log_level
        .parse()
        .unwrap_or(tracing::Level::INFO);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("tokenforge_api={},tower_http=info", log_level.as_str().to_lowercase()).into()
    });

    if config.monitoring.structured_logging {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()?;
    }

    Ok(())
}
