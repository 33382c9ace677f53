use std::sync::Arc;

use clap::Parser;
use neurobot_core::llm::{create_backend, ModelBackend};
use neurobot_core::NeurobotConfig;
use neurobot_server::http::{start_http_server, HttpState};
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "neurobot.toml")]
    config: String,

    #[arg(long)]
    health: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience — production uses real env vars)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Init logging
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    // Load config
    let config = match NeurobotConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    // Connect to DB and bootstrap the schema
    let pool = match neurobot_core::db::create_pool(&config.database).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to open database: {}", e);
            std::process::exit(1);
        }
    };
    neurobot_core::db::init_schema(&pool).await?;

    // Model backend
    let backend: Arc<dyn ModelBackend> = match create_backend(&config.model) {
        Ok(b) => Arc::from(b),
        Err(e) => {
            eprintln!("Failed to create model backend: {}", e);
            std::process::exit(1);
        }
    };

    if args.health {
        match neurobot_core::db::health_check(&pool).await {
            Ok(v) => println!("✅ SQLite connected: {}", v),
            Err(e) => {
                println!("❌ SQLite check failed: {}", e);
                std::process::exit(1);
            }
        }

        match backend.list_models().await {
            Ok(models) => println!("✅ {} backend reachable: {:?}", backend.name(), models),
            Err(e) => {
                println!("❌ {} backend unreachable: {}", backend.name(), e);
                std::process::exit(1);
            }
        }

        println!("✅ NeuroBot health check passed");
        return Ok(());
    }

    // Graceful shutdown on Ctrl+C
    let (tx, _rx) = broadcast::channel(1);
    let shutdown_tx = tx.clone();

    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl+C");
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    let state = Arc::new(HttpState::new(pool, config, backend)?);
    start_http_server(state, tx.subscribe()).await?;

    Ok(())
}
