//! CareBot: WhatsApp health triage assistant.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use carebot_chat::LLMConfig;
use carebot_core::CareBotConfig;
use carebot_server::{build_router, AppState};
use carebot_store::SqliteStore;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const RETENTION_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);
const LIMITER_PRUNE_INTERVAL: Duration = Duration::from_secs(10 * 60);

fn resolve_data_dir() -> PathBuf {
    std::env::var("CAREBOT_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

fn print_help() {
    println!("CareBot, a WhatsApp health triage assistant");
    println!();
    println!("Usage: carebot [command]");
    println!();
    println!("Commands:");
    println!("  (none)            Start the server");
    println!("  cleanup [days]    Delete messages and analyses older than [days]");
    println!("  stats             Print usage statistics as JSON");
    println!("  help              Show this help message");
}

fn open_store(config: &CareBotConfig) -> anyhow::Result<SqliteStore> {
    SqliteStore::open(&config.data_paths.database)
        .map_err(|e| anyhow::anyhow!("Failed to open store: {}", e))
}

/// Daily retention cleanup and periodic rate limiter pruning.
fn spawn_maintenance(state: Arc<AppState>) {
    let retention_state = state.clone();
    tokio::spawn(async move {
        let days = retention_state.config.retention_days;
        let mut ticker = tokio::time::interval(RETENTION_INTERVAL);
        loop {
            ticker.tick().await;
            match retention_state.store.cleanup_old_data(days) {
                Ok(report) => info!(
                    "Retention pass ({} days): {} messages, {} analyses removed",
                    days, report.messages_deleted, report.analyses_deleted
                ),
                Err(e) => error!("Retention cleanup failed: {}", e),
            }
        }
    });

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(LIMITER_PRUNE_INTERVAL);
        loop {
            ticker.tick().await;
            let dropped = state.bot.limiter().prune();
            if dropped > 0 {
                info!("Rate limiter: dropped {} idle senders", dropped);
            }
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .init();

    let data_dir = resolve_data_dir();
    let config = CareBotConfig::from_env(&data_dir)?;

    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 {
        match args[1].as_str() {
            "--help" | "-h" | "help" => {
                print_help();
                return Ok(());
            }
            "cleanup" => {
                let days = match args.get(2) {
                    Some(raw) => raw
                        .parse()
                        .map_err(|_| anyhow::anyhow!("Invalid number of days: {}", raw))?,
                    None => config.retention_days,
                };
                let report = open_store(&config)?.cleanup_old_data(days)?;
                println!(
                    "Removed {} messages and {} analyses older than {} days",
                    report.messages_deleted, report.analyses_deleted, days
                );
                return Ok(());
            }
            "stats" => {
                let stats = open_store(&config)?.get_statistics()?;
                println!("{}", serde_json::to_string_pretty(&stats)?);
                return Ok(());
            }
            other => {
                eprintln!("Unknown command: {}. Use 'carebot help' for usage.", other);
                std::process::exit(1);
            }
        }
    }

    info!("Data directory: {}", data_dir.display());
    let port = config.port;
    let store = open_store(&config)?;
    let llm_config = LLMConfig::load(&config.data_paths.llm_config_file);
    match llm_config.resolve_provider() {
        Some(resolved) => info!(
            "General-question delegate: {} ({})",
            resolved.provider, resolved.model
        ),
        None => warn!("No LLM API key configured; general questions get the fallback reply"),
    }

    let state = Arc::new(AppState::new(config, store, llm_config));
    spawn_maintenance(state.clone());

    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("CareBot server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
