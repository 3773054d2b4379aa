//! Transfer Ledger - HTTP service entry point
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌───────────┐    ┌────────────┐
//! │  Config  │───▶│ Storage  │───▶│  Ledger   │───▶│  Gateway   │
//! │  (YAML)  │    │ (PG/mem) │    │  Service  │    │  (axum)    │
//! └──────────┘    └──────────┘    └───────────┘    └────────────┘
//! ```
//!
//! Usage: `transfer_ledger [--env dev] [--port 8080]`

use std::sync::Arc;

use anyhow::Context;

use transfer_ledger::config::{AppConfig, StorageBackend};
use transfer_ledger::db::Database;
use transfer_ledger::gateway::{self, state::AppState};
use transfer_ledger::service::{LedgerApi, LedgerService};
use transfer_ledger::store::{LedgerBackend, MemoryBackend, PgBackend};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

fn build_service<B: LedgerBackend>(backend: B, config: &AppConfig) -> Arc<dyn LedgerApi> {
    Arc::new(
        LedgerService::new(Arc::new(backend))
            .with_request_timeout(config.gateway.request_timeout()),
    )
}

async fn connect_storage(config: &AppConfig) -> anyhow::Result<Arc<dyn LedgerApi>> {
    match config.storage.backend {
        StorageBackend::Postgres => {
            let storage = &config.storage;
            let db = Database::connect(
                &storage.postgres_url,
                storage.max_connections,
                storage.acquire_timeout(),
            )
            .await
            .context("Failed to connect to PostgreSQL")?;
            db.migrate().await.context("Failed to apply schema")?;
            tracing::info!(
                max_connections = storage.max_connections,
                "PostgreSQL connected and schema initialized"
            );
            Ok(build_service(PgBackend::from_database(&db), config))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, state is lost on exit");
            Ok(build_service(MemoryBackend::new(), config))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let app_config = AppConfig::load(&env)?;
    let _log_guard = transfer_ledger::logging::init_logging(&app_config);

    tracing::info!(
        version = env!("GIT_HASH"),
        "Starting transfer ledger in {} mode",
        env
    );

    let ledger = connect_storage(&app_config).await?;

    let gateway_config = &app_config.gateway;
    let port = get_port_override().unwrap_or(gateway_config.port);
    let state = Arc::new(AppState::new(ledger));

    gateway::run_server(&gateway_config.host, port, state).await
}
