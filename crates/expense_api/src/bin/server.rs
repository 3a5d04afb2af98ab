use anyhow::Context;
use expense_api::{init_tracing, run_server, ExpenseService, ExpenseStore, FileExpenseStore, ServerConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; plain environment variables still apply.
    let dotenv_loaded = dotenvy::dotenv().is_ok();
    init_tracing();

    let config = ServerConfig::from_env();

    println!("Expense Tracker API Server");
    println!("==========================");
    println!("Database file: {}", config.database_path.display());
    println!("Static assets: {}", config.static_dir.display());
    println!("Listening on: {}:{}", config.host, config.port);
    if dotenv_loaded {
        println!("Loaded overrides from .env");
    }
    println!();

    if !config.static_dir.is_dir() {
        tracing::warn!(
            static_dir = %config.static_dir.display(),
            "Static directory not found; only API routes will respond"
        );
    }

    let store = Arc::new(FileExpenseStore::new(&config.database_path));
    store
        .ensure_initialized()
        .await
        .with_context(|| format!("Initializing {}", config.database_path.display()))?;

    let service = Arc::new(ExpenseService::new(store));
    run_server(service, &config).await?;

    Ok(())
}
