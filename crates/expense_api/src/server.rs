use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::{config::ServerConfig, router::create_router, service::ExpenseService};

/// Install the global tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "expense_api=debug,tower_http=debug".into()),
        )
        .init();
}

/// Bind the configured host and port. Host names are resolved by the listener.
pub async fn bind_listener(config: &ServerConfig) -> anyhow::Result<TcpListener> {
    let (host, port) = config.bind_address();
    TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Binding {}:{}", host, port))
}

/// Run the API server
pub async fn run_server(service: Arc<ExpenseService>, config: &ServerConfig) -> anyhow::Result<()> {
    let app = create_router(service, &config.static_dir);

    let listener = bind_listener(config).await?;
    tracing::info!("Starting server on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
