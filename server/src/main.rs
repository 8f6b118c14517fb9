use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use todo_core::{KeyValueStore, MemoryStore, TodoStore};
use todo_server::config::Config;
use todo_server::TcpStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let kv: Arc<dyn KeyValueStore> = if config.in_memory {
        warn!("using the in-memory store, todos are lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        let store = TcpStore::connect(
            config.kv_addr.clone(),
            config.credentials(),
            config.kv_timeout(),
        )
        .await
        .with_context(|| format!("connecting to store at {}", config.kv_addr))?;
        Arc::new(store)
    };

    let store = Arc::new(TodoStore::new(kv));
    store.init().await.context("initializing todo index")?;

    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "listening");

    todo_server::run(listener, store, shutdown_signal()).await?;
    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
