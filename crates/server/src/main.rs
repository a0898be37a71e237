//! # todo-server
//!
//! Serves a single shared todo list over HTTP, persisted in an embedded
//! log-structured store under `TODO_DBPATH`.
//!
//! ```text
//! $ TODO_BIND=127.0.0.1:8000 TODO_THEME=nord cargo run -p server
//! INFO engine opened dir=todo.db keys=0 ...
//! INFO listening addr=127.0.0.1:8000
//! ```
//!
//! See the `config` crate for every setting. Logging is controlled with
//! `RUST_LOG` (default `info`).
use anyhow::{Context, Result};
use config::Config;
use engine::Engine;
use server::{app, AppState};
use todo::{Limits, TodoStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = Config::from_env()?;
    tracing::info!(
        db_path = %cfg.db_path.display(),
        bind = %cfg.bind,
        max_items = cfg.max_items,
        max_title_length = cfg.max_title_length,
        theme = %cfg.theme,
        sync = cfg.sync,
        merge_trigger_bytes = cfg.merge_trigger_bytes,
        "configuration loaded"
    );

    let mut engine = Engine::open(&cfg.db_path, cfg.sync)
        .with_context(|| format!("failed to open store at {}", cfg.db_path.display()))?;
    engine.set_merge_trigger(cfg.merge_trigger_bytes);

    let store = TodoStore::new(
        engine,
        Limits {
            max_items: cfg.max_items,
            max_title_length: cfg.max_title_length,
        },
    );
    let state = AppState::new(store, &cfg.theme)?;
    let store = std::sync::Arc::clone(state.store());

    let listener = tokio::net::TcpListener::bind(cfg.bind)
        .await
        .with_context(|| format!("failed to bind {}", cfg.bind))?;
    tracing::info!(addr = %cfg.bind, "listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Handlers are gone; this is the last handle, so the engine is dropped
    // (and synced) here rather than at process exit.
    match std::sync::Arc::try_unwrap(store) {
        Ok(store) => {
            let mut engine = store.into_inner();
            engine.sync()?;
            tracing::info!(keys = engine.len(), "store closed");
        }
        Err(_) => tracing::warn!("store still shared at shutdown, skipping final sync"),
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "unable to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "unable to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
