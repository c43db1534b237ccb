use std::sync::Arc;

use kotoba_backend::config::Config;
use kotoba_backend::db::Stores;
use kotoba_backend::logging::init_tracing;
use kotoba_backend::seed::seed_vocabulary;
use kotoba_backend::state::AppState;
use kotoba_backend::workers::WorkerManager;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = init_tracing(&config.log_level);

    let stores = match Stores::from_config(&config.db).await {
        Ok(stores) => stores,
        Err(err) => {
            tracing::error!(error = %err, "failed to open store");
            std::process::exit(1);
        }
    };

    if config.seed_vocabulary {
        if let Err(err) = seed_vocabulary(stores.vocabulary.as_ref()).await {
            tracing::warn!(error = %err, "vocabulary seed failed");
        }
    }

    let state = AppState::new(stores, config.srs);

    let worker_manager = if config.session_cleanup_enabled {
        match WorkerManager::new(Arc::clone(state.orchestrator())).await {
            Ok(manager) => {
                if let Err(e) = manager.start(&config.session_cleanup_schedule).await {
                    tracing::error!(error = %e, "failed to start workers");
                }
                Some(manager)
            }
            Err(e) => {
                tracing::warn!(error = %e, "worker manager not initialized");
                None
            }
        }
    } else {
        tracing::info!("session cleanup worker disabled");
        None
    };

    let app = kotoba_backend::build_app(state);

    let addr = config.bind_addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(%addr, error = %err, "failed to bind listener");
            std::process::exit(1);
        }
    };
    tracing::info!(%addr, "kotoba-backend listening");

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

    if let Err(e) = server.await {
        tracing::error!(error = %e, "server error");
    }

    tracing::info!("HTTP server stopped, initiating graceful shutdown sequence");

    if let Some(ref manager) = worker_manager {
        manager.stop().await;
    }

    tracing::info!("Graceful shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
