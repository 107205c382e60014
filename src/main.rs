use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use todo_service::app_env::AppConfig;
use todo_service::{SharedData, api, db, logging, persistence};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let dotenv_result = dotenv();
    let config = AppConfig::from_env();

    let otel_exporters = match config.as_ref().ok().and_then(|config| config.otel.as_ref()) {
        Some(endpoints) => Some(logging::init_exporters(&endpoints.spans, &endpoints.metrics)?),
        None => None,
    };
    logging::setup_logging_and_tracing(logging::init_env_filter()?, otel_exporters);

    let config = match config {
        Ok(config) => config,
        Err(config_error) => {
            error!("Invalid configuration, shutting down: {config_error:?}");
            return Err(config_error);
        }
    };

    if dotenv_result.is_err() {
        info!("No .env file found, using the process environment as-is.");
    }
    if config.otel.is_none() {
        warn!("OpenTelemetry export URLs were not both provided, spans and metrics stay local.");
    }
    info!(runtime_mode = %config.runtime_mode, "Connecting to MongoDB...");

    let db = match db::connect_and_verify(&config.mongodb_uri).await {
        Ok(db) => db,
        Err(connection_error) => {
            error!("Could not connect to MongoDB, shutting down: {connection_error:?}");
            return Err(connection_error);
        }
    };

    let shared_data = Arc::new(SharedData {
        ext_cxn: persistence::ExternalConnectivity::new(db),
        runtime_mode: config.runtime_mode,
    });
    let router = api::build_router(shared_data);

    let address = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("binding the HTTP listener to {address}"))?;

    info!("Todo service listening on {address}");
    info!(
        "Todo API available at http://localhost:{}{}",
        config.port,
        api::TODOS_PATH
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP requests")?;

    info!("Todo service stopped.");
    Ok(())
}

/// Resolves once the process is asked to stop, either by Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(signal_error) = signal::ctrl_c().await {
            error!("Could not listen for Ctrl+C: {signal_error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(signal_error) => {
                error!("Could not listen for SIGTERM: {signal_error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown requested, finishing in-flight requests.");
}
