// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Framewerk — image editor and resize service.
//
// Entry point. Initialises logging, loads configuration (optional JSON path as
// the first argument, then FRAMEWERK_* overrides), and serves until Ctrl-C.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use framewerk_core::ServiceConfig;
use framewerk_server::{EditorService, HttpServer};
use framewerk_storage::FsObjectStore;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Framewerk starting");

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = match ServiceConfig::load(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(
        addr = %config.socket_addr(),
        storage_root = %config.storage_root.display(),
        "configuration loaded"
    );

    let store = FsObjectStore::new(config.storage_root.clone());
    let service = Arc::new(EditorService::new(store, &config));

    let mut server = HttpServer::new(&config);
    if let Err(e) = server.start(service).await {
        tracing::error!(error = %e, "failed to start HTTP server");
        return ExitCode::FAILURE;
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }

    if let Err(e) = server.stop().await {
        tracing::error!(error = %e, "unclean shutdown");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
