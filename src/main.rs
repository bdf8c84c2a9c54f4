// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;
use std::time::Duration;

use axum_server::tls_rustls::RustlsConfig;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;

use tangle_faucet::api::router;
use tangle_faucet::config::FaucetConfig;
use tangle_faucet::faucet::Faucet;
use tangle_faucet::ledger::signing::add_checksum;
use tangle_faucet::ledger::{Ledger, NodeClient, COMNET};
use tangle_faucet::logging;
use tangle_faucet::state::AppState;
use tangle_faucet::storage::{WalletDefaults, WalletStore};

/// Time in-flight requests get to finish after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() {
    let config = FaucetConfig::from_env().expect("Invalid configuration");
    logging::init(config.log_format);

    let client = NodeClient::new(COMNET, config.provider_url.as_str(), config.node_timeout)
        .expect("Failed to create ledger node client");
    info!(
        network = client.network().name,
        provider = %config.provider_url,
        "Ledger node configured"
    );
    let ledger: Arc<dyn Ledger> = Arc::new(client);

    let store = Arc::new(
        WalletStore::open(
            config.cache_paths.clone(),
            WalletDefaults {
                seed: config.seed.clone(),
                default_balance: config.default_amount,
            },
        )
        .expect("Failed to open wallet cache"),
    );
    let wallet = store.load().expect("Failed to load wallet record");
    let funding_address = ledger
        .generate_address(&wallet.seed, wallet.key_index)
        .await
        .and_then(|address| add_checksum(&address))
        .expect("Failed to derive faucet address");
    info!(
        cache = %config.cache_paths.cache_file().display(),
        key_index = wallet.key_index,
        default_amount = wallet.default_balance,
        address = %funding_address,
        "Loaded faucet wallet"
    );

    let shutdown = CancellationToken::new();
    let faucet = Arc::new(Faucet::new(
        ledger.clone(),
        store.clone(),
        config.poll_interval,
        shutdown.clone(),
    ));
    let app = router(AppState::new(faucet, store, ledger));

    let handle = axum_server::Handle::new();
    tokio::spawn({
        let handle = handle.clone();
        let shutdown = shutdown.clone();
        async move {
            shutdown_signal().await;
            shutdown.cancel();
            handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        }
    });

    let addr = config.bind_addr;
    match config.tls {
        Some(tls) => {
            // Install the ring crypto provider for rustls (must be done before any TLS operations)
            rustls::crypto::ring::default_provider()
                .install_default()
                .expect("Failed to install rustls crypto provider");

            let tls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key)
                .await
                .expect("Failed to load TLS certificate and key");

            info!(%addr, provider = %config.provider_url, "Tangle faucet listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .expect("HTTPS server failed");
        }
        None => {
            info!(%addr, provider = %config.provider_url, "Tangle faucet listening on http (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .expect("HTTP server failed");
        }
    }

    info!("Shut down gracefully");
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received terminate signal"),
    }
}
