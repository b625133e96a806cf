//! DA prover - data-availability challenge-response service.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use common::auth::ApiKey;
use da_circuits::Srs;
use da_prover::api::{self, AppState};
use da_prover::chain::{ChainProofClient, HttpChainClient};
use da_prover::config::{self, ProverConfig};
use da_prover::da::{self, ProverContext, ProverState, ProverStatus, SystemClock};
use da_prover::registry::SledFileRegistry;
use da_prover::storage::HttpStorageBackend;

#[derive(Parser, Debug)]
#[command(author, version, about = "DA prover - data-availability challenge-response service")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = config::load_config(cli.config.as_deref())?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen_addr = %config.listen_addr,
        chain_gateway = %config.chain_gateway_url,
        storage = %config.storage_url,
        "DA prover starting"
    );

    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("failed to create data dir {}", config.data_dir.display()))?;

    let registry = Arc::new(SledFileRegistry::open(&config.db_path)?);
    info!(db_path = %config.db_path.display(), "File registry opened");

    let srs = Arc::new(load_srs(&config)?);
    info!(
        g1_powers = srs.max_coefficients(),
        max_file_bytes = srs.max_file_bytes(),
        "SRS loaded"
    );

    let chain_key = ApiKey::from_config(config.chain_gateway_api_key.as_deref())
        .context("invalid chain_gateway_api_key")?;
    let storage_key = ApiKey::from_config(config.storage_api_key.as_deref())
        .context("invalid storage_api_key")?;
    let registry_key = ApiKey::from_config(config.registry_api_key.as_deref())
        .context("invalid registry_api_key")?;

    let chain: Arc<dyn ChainProofClient> = Arc::new(HttpChainClient::new(
        &config.chain_gateway_url,
        chain_key,
        config.chain_gateway_insecure_tls,
    )?);
    let storage = Arc::new(HttpStorageBackend::new(&config.storage_url, storage_key)?);
    let status = Arc::new(ProverStatus::default());
    let cancel = CancellationToken::new();

    let ctx = ProverContext {
        chain: chain.clone(),
        registry: registry.clone(),
        storage: storage.clone(),
        clock: Arc::new(SystemClock),
        status: status.clone(),
        dispute_poll: Duration::from_secs(config.dispute_poll_secs),
        round_retry: Duration::from_secs(config.round_retry_secs),
    };

    // Start the prover loop once the challenge settings are known
    let loop_srs = srs.clone();
    let loop_cancel = cancel.clone();
    let settings_retry = Duration::from_secs(config.settings_retry_secs);
    let prover_task = tokio::spawn(async move {
        let Some(settings) =
            da::wait_for_settings(ctx.chain.as_ref(), settings_retry, &loop_cancel).await
        else {
            return;
        };
        let last_challenge_time = match ctx.chain.get_verify_info().await {
            Ok(info) => info.last_challenge_time,
            Err(e) => {
                warn!(error = %e, "Failed to read last challenge time, starting from now");
                0
            }
        };
        let state = ProverState::new(settings, loop_srs, last_challenge_time, common::now_secs());
        da::run_prover_loop(ctx, state, loop_cancel).await;
    });

    let app = api::build_router(Arc::new(AppState {
        registry: registry.clone(),
        storage,
        srs,
        status,
        registry_api_key: registry_key,
    }));

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(addr = %config.listen_addr, "Registry API listening");

    let server_cancel = cancel.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            info!("Shutdown requested");
            server_cancel.cancel();
        })
        .await
        .context("registry API server failed")?;

    // The server may also stop on its own; make sure the loop follows.
    cancel.cancel();
    if let Err(e) = prover_task.await {
        error!(error = %e, "Prover loop task panicked");
    }

    registry.flush()?;
    info!("DA prover stopped");
    Ok(())
}

/// Load the SRS from `srs_path`, or derive the development SRS if allowed.
fn load_srs(config: &ProverConfig) -> Result<Srs> {
    if config.srs_path.exists() {
        return Srs::load(&config.srs_path)
            .with_context(|| format!("failed to load SRS from {}", config.srs_path.display()));
    }
    if !config.allow_dev_srs {
        bail!(
            "SRS file {} not found; generate one with generate_srs or set allow_dev_srs",
            config.srs_path.display()
        );
    }

    warn!(
        size = config.dev_srs_size,
        "Using insecure development SRS - DO NOT USE IN PRODUCTION"
    );
    Ok(Srs::insecure_from_seed(
        config.dev_srs_size,
        config.dev_srs_seed.as_bytes(),
    )?)
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
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
}
