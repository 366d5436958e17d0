//! CUSF Launcher - Main Entry Point
//! Wires the adapters into the core services and serves the HTTP control surface

mod logging;
mod settings;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use cusf_api_http::{AppState, HttpServer};
use cusf_core::application::{
    shutdown_channel, Downloader, Installer, LauncherContext, Registry, ShutdownReason,
    ShutdownSender, ShutdownToken, Supervisor, WalletService,
};
use cusf_core::domain::HostOs;
use cusf_infra_net::{JsonRpcControlPlane, ReqwestTransport};
use cusf_infra_system::{DetachedSpawner, SubprocessRunner, SysinfoProbe, SystemExtractor};

use crate::settings::{default_config_path, LauncherConfig};

#[derive(Parser)]
#[command(name = "cusf-launcher")]
#[command(about = "CUSF launcher daemon", long_about = None)]
#[command(version)]
struct Args {
    /// Configuration file (TOML)
    #[arg(long, env = "CUSF_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // 1. Configuration and layout
    let config_path = args.config.or_else(default_config_path);
    let config = LauncherConfig::load(config_path.as_deref()).context("invalid configuration")?;

    let home = directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .context("could not determine the home directory")?;
    let os = HostOs::current();
    let layout = config.layout(os, &home);

    // 2. Logging
    let _log_guard = logging::init_logging(&layout.logs_dir())
        .with_context(|| format!("cannot create {}", layout.logs_dir().display()))?;

    info!(
        version = cusf_core::VERSION,
        os = ?os,
        base_dir = %layout.base_dir().display(),
        config = ?config_path,
        "CUSF launcher starting"
    );

    let context = Arc::new(LauncherContext::new(Registry::builtin(), layout, os));
    context.layout.ensure_all(&context.registry).await?;

    // 3. Adapters and services
    let transport = ReqwestTransport::new(config.transport_config())?;
    let installer = Arc::new(Installer::new(
        context.clone(),
        Downloader::new(Arc::new(transport), config.download_policy()),
        Arc::new(SystemExtractor::new()),
    ));
    let supervisor = Arc::new(Supervisor::new(
        context.clone(),
        Arc::new(DetachedSpawner::new()),
        Arc::new(SysinfoProbe::new()),
        Arc::new(JsonRpcControlPlane::new()),
    ));
    let wallet = Arc::new(WalletService::new(
        context.clone(),
        Arc::new(SubprocessRunner::new()),
    ));

    // 4. Shutdown triggers: signals and panics
    let (shutdown_tx, shutdown_token) = shutdown_channel();
    install_panic_hook(shutdown_tx.clone());
    tokio::spawn(forward_signals(shutdown_tx.clone()));

    let reaper = tokio::spawn(reap_exited(
        supervisor.clone(),
        config.reap_interval(),
        shutdown_token.clone(),
    ));

    // 5. HTTP control surface
    let server = HttpServer::new(
        config.http_config(),
        AppState {
            context: context.clone(),
            installer,
            supervisor: supervisor.clone(),
            wallet,
            ui_dir: config.ui_dir(),
        },
    );

    let mut server_token = shutdown_token.clone();
    if let Err(e) = server
        .run(async move {
            server_token.wait().await;
        })
        .await
    {
        error!(error = %e, "HTTP server failed");
        shutdown_tx.shutdown(ShutdownReason::Fault(e.to_string()));
    }

    // 6. Stop every component before exiting
    let reason = shutdown_token.reason().unwrap_or(ShutdownReason::Signal);
    info!(reason = %reason, "Shutting down");

    reaper.abort();
    let stopped = supervisor.shutdown_all().await;
    info!(stopped = stopped.len(), "Shutdown complete");

    Ok(ExitCode::from(reason.exit_code() as u8))
}

/// Chain onto the default hook so a panic anywhere still stops the children
fn install_panic_hook(shutdown: ShutdownSender) {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        default_hook(info);
        shutdown.shutdown(ShutdownReason::Fault(info.to_string()));
    }));
}

async fn wait_for_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result,
            _ = terminate.recv() => Ok(()),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await
    }
}

async fn forward_signals(shutdown: ShutdownSender) {
    match wait_for_signal().await {
        Ok(()) => {
            info!("Shutdown signal received");
            shutdown.shutdown(ShutdownReason::Signal);
        }
        Err(e) => warn!(error = %e, "Cannot listen for shutdown signals"),
    }
}

async fn reap_exited(supervisor: Arc<Supervisor>, every: Duration, mut shutdown: ShutdownToken) {
    let mut ticker = tokio::time::interval(every);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let reaped = supervisor.reap_exited();
                if !reaped.is_empty() {
                    info!(components = ?reaped, "Reaped exited components");
                }
            }
            _ = shutdown.wait() => break,
        }
    }
}
