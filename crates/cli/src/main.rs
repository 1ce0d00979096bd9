mod config;

use anyhow::Result;
use clap::Parser;
use config::{Cli, Config, ConfigError, USAGE};
use kitemcp_api::CallbackServer;
use kitemcp_auth::{run_handshake, Browser, HandshakeConfig, NoBrowser, SystemBrowser};
use kitemcp_brokers_kite::{KiteClient, KiteConfig};
use kitemcp_core::Session;
use kitemcp_mcp::McpServer;
use kitemcp_tools::ToolSet;
use std::fmt::Display;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::signal;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // stdout carries the protocol stream, so every log line goes to stderr
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::from_cli(cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            if matches!(e, ConfigError::MissingSecret(_)) {
                eprintln!("{USAGE}");
            }
            std::process::exit(1);
        }
    };

    let code = match run(config).await {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Kite MCP server failed");
            1
        }
    };

    // A blocked stdin read would otherwise keep the runtime alive.
    std::process::exit(code);
}

async fn run(config: Config) -> Result<()> {
    let settings = &config.settings;
    let grace = settings.shutdown_grace();
    let cancel = CancellationToken::new();
    tokio::spawn(await_shutdown(cancel.clone()));

    let session = Arc::new(Session::new());

    // The listener must be live before the login page is opened.
    let addr = SocketAddr::new(settings.bind_host, config.port);
    let callback = CallbackServer::bind(addr, session.clone()).await?;
    tracing::info!(%addr, "Login redirect expected at http://{}/auth", addr);
    let http_task = tokio::spawn(callback.run(cancel.clone()));

    let mut kite_config = KiteConfig::new(&config.api_key);
    kite_config.api_url = settings.kite_api_url.clone();
    kite_config.login_url = settings.kite_login_url.clone();
    let client = Arc::new(KiteClient::new(kite_config)?);

    let browser: Box<dyn Browser> = if settings.open_browser {
        Box::new(SystemBrowser)
    } else {
        Box::new(NoBrowser)
    };
    let handshake = HandshakeConfig {
        poll_interval: settings.poll_interval(),
        deadline: settings.auth_timeout(),
    };

    if let Err(e) = run_handshake(
        &*client,
        &session,
        &*browser,
        &config.api_secret,
        handshake,
        &cancel,
    )
    .await
    {
        cancel.cancel();
        drain("Callback server", http_task, grace).await;
        return Err(e.into());
    }

    let server = McpServer::new(ToolSet::new(client));
    tracing::info!("Serving MCP tools on stdio");
    let mcp_cancel = cancel.clone();
    let mut mcp_task = tokio::spawn(async move {
        server
            .serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout(), mcp_cancel)
            .await
    });

    let finished = tokio::select! {
        () = cancel.cancelled() => None,
        result = &mut mcp_task => Some(result),
    };
    cancel.cancel();

    match finished {
        Some(result) => report("Tool server", result),
        None => drain("Tool server", mcp_task, grace).await,
    }
    drain("Callback server", http_task, grace).await;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Give a task `grace` to finish, then abandon it.
async fn drain<E: Display>(
    name: &str,
    mut task: JoinHandle<Result<(), E>>,
    grace: Duration,
) {
    match tokio::time::timeout(grace, &mut task).await {
        Ok(result) => report(name, result),
        Err(_) => {
            tracing::warn!(task = name, grace_secs = grace.as_secs(), "Did not stop in time, aborting");
            task.abort();
        }
    }
}

fn report<E: Display>(name: &str, result: Result<Result<(), E>, tokio::task::JoinError>) {
    match result {
        Ok(Ok(())) => tracing::info!(task = name, "Stopped"),
        Ok(Err(e)) => tracing::warn!(task = name, error = %e, "Stopped with error"),
        Err(e) => tracing::warn!(task = name, error = %e, "Task panicked or was cancelled"),
    }
}

/// Wait for SIGINT or SIGTERM, then cancel everything.
async fn await_shutdown(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C, initiating shutdown"),
        () = terminate => tracing::info!("Received SIGTERM, initiating shutdown"),
        () = cancel.cancelled() => return,
    }

    cancel.cancel();
}
