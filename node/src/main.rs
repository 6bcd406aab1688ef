// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::sync::watch;

use tally_node::config::NodeConfig;
use tally_node::daemons;
use tally_node::peers;
use tally_node::server::{build_router, AppState};

#[derive(Parser, Debug)]
#[command(name = "tally-node", version, about = "runs a tally ledger node")]
struct Args {
    /// ip to bind to
    #[arg(short = 'i', long = "ip", default_value = "0.0.0.0")]
    ip: String,

    /// port to bind to
    #[arg(short = 'p', long = "port", default_value_t = 1337)]
    port: u16,

    /// file containing the peer list; if provided, autosweeps immediately
    #[arg(short = 'q', long = "peers")]
    peers: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    tally_node::telemetry::init_telemetry();

    let bind_addr: SocketAddr = match format!("{}:{}", args.ip, args.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!(ip = %args.ip, port = args.port, error = %e, "invalid bind address");
            std::process::exit(1);
        }
    };
    let config = NodeConfig {
        bind_addr,
        peers_file: args.peers,
        ..NodeConfig::default()
    };

    tracing::info!("Good morning, Bilbo Baggins. I am listening on {}", config.bind_addr);

    let state = AppState::new();
    state.engine.ensure_history().await;

    if let Some(path) = &config.peers_file {
        tracing::info!(filename = %path.display(), "peers file provided...reading");
        match peers::read_peers_file(path) {
            Ok(peerage) => {
                state.peers.replace(peerage.peers).await;
                state.sweep.enable();
            }
            Err(e) => {
                tracing::error!(filename = %path.display(), error = %e, "unable to read peer file");
            }
        }
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(daemons::run_batcher(
        state.clone(),
        config.clone(),
        shutdown_rx.clone(),
    ));
    tokio::spawn(daemons::run_sweeper(state.clone(), shutdown_rx));

    let app = build_router(state);
    let listener = match tokio::net::TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(addr = %config.bind_addr, error = %e, "unable to bind");
            std::process::exit(1);
        }
    };

    let result = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    let _ = shutdown_tx.send(true);
    if let Err(e) = result {
        tracing::error!(error = %e, "server failure");
        std::process::exit(1);
    }
    tracing::info!("node stopped");
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigint = signal(SignalKind::interrupt()).expect("SIGINT handler");
        let mut sigterm = signal(SignalKind::terminate()).expect("SIGTERM handler");
        tokio::select! {
            _ = sigint.recv() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.expect("ctrl-c handler");
    }
    tracing::info!("shutdown signal received");
}
