//! The two long-lived background loops: the batcher, which seals the
//! mempool into blocks, and the sweeper, which pulls peer chains and adopts
//! any longer valid one.

use std::time::Duration;

use rand::Rng;
use tokio::sync::watch;
use tokio::time::Instant;

use tally_kernel::RecordCollection;

use crate::config::NodeConfig;
use crate::server::AppState;

/// Periodically drain the mempool into a single block. Flushes when the
/// deadline passes or the pool crosses the soft cap; sleeps a random
/// interval each lap to desynchronize peers.
pub async fn run_batcher(
    state: AppState,
    config: NodeConfig,
    mut shutdown: watch::Receiver<bool>,
) {
    tokio::time::sleep(Duration::from_secs(1)).await;
    tracing::info!(
        flush_interval = ?config.flush_interval,
        max_local_pool = config.max_local_pool,
        "record processor running"
    );
    let mut next_flush = Instant::now() + config.flush_interval;
    loop {
        // [500ms, 10_500ms)
        let sleep_ms = rand::thread_rng().gen_range(500..10_500);
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(sleep_ms)) => {}
            _ = shutdown.changed() => {
                tracing::info!("record processor stopping");
                return;
            }
        }

        let pool_size = state.mempool.lock().await.len();
        if Instant::now() < next_flush && pool_size < config.max_local_pool {
            tracing::debug!(
                headroom = config.max_local_pool.saturating_sub(pool_size),
                "waiting for the next flush"
            );
            continue;
        }

        let batch = {
            let mut pool = state.mempool.lock().await;
            let mut buffer = Vec::new();
            while let Some(record) = pool.pop() {
                buffer.push(record);
            }
            if pool.len() != 0 {
                tracing::error!(remaining = pool.len(), "consistency error: pool non-empty after drain");
            }
            RecordCollection::from_records(buffer)
        };

        if !batch.is_empty() {
            tracing::info!(records = batch.len(), "hammering into the chain now");
            if let Err(e) = state.engine.append(batch).await {
                tracing::warn!(error = %e, "inability to append records");
            }
        }
        next_flush = Instant::now() + config.flush_interval;
    }
}

/// Periodically pull every peer's chain while the sweep flag is enabled.
pub async fn run_sweeper(state: AppState, mut shutdown: watch::Receiver<bool>) {
    tokio::time::sleep(Duration::from_secs(1)).await;
    loop {
        // [3s, 20s)
        let sleep_secs = rand::thread_rng().gen_range(3..20);
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(sleep_secs)) => {}
            _ = shutdown.changed() => {
                tracing::info!("sweeper stopping");
                return;
            }
        }
        if !state.sweep.is_enabled() {
            continue;
        }
        tracing::info!("autosweeper beginning sweep");
        sweep_once(&state).await;
    }
}

/// One pass over the peer list. Sequential on purpose: each adoption
/// changes the length the next candidate is compared against.
pub async fn sweep_once(state: &AppState) {
    let endpoints = state.peers.all().await;
    for addr in endpoints {
        sweep_one_peer(state, &addr).await;
    }
}

async fn sweep_one_peer(state: &AppState, addr: &str) {
    let candidate = match state.client.get_chain(addr).await {
        Ok(chain) => chain,
        Err(e) => {
            tracing::warn!(peer = %addr, error = %e, "error getting chain");
            return;
        }
    };
    if !candidate.validate() {
        tracing::warn!(peer = %addr, "invalid chain gotten from peer");
        return;
    }
    if candidate.length() > state.engine.length().await {
        tracing::info!(peer = %addr, length = candidate.length(), "updating from peer");
        state.engine.swap_in(candidate).await;
    }
}
