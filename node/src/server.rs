use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use tally_kernel::{ByteTrie, Chain, Record, RecordCollection};

use crate::api::{BlockData, Peerage, Statistics};
use crate::daemons;
use crate::engine::ChainEngine;
use crate::errors::NodeError;
use crate::mempool::Fifo;
use crate::network::client::NodeClient;
use crate::peers::{PeerRegistry, SweepFlag};

const REQUEST_DEADLINE: Duration = Duration::from_secs(15);

/// Shared handles to every locked component. Lock order, where more than
/// one is held: chain -> mempool -> peers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ChainEngine>,
    pub mempool: Arc<Mutex<Fifo>>,
    /// Hashes of records currently pending in the mempool.
    pub pending: Arc<RwLock<ByteTrie>>,
    pub peers: Arc<PeerRegistry>,
    pub sweep: Arc<SweepFlag>,
    pub client: NodeClient,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            engine: Arc::new(ChainEngine::new()),
            mempool: Arc::new(Mutex::new(Fifo::new())),
            pending: Arc::new(RwLock::new(ByteTrie::new())),
            peers: Arc::new(PeerRegistry::new()),
            sweep: Arc::new(SweepFlag::new()),
            client: NodeClient::new(),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/chain", get(return_chain).put(accept_chain))
        .route("/api/chain/compare", post(compare_chain))
        .route("/api/block", put(append_block))
        .route("/api/record", put(enter_record))
        .route("/api/statistics", get(statistics))
        .route("/api/peers", get(get_peers).put(put_peers))
        .route("/api/peers/sweep", post(sweep_peers))
        .route(
            "/api/peers/sweep/auto",
            put(enable_auto_sweep).delete(disable_auto_sweep),
        )
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_DEADLINE))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn return_chain(State(state): State<AppState>) -> Json<Chain> {
    Json(state.engine.snapshot().await)
}

/// Longest-valid-chain acceptance: replace only with a strictly longer,
/// fully valid candidate.
async fn accept_chain(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, NodeError> {
    let candidate: Chain =
        serde_json::from_slice(&body).map_err(|e| NodeError::Decode(e.to_string()))?;
    if !candidate.validate() {
        return Err(NodeError::InvalidChain);
    }
    if candidate.length() > state.engine.length().await {
        state.engine.swap_in(candidate).await;
        Ok((StatusCode::CREATED, "replaced with new chain").into_response())
    } else {
        Ok("no change".into_response())
    }
}

async fn compare_chain(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, NodeError> {
    let candidate: Chain =
        serde_json::from_slice(&body).map_err(|e| NodeError::Decode(e.to_string()))?;
    if !candidate.validate() {
        return Err(NodeError::InvalidChain);
    }
    if candidate.length() > state.engine.length().await {
        Ok((StatusCode::ACCEPTED, "submitted chain is newer").into_response())
    } else {
        Ok("contained chain is at least equal, if not newer".into_response())
    }
}

/// Seal one opaque payload straight into a block, bypassing the mempool.
async fn append_block(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, NodeError> {
    let Ok(payload) = serde_json::from_slice::<BlockData>(&body) else {
        return Ok((StatusCode::BAD_REQUEST, "query parse fail").into_response());
    };
    if payload.data.is_empty() {
        return Err(NodeError::EmptyPayload);
    }
    let record = Record::with_parts(Uuid::nil(), Utc::now().timestamp(), payload.data);
    state
        .engine
        .append(RecordCollection::from_records(vec![record]))
        .await?;
    Ok("ok".into_response())
}

/// Ingress for a single record: dedupe against the committed and pending
/// seen indexes, enqueue, then fan out to peers in the background.
async fn enter_record(
    State(state): State<AppState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    body: Bytes,
) -> Result<Response, NodeError> {
    let record: Record =
        serde_json::from_slice(&body).map_err(|e| NodeError::Decode(e.to_string()))?;
    tracing::info!(uuid = %record.uuid, sender = %remote, "record received");

    if state.engine.has_seen(&record).await
        || state.pending.read().await.contains(record.hash())
    {
        tracing::info!("attempted double-send of record");
        return Err(NodeError::Duplicate);
    }

    {
        let mut pool = state.mempool.lock().await;
        pool.put(record.clone())?;
        // Only marked pending once the put has succeeded, so a rejected
        // record may be retried later.
        state.pending.write().await.put(record.hash());
    }
    tracing::info!("record logged into the mempool");

    let peer_list = state.peers.all().await;
    let client = state.client.clone();
    tokio::spawn(async move {
        fan_out(client, peer_list, record, remote).await;
    });
    Ok("ok".into_response())
}

/// Push a freshly accepted record to every peer, skipping whoever sent it
/// to us. Failures are logged and never retried; peers deduplicate.
async fn fan_out(client: NodeClient, peer_list: Vec<String>, record: Record, sender: SocketAddr) {
    let sender_addr = sender.to_string();
    for peer in peer_list {
        let url = match reqwest::Url::parse(&peer) {
            Ok(url) => url,
            Err(e) => {
                tracing::info!(peer = %peer, error = %e, "unable to send to peer, unparsable url");
                continue;
            }
        };
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            _ => continue,
        };
        // Best-effort echo suppression; misses behind reverse proxies.
        if host == sender_addr {
            tracing::info!("refusing to echo back to sender");
            continue;
        }
        tracing::info!(peer = %peer, "writing record to peer");
        if let Err(e) = client.put_record(&peer, &record).await {
            tracing::warn!(peer = %peer, error = %e, "unable to put record to peer");
        }
    }
}

async fn statistics(State(state): State<AppState>) -> Json<Statistics> {
    let chain_size = state.engine.length().await;
    let mempool_size = state.mempool.lock().await.len();
    Json(Statistics {
        mempool_size,
        chain_size,
    })
}

async fn get_peers(State(state): State<AppState>) -> Json<Peerage> {
    Json(Peerage {
        peers: state.peers.all().await,
    })
}

async fn put_peers(State(state): State<AppState>, body: Bytes) -> Result<Response, NodeError> {
    let peerage: Peerage =
        serde_json::from_slice(&body).map_err(|e| NodeError::Decode(e.to_string()))?;
    state.peers.replace(peerage.peers).await;
    Ok("ok".into_response())
}

/// One synchronous sweep pass over the peer list.
async fn sweep_peers(State(state): State<AppState>) -> StatusCode {
    daemons::sweep_once(&state).await;
    StatusCode::OK
}

async fn enable_auto_sweep(State(state): State<AppState>) -> &'static str {
    tracing::info!("enabling sweeping");
    state.sweep.enable();
    "enabled"
}

async fn disable_auto_sweep(State(state): State<AppState>) -> &'static str {
    tracing::info!("disabling sweeping");
    state.sweep.disable();
    "disabled"
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "your content is in another url")
}
