use std::time::Duration;

use reqwest::{Client, StatusCode};

use tally_kernel::{Chain, Record};

use crate::api::{BlockData, Peerage};
use crate::errors::NodeError;

/// HTTP client for the node API of a peer. Cheap to clone.
#[derive(Debug, Clone)]
pub struct NodeClient {
    client: Client,
}

impl Default for NodeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeClient {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(5))
                .build()
                .expect("http client"),
        }
    }

    pub async fn get_chain(&self, base: &str) -> Result<Chain, NodeError> {
        let url = format!("{base}/api/chain");
        tracing::info!(endpoint = %url, "reading peer");
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| NodeError::Network(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(NodeError::Network(format!(
                "chain request failed: {}",
                resp.status()
            )));
        }
        resp.json().await.map_err(|e| NodeError::Decode(e.to_string()))
    }

    pub async fn put_chain(&self, base: &str, chain: &Chain) -> Result<(), NodeError> {
        let url = format!("{base}/api/chain");
        let resp = self
            .client
            .put(&url)
            .json(chain)
            .send()
            .await
            .map_err(|e| NodeError::Network(e.to_string()))?;
        match resp.status() {
            StatusCode::OK | StatusCode::CREATED => Ok(()),
            status => Err(NodeError::Network(format!("bad status: {status}"))),
        }
    }

    /// Is the submitted chain newer than the one held at `base`?
    pub async fn compare_chain(&self, base: &str, chain: &Chain) -> Result<bool, NodeError> {
        let url = format!("{base}/api/chain/compare");
        let resp = self
            .client
            .post(&url)
            .json(chain)
            .send()
            .await
            .map_err(|e| NodeError::Network(e.to_string()))?;
        match resp.status() {
            StatusCode::ACCEPTED => Ok(true),
            StatusCode::OK => Ok(false),
            status => Err(NodeError::Network(format!("bad status: {status}"))),
        }
    }

    pub async fn put_record(&self, base: &str, record: &Record) -> Result<(), NodeError> {
        let url = format!("{base}/api/record");
        let resp = self
            .client
            .put(&url)
            .json(record)
            .send()
            .await
            .map_err(|e| NodeError::Network(e.to_string()))?;
        match resp.status() {
            StatusCode::OK | StatusCode::CREATED => Ok(()),
            StatusCode::NOT_ACCEPTABLE => Err(NodeError::Duplicate),
            status => Err(NodeError::Network(format!("bad status: {status}"))),
        }
    }

    pub async fn put_block(&self, base: &str, data: &BlockData) -> Result<(), NodeError> {
        let url = format!("{base}/api/block");
        let resp = self
            .client
            .put(&url)
            .json(data)
            .send()
            .await
            .map_err(|e| NodeError::Network(e.to_string()))?;
        match resp.status() {
            StatusCode::OK => Ok(()),
            status => Err(NodeError::Network(format!("bad status: {status}"))),
        }
    }

    pub async fn get_peers(&self, base: &str) -> Result<Peerage, NodeError> {
        let url = format!("{base}/api/peers");
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| NodeError::Network(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(NodeError::Network(format!(
                "peers request failed: {}",
                resp.status()
            )));
        }
        resp.json().await.map_err(|e| NodeError::Decode(e.to_string()))
    }

    pub async fn put_peers(&self, base: &str, peers: &Peerage) -> Result<(), NodeError> {
        let url = format!("{base}/api/peers");
        let resp = self
            .client
            .put(&url)
            .json(peers)
            .send()
            .await
            .map_err(|e| NodeError::Network(e.to_string()))?;
        match resp.status() {
            StatusCode::OK => Ok(()),
            status => Err(NodeError::Network(format!("bad status: {status}"))),
        }
    }

    pub async fn post_sweep(&self, base: &str) -> Result<(), NodeError> {
        let url = format!("{base}/api/peers/sweep");
        let resp = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(|e| NodeError::Network(e.to_string()))?;
        match resp.status() {
            StatusCode::OK => Ok(()),
            status => Err(NodeError::Network(format!("bad status: {status}"))),
        }
    }

    pub async fn enable_auto_sweep(&self, base: &str) -> Result<(), NodeError> {
        let url = format!("{base}/api/peers/sweep/auto");
        let resp = self
            .client
            .put(&url)
            .send()
            .await
            .map_err(|e| NodeError::Network(e.to_string()))?;
        match resp.status() {
            StatusCode::OK => Ok(()),
            status => Err(NodeError::Network(format!("bad status: {status}"))),
        }
    }

    pub async fn disable_auto_sweep(&self, base: &str) -> Result<(), NodeError> {
        let url = format!("{base}/api/peers/sweep/auto");
        let resp = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| NodeError::Network(e.to_string()))?;
        match resp.status() {
            StatusCode::OK => Ok(()),
            status => Err(NodeError::Network(format!("bad status: {status}"))),
        }
    }
}
