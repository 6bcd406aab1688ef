use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct NodeConfig {
    pub bind_addr: SocketAddr,
    /// Optional peers file; when present the sweeper starts enabled.
    pub peers_file: Option<PathBuf>,
    /// Time between forced mempool flushes.
    pub flush_interval: Duration,
    /// Pool size that triggers an early flush.
    pub max_local_pool: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:1337".parse().unwrap(),
            peers_file: None,
            flush_interval: Duration::from_secs(30),
            max_local_pool: 1000,
        }
    }
}
