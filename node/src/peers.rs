//! Peer registry and the sweeper's enabled/disabled flag.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;

use crate::api::Peerage;
use crate::errors::NodeError;

/// Mutable list of peer base URLs. Readers get copies.
#[derive(Debug, Default)]
pub struct PeerRegistry {
    peers: RwLock<Vec<String>>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all(&self) -> Vec<String> {
        self.peers.read().await.clone()
    }

    pub async fn replace(&self, peers: Vec<String>) {
        *self.peers.write().await = peers;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepState {
    Enabled,
    Disabled,
}

/// Two-valued sweeper state as an atomic flag. Defaults to `Disabled`.
#[derive(Debug, Default)]
pub struct SweepFlag {
    enabled: AtomicBool,
}

impl SweepFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Relaxed);
    }

    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn state(&self) -> SweepState {
        if self.is_enabled() {
            SweepState::Enabled
        } else {
            SweepState::Disabled
        }
    }
}

/// Read a `{"peers": [...]}` document from disk.
pub fn read_peers_file(path: &Path) -> Result<Peerage, NodeError> {
    let bytes = std::fs::read(path).map_err(|e| NodeError::Decode(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| NodeError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[tokio::test]
    async fn registry_hands_out_copies() {
        let registry = PeerRegistry::new();
        assert!(registry.all().await.is_empty());

        registry
            .replace(vec!["http://a:1337".into(), "http://b:1337".into()])
            .await;
        let mut copy = registry.all().await;
        copy.pop();
        assert_eq!(registry.all().await.len(), 2);
    }

    #[test]
    fn sweep_flag_transitions() {
        let flag = SweepFlag::new();
        assert_eq!(flag.state(), SweepState::Disabled);
        flag.enable();
        assert_eq!(flag.state(), SweepState::Enabled);
        // Disable really disables.
        flag.disable();
        assert_eq!(flag.state(), SweepState::Disabled);
        assert!(!flag.is_enabled());
    }

    #[test]
    fn peers_file_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"peers":["http://10.0.0.1:1337","http://10.0.0.2:1337"]}}"#).unwrap();
        let peerage = read_peers_file(file.path()).unwrap();
        assert_eq!(
            peerage.peers,
            ["http://10.0.0.1:1337", "http://10.0.0.2:1337"]
        );
    }

    #[test]
    fn malformed_peers_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(read_peers_file(file.path()).is_err());
    }
}
