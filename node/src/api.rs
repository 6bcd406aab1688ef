// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use serde::{Deserialize, Serialize};

/// Body of `PUT /api/block`: a single opaque payload to seal directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockData {
    pub data: String,
}

/// Peer list document, both the wire body of `/api/peers` and the on-disk
/// peers file format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Peerage {
    pub peers: Vec<String>,
}

/// `GET /api/statistics` response. Field capitalization is part of the
/// existing wire contract.
#[derive(Debug, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(rename = "MempoolSize")]
    pub mempool_size: usize,
    #[serde(rename = "ChainSize")]
    pub chain_size: usize,
}
