//! Blocks and the block-hash rule.

use chrono::{DateTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::KernelError;
use crate::hashutil;
use crate::record::{Record, RecordCollection};

/// The genesis sentinel. Five bytes, not a digest width; this exact value
/// crosses the wire and must never change.
pub const GENESIS_PREVIOUS_HASH: [u8; 5] = [0xde, 0xea, 0x0d, 0xbe, 0xff];

const GENESIS_ENTRY: &str = "בְּרֵאשִׁ֖ית בָּרָ֣א";

/// One unit of the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    #[serde(with = "hashutil::base64_bytes")]
    pub previous_hash: Vec<u8>,
    pub timestamp: DateTime<Utc>,
    #[serde(with = "hashutil::base64_bytes")]
    pub hash: Vec<u8>,
    pub data: RecordCollection,
}

/// SHAKE256-64 over
/// `varint(index) || previous_hash || varint(unix_secs) || composite`.
pub fn calculate_hash(
    index: u64,
    timestamp: DateTime<Utc>,
    previous_hash: &[u8],
    data: &RecordCollection,
) -> Result<Vec<u8>, KernelError> {
    let composite = data.composite_hash();
    let buf = hashutil::concat(&[
        &hashutil::uint_to_bytes(index),
        previous_hash,
        &hashutil::int_to_bytes(timestamp.timestamp()),
        &composite,
    ]);
    Ok(hashutil::shake256(&buf))
}

impl Block {
    pub fn new(
        index: u64,
        timestamp: DateTime<Utc>,
        previous_hash: Vec<u8>,
        data: RecordCollection,
    ) -> Result<Self, KernelError> {
        let hash = calculate_hash(index, timestamp, &previous_hash, &data)?;
        Ok(Self {
            index,
            previous_hash,
            timestamp,
            hash,
            data,
        })
    }

    /// Is the block true to itself?
    pub fn validate(&self) -> bool {
        match calculate_hash(self.index, self.timestamp, &self.previous_hash, &self.data) {
            Ok(candidate) => candidate == self.hash,
            Err(_) => false,
        }
    }
}

impl std::fmt::Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "> {} | {} | {} | {} | {} records",
            self.index,
            self.timestamp.timestamp(),
            hex::encode(&self.previous_hash),
            hex::encode(&self.hash),
            self.data.len()
        )
    }
}

/// The hard-coded first block every node shares byte-for-byte.
///
/// Failure to compute the genesis hash is the one fatal startup condition.
pub fn genesis() -> Block {
    let starter_timestamp = Utc
        .with_ymd_and_hms(-3761, 1, 1, 1, 1, 1)
        .single()
        .expect("genesis record timestamp")
        .timestamp();
    let starter = RecordCollection::from_records(vec![Record::with_parts(
        Uuid::nil(),
        starter_timestamp,
        GENESIS_ENTRY.to_string(),
    )]);
    let genesis_time = Utc
        .with_ymd_and_hms(1, 1, 1, 1, 1, 1)
        .single()
        .and_then(|t| t.with_nanosecond(1))
        .expect("genesis timestamp");
    Block::new(0, genesis_time, GENESIS_PREVIOUS_HASH.to_vec(), starter)
        .expect("unable to hash the genesis block")
}
