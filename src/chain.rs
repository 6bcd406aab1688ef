//! The chain: an ordered block list rooted at the canonical genesis.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::block::{self, Block};
use crate::error::KernelError;
use crate::record::RecordCollection;

/// Ordered sequence of blocks. This is also the wire shape of
/// `GET /api/chain` (`{"block_list": [...]}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    pub block_list: Vec<Block>,
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}

impl Chain {
    /// A fresh chain holding only the genesis block.
    pub fn new() -> Self {
        Self {
            block_list: vec![block::genesis()],
        }
    }

    pub fn length(&self) -> usize {
        self.block_list.len()
    }

    pub fn last(&self) -> Option<&Block> {
        self.block_list.last()
    }

    /// True iff the whole chain holds: canonical genesis first, contiguous
    /// indices, intact hash links, and every block true to itself. An empty
    /// chain is invalid, never a panic.
    pub fn validate(&self) -> bool {
        let Some(first) = self.block_list.first() else {
            return false;
        };
        if *first != block::genesis() {
            return false;
        }
        for (idx, element) in self.block_list.iter().enumerate().skip(1) {
            if !element.validate() {
                return false;
            }
            let prior = &self.block_list[idx - 1];
            if element.index != prior.index + 1 {
                return false;
            }
            if element.previous_hash != prior.hash {
                return false;
            }
        }
        true
    }

    /// Seal `data` into the next block. Content is never rejected here;
    /// deduplication belongs to the ingress path.
    pub fn append_block(&mut self, data: RecordCollection) -> Result<(), KernelError> {
        let index = self.block_list.len() as u64;
        let prior = self.block_list.last().ok_or(KernelError::EmptyChain)?;
        let previous_hash = prior.hash.clone();
        let timestamp = Utc::now();
        let hash = block::calculate_hash(index, timestamp, &previous_hash, &data)?;
        self.block_list.push(Block {
            index,
            previous_hash,
            timestamp,
            hash,
            data,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use uuid::Uuid;

    fn batch(entries: &[&str]) -> RecordCollection {
        RecordCollection::from_records(
            entries
                .iter()
                .map(|e| Record::with_parts(Uuid::new_v4(), 1_700_000_000, e.to_string()))
                .collect(),
        )
    }

    #[test]
    fn fresh_chain_validates() {
        let chain = Chain::new();
        assert_eq!(chain.length(), 1);
        assert!(chain.validate());
    }

    #[test]
    fn empty_chain_is_invalid_not_a_panic() {
        let chain = Chain { block_list: vec![] };
        assert!(!chain.validate());
    }

    #[test]
    fn appended_batches_keep_the_chain_valid() {
        let mut chain = Chain::new();
        chain.append_block(batch(&["a"])).unwrap();
        chain.append_block(batch(&["b", "c"])).unwrap();
        chain.append_block(batch(&["d"])).unwrap();
        assert_eq!(chain.length(), 4);
        assert!(chain.validate());
    }

    #[test]
    fn append_links_to_the_prior_block() {
        let mut chain = Chain::new();
        chain.append_block(batch(&["a"])).unwrap();
        chain.append_block(batch(&["b"])).unwrap();

        let last = chain.last().unwrap();
        let before_last = &chain.block_list[chain.length() - 2];
        assert_eq!(last.index, before_last.index + 1);
        assert_eq!(last.previous_hash, before_last.hash);
        assert!(last.validate());
    }

    #[test]
    fn single_byte_tampering_is_caught() {
        let mut chain = Chain::new();
        chain.append_block(batch(&["a"])).unwrap();
        chain.append_block(batch(&["b"])).unwrap();
        assert!(chain.validate());

        let mut tampered = chain.clone();
        tampered.block_list[1].hash[0] ^= 0x01;
        assert!(!tampered.validate());

        let mut tampered = chain.clone();
        tampered.block_list[2].previous_hash[0] ^= 0x01;
        assert!(!tampered.validate());

        let mut tampered = chain.clone();
        tampered.block_list[1].timestamp =
            tampered.block_list[1].timestamp + chrono::Duration::seconds(1);
        assert!(!tampered.validate());

        let mut tampered = chain.clone();
        tampered.block_list[2].data.items[0] =
            Record::with_parts(Uuid::nil(), 0, "swapped".to_string());
        assert!(!tampered.validate());
    }

    #[test]
    fn wrong_genesis_is_rejected() {
        let mut chain = Chain::new();
        chain.block_list[0].data.items[0] =
            Record::with_parts(Uuid::nil(), 0, "not the beginning".to_string());
        assert!(!chain.validate());
    }

    #[test]
    fn index_gap_is_rejected() {
        let mut chain = Chain::new();
        chain.append_block(batch(&["a"])).unwrap();
        chain.append_block(batch(&["b"])).unwrap();
        chain.block_list.remove(1);
        assert!(!chain.validate());
    }

    #[test]
    fn chain_json_round_trips() {
        let mut chain = Chain::new();
        chain.append_block(batch(&["a"])).unwrap();
        let json = serde_json::to_string(&chain).unwrap();
        let back: Chain = serde_json::from_str(&json).unwrap();
        assert_eq!(back, chain);
        assert!(back.validate());
    }
}
