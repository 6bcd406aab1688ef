// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use tokio::sync::RwLock;

use tally_kernel::{ByteTrie, Chain, KernelError, Record, RecordCollection};

/// Guards the chain and its committed-seen index behind one reader-writer
/// lock. Readers (length, validate, snapshot, has-seen) are common; writers
/// (batcher append, sweeper swap-in) are rare.
pub struct ChainEngine {
    inner: RwLock<Ledger>,
}

struct Ledger {
    chain: Chain,
    seen: ByteTrie,
}

impl Ledger {
    /// Rebuild the seen index from every record in every block.
    fn rebuild_seen(&mut self) {
        let mut seen = ByteTrie::new();
        for block in &self.chain.block_list {
            for record in &block.data.items {
                seen.put(record.hash());
            }
        }
        self.seen = seen;
    }
}

impl Default for ChainEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainEngine {
    pub fn new() -> Self {
        let mut ledger = Ledger {
            chain: Chain::new(),
            seen: ByteTrie::new(),
        };
        ledger.rebuild_seen();
        Self {
            inner: RwLock::new(ledger),
        }
    }

    pub async fn length(&self) -> usize {
        self.inner.read().await.chain.length()
    }

    pub async fn validate(&self) -> bool {
        self.inner.read().await.chain.validate()
    }

    /// A deep copy; callers may serialize it without holding the lock.
    pub async fn snapshot(&self) -> Chain {
        self.inner.read().await.chain.clone()
    }

    /// Has this record been committed on the current chain?
    pub async fn has_seen(&self, record: &Record) -> bool {
        self.inner.read().await.seen.contains(record.hash())
    }

    /// Seal `batch` into the next block and mark every member as seen.
    /// Never rejects on content; the ingress path deduplicates.
    pub async fn append(&self, batch: RecordCollection) -> Result<(), KernelError> {
        let mut guard = self.inner.write().await;
        let hashes: Vec<Vec<u8>> = batch.items.iter().map(|r| r.hash().to_vec()).collect();
        guard.chain.append_block(batch)?;
        for hash in &hashes {
            guard.seen.put(hash);
        }
        Ok(())
    }

    /// Replace the block list wholesale and rebuild the seen index from it.
    /// The caller has already validated `candidate` and compared lengths.
    pub async fn swap_in(&self, candidate: Chain) {
        let mut guard = self.inner.write().await;
        guard.chain = candidate;
        guard.rebuild_seen();
    }

    /// Idempotent seen-index rebuild from the current blocks.
    pub async fn ensure_history(&self) {
        self.inner.write().await.rebuild_seen();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn batch(entries: &[&str]) -> RecordCollection {
        RecordCollection::from_records(
            entries
                .iter()
                .map(|e| Record::with_parts(Uuid::new_v4(), 1_700_000_000, e.to_string()))
                .collect(),
        )
    }

    #[tokio::test]
    async fn append_marks_records_as_seen() {
        let engine = ChainEngine::new();
        let records = batch(&["a", "b"]);
        let copies = records.items.clone();

        assert!(!engine.has_seen(&copies[0]).await);
        engine.append(records).await.unwrap();

        assert_eq!(engine.length().await, 2);
        assert!(engine.validate().await);
        for record in &copies {
            assert!(engine.has_seen(record).await);
        }
    }

    #[tokio::test]
    async fn swap_in_rebuilds_the_seen_index() {
        let mut other = Chain::new();
        other.append_block(batch(&["x"])).unwrap();
        other.append_block(batch(&["y", "z"])).unwrap();
        let all_records: Vec<Record> = other
            .block_list
            .iter()
            .flat_map(|b| b.data.items.clone())
            .collect();

        let engine = ChainEngine::new();
        let stale = batch(&["stale"]);
        engine.append(stale.clone()).await.unwrap();
        assert!(engine.has_seen(&stale.items[0]).await);

        engine.swap_in(other).await;
        assert_eq!(engine.length().await, 3);
        for record in &all_records {
            assert!(engine.has_seen(record).await);
        }
        // The replaced history is gone from the index.
        assert!(!engine.has_seen(&stale.items[0]).await);
    }

    #[tokio::test]
    async fn ensure_history_is_idempotent() {
        let engine = ChainEngine::new();
        let records = batch(&["a"]);
        let copy = records.items[0].clone();
        engine.append(records).await.unwrap();

        engine.ensure_history().await;
        engine.ensure_history().await;
        assert!(engine.has_seen(&copy).await);
        assert!(engine.validate().await);
    }
}
