//! Bounded FIFO of records awaiting inclusion in the next block.
//!
//! Invariants:
//! - capacity is an absolute ceiling; `put` on a full pool fails
//! - pops come out in insertion order
//! - head and tail advance modulo capacity

use tally_kernel::Record;

use crate::errors::NodeError;

/// Absolute ceiling on pending records.
pub const MAX_SLOTS: usize = 100_000;

/// The ring itself. The node wraps this in a `tokio::sync::Mutex`; callers
/// hold that lock across bulk drains so emptiness is observable atomically.
#[derive(Debug)]
pub struct Fifo {
    slots: Vec<Option<Record>>,
    head: usize,
    tail: usize,
    len: usize,
}

impl Default for Fifo {
    fn default() -> Self {
        Self::new()
    }
}

impl Fifo {
    pub fn new() -> Self {
        Self::with_capacity(MAX_SLOTS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
            head: 0,
            tail: 0,
            len: 0,
        }
    }

    pub fn put(&mut self, record: Record) -> Result<(), NodeError> {
        if self.len == self.slots.len() {
            return Err(NodeError::MempoolFull);
        }
        self.slots[self.tail] = Some(record);
        self.tail = (self.tail + 1) % self.slots.len();
        self.len += 1;
        Ok(())
    }

    /// Absence is not an error.
    pub fn pop(&mut self) -> Option<Record> {
        if self.len == 0 {
            return None;
        }
        let record = self.slots[self.head].take();
        self.head = (self.head + 1) % self.slots.len();
        self.len -= 1;
        record
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
