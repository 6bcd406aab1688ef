//! The tally kernel: the deterministic data model of the ledger.
//!
//! Everything here is pure state + hashing. Networking, locking, and
//! scheduling live in the `tally-node` crate.

pub mod block;
pub mod chain;
pub mod error;
pub mod hashutil;
pub mod record;
pub mod trie;

pub use block::Block;
pub use chain::Chain;
pub use error::KernelError;
pub use record::{Record, RecordCollection};
pub use trie::ByteTrie;
