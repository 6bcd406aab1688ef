//! Kernel error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KernelError {
    /// Reserved for hashing-library failure; not currently produced.
    #[error("hashing failure: {0}")]
    Hash(String),

    #[error("append on an empty chain")]
    EmptyChain,
}
