//! Engine error type
//!
//! Only setup can fail: choosing an algorithm or tier, and reserving a
//! worker's scratch. Hashing and searching have no error path.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// No algorithm is registered under this name
    #[error("unknown algorithm '{name}' (available: {available})")]
    UnknownAlgorithm { name: String, available: String },

    /// Tier name not one of baseline, mid, widest
    #[error("unknown tier '{0}' (expected baseline, mid or widest)")]
    UnknownTier(String),

    /// The memory-hard stage's scratch could not be reserved
    #[error("failed to allocate {bytes} bytes of scratch for worker {thread_id}")]
    ScratchAllocation { bytes: usize, thread_id: usize },
}

impl Error {
    /// True for errors caused by a bad run configuration
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::UnknownAlgorithm { .. } | Error::UnknownTier(_))
    }

    /// True for errors caused by resource exhaustion at worker startup
    pub fn is_resource(&self) -> bool {
        matches!(self, Error::ScratchAllocation { .. })
    }
}

pub type Result<T> = core::result::Result<T, Error>;
