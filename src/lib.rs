//! lanehash miner library
//!
//! Drives the [`engine`] from the outside: splits a nonce range across
//! worker threads, shares one cancellation flag between them and collects
//! the first share.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::AtomicBool;
//! use lanehash::engine::{register, Target, WorkItem};
//! use lanehash::miner::{search, SearchConfig};
//!
//! let desc = register("keccak").unwrap();
//! let work = WorkItem::new([0; 20], Target::from_leading_zeros(4));
//! let config = SearchConfig { threads: 2, start: 0, max_nonce: 10_000 };
//! let cancel = Arc::new(AtomicBool::new(false));
//!
//! let report = search(&desc, &work, &config, &cancel).unwrap();
//! assert!(report.found.is_some());
//! ```

// Re-export the hashing engine
pub use lanehash_core as engine;

pub mod miner;
pub mod report;
