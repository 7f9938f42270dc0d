//! # lanehash core
//!
//! A CPU proof-of-work engine: for a chosen hash chain it searches a nonce
//! range for a digest under a 256-bit target, hashing 1, 4 or 8 nonces at a
//! time depending on the CPU.
//!
//! ## Layers
//!
//! - [`simd`] / [`lanes`]: portable vector registers (`V128`, `V256`,
//!   `V512`) with identical semantics on every width
//! - [`primitives`], [`keccak`], [`lyra2`]: the chain stages
//! - [`chain`]: algorithm tables and the scalar [`Composer`]
//! - [`batch`]: the same chains over `W` packed lanes
//! - [`gate`]: tier detection and registration into a [`Descriptor`]
//! - [`scan`]: the nonce search loop
//!
//! ## Algorithms
//!
//! | Name    | Chain                                                   |
//! |---------|---------------------------------------------------------|
//! | `keccak`| Keccak-256                                              |
//! | `sha3d` | SHA3-256 twice                                          |
//! | `x8`    | 8 wide stages, first 32 bytes of the last               |
//! | `x15lz` | 15 wide stages, SHA-256, Streebog-512, Lyra2 (t=2, 66×66)|
//!
//! ## Example
//!
//! ```rust
//! use std::sync::atomic::AtomicBool;
//! use lanehash_core::{register, Target, WorkItem};
//!
//! let desc = register("keccak").unwrap();
//! let mut ctx = desc.worker_context(0).unwrap();
//! let mut work = WorkItem::new([0; 20], Target::from_leading_zeros(8));
//! let cancel = AtomicBool::new(false);
//!
//! let mut hashes_done = 0;
//! if desc.scanhash(&mut work, 100_000, &mut hashes_done, &mut ctx, &cancel) {
//!     println!("nonce {} after {} hashes", work.nonce(), hashes_done);
//! }
//! ```

mod context;
mod error;
mod params;

pub mod batch;
pub mod chain;
pub mod gate;
pub mod keccak;
pub mod lanes;
pub mod lyra2;
pub mod primitives;
pub mod scan;
pub mod simd;
pub mod work;

pub use chain::{Algorithm, Composer, Finisher};
pub use context::WorkerContext;
pub use error::{Error, Result};
pub use gate::{Descriptor, Gate, Optimizations, Tier, algorithms, register};
pub use params::*;
pub use primitives::Stage;
pub use scan::{ScanOutcome, Share, meets_target, scanhash};
pub use simd::{Simd, V128, V256, V512};
pub use work::{Target, WorkItem};
