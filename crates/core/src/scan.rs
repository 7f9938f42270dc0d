//! Nonce search loop
//!
//! Hashes `K` consecutive nonces per iteration through the descriptor's
//! bound entry point and checks the lanes in nonce order. Each lane gets a
//! cheap test of the most significant digest word first; only lanes that
//! pass it (equal top words included) get the full 256-bit comparison.
//!
//! Cancellation is polled once per iteration, so at most `K - 1` hashes
//! are computed after the flag is raised.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::trace;

use crate::context::WorkerContext;
use crate::gate::Descriptor;
use crate::params::{FINAL_DIGEST, MAX_LANES, TARGET_WORDS};
use crate::work::{Target, WorkItem};

/// A verified winning nonce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Share {
    pub nonce: u32,
    pub digest: [u8; FINAL_DIGEST],
}

/// Result of one search call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOutcome {
    pub found: Option<Share>,
    /// Hashes actually compared against the target
    pub hashes_done: u64,
}

/// Digest as eight words, word 7 most significant
///
/// The digest is read as a big-endian number: bytes `0..4` form word 7.
#[inline]
pub fn digest_words(digest: &[u8; FINAL_DIGEST]) -> [u32; TARGET_WORDS] {
    let mut words = [0u32; TARGET_WORDS];
    for (i, chunk) in digest.chunks_exact(4).enumerate() {
        words[TARGET_WORDS - 1 - i] = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    words
}

/// Top-word filter: false only when the digest certainly misses
#[inline(always)]
pub fn quick_test(digest: &[u8; FINAL_DIGEST], target: &Target) -> bool {
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]) <= target.top_word()
}

/// Full comparison, most significant word first; equal passes
#[inline]
pub fn full_test(hash: &[u32; TARGET_WORDS], target: &Target) -> bool {
    for (h, t) in hash.iter().rev().zip(target.words().iter().rev()) {
        if h != t {
            return h < t;
        }
    }
    true
}

/// True when `digest`, read big-endian, does not exceed `target`
#[inline]
pub fn meets_target(digest: &[u8; FINAL_DIGEST], target: &Target) -> bool {
    quick_test(digest, target) && full_test(&digest_words(digest), target)
}

/// Search `[work.nonce(), max_nonce)` and report the first winner
///
/// On success the winning nonce is written into `work`. Otherwise `work`
/// holds the last nonce that was checked (unchanged if none was).
pub fn search(
    desc: &Descriptor,
    work: &mut WorkItem,
    max_nonce: u32,
    ctx: &mut WorkerContext,
    cancel: &AtomicBool,
) -> ScanOutcome {
    let k = desc.lanes();
    let target = work.target;
    let header = work.to_wire();
    let mut digests = [[0u8; FINAL_DIGEST]; MAX_LANES];

    let mut next = Some(work.nonce());
    let mut last = None;
    let mut hashes_done = 0u64;

    while let Some(first) = next {
        if cancel.load(Ordering::Relaxed) || first >= max_nonce {
            break;
        }
        desc.hash_lanes(&header, first, ctx, &mut digests);

        for (lane, digest) in digests.iter().take(k).enumerate() {
            let nonce = match first.checked_add(lane as u32) {
                Some(n) if n < max_nonce => n,
                _ => break,
            };
            hashes_done += 1;
            last = Some(nonce);

            if quick_test(digest, &target) && full_test(&digest_words(digest), &target) {
                work.set_nonce(nonce);
                trace!(nonce, hashes_done, "share found");
                return ScanOutcome {
                    found: Some(Share {
                        nonce,
                        digest: *digest,
                    }),
                    hashes_done,
                };
            }
        }
        next = first.checked_add(k as u32);
    }

    if let Some(nonce) = last {
        work.set_nonce(nonce);
    }
    ScanOutcome {
        found: None,
        hashes_done,
    }
}

/// Search entry point with the classic out-parameter shape
///
/// Returns true with the winning nonce in `work` and
/// `hashes_done == winner - start + 1`; false when the range is exhausted or
/// `cancel` was raised.
pub fn scanhash(
    desc: &Descriptor,
    work: &mut WorkItem,
    max_nonce: u32,
    hashes_done: &mut u64,
    ctx: &mut WorkerContext,
    cancel: &AtomicBool,
) -> bool {
    let outcome = search(desc, work, max_nonce, ctx, cancel);
    *hashes_done = outcome.hashes_done;
    outcome.found.is_some()
}
