//! Per-worker state
//!
//! A [`WorkerContext`] owns the memory-hard stage's scratch matrix. Create
//! one per worker thread (see [`crate::Descriptor::worker_context`]) and pass
//! it by `&mut` into every hash call; it is never shared.

use tracing::debug;

use crate::error::{Error, Result};
use crate::simd::Simd;

/// Scratch owned by one worker thread
pub struct WorkerContext {
    thread_id: usize,
    scratch: Vec<u64>,
}

impl WorkerContext {
    /// Context without scratch, for chains that have no memory-hard stage
    pub fn new(thread_id: usize) -> Self {
        Self {
            thread_id,
            scratch: Vec::new(),
        }
    }

    /// Context with `words` 64-bit words of scratch reserved up front
    ///
    /// Fails with [`Error::ScratchAllocation`] instead of aborting when the
    /// allocator refuses.
    pub fn with_scratch(thread_id: usize, words: usize) -> Result<Self> {
        let bytes = words.saturating_mul(8);
        let mut scratch = Vec::new();
        scratch
            .try_reserve_exact(words)
            .map_err(|_| Error::ScratchAllocation { bytes, thread_id })?;
        scratch.resize(words, 0);
        debug!(thread_id, bytes, "allocated worker scratch");
        Ok(Self { thread_id, scratch })
    }

    pub fn thread_id(&self) -> usize {
        self.thread_id
    }

    /// Bytes of scratch currently held
    pub fn scratch_bytes(&self) -> usize {
        self.scratch.len() * 8
    }

    /// Grow to at least `words`; a context built for the right descriptor
    /// never takes this path
    fn ensure(&mut self, words: usize) {
        if self.scratch.len() < words {
            debug!(
                thread_id = self.thread_id,
                bytes = words * 8,
                "growing undersized worker scratch"
            );
            self.scratch.resize(words, 0);
        }
    }

    /// Scratch as single-lane words
    pub(crate) fn scalar_scratch(&mut self, words: usize) -> &mut [u64] {
        self.ensure(words);
        &mut self.scratch[..words]
    }

    /// Scratch as `W`-lane vectors, `words_per_lane` of them
    pub(crate) fn lane_scratch<const W: usize>(&mut self, words_per_lane: usize) -> &mut [Simd<W>] {
        self.ensure(words_per_lane * W);
        let words = &mut self.scratch[..words_per_lane * W];
        // SAFETY: Simd<W> is repr(transparent) over [u64; W], so it has the
        // size and alignment of W consecutive u64s. The slice covers exactly
        // words_per_lane * W initialized words and the borrow of self keeps
        // it exclusive for the returned lifetime.
        unsafe {
            core::slice::from_raw_parts_mut(words.as_mut_ptr().cast::<Simd<W>>(), words_per_lane)
        }
    }
}

impl core::fmt::Debug for WorkerContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WorkerContext")
            .field("thread_id", &self.thread_id)
            .field("scratch_bytes", &self.scratch_bytes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scratch_reservation() {
        let ctx = WorkerContext::with_scratch(3, 1024).unwrap();
        assert_eq!(ctx.thread_id(), 3);
        assert_eq!(ctx.scratch_bytes(), 8192);
    }

    #[test]
    fn test_impossible_reservation_is_an_error() {
        let err = WorkerContext::with_scratch(7, usize::MAX / 4).unwrap_err();
        assert!(err.is_resource());
        assert!(matches!(err, Error::ScratchAllocation { thread_id: 7, .. }));
    }

    #[test]
    fn test_lane_view_covers_same_memory() {
        let mut ctx = WorkerContext::new(0);
        {
            let lanes = ctx.lane_scratch::<4>(3);
            assert_eq!(lanes.len(), 3);
            lanes[2].set_word(1, 42);
        }
        assert_eq!(ctx.scalar_scratch(12)[9], 42);
        assert_eq!(ctx.scratch_bytes(), 96);
    }
}
