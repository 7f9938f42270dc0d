//! Lane-parallel chain runner
//!
//! Runs one [`Algorithm`] across `W` headers at once. Headers are packed
//! word by word into `Simd<W>` vectors, the chain runs on the packed form,
//! and the `W` results are unpacked. Lane `j` always equals
//! [`Composer::hash`](crate::Composer::hash) on header `j`.

use crate::chain::{Algorithm, Finisher};
use crate::context::WorkerContext;
use crate::lanes::{deinterleave_lane, interleave_lane};
use crate::lyra2::lyra2;
use crate::params::{FINAL_DIGEST, HEADER_SIZE, LYRA2_INPUT_LEN, NONCE_OFFSET, WIDE_DIGEST};
use crate::simd::Simd;

/// Header length in 64-bit words
const HEADER_WORDS64: usize = HEADER_SIZE / 8;
const WIDE_WORDS: usize = WIDE_DIGEST / 8;
const FINAL_WORDS: usize = FINAL_DIGEST / 8;

/// Word holding the nonce, in its upper 32-bit element
const NONCE_WORD64: usize = NONCE_OFFSET / 8;

/// Every odd 32-bit element: the upper half of each 64-bit word
const UPPER_HALVES: u16 = 0xAAAA;

/// Run the chain on `W` packed headers, leaving packed 32-byte digests
#[inline(always)]
pub fn hash_interleaved<const W: usize>(
    algo: &Algorithm,
    input: &[Simd<W>; HEADER_WORDS64],
    ctx: &mut WorkerContext,
    out: &mut [Simd<W>; FINAL_WORDS],
) {
    let mut buf = *input;
    let mut len = HEADER_WORDS64;
    let mut wide = [Simd::<W>::zero(); WIDE_WORDS];
    for stage in algo.stages {
        stage.apply_lanes(&buf[..len], &mut wide);
        buf[..WIDE_WORDS].copy_from_slice(&wide);
        len = WIDE_WORDS;
    }

    match algo.finisher {
        Finisher::Truncate => out.copy_from_slice(&buf[..FINAL_WORDS]),
        Finisher::Narrow(stages) => {
            for stage in stages {
                stage.apply_lanes(&buf[..len], out);
                buf[..FINAL_WORDS].copy_from_slice(&out[..]);
                len = FINAL_WORDS;
            }
        }
        Finisher::MemoryHard {
            narrow,
            widen,
            params,
        } => {
            let mut b = [Simd::<W>::zero(); WIDE_WORDS];
            narrow.apply_lanes(&buf[..len], &mut b[..FINAL_WORDS]);
            let mut c = [Simd::<W>::zero(); LYRA2_INPUT_LEN / 8];
            widen.apply_lanes(&b, &mut c[..WIDE_WORDS]);
            let scratch = ctx.lane_scratch::<W>(params.scratch_words());
            lyra2(out, &c, &c, &params, scratch);
        }
    }
}

/// Hash `W` independent headers
pub fn hash_lanes<const W: usize>(
    algo: &Algorithm,
    headers: &[[u8; HEADER_SIZE]; W],
    ctx: &mut WorkerContext,
    out: &mut [[u8; FINAL_DIGEST]; W],
) {
    let mut input = [Simd::<W>::zero(); HEADER_WORDS64];
    for (j, header) in headers.iter().enumerate() {
        interleave_lane(&mut input, j, header);
    }
    let mut digests = [Simd::<W>::zero(); FINAL_WORDS];
    hash_interleaved(algo, &input, ctx, &mut digests);
    for (j, digest) in out.iter_mut().enumerate() {
        deinterleave_lane(&digests, j, digest);
    }
}

/// Hash `W` consecutive nonces of one header
///
/// Lane `j` hashes `base` with the nonce bytes replaced by
/// `first_nonce + j` (wrapping) in wire order. `out` needs at least `W`
/// entries; only the first `W` are written.
#[inline(always)]
pub fn hash_nonces<const W: usize>(
    algo: &Algorithm,
    base: &[u8; HEADER_SIZE],
    first_nonce: u32,
    ctx: &mut WorkerContext,
    out: &mut [[u8; FINAL_DIGEST]],
) {
    debug_assert!(out.len() >= W);
    let mut input = [Simd::<W>::zero(); HEADER_WORDS64];
    for (v, chunk) in input.iter_mut().zip(base.chunks_exact(8)) {
        *v = Simd::splat64(u64::from_le_bytes([
            chunk[0], chunk[1], chunk[2], chunk[3], chunk[4], chunk[5], chunk[6], chunk[7],
        ]));
    }

    // nonces sit big-endian in the upper half of the last word
    let nonces = Simd::<W>::from_words(core::array::from_fn(|j| {
        (first_nonce.wrapping_add(j as u32) as u64) << 32
    }))
    .bswap_32();
    input[NONCE_WORD64] = input[NONCE_WORD64].mask_32(UPPER_HALVES) | nonces;

    let mut digests = [Simd::<W>::zero(); FINAL_WORDS];
    hash_interleaved(algo, &input, ctx, &mut digests);
    for (j, digest) in out.iter_mut().take(W).enumerate() {
        deinterleave_lane(&digests, j, digest);
    }
}
