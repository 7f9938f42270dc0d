//! Keccak-f[1600] and its sponge, generic over lane width
//!
//! The only primitive family the batched path runs natively across lanes.
//! Inputs are whole 64-bit words (every chain stage feeds 80 or 64 bytes),
//! so padding lands on a word boundary and the sponge never sees a partial
//! word.

use crate::lanes::Lanes64;

/// Rate of the 512-bit output variants, in bytes
pub const RATE_512: usize = 72;

/// Rate of the 256-bit output variants and SHAKE256, in bytes
pub const RATE_256: usize = 136;

/// Domain separation byte appended after the message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Padding {
    /// Original Keccak submission
    Keccak = 0x01,
    /// FIPS 202 SHA-3
    Sha3 = 0x06,
    /// FIPS 202 SHAKE
    Shake = 0x1F,
}

const ROUND_CONSTANTS: [u64; 24] = [
    0x0000_0000_0000_0001,
    0x0000_0000_0000_8082,
    0x8000_0000_0000_808A,
    0x8000_0000_8000_8000,
    0x0000_0000_0000_808B,
    0x0000_0000_8000_0001,
    0x8000_0000_8000_8081,
    0x8000_0000_0000_8009,
    0x0000_0000_0000_008A,
    0x0000_0000_0000_0088,
    0x0000_0000_8000_8009,
    0x0000_0000_8000_000A,
    0x0000_0000_8000_808B,
    0x8000_0000_0000_008B,
    0x8000_0000_0000_8089,
    0x8000_0000_0000_8003,
    0x8000_0000_0000_8002,
    0x8000_0000_0000_0080,
    0x0000_0000_0000_800A,
    0x8000_0000_8000_000A,
    0x8000_0000_8000_8081,
    0x8000_0000_0000_8080,
    0x0000_0000_8000_0001,
    0x8000_0000_8000_8008,
];

/// Rho offsets in pi traversal order
const RHO: [u32; 24] = [
    1, 3, 6, 10, 15, 21, 28, 36, 45, 55, 2, 14, 27, 41, 56, 8, 25, 43, 62, 18, 39, 61, 20, 44,
];

/// Pi traversal order starting from lane 1
const PI: [usize; 24] = [
    10, 7, 11, 17, 18, 3, 5, 16, 8, 21, 24, 4, 15, 23, 19, 13, 12, 2, 20, 14, 22, 9, 6, 1,
];

/// Round constants broadcast to every lane
///
/// Built once per sponge call and shared by all its permutations.
#[inline(always)]
fn round_constants<L: Lanes64>() -> [L; 24] {
    core::array::from_fn(|i| L::splat(ROUND_CONSTANTS[i]))
}

/// The 24-round Keccak-f[1600] permutation
#[inline(always)]
pub fn keccak_f<L: Lanes64>(a: &mut [L; 25], rc: &[L; 24]) {
    for round_constant in rc {
        // theta
        let mut c = [L::splat(0); 5];
        for (x, col) in c.iter_mut().enumerate() {
            *col = L::xor3(L::xor3(a[x], a[x + 5], a[x + 10]), a[x + 15], a[x + 20]);
        }
        for x in 0..5 {
            let d = c[(x + 4) % 5].xor(c[(x + 1) % 5].rotl(1));
            for y in 0..5 {
                a[5 * y + x] = a[5 * y + x].xor(d);
            }
        }

        // rho + pi
        let mut last = a[1];
        for (&j, &r) in PI.iter().zip(RHO.iter()) {
            let tmp = a[j];
            a[j] = last.rotl(r);
            last = tmp;
        }

        // chi
        for y in 0..5 {
            let row: [L; 5] = core::array::from_fn(|x| a[5 * y + x]);
            for x in 0..5 {
                a[5 * y + x] = row[x].xor(row[(x + 1) % 5].andnot(row[(x + 2) % 5]));
            }
        }

        // iota
        a[0] = a[0].xor(*round_constant);
    }
}

/// Hash whole words through the sponge
///
/// `rate` is in bytes; `out.len()` words are squeezed. Word `i` of the input
/// holds message bytes `8i..8i+8` little-endian, and the output follows the
/// same convention.
#[inline(always)]
pub fn sponge<L: Lanes64>(input: &[L], rate: usize, padding: Padding, out: &mut [L]) {
    debug_assert!(rate % 8 == 0 && rate < 200);
    let rate_words = rate / 8;
    let rc = round_constants::<L>();
    let mut state = [L::splat(0); 25];

    let mut blocks = input.chunks_exact(rate_words);
    for block in &mut blocks {
        for (s, w) in state.iter_mut().zip(block) {
            *s = s.xor(*w);
        }
        keccak_f(&mut state, &rc);
    }

    let tail = blocks.remainder();
    for (s, w) in state.iter_mut().zip(tail) {
        *s = s.xor(*w);
    }
    state[tail.len()] = state[tail.len()].xor(L::splat(padding as u64));
    state[rate_words - 1] = state[rate_words - 1].xor(L::splat(0x80 << 56));
    keccak_f(&mut state, &rc);

    let mut chunks = out.chunks_mut(rate_words).peekable();
    while let Some(chunk) = chunks.next() {
        chunk.copy_from_slice(&state[..chunk.len()]);
        if chunks.peek().is_some() {
            keccak_f(&mut state, &rc);
        }
    }
}

/// Scalar byte-oriented wrapper around [`sponge`]
///
/// # Panics
///
/// If `input.len()` or `out.len()` is not a multiple of 8.
pub fn hash_bytes(input: &[u8], rate: usize, padding: Padding, out: &mut [u8]) {
    assert!(
        input.len() % 8 == 0 && out.len() % 8 == 0,
        "keccak::hash_bytes works on whole 64-bit words"
    );
    let words_in: Vec<u64> = input
        .chunks_exact(8)
        .map(|c| u64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
        .collect();

    let mut words_out = vec![0u64; out.len() / 8];
    sponge(&words_in, rate, padding, &mut words_out);

    for (chunk, w) in out.chunks_exact_mut(8).zip(&words_out) {
        chunk.copy_from_slice(&w.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lanes::{deinterleave_lane, interleave_lane};
    use crate::simd::Simd;
    use sha3::digest::{ExtendableOutput, Update};
    use sha3::{Digest, Keccak256, Keccak512, Sha3_256, Sha3_512, Shake256};

    fn msg(len: usize, seed: u8) -> Vec<u8> {
        (0..len).map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed)).collect()
    }

    #[test]
    fn test_matches_sha3_crate() {
        for len in [0usize, 8, 64, 72, 80, 136, 144] {
            let m = msg(len, 7);

            let mut out = [0u8; 32];
            hash_bytes(&m, RATE_256, Padding::Keccak, &mut out);
            assert_eq!(&out[..], &Keccak256::digest(&m)[..], "keccak256 len {len}");

            hash_bytes(&m, RATE_256, Padding::Sha3, &mut out);
            assert_eq!(&out[..], &Sha3_256::digest(&m)[..], "sha3-256 len {len}");

            let mut out = [0u8; 64];
            hash_bytes(&m, RATE_512, Padding::Keccak, &mut out);
            assert_eq!(&out[..], &Keccak512::digest(&m)[..], "keccak512 len {len}");

            hash_bytes(&m, RATE_512, Padding::Sha3, &mut out);
            assert_eq!(&out[..], &Sha3_512::digest(&m)[..], "sha3-512 len {len}");

            hash_bytes(&m, RATE_256, Padding::Shake, &mut out);
            let mut shake = Shake256::default();
            shake.update(&m);
            let mut expected = [0u8; 64];
            shake.finalize_xof_into(&mut expected);
            assert_eq!(out, expected, "shake256 len {len}");
        }
    }

    #[test]
    fn test_long_input_and_output() {
        // several full blocks in, several rate-sized blocks out
        let m = msg(1000, 3);
        let mut out = [0u8; 32];
        hash_bytes(&m, RATE_256, Padding::Keccak, &mut out);
        assert_eq!(&out[..], &Keccak256::digest(&m)[..]);

        let mut out = vec![0u8; 400];
        hash_bytes(&m, RATE_256, Padding::Shake, &mut out);
        let mut shake = Shake256::default();
        shake.update(&m);
        let mut expected = vec![0u8; 400];
        shake.finalize_xof_into(&mut expected);
        assert_eq!(out, expected);
    }

    #[test]
    #[should_panic(expected = "whole 64-bit words")]
    fn test_unaligned_input_panics() {
        let mut out = [0u8; 32];
        hash_bytes(&[1, 2, 3], RATE_256, Padding::Keccak, &mut out);
    }

    #[test]
    fn test_empty_keccak256_vector() {
        let mut out = [0u8; 32];
        hash_bytes(&[], RATE_256, Padding::Keccak, &mut out);
        assert_eq!(
            hex::encode(out),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    fn lanes_agree<const W: usize>() {
        let msgs: Vec<Vec<u8>> = (0..W).map(|j| msg(80, j as u8)).collect();
        let mut input = [Simd::<W>::zero(); 10];
        for (j, m) in msgs.iter().enumerate() {
            interleave_lane(&mut input, j, m);
        }
        let mut out = [Simd::<W>::zero(); 8];
        sponge(&input, RATE_512, Padding::Keccak, &mut out);

        for (j, m) in msgs.iter().enumerate() {
            let mut lane = [0u8; 64];
            deinterleave_lane(&out, j, &mut lane);
            assert_eq!(&lane[..], &Keccak512::digest(m)[..], "lane {j} of {W}");
        }
    }

    #[test]
    fn test_vector_lanes_match_scalar() {
        lanes_agree::<2>();
        lanes_agree::<4>();
        lanes_agree::<8>();
    }
}
