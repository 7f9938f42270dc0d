//! 64-bit lane view shared by the scalar and batched paths
//!
//! Primitives written against [`Lanes64`] compile once for `u64` (one lane)
//! and once per vector width, so the 4-way and 8-way variants are the scalar
//! code with a wider word type rather than separate sources.

use crate::simd::Simd;

/// A word type carrying `LANES` independent 64-bit lanes
pub trait Lanes64: Copy + Send + Sync + 'static {
    /// Number of independent lanes
    const LANES: usize;

    fn splat(x: u64) -> Self;
    fn lane(&self, i: usize) -> u64;
    fn set_lane(&mut self, i: usize, v: u64);

    fn xor(self, other: Self) -> Self;
    fn and(self, other: Self) -> Self;
    /// `!self & other`
    fn andnot(self, other: Self) -> Self;
    fn add(self, other: Self) -> Self;
    fn rotl(self, c: u32) -> Self;
    fn rotr(self, c: u32) -> Self;

    #[inline(always)]
    fn xor3(a: Self, b: Self, c: Self) -> Self {
        a.xor(b).xor(c)
    }
}

impl Lanes64 for u64 {
    const LANES: usize = 1;

    #[inline(always)]
    fn splat(x: u64) -> Self {
        x
    }

    #[inline(always)]
    fn lane(&self, _i: usize) -> u64 {
        *self
    }

    #[inline(always)]
    fn set_lane(&mut self, _i: usize, v: u64) {
        *self = v;
    }

    #[inline(always)]
    fn xor(self, other: Self) -> Self {
        self ^ other
    }

    #[inline(always)]
    fn and(self, other: Self) -> Self {
        self & other
    }

    #[inline(always)]
    fn andnot(self, other: Self) -> Self {
        !self & other
    }

    #[inline(always)]
    fn add(self, other: Self) -> Self {
        self.wrapping_add(other)
    }

    #[inline(always)]
    fn rotl(self, c: u32) -> Self {
        self.rotate_left(c)
    }

    #[inline(always)]
    fn rotr(self, c: u32) -> Self {
        self.rotate_right(c)
    }
}

impl<const W: usize> Lanes64 for Simd<W> {
    const LANES: usize = W;

    #[inline(always)]
    fn splat(x: u64) -> Self {
        Simd::splat64(x)
    }

    #[inline(always)]
    fn lane(&self, i: usize) -> u64 {
        self.word(i)
    }

    #[inline(always)]
    fn set_lane(&mut self, i: usize, v: u64) {
        self.set_word(i, v);
    }

    #[inline(always)]
    fn xor(self, other: Self) -> Self {
        self ^ other
    }

    #[inline(always)]
    fn and(self, other: Self) -> Self {
        self & other
    }

    #[inline(always)]
    fn andnot(self, other: Self) -> Self {
        Simd::andnot(self, other)
    }

    #[inline(always)]
    fn add(self, other: Self) -> Self {
        self.add_64(other)
    }

    #[inline(always)]
    fn rotl(self, c: u32) -> Self {
        self.rol_64(c)
    }

    #[inline(always)]
    fn rotr(self, c: u32) -> Self {
        self.ror_64(c)
    }

    #[inline(always)]
    fn xor3(a: Self, b: Self, c: Self) -> Self {
        Simd::xor3(a, b, c)
    }
}

/// Pack `W` equal-length byte buffers into per-word lane vectors
///
/// Word `i` of lane `j` lands in `out[i].word(j)`. Every input must be
/// `out.len() * 8` bytes long.
#[inline]
pub fn interleave_64<const W: usize>(lanes: &[&[u8]; W], out: &mut [Simd<W>]) {
    for (j, lane) in lanes.iter().enumerate() {
        interleave_lane(out, j, lane);
    }
}

/// Write one lane's bytes into an interleaved buffer
#[inline]
pub fn interleave_lane<const W: usize>(out: &mut [Simd<W>], lane: usize, bytes: &[u8]) {
    debug_assert_eq!(bytes.len(), out.len() * 8);
    for (v, chunk) in out.iter_mut().zip(bytes.chunks_exact(8)) {
        let mut w = [0u8; 8];
        w.copy_from_slice(chunk);
        v.set_word(lane, u64::from_le_bytes(w));
    }
}

/// Unpack an interleaved buffer into `W` byte buffers
#[inline]
pub fn deinterleave_64<const W: usize>(input: &[Simd<W>], out: &mut [&mut [u8]; W]) {
    for (j, lane) in out.iter_mut().enumerate() {
        deinterleave_lane(input, j, lane);
    }
}

/// Extract one lane's bytes from an interleaved buffer
#[inline]
pub fn deinterleave_lane<const W: usize>(input: &[Simd<W>], lane: usize, out: &mut [u8]) {
    debug_assert_eq!(out.len(), input.len() * 8);
    for (v, chunk) in input.iter().zip(out.chunks_exact_mut(8)) {
        chunk.copy_from_slice(&v.word(lane).to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::V256;

    #[test]
    fn test_interleave_layout() {
        let a: Vec<u8> = (0..16).collect();
        let b: Vec<u8> = (16..32).collect();
        let c = [0xAAu8; 16];
        let d = [0x55u8; 16];
        let mut v = [V256::zero(); 2];
        interleave_64(&[&a, &b, &c, &d], &mut v);

        assert_eq!(v[0].word(0), u64::from_le_bytes(a[..8].try_into().unwrap()));
        assert_eq!(v[1].word(1), u64::from_le_bytes(b[8..].try_into().unwrap()));
        assert_eq!(v[0].word(2), 0xAAAA_AAAA_AAAA_AAAA);

        let mut outs = [[0u8; 16]; 4];
        let [o0, o1, o2, o3] = &mut outs;
        deinterleave_64(&v, &mut [&mut o0[..], &mut o1[..], &mut o2[..], &mut o3[..]]);
        assert_eq!(&outs[0][..], &a[..]);
        assert_eq!(&outs[1][..], &b[..]);
        assert_eq!(outs[2], c);
        assert_eq!(outs[3], d);
    }

    #[test]
    fn test_scalar_and_vector_lanes_agree() {
        let x = 0xDEAD_BEEF_0123_4567u64;
        let y = 0x0F0F_F0F0_1234_5678u64;
        let vx = V256::splat(x);
        let vy = V256::splat(y);
        for c in [1, 16, 24, 32, 63] {
            assert_eq!(vx.rotr(c).lane(3), x.rotr(c));
            assert_eq!(vx.rotl(c).lane(0), x.rotl(c));
        }
        assert_eq!(vx.andnot(vy).lane(2), Lanes64::andnot(x, y));
        assert_eq!(Lanes64::add(vx, vy).lane(1), Lanes64::add(x, y));
        assert_eq!(<V256 as Lanes64>::xor3(vx, vy, vx).lane(0), y);
    }
}
