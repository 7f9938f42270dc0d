//! Portable vector registers for lane-parallel hashing
//!
//! `Simd<W>` holds `W` 64-bit words: `V128`, `V256` and `V512` are the
//! containers of the baseline, mid and widest tiers. Every operation has the
//! same result on every width; only the way it is built differs. The widest
//! container uses the native rotate, narrower ones synthesise it from two
//! shifts and an OR, mirroring what the instruction sets offer.
//!
//! Element widths of 8, 16, 32 and 64 bits are supported. Elements are laid
//! out little-endian: element 0 occupies the lowest bits of word 0, exactly
//! as a register loaded from memory on x86.
//!
//! There are no vector literals in hardware. Constants are synthesised with
//! `splat*`/`from_*`; code that reuses one (round constants, shuffle
//! controls) builds it once per call and keeps it in a local.

use core::fmt;
use core::ops::{BitAnd, BitOr, BitXor, Not};

/// A vector register of `W` 64-bit words
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Simd<const W: usize>(pub(crate) [u64; W]);

/// 128-bit register (baseline tier)
pub type V128 = Simd<2>;
/// 256-bit register (mid tier, 4 lanes of 64 bits)
pub type V256 = Simd<4>;
/// 512-bit register (widest tier, 8 lanes of 64 bits)
pub type V512 = Simd<8>;

/// Largest register in bytes; sizes scratch buffers for byte permutations
const MAX_BYTES: usize = 64;

impl<const W: usize> Default for Simd<W> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<const W: usize> fmt::Debug for Simd<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Simd<{}>[", W * 64)?;
        for (i, w) in self.0.iter().enumerate().rev() {
            if i + 1 != W {
                f.write_str(" ")?;
            }
            write!(f, "{w:016x}")?;
        }
        f.write_str("]")
    }
}

// Sub-word element helpers. Element i of width E sits at bits [i*E, (i+1)*E).

#[inline(always)]
fn each32(w: u64, f: impl Fn(u32) -> u32) -> u64 {
    (f(w as u32) as u64) | ((f((w >> 32) as u32) as u64) << 32)
}

#[inline(always)]
fn each16(w: u64, f: impl Fn(u16) -> u16) -> u64 {
    let mut r = 0u64;
    for i in 0..4 {
        r |= (f((w >> (16 * i)) as u16) as u64) << (16 * i);
    }
    r
}

#[inline(always)]
fn each8(w: u64, f: impl Fn(u8) -> u8) -> u64 {
    let mut r = 0u64;
    for i in 0..8 {
        r |= (f((w >> (8 * i)) as u8) as u64) << (8 * i);
    }
    r
}

#[inline(always)]
fn zip32(a: u64, b: u64, f: impl Fn(u32, u32) -> u32) -> u64 {
    (f(a as u32, b as u32) as u64) | ((f((a >> 32) as u32, (b >> 32) as u32) as u64) << 32)
}

#[inline(always)]
fn zip16(a: u64, b: u64, f: impl Fn(u16, u16) -> u16) -> u64 {
    let mut r = 0u64;
    for i in 0..4 {
        r |= (f((a >> (16 * i)) as u16, (b >> (16 * i)) as u16) as u64) << (16 * i);
    }
    r
}

#[inline(always)]
fn zip8(a: u64, b: u64, f: impl Fn(u8, u8) -> u8) -> u64 {
    let mut r = 0u64;
    for i in 0..8 {
        r |= (f((a >> (8 * i)) as u8, (b >> (8 * i)) as u8) as u64) << (8 * i);
    }
    r
}

impl<const W: usize> Simd<W> {
    /// Register width in bits
    pub const BITS: usize = W * 64;

    /// Register width in bytes
    pub const BYTES: usize = W * 8;

    /// The widest tier has a native rotate; narrower tiers shift and OR
    pub const NATIVE_ROTATE: bool = W >= 8;

    #[inline(always)]
    fn map64(self, f: impl Fn(u64) -> u64) -> Self {
        Self(self.0.map(f))
    }

    #[inline(always)]
    fn zip64(self, other: Self, f: impl Fn(u64, u64) -> u64) -> Self {
        Self(core::array::from_fn(|i| f(self.0[i], other.0[i])))
    }

    // ------------------------------------------------------------------
    // Constants

    #[inline(always)]
    pub const fn zero() -> Self {
        Self([0; W])
    }

    /// All bits set
    #[inline(always)]
    pub const fn neg1() -> Self {
        Self([u64::MAX; W])
    }

    #[inline(always)]
    pub const fn from_words(words: [u64; W]) -> Self {
        Self(words)
    }

    /// Broadcast a 64-bit value to every 64-bit element
    #[inline(always)]
    pub const fn splat64(x: u64) -> Self {
        Self([x; W])
    }

    #[inline(always)]
    pub const fn splat32(x: u32) -> Self {
        Self::splat64((x as u64) | ((x as u64) << 32))
    }

    #[inline(always)]
    pub const fn splat16(x: u16) -> Self {
        Self::splat32((x as u32) | ((x as u32) << 16))
    }

    #[inline(always)]
    pub const fn splat8(x: u8) -> Self {
        Self::splat16((x as u16) | ((x as u16) << 8))
    }

    #[inline(always)]
    pub const fn one_64() -> Self {
        Self::splat64(1)
    }

    #[inline(always)]
    pub const fn one_32() -> Self {
        Self::splat32(1)
    }

    #[inline(always)]
    pub const fn one_16() -> Self {
        Self::splat16(1)
    }

    #[inline(always)]
    pub const fn one_8() -> Self {
        Self::splat8(1)
    }

    /// `{hi, lo}` repeated in every 128-bit lane
    #[inline(always)]
    pub fn from_u64x2(hi: u64, lo: u64) -> Self {
        Self(core::array::from_fn(|i| if i % 2 == 0 { lo } else { hi }))
    }

    // ------------------------------------------------------------------
    // Load / store

    /// Load from exactly `W * 8` little-endian bytes
    #[inline(always)]
    pub fn from_le_bytes(bytes: &[u8]) -> Self {
        debug_assert_eq!(bytes.len(), Self::BYTES);
        Self(core::array::from_fn(|i| {
            let mut w = [0u8; 8];
            w.copy_from_slice(&bytes[i * 8..i * 8 + 8]);
            u64::from_le_bytes(w)
        }))
    }

    /// Store into exactly `W * 8` bytes, little-endian
    #[inline(always)]
    pub fn to_le_bytes(self, out: &mut [u8]) {
        debug_assert_eq!(out.len(), Self::BYTES);
        for (chunk, w) in out.chunks_exact_mut(8).zip(self.0) {
            chunk.copy_from_slice(&w.to_le_bytes());
        }
    }

    #[inline(always)]
    pub const fn words(&self) -> &[u64; W] {
        &self.0
    }

    #[inline(always)]
    pub const fn word(&self, i: usize) -> u64 {
        self.0[i]
    }

    #[inline(always)]
    pub fn set_word(&mut self, i: usize, v: u64) {
        self.0[i] = v;
    }

    // ------------------------------------------------------------------
    // Arithmetic and logic

    #[inline(always)]
    pub fn add_64(self, other: Self) -> Self {
        self.zip64(other, u64::wrapping_add)
    }

    #[inline(always)]
    pub fn add_32(self, other: Self) -> Self {
        self.zip64(other, |a, b| zip32(a, b, u32::wrapping_add))
    }

    #[inline(always)]
    pub fn add_16(self, other: Self) -> Self {
        self.zip64(other, |a, b| zip16(a, b, u16::wrapping_add))
    }

    #[inline(always)]
    pub fn add_8(self, other: Self) -> Self {
        self.zip64(other, |a, b| zip8(a, b, u8::wrapping_add))
    }

    /// `!self & other`
    #[inline(always)]
    pub fn andnot(self, other: Self) -> Self {
        self.zip64(other, |a, b| !a & b)
    }

    #[inline(always)]
    pub fn negate_64(self) -> Self {
        self.map64(u64::wrapping_neg)
    }

    #[inline(always)]
    pub fn negate_32(self) -> Self {
        self.map64(|w| each32(w, u32::wrapping_neg))
    }

    #[inline(always)]
    pub fn negate_16(self) -> Self {
        self.map64(|w| each16(w, u16::wrapping_neg))
    }

    /// Zero every 32-bit element whose bit is set in `mask`
    #[inline(always)]
    pub fn mask_32(self, mask: u16) -> Self {
        Self(core::array::from_fn(|i| {
            let lo = if mask >> (2 * i) & 1 != 0 { 0 } else { 0xFFFF_FFFF };
            let hi = if mask >> (2 * i + 1) & 1 != 0 { 0 } else { 0xFFFF_FFFF_0000_0000 };
            self.0[i] & (lo | hi)
        }))
    }

    // Reduction trees: two independent pairs, then one combine.

    #[inline(always)]
    pub fn xor3(a: Self, b: Self, c: Self) -> Self {
        a ^ b ^ c
    }

    #[inline(always)]
    pub fn xor4(a: Self, b: Self, c: Self, d: Self) -> Self {
        (a ^ b) ^ (c ^ d)
    }

    #[inline(always)]
    pub fn add4_64(a: Self, b: Self, c: Self, d: Self) -> Self {
        a.add_64(b).add_64(c.add_64(d))
    }

    #[inline(always)]
    pub fn add4_32(a: Self, b: Self, c: Self, d: Self) -> Self {
        a.add_32(b).add_32(c.add_32(d))
    }

    #[inline(always)]
    pub fn add4_16(a: Self, b: Self, c: Self, d: Self) -> Self {
        a.add_16(b).add_16(c.add_16(d))
    }

    #[inline(always)]
    pub fn add4_8(a: Self, b: Self, c: Self, d: Self) -> Self {
        a.add_8(b).add_8(c.add_8(d))
    }

    // ------------------------------------------------------------------
    // Bit rotation within elements. `c` must be in [1, width - 1].

    #[inline(always)]
    pub fn rol_64(self, c: u32) -> Self {
        debug_assert!(c > 0 && c < 64, "rotate count {c} out of range");
        if Self::NATIVE_ROTATE {
            self.map64(|x| x.rotate_left(c))
        } else {
            self.map64(|x| (x << c) | (x >> (64 - c)))
        }
    }

    #[inline(always)]
    pub fn ror_64(self, c: u32) -> Self {
        debug_assert!(c > 0 && c < 64, "rotate count {c} out of range");
        if Self::NATIVE_ROTATE {
            self.map64(|x| x.rotate_right(c))
        } else {
            self.map64(|x| (x >> c) | (x << (64 - c)))
        }
    }

    #[inline(always)]
    pub fn rol_32(self, c: u32) -> Self {
        debug_assert!(c > 0 && c < 32, "rotate count {c} out of range");
        if Self::NATIVE_ROTATE {
            self.map64(|w| each32(w, |x| x.rotate_left(c)))
        } else {
            self.map64(|w| each32(w, |x| (x << c) | (x >> (32 - c))))
        }
    }

    #[inline(always)]
    pub fn ror_32(self, c: u32) -> Self {
        debug_assert!(c > 0 && c < 32, "rotate count {c} out of range");
        if Self::NATIVE_ROTATE {
            self.map64(|w| each32(w, |x| x.rotate_right(c)))
        } else {
            self.map64(|w| each32(w, |x| (x >> c) | (x << (32 - c))))
        }
    }

    // No tier has a 16- or 8-bit rotate instruction.

    #[inline(always)]
    pub fn rol_16(self, c: u32) -> Self {
        debug_assert!(c > 0 && c < 16, "rotate count {c} out of range");
        self.map64(|w| each16(w, |x| (x << c) | (x >> (16 - c))))
    }

    #[inline(always)]
    pub fn ror_16(self, c: u32) -> Self {
        debug_assert!(c > 0 && c < 16, "rotate count {c} out of range");
        self.map64(|w| each16(w, |x| (x >> c) | (x << (16 - c))))
    }

    #[inline(always)]
    pub fn rol_8(self, c: u32) -> Self {
        debug_assert!(c > 0 && c < 8, "rotate count {c} out of range");
        self.map64(|w| each8(w, |x| (x << c) | (x >> (8 - c))))
    }

    #[inline(always)]
    pub fn ror_8(self, c: u32) -> Self {
        debug_assert!(c > 0 && c < 8, "rotate count {c} out of range");
        self.map64(|w| each8(w, |x| (x >> c) | (x << (8 - c))))
    }

    /// Rotate every 64-bit element left by `c` bytes
    #[inline(always)]
    pub fn rol64_8(self, c: u32) -> Self {
        self.rol_64(c * 8)
    }

    #[inline(always)]
    pub fn ror64_8(self, c: u32) -> Self {
        self.ror_64(c * 8)
    }

    #[inline(always)]
    pub fn rol32_8(self, c: u32) -> Self {
        self.rol_32(c * 8)
    }

    #[inline(always)]
    pub fn ror32_8(self, c: u32) -> Self {
        self.ror_32(c * 8)
    }

    /// Swap the 32-bit halves of every 64-bit element
    #[inline(always)]
    pub fn swap64_32(self) -> Self {
        self.rol_64(32)
    }

    // ------------------------------------------------------------------
    // Endian byte swap

    #[inline(always)]
    pub fn bswap_64(self) -> Self {
        self.map64(u64::swap_bytes)
    }

    #[inline(always)]
    pub fn bswap_32(self) -> Self {
        self.map64(|w| each32(w, u32::swap_bytes))
    }

    #[inline(always)]
    pub fn bswap_16(self) -> Self {
        self.map64(|w| each16(w, u16::swap_bytes))
    }

    /// Byte-swap eight registers of 64-bit elements
    #[inline(always)]
    pub fn block_bswap_64(dst: &mut [Self; 8], src: &[Self; 8]) {
        for (d, s) in dst.iter_mut().zip(src) {
            *d = s.bswap_64();
        }
    }

    /// Byte-swap eight registers of 32-bit elements
    #[inline(always)]
    pub fn block_bswap_32(dst: &mut [Self; 8], src: &[Self; 8]) {
        for (d, s) in dst.iter_mut().zip(src) {
            *d = s.bswap_32();
        }
    }

    // ------------------------------------------------------------------
    // Whole-register element rotation and permutation.
    //
    // "Right" moves elements toward index 0: after `ror_1x32`, element 0
    // holds what element 1 held and the old element 0 wraps to the top.

    #[inline(always)]
    fn rotate_bytes_right(self, n: usize) -> Self {
        let mut buf = [0u8; MAX_BYTES];
        let bytes = &mut buf[..Self::BYTES];
        self.to_le_bytes(bytes);
        bytes.rotate_left(n % Self::BYTES);
        Self::from_le_bytes(bytes)
    }

    /// Rotate the register right by `c` bytes
    #[inline(always)]
    pub fn ror_x8(self, c: usize) -> Self {
        self.rotate_bytes_right(c)
    }

    /// Rotate the register left by `c` bytes
    #[inline(always)]
    pub fn rol_x8(self, c: usize) -> Self {
        self.rotate_bytes_right(Self::BYTES - c % Self::BYTES)
    }

    #[inline(always)]
    pub fn ror_1x64(self) -> Self {
        let mut w = self.0;
        w.rotate_left(1);
        Self(w)
    }

    #[inline(always)]
    pub fn rol_1x64(self) -> Self {
        let mut w = self.0;
        w.rotate_right(1);
        Self(w)
    }

    #[inline(always)]
    pub fn ror_1x32(self) -> Self {
        self.ror_x8(4)
    }

    #[inline(always)]
    pub fn rol_1x32(self) -> Self {
        self.rol_x8(4)
    }

    #[inline(always)]
    pub fn ror_1x16(self) -> Self {
        self.ror_x8(2)
    }

    #[inline(always)]
    pub fn rol_1x16(self) -> Self {
        self.rol_x8(2)
    }

    #[inline(always)]
    pub fn ror_1x8(self) -> Self {
        self.ror_x8(1)
    }

    #[inline(always)]
    pub fn rol_1x8(self) -> Self {
        self.rol_x8(1)
    }

    /// Exchange the upper and lower halves of the register
    #[inline(always)]
    pub fn swap_halves(self) -> Self {
        let mut w = self.0;
        w.rotate_left(W / 2);
        Self(w)
    }

    /// Reverse the order of the 64-bit elements
    #[inline(always)]
    pub fn invert_64(self) -> Self {
        let mut w = self.0;
        w.reverse();
        Self(w)
    }

    /// Reverse the order of the 32-bit elements
    #[inline(always)]
    pub fn invert_32(self) -> Self {
        self.invert_64().swap64_32()
    }

    /// Reverse the order of the 16-bit elements
    #[inline(always)]
    pub fn invert_16(self) -> Self {
        self.invert_32().map64(|w| each32(w, |x| x.rotate_left(16)))
    }

    /// Reverse the order of all bytes
    #[inline(always)]
    pub fn invert_8(self) -> Self {
        self.invert_64().bswap_64()
    }

    // Two registers rotated as one double-width register, `lo` holding the
    // low half.

    #[inline(always)]
    fn rotate_pair_bytes_right(lo: &mut Self, hi: &mut Self, n: usize) {
        let mut buf = [0u8; 2 * MAX_BYTES];
        let bytes = &mut buf[..2 * Self::BYTES];
        lo.to_le_bytes(&mut bytes[..Self::BYTES]);
        hi.to_le_bytes(&mut bytes[Self::BYTES..]);
        bytes.rotate_left(n % (2 * Self::BYTES));
        *lo = Self::from_le_bytes(&bytes[..Self::BYTES]);
        *hi = Self::from_le_bytes(&bytes[Self::BYTES..]);
    }

    #[inline(always)]
    pub fn ror_pair_64(lo: &mut Self, hi: &mut Self) {
        Self::rotate_pair_bytes_right(lo, hi, 8);
    }

    #[inline(always)]
    pub fn rol_pair_64(lo: &mut Self, hi: &mut Self) {
        Self::rotate_pair_bytes_right(lo, hi, 2 * Self::BYTES - 8);
    }

    #[inline(always)]
    pub fn ror_pair_32(lo: &mut Self, hi: &mut Self) {
        Self::rotate_pair_bytes_right(lo, hi, 4);
    }

    #[inline(always)]
    pub fn rol_pair_32(lo: &mut Self, hi: &mut Self) {
        Self::rotate_pair_bytes_right(lo, hi, 2 * Self::BYTES - 4);
    }

    #[inline(always)]
    pub fn swap_pair(lo: &mut Self, hi: &mut Self) {
        core::mem::swap(lo, hi);
    }

    // ------------------------------------------------------------------
    // Horizontal tests for branch-free short-circuiting

    #[inline(always)]
    pub fn all_bits0(self) -> bool {
        self.0.iter().fold(0, |acc, w| acc | w) == 0
    }

    #[inline(always)]
    pub fn all_bits1(self) -> bool {
        self.0.iter().fold(u64::MAX, |acc, w| acc & w) == u64::MAX
    }

    #[inline(always)]
    pub fn any_bits0(self) -> bool {
        !self.all_bits1()
    }

    #[inline(always)]
    pub fn any_bits1(self) -> bool {
        !self.all_bits0()
    }

    /// Per 64-bit element: all ones where `self <= other` (unsigned), else zero
    #[inline(always)]
    pub fn le_mask_64(self, other: Self) -> Self {
        self.zip64(other, |a, b| if a <= b { u64::MAX } else { 0 })
    }
}

impl<const W: usize> BitXor for Simd<W> {
    type Output = Self;

    #[inline(always)]
    fn bitxor(self, rhs: Self) -> Self {
        self.zip64(rhs, |a, b| a ^ b)
    }
}

impl<const W: usize> BitAnd for Simd<W> {
    type Output = Self;

    #[inline(always)]
    fn bitand(self, rhs: Self) -> Self {
        self.zip64(rhs, |a, b| a & b)
    }
}

impl<const W: usize> BitOr for Simd<W> {
    type Output = Self;

    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self {
        self.zip64(rhs, |a, b| a | b)
    }
}

impl<const W: usize> Not for Simd<W> {
    type Output = Self;

    #[inline(always)]
    fn not(self) -> Self {
        self.map64(|a| !a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample<const W: usize>() -> Simd<W> {
        Simd::from_words(core::array::from_fn(|i| {
            0x0123_4567_89ab_cdefu64.rotate_left(8 * i as u32) ^ (i as u64 * 0x1111)
        }))
    }

    #[test]
    fn test_native_and_synthesised_rotates_agree() {
        // The 512-bit container takes the native path; compare it word by
        // word against the shift+OR path of the 128-bit container.
        let wide: V512 = sample();
        for c in 1..64 {
            let native = wide.rol_64(c);
            for pair in 0..4 {
                let narrow = V128::from_words([wide.word(2 * pair), wide.word(2 * pair + 1)]);
                let synth = narrow.rol_64(c);
                assert_eq!(synth.word(0), native.word(2 * pair), "rol_64 by {c}");
                assert_eq!(synth.word(1), native.word(2 * pair + 1), "rol_64 by {c}");
            }
        }
        for c in 1..32 {
            let native = wide.ror_32(c);
            let narrow = V256::from_words([wide.word(0), wide.word(1), wide.word(2), wide.word(3)]);
            assert_eq!(narrow.ror_32(c).words()[..], native.words()[..4], "ror_32 by {c}");
        }
    }

    #[test]
    fn test_rotate_round_trip_all_widths() {
        let v: V256 = sample();
        for c in 1..64 {
            assert_eq!(v.rol_64(c).ror_64(c), v);
        }
        for c in 1..32 {
            assert_eq!(v.rol_32(c).ror_32(c), v);
        }
        for c in 1..16 {
            assert_eq!(v.rol_16(c).ror_16(c), v);
        }
        for c in 1..8 {
            assert_eq!(v.rol_8(c).ror_8(c), v);
        }
    }

    #[test]
    fn test_rotate_32_stays_inside_element() {
        let v = V128::from_words([0x8000_0000_0000_0001, 0]);
        let r = v.rol_32(1);
        assert_eq!(r.word(0), 0x0000_0001_0000_0002);
        let r = V128::from_words([0x0001_0000_0000_0000, 0]).rol_16(15);
        assert_eq!(r.word(0), 0x8000_0000_0000_0000);
    }

    #[test]
    fn test_byte_swaps() {
        let v = V128::from_words([0x0102_0304_0506_0708, 0x1112_1314_1516_1718]);
        assert_eq!(v.bswap_64().word(0), 0x0807_0605_0403_0201);
        assert_eq!(v.bswap_32().word(0), 0x0403_0201_0807_0605);
        assert_eq!(v.bswap_16().word(1), 0x1211_1413_1615_1817);
        assert_eq!(v.bswap_32().bswap_32(), v);

        let src: [V256; 8] = core::array::from_fn(|i| V256::splat64(i as u64 + 1));
        let mut dst = [V256::zero(); 8];
        V256::block_bswap_32(&mut dst, &src);
        assert_eq!(dst[2].word(3), 0x0000_0000_0300_0000);
        V256::block_bswap_64(&mut dst, &src);
        assert_eq!(dst[0].word(0), 0x0100_0000_0000_0000);
    }

    #[test]
    fn test_element_rotation_and_inversion() {
        // elements (32-bit) 0..4 = 0, 1, 2, 3
        let v = V128::from_words([1u64 << 32, 2 | (3u64 << 32)]);
        let r = v.ror_1x32();
        assert_eq!(r.words(), &[1 | (2u64 << 32), 3]);
        assert_eq!(v.rol_1x32().words(), &[3 | (0u64 << 32), 1 | (2u64 << 32)]);
        assert_eq!(v.invert_32().words(), &[3 | (2u64 << 32), 1 | (0u64 << 32)]);
        assert_eq!(v.swap_halves().words(), &[v.word(1), v.word(0)]);

        let w: V512 = sample();
        assert_eq!(w.ror_1x64().rol_1x64(), w);
        assert_eq!(w.ror_1x16().rol_1x16(), w);
        assert_eq!(w.ror_1x8().rol_1x8(), w);
        assert_eq!(w.invert_8().invert_8(), w);
        assert_eq!(w.invert_16().invert_16(), w);
        assert_eq!(w.ror_x8(5).rol_x8(5), w);
        // eight single-word rotations bring the register back
        let mut x = w;
        for _ in 0..8 {
            x = x.ror_1x64();
        }
        assert_eq!(x, w);
    }

    #[test]
    fn test_pair_rotation_matches_double_width() {
        let lo0 = V128::from_words([10, 11]);
        let hi0 = V128::from_words([12, 13]);
        let (mut lo, mut hi) = (lo0, hi0);
        V128::ror_pair_64(&mut lo, &mut hi);
        assert_eq!(lo.words(), &[11, 12]);
        assert_eq!(hi.words(), &[13, 10]);

        let wide = V256::from_words([10, 11, 12, 13]).ror_1x32();
        let (mut lo, mut hi) = (lo0, hi0);
        V128::ror_pair_32(&mut lo, &mut hi);
        assert_eq!([lo.word(0), lo.word(1), hi.word(0), hi.word(1)], *wide.words());
        V128::rol_pair_32(&mut lo, &mut hi);
        V128::ror_pair_64(&mut lo, &mut hi);
        V128::rol_pair_64(&mut lo, &mut hi);
        assert_eq!((lo, hi), (lo0, hi0));

        V128::swap_pair(&mut lo, &mut hi);
        assert_eq!((lo, hi), (hi0, lo0));
    }

    #[test]
    fn test_constants() {
        assert_eq!(V128::one_32().words(), &[0x0000_0001_0000_0001; 2]);
        assert_eq!(V128::one_16().word(0), 0x0001_0001_0001_0001);
        assert_eq!(V128::one_8().word(1), 0x0101_0101_0101_0101);
        assert_eq!(V256::from_u64x2(7, 9).words(), &[9, 7, 9, 7]);
        assert_eq!(V256::one_64().add_64(V256::neg1()), V256::zero());
        assert_eq!(!V512::zero(), V512::neg1());
    }

    #[test]
    fn test_bit_tests() {
        assert!(V512::zero().all_bits0());
        assert!(!V512::zero().any_bits1());
        assert!(V512::neg1().all_bits1());
        assert!(!V512::neg1().any_bits0());
        let mut v = V512::zero();
        v.set_word(7, 1 << 63);
        assert!(v.any_bits1());
        assert!(!v.all_bits0());
        assert!(v.any_bits0());

        let m = V256::from_words([1, 5, 9, 5]).le_mask_64(V256::splat64(5));
        assert_eq!(m.words(), &[u64::MAX, u64::MAX, 0, u64::MAX]);
    }

    #[test]
    fn test_reduction_trees_match_sequential() {
        let a: V256 = sample();
        let b = a.rol_64(7);
        let c = a.bswap_32();
        let d = !a;
        assert_eq!(V256::xor4(a, b, c, d), a ^ b ^ c ^ d);
        assert_eq!(V256::xor3(a, b, c), (a ^ b) ^ c);
        assert_eq!(V256::add4_64(a, b, c, d), a.add_64(b).add_64(c).add_64(d));
        assert_eq!(V256::add4_32(a, b, c, d), a.add_32(b).add_32(c).add_32(d));
        assert_eq!(V256::add4_16(a, b, c, d), a.add_16(b).add_16(c).add_16(d));
        assert_eq!(V256::add4_8(a, b, c, d), a.add_8(b).add_8(c).add_8(d));
    }

    #[test]
    fn test_negate_and_mask() {
        let v = V128::from_words([0x0000_0002_0000_0001, 0x0001_0000_FFFF_FFFF]);
        assert_eq!(v.negate_32().add_32(v), V128::zero());
        assert_eq!(v.negate_16().add_16(v), V128::zero());
        assert_eq!(v.negate_64().add_64(v), V128::zero());
        assert_eq!(v.mask_32(0b0101).words(), &[0x0000_0002_0000_0000, 0x0001_0000_0000_0000]);
        assert_eq!(v.andnot(V128::neg1()), !v);
    }

    #[test]
    fn test_byte_round_trip() {
        let v: V512 = sample();
        let mut buf = [0u8; 64];
        v.to_le_bytes(&mut buf);
        assert_eq!(V512::from_le_bytes(&buf), v);
        assert_eq!(buf[0], v.word(0) as u8);
    }
}
