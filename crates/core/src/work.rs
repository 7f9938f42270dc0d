//! Work items and difficulty targets
//!
//! Header words travel big-endian ("network order") and are kept as native
//! `u32` values internally. Hashing always sees the wire bytes, so
//! [`WorkItem::to_wire`] is what every chain consumes.

use core::fmt;

use crate::params::{HEADER_SIZE, HEADER_WORDS, NONCE_WORD, TARGET_WORDS};

/// 256-bit difficulty threshold, word 7 most significant
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Target(pub [u32; TARGET_WORDS]);

impl Target {
    /// Every digest qualifies
    pub const MAX: Target = Target([u32::MAX; TARGET_WORDS]);

    pub const fn from_words(words: [u32; TARGET_WORDS]) -> Self {
        Self(words)
    }

    pub const fn words(&self) -> &[u32; TARGET_WORDS] {
        &self.0
    }

    /// Most significant word, the one the quick test compares
    pub const fn top_word(&self) -> u32 {
        self.0[TARGET_WORDS - 1]
    }

    /// Parse a big-endian 256-bit number
    pub fn from_be_bytes(bytes: &[u8; 32]) -> Self {
        let mut words = [0u32; TARGET_WORDS];
        for (i, chunk) in bytes.chunks_exact(4).enumerate() {
            words[TARGET_WORDS - 1 - i] =
                u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Self(words)
    }

    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        for (i, chunk) in out.chunks_exact_mut(4).enumerate() {
            chunk.copy_from_slice(&self.0[TARGET_WORDS - 1 - i].to_be_bytes());
        }
        out
    }

    /// Decode the compact "bits" encoding of a block header
    ///
    /// Negative values decode to zero, values past 256 bits saturate.
    pub fn from_compact(bits: u32) -> Self {
        let exponent = (bits >> 24) as usize;
        let mantissa = bits & 0x007F_FFFF;
        if bits & 0x0080_0000 != 0 || mantissa == 0 {
            return Self([0; TARGET_WORDS]);
        }

        let mut be = [0u8; 32];
        if exponent <= 3 {
            let m = mantissa >> (8 * (3 - exponent));
            be[28..].copy_from_slice(&m.to_be_bytes());
        } else {
            // mantissa bytes land at [32 - exponent, 35 - exponent)
            let m = mantissa.to_be_bytes();
            for (k, &b) in m[1..].iter().enumerate() {
                let pos = 32 + k as isize - exponent as isize;
                if pos >= 0 {
                    be[pos as usize] = b;
                } else if b != 0 {
                    return Self::MAX;
                }
            }
        }
        Self::from_be_bytes(&be)
    }

    /// Target whose top `zeros` bits are clear and the rest set
    pub fn from_leading_zeros(zeros: u32) -> Self {
        let mut words = [u32::MAX; TARGET_WORDS];
        let mut remaining = zeros.min(256);
        for w in words.iter_mut().rev() {
            let take = remaining.min(32);
            *w = if take == 32 { 0 } else { u32::MAX >> take };
            remaining -= take;
        }
        Self(words)
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::MAX
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for w in self.0.iter().rev() {
            write!(f, "{w:08x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Target({self})")
    }
}

/// One search task: an 80-byte header plus its target
///
/// Only the nonce word changes while a search runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub data: [u32; HEADER_WORDS],
    pub target: Target,
}

impl WorkItem {
    pub const fn new(data: [u32; HEADER_WORDS], target: Target) -> Self {
        Self { data, target }
    }

    /// Ingest a header in wire order
    pub fn from_wire(header: &[u8; HEADER_SIZE], target: Target) -> Self {
        let mut data = [0u32; HEADER_WORDS];
        for (w, chunk) in data.iter_mut().zip(header.chunks_exact(4)) {
            *w = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Self { data, target }
    }

    /// Emit the header in wire order
    pub fn to_wire(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        for (chunk, w) in out.chunks_exact_mut(4).zip(&self.data) {
            chunk.copy_from_slice(&w.to_be_bytes());
        }
        out
    }

    pub const fn nonce(&self) -> u32 {
        self.data[NONCE_WORD]
    }

    pub fn set_nonce(&mut self, nonce: u32) {
        self.data[NONCE_WORD] = nonce;
    }

    pub const fn version(&self) -> u32 {
        self.data[0]
    }

    pub fn prev_hash(&self) -> [u32; 8] {
        let mut out = [0u32; 8];
        out.copy_from_slice(&self.data[1..9]);
        out
    }

    pub fn merkle_root(&self) -> [u32; 8] {
        let mut out = [0u32; 8];
        out.copy_from_slice(&self.data[9..17]);
        out
    }

    pub const fn time(&self) -> u32 {
        self.data[17]
    }

    pub const fn bits(&self) -> u32 {
        self.data[18]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_round_trip() {
        let mut wire = [0u8; HEADER_SIZE];
        for (i, b) in wire.iter_mut().enumerate() {
            *b = (i as u8).wrapping_mul(37) ^ 0xC3;
        }
        let work = WorkItem::from_wire(&wire, Target::MAX);
        assert_eq!(work.to_wire(), wire);
        assert_eq!(work.version(), u32::from_be_bytes(wire[..4].try_into().unwrap()));
        assert_eq!(work.nonce(), u32::from_be_bytes(wire[76..].try_into().unwrap()));
        assert_eq!(work.prev_hash()[0], work.data[1]);
        assert_eq!(work.merkle_root()[7], work.data[16]);
        assert_eq!(work.time(), work.data[17]);
        assert_eq!(work.bits(), work.data[18]);
    }

    #[test]
    fn test_set_nonce_touches_only_nonce_bytes() {
        let mut work = WorkItem::new([7; HEADER_WORDS], Target::MAX);
        let before = work.to_wire();
        work.set_nonce(0x0102_0304);
        let after = work.to_wire();
        assert_eq!(before[..76], after[..76]);
        assert_eq!(after[76..], [1, 2, 3, 4]);
    }

    #[test]
    fn test_target_byte_order() {
        let mut be = [0u8; 32];
        be[0] = 0x12;
        be[31] = 0x34;
        let t = Target::from_be_bytes(&be);
        assert_eq!(t.top_word(), 0x1200_0000);
        assert_eq!(t.words()[0], 0x34);
        assert_eq!(t.to_be_bytes(), be);
    }

    #[test]
    fn test_compact() {
        // Bitcoin genesis difficulty
        let t = Target::from_compact(0x1d00_ffff);
        assert_eq!(
            t.to_string(),
            "00000000ffff0000000000000000000000000000000000000000000000000000"
        );
        let t = Target::from_compact(0x0312_3456);
        assert_eq!(t.words()[0], 0x0012_3456);
        let t = Target::from_compact(0x0212_3456);
        assert_eq!(t.words()[0], 0x0000_1234);
        assert_eq!(Target::from_compact(0x0480_0000), Target::from_words([0; 8]));
        assert_eq!(Target::from_compact(0xff12_3456), Target::MAX);
    }

    #[test]
    fn test_leading_zeros() {
        assert_eq!(Target::from_leading_zeros(0), Target::MAX);
        assert_eq!(Target::from_leading_zeros(16).top_word(), 0x0000_FFFF);
        let t = Target::from_leading_zeros(40);
        assert_eq!(t.top_word(), 0);
        assert_eq!(t.words()[6], 0x00FF_FFFF);
        assert_eq!(t.words()[0], u32::MAX);
        assert_eq!(Target::from_leading_zeros(300), Target::from_words([0; 8]));
    }
}
