//! Chain stages
//!
//! Each stage is a fixed-output hash consumed as a black box from the
//! RustCrypto crates (and `blake3`). The lane-parallel form runs the Keccak
//! family natively across lanes through [`crate::keccak`]; every other stage
//! is unpacked, hashed lane by lane, and packed again.

use blake2::Blake2b512;
use groestl::Groestl512;
use jh::Jh512;
use sha2::digest::consts::U64;
use sha2::{Digest, Sha256, Sha512};
use sha3::digest::{ExtendableOutput, Update};
use sha3::{Keccak256, Keccak512, Sha3_256, Sha3_512, Shake256};
use shabal::Shabal512;
use skein::Skein512;
use streebog::Streebog512;
use whirlpool::Whirlpool;

use crate::keccak::{self, Padding, RATE_256, RATE_512};
use crate::lanes::{deinterleave_lane, interleave_lane};
use crate::params::{FINAL_DIGEST, HEADER_SIZE, WIDE_DIGEST};
use crate::simd::Simd;

/// One black-box transform of a hash chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Blake2b512,
    Groestl512,
    Skein512,
    Jh512,
    Keccak512,
    Shabal512,
    Whirlpool,
    Sha512,
    Sha3_512,
    /// BLAKE3 in XOF mode, 64 bytes out
    Blake3Xof512,
    /// SHAKE256, 64 bytes out
    Shake256_512,
    /// GOST R 34.11-2012, 512-bit
    Streebog512,
    Sha256,
    Keccak256,
    Sha3_256,
}

#[inline(always)]
fn digest_into<D: Digest>(input: &[u8], out: &mut [u8]) {
    out.copy_from_slice(&D::digest(input));
}

impl Stage {
    /// Digest length in bytes
    pub const fn output_len(self) -> usize {
        match self {
            Stage::Sha256 | Stage::Keccak256 | Stage::Sha3_256 => FINAL_DIGEST,
            _ => WIDE_DIGEST,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Stage::Blake2b512 => "blake2b-512",
            Stage::Groestl512 => "groestl-512",
            Stage::Skein512 => "skein-512",
            Stage::Jh512 => "jh-512",
            Stage::Keccak512 => "keccak-512",
            Stage::Shabal512 => "shabal-512",
            Stage::Whirlpool => "whirlpool",
            Stage::Sha512 => "sha-512",
            Stage::Sha3_512 => "sha3-512",
            Stage::Blake3Xof512 => "blake3-xof-512",
            Stage::Shake256_512 => "shake256-512",
            Stage::Streebog512 => "streebog-512",
            Stage::Sha256 => "sha-256",
            Stage::Keccak256 => "keccak-256",
            Stage::Sha3_256 => "sha3-256",
        }
    }

    /// Sponge rate and padding of the Keccak family
    const fn sponge(self) -> Option<(usize, Padding)> {
        match self {
            Stage::Keccak512 => Some((RATE_512, Padding::Keccak)),
            Stage::Sha3_512 => Some((RATE_512, Padding::Sha3)),
            Stage::Shake256_512 => Some((RATE_256, Padding::Shake)),
            Stage::Keccak256 => Some((RATE_256, Padding::Keccak)),
            Stage::Sha3_256 => Some((RATE_256, Padding::Sha3)),
            _ => None,
        }
    }

    /// True when the lane-parallel form runs without unpacking
    pub const fn is_lane_native(self) -> bool {
        self.sponge().is_some()
    }

    /// Hash one input; `out.len()` must equal [`Stage::output_len`]
    pub fn apply(self, input: &[u8], out: &mut [u8]) {
        debug_assert_eq!(out.len(), self.output_len());
        match self {
            Stage::Blake2b512 => digest_into::<Blake2b512>(input, out),
            Stage::Groestl512 => digest_into::<Groestl512>(input, out),
            Stage::Skein512 => digest_into::<Skein512<U64>>(input, out),
            Stage::Jh512 => digest_into::<Jh512>(input, out),
            Stage::Keccak512 => digest_into::<Keccak512>(input, out),
            Stage::Shabal512 => digest_into::<Shabal512>(input, out),
            Stage::Whirlpool => digest_into::<Whirlpool>(input, out),
            Stage::Sha512 => digest_into::<Sha512>(input, out),
            Stage::Sha3_512 => digest_into::<Sha3_512>(input, out),
            Stage::Blake3Xof512 => {
                let mut hasher = blake3::Hasher::new();
                hasher.update(input);
                hasher.finalize_xof().fill(out);
            }
            Stage::Shake256_512 => {
                let mut hasher = Shake256::default();
                Update::update(&mut hasher, input);
                hasher.finalize_xof_into(out);
            }
            Stage::Streebog512 => digest_into::<Streebog512>(input, out),
            Stage::Sha256 => digest_into::<Sha256>(input, out),
            Stage::Keccak256 => digest_into::<Keccak256>(input, out),
            Stage::Sha3_256 => digest_into::<Sha3_256>(input, out),
        }
    }

    /// Hash `W` interleaved inputs
    ///
    /// `input` holds the lanes' messages word by word; `out.len()` must be
    /// `output_len() / 8`. Lane `j` of the result equals `apply` on lane `j`.
    #[inline(always)]
    pub fn apply_lanes<const W: usize>(self, input: &[Simd<W>], out: &mut [Simd<W>]) {
        debug_assert_eq!(out.len() * 8, self.output_len());
        if let Some((rate, padding)) = self.sponge() {
            keccak::sponge(input, rate, padding, out);
            return;
        }

        let in_len = input.len() * 8;
        debug_assert!(in_len <= HEADER_SIZE);
        let mut msg = [0u8; HEADER_SIZE];
        let mut digest = [0u8; WIDE_DIGEST];
        let out_len = self.output_len();
        for lane in 0..W {
            deinterleave_lane(input, lane, &mut msg[..in_len]);
            self.apply(&msg[..in_len], &mut digest[..out_len]);
            interleave_lane(out, lane, &digest[..out_len]);
        }
    }
}

impl core::fmt::Display for Stage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
