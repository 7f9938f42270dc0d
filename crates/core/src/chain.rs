//! Hash chains
//!
//! An [`Algorithm`] is a fixed table: an ordered list of wide stages, each
//! hashing the previous stage's 64-byte digest (the first one hashes the
//! 80-byte header), followed by a finisher that produces the 32-byte result.
//! [`Composer`] runs a chain on one header.

use crate::context::WorkerContext;
use crate::gate::Optimizations;
use crate::lyra2::{Lyra2Params, lyra2};
use crate::params::{FINAL_DIGEST, HEADER_SIZE, LYRA2_INPUT_LEN, WIDE_DIGEST};
use crate::primitives::Stage;

/// How the last wide digest becomes the 32-byte result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finisher {
    /// First 32 bytes of the last wide digest
    Truncate,
    /// Narrow (32-byte) stages applied in order
    Narrow(&'static [Stage]),
    /// `b = narrow(h)`, `c = widen(b ‖ 0…)`, then Lyra2 keyed on `c ‖ 0…`
    /// as both password and salt
    MemoryHard {
        narrow: Stage,
        widen: Stage,
        params: Lyra2Params,
    },
}

/// A named hash chain
#[derive(Debug)]
pub struct Algorithm {
    pub name: &'static str,
    pub stages: &'static [Stage],
    pub finisher: Finisher,
    /// Instruction-set extensions the implementation can exploit
    pub optimizations: Optimizations,
}

impl Algorithm {
    /// Memory-hard scratch one lane needs, in 64-bit words
    pub const fn scratch_words(&self) -> usize {
        match self.finisher {
            Finisher::Truncate | Finisher::Narrow(_) => 0,
            Finisher::MemoryHard { params, .. } => params.scratch_words(),
        }
    }

    /// Every stage the chain runs, finisher included
    pub fn stage_count(&self) -> usize {
        self.stages.len()
            + match self.finisher {
                Finisher::Truncate => 0,
                Finisher::Narrow(s) => s.len(),
                Finisher::MemoryHard { .. } => 3,
            }
    }
}

/// Keccak-256 of the header
pub static KECCAK: Algorithm = Algorithm {
    name: "keccak",
    stages: &[],
    finisher: Finisher::Narrow(&[Stage::Keccak256]),
    optimizations: Optimizations::SSE2
        .union(Optimizations::AVX2)
        .union(Optimizations::AVX512),
};

/// Double SHA3-256
pub static SHA3D: Algorithm = Algorithm {
    name: "sha3d",
    stages: &[],
    finisher: Finisher::Narrow(&[Stage::Sha3_256, Stage::Sha3_256]),
    optimizations: Optimizations::SSE2
        .union(Optimizations::AVX2)
        .union(Optimizations::AVX512),
};

/// Eight wide stages, the last digest cut to 32 bytes
pub static X8: Algorithm = Algorithm {
    name: "x8",
    stages: &[
        Stage::Blake2b512,
        Stage::Groestl512,
        Stage::Skein512,
        Stage::Jh512,
        Stage::Keccak512,
        Stage::Shabal512,
        Stage::Whirlpool,
        Stage::Sha512,
    ],
    finisher: Finisher::Truncate,
    optimizations: Optimizations::SSE2
        .union(Optimizations::AES)
        .union(Optimizations::AVX2)
        .union(Optimizations::AVX512)
        .union(Optimizations::VAES),
};

/// Fifteen wide stages, then SHA-256, Streebog and Lyra2 (t=2, 66×66)
pub static X15LZ: Algorithm = Algorithm {
    name: "x15lz",
    stages: &[
        Stage::Blake2b512,
        Stage::Groestl512,
        Stage::Skein512,
        Stage::Jh512,
        Stage::Keccak512,
        Stage::Shabal512,
        Stage::Whirlpool,
        Stage::Sha512,
        Stage::Sha3_512,
        Stage::Blake3Xof512,
        Stage::Shake256_512,
        Stage::Streebog512,
        Stage::Skein512,
        Stage::Keccak512,
        Stage::Groestl512,
    ],
    finisher: Finisher::MemoryHard {
        narrow: Stage::Sha256,
        widen: Stage::Streebog512,
        params: Lyra2Params::new(2, 66, 66),
    },
    optimizations: Optimizations::SSE2
        .union(Optimizations::AES)
        .union(Optimizations::AVX2)
        .union(Optimizations::AVX512)
        .union(Optimizations::VAES),
};

/// Every shipped chain, in listing order
pub static ALGORITHMS: &[&Algorithm] = &[&KECCAK, &SHA3D, &X8, &X15LZ];

/// Look an algorithm up by name (case-insensitive)
pub fn find(name: &str) -> Option<&'static Algorithm> {
    ALGORITHMS
        .iter()
        .copied()
        .find(|a| a.name.eq_ignore_ascii_case(name))
}

/// Scalar chain runner
#[derive(Debug, Clone, Copy)]
pub struct Composer {
    algorithm: &'static Algorithm,
}

impl Composer {
    pub const fn new(algorithm: &'static Algorithm) -> Self {
        Self { algorithm }
    }

    pub const fn algorithm(&self) -> &'static Algorithm {
        self.algorithm
    }

    /// Hash one 80-byte header
    ///
    /// Pure: the result depends only on `header`. `ctx` lends the scratch of
    /// the memory-hard stage, whose previous contents do not matter.
    pub fn hash(&self, header: &[u8; HEADER_SIZE], ctx: &mut WorkerContext) -> [u8; FINAL_DIGEST] {
        let algo = self.algorithm;

        // `buf[..len]` is the previous stage's digest
        let mut buf = *header;
        let mut len = HEADER_SIZE;
        let mut wide = [0u8; WIDE_DIGEST];
        for stage in algo.stages {
            stage.apply(&buf[..len], &mut wide);
            buf[..WIDE_DIGEST].copy_from_slice(&wide);
            len = WIDE_DIGEST;
        }

        let mut out = [0u8; FINAL_DIGEST];
        match algo.finisher {
            Finisher::Truncate => out.copy_from_slice(&buf[..FINAL_DIGEST]),
            Finisher::Narrow(stages) => {
                for stage in stages {
                    stage.apply(&buf[..len], &mut out);
                    buf[..FINAL_DIGEST].copy_from_slice(&out);
                    len = FINAL_DIGEST;
                }
            }
            Finisher::MemoryHard {
                narrow,
                widen,
                params,
            } => {
                let mut b = [0u8; WIDE_DIGEST];
                narrow.apply(&buf[..len], &mut b[..FINAL_DIGEST]);
                let mut c = [0u8; LYRA2_INPUT_LEN];
                widen.apply(&b, &mut c[..WIDE_DIGEST]);

                let mut pwd = [0u64; LYRA2_INPUT_LEN / 8];
                for (w, chunk) in pwd.iter_mut().zip(c.chunks_exact(8)) {
                    *w = u64::from_le_bytes([
                        chunk[0], chunk[1], chunk[2], chunk[3], chunk[4], chunk[5], chunk[6],
                        chunk[7],
                    ]);
                }
                let mut key = [0u64; FINAL_DIGEST / 8];
                let scratch = ctx.scalar_scratch(params.scratch_words());
                lyra2(&mut key, &pwd, &pwd, &params, scratch);
                for (chunk, w) in out.chunks_exact_mut(8).zip(key) {
                    chunk.copy_from_slice(&w.to_le_bytes());
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha3::{Digest, Keccak256, Sha3_256};

    #[test]
    fn test_finisher_stages_are_narrow() {
        for algo in ALGORITHMS {
            for stage in algo.stages {
                assert_eq!(stage.output_len(), WIDE_DIGEST, "{}: {stage}", algo.name);
            }
            match algo.finisher {
                Finisher::Truncate => assert!(!algo.stages.is_empty(), "{}", algo.name),
                Finisher::Narrow(stages) => {
                    assert!(!stages.is_empty());
                    for stage in stages {
                        assert_eq!(stage.output_len(), FINAL_DIGEST, "{}: {stage}", algo.name);
                    }
                }
                Finisher::MemoryHard { narrow, widen, .. } => {
                    assert_eq!(narrow.output_len(), FINAL_DIGEST);
                    assert_eq!(widen.output_len(), WIDE_DIGEST);
                }
            }
        }
        assert_eq!(X15LZ.stages.len(), 15);
        assert_eq!(X15LZ.stage_count(), 18);
        assert_eq!(X8.stage_count(), 8);
    }

    #[test]
    fn test_truncating_chain_keeps_wide_prefix() {
        use sha2::Sha512;

        let header = [0x3Cu8; HEADER_SIZE];
        let mut wide = [0u8; WIDE_DIGEST];
        let mut buf = header.to_vec();
        for stage in X8.stages {
            stage.apply(&buf, &mut wide);
            buf = wide.to_vec();
        }
        let mut ctx = WorkerContext::new(0);
        let got = Composer::new(&X8).hash(&header, &mut ctx);
        assert_eq!(got[..], wide[..FINAL_DIGEST]);
        assert_eq!(X8.scratch_words(), 0);

        // last stage is SHA-512: the result is a prefix of it
        let mut before_last = header.to_vec();
        for stage in &X8.stages[..X8.stages.len() - 1] {
            stage.apply(&before_last, &mut wide);
            before_last = wide.to_vec();
        }
        assert_eq!(got[..], Sha512::digest(&before_last)[..FINAL_DIGEST]);
    }

    #[test]
    fn test_lookup() {
        assert_eq!(find("X15LZ").map(|a| a.name), Some("x15lz"));
        assert_eq!(find("x8").map(|a| a.name), Some("x8"));
        assert!(find("x11").is_none());
    }

    #[test]
    fn test_narrow_chains_match_reference() {
        let mut header = [0u8; HEADER_SIZE];
        header[76..].copy_from_slice(&1234u32.to_be_bytes());
        let mut ctx = WorkerContext::new(0);

        let got = Composer::new(&KECCAK).hash(&header, &mut ctx);
        assert_eq!(&got[..], &Keccak256::digest(header)[..]);

        let got = Composer::new(&SHA3D).hash(&header, &mut ctx);
        assert_eq!(&got[..], &Sha3_256::digest(Sha3_256::digest(header))[..]);
        assert_eq!(ctx.scratch_bytes(), 0, "narrow chains need no scratch");
    }

    #[test]
    fn test_memory_hard_chain_is_pure() {
        let composer = Composer::new(&X15LZ);
        let header = [0x11u8; HEADER_SIZE];
        let mut other = header;
        other[79] ^= 1;

        let mut ctx = WorkerContext::with_scratch(0, X15LZ.scratch_words()).unwrap();
        let first = composer.hash(&header, &mut ctx);
        let between = composer.hash(&other, &mut ctx);
        let again = composer.hash(&header, &mut ctx);
        let mut fresh = WorkerContext::new(1);
        assert_eq!(first, again, "scratch reuse must not leak into the result");
        assert_eq!(first, composer.hash(&header, &mut fresh));
        assert_ne!(first, between);
    }
}
