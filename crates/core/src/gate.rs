//! Algorithm registry
//!
//! Registration turns an algorithm name into an immutable [`Descriptor`]:
//! the chain table, the CPU tier, its lane width, and the batched hash entry
//! point bound for that tier. The tier is detected once per process.
//!
//! ```text
//! Widest    AVX-512 F/VL/DQ/BW   8 lanes
//! Mid       AVX2 + AES           4 lanes
//! Baseline  anything else        1 lane (scalar composer)
//! ```
//!
//! A tier can be forced with [`Gate::builder`]. Forcing a tier the CPU lacks
//! runs the portable lane code without target-feature acceleration; results
//! are the same either way.

use core::fmt;
use core::ops::BitOr;
use core::str::FromStr;
use std::sync::OnceLock;
use std::sync::atomic::AtomicBool;

use tracing::{debug, info};

use crate::batch;
use crate::chain::{ALGORITHMS, Algorithm, Composer, find};
use crate::context::WorkerContext;
use crate::error::{Error, Result};
use crate::params::{FINAL_DIGEST, HEADER_SIZE, MAX_LANES, NONCE_OFFSET};
use crate::scan::{self, ScanOutcome};
use crate::work::WorkItem;

/// Instruction-set capability level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    /// 128-bit, scalar chain
    Baseline,
    /// 256-bit, 4 lanes
    Mid,
    /// 512-bit, 8 lanes
    Widest,
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
cpufeatures::new!(cpuid_widest, "avx512f", "avx512vl", "avx512dq", "avx512bw");
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
cpufeatures::new!(cpuid_mid, "avx2", "aes");

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Baseline, Tier::Mid, Tier::Widest];

    /// Nonces hashed per batch
    pub const fn lanes(self) -> usize {
        match self {
            Tier::Baseline => 1,
            Tier::Mid => 4,
            Tier::Widest => 8,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Tier::Baseline => "baseline",
            Tier::Mid => "mid",
            Tier::Widest => "widest",
        }
    }

    /// Best tier the running CPU supports, detected once
    pub fn detect() -> Tier {
        static DETECTED: OnceLock<Tier> = OnceLock::new();
        *DETECTED.get_or_init(|| {
            let tier = detect_tier();
            debug!(tier = %tier, lanes = tier.lanes(), "detected cpu tier");
            tier
        })
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn detect_tier() -> Tier {
    // Widest also requires the Mid features
    let mid = cpuid_mid::get();
    if mid && cpuid_widest::get() {
        Tier::Widest
    } else if mid {
        Tier::Mid
    } else {
        Tier::Baseline
    }
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
fn detect_tier() -> Tier {
    Tier::Baseline
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Tier::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownTier(s.to_string()))
    }
}

/// Instruction-set extensions an algorithm can exploit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Optimizations(u16);

impl Optimizations {
    pub const NONE: Self = Self(0);
    pub const SSE2: Self = Self(1 << 0);
    pub const AES: Self = Self(1 << 1);
    pub const AVX2: Self = Self(1 << 2);
    pub const AVX512: Self = Self(1 << 3);
    pub const VAES: Self = Self(1 << 4);
    pub const VAES256: Self = Self(1 << 5);

    const NAMES: [(Self, &'static str); 6] = [
        (Self::SSE2, "SSE2"),
        (Self::AES, "AES"),
        (Self::AVX2, "AVX2"),
        (Self::AVX512, "AVX512"),
        (Self::VAES, "VAES"),
        (Self::VAES256, "VAES256"),
    ];

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn bits(self) -> u16 {
        self.0
    }
}

impl BitOr for Optimizations {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl fmt::Display for Optimizations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (flag, name) in Self::NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str(" ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        if first {
            f.write_str("none")?;
        }
        Ok(())
    }
}

/// Batched entry point: hash `lanes` consecutive nonces of one header
type SweepFn = fn(
    &'static Algorithm,
    &[u8; HEADER_SIZE],
    u32,
    &mut WorkerContext,
    &mut [[u8; FINAL_DIGEST]],
);

fn sweep_scalar(
    algo: &'static Algorithm,
    base: &[u8; HEADER_SIZE],
    nonce: u32,
    ctx: &mut WorkerContext,
    out: &mut [[u8; FINAL_DIGEST]],
) {
    let mut header = *base;
    header[NONCE_OFFSET..].copy_from_slice(&nonce.to_be_bytes());
    out[0] = Composer::new(algo).hash(&header, ctx);
}

fn sweep_portable<const W: usize>(
    algo: &'static Algorithm,
    base: &[u8; HEADER_SIZE],
    first_nonce: u32,
    ctx: &mut WorkerContext,
    out: &mut [[u8; FINAL_DIGEST]],
) {
    batch::hash_nonces::<W>(algo, base, first_nonce, ctx, out);
}

/// The batched path compiled again with the tier's target features
///
/// The batch, stage and sponge generics are `#[inline(always)]` so their
/// bodies are codegenned inside these wrappers.
#[cfg(target_arch = "x86_64")]
mod accel {
    use super::*;

    #[target_feature(enable = "avx2,aes")]
    unsafe fn hash_nonces_avx2(
        algo: &'static Algorithm,
        base: &[u8; HEADER_SIZE],
        first_nonce: u32,
        ctx: &mut WorkerContext,
        out: &mut [[u8; FINAL_DIGEST]],
    ) {
        batch::hash_nonces::<4>(algo, base, first_nonce, ctx, out);
    }

    #[target_feature(enable = "avx512f,avx512vl,avx512dq,avx512bw")]
    unsafe fn hash_nonces_avx512(
        algo: &'static Algorithm,
        base: &[u8; HEADER_SIZE],
        first_nonce: u32,
        ctx: &mut WorkerContext,
        out: &mut [[u8; FINAL_DIGEST]],
    ) {
        batch::hash_nonces::<8>(algo, base, first_nonce, ctx, out);
    }

    pub(super) fn sweep_mid(
        algo: &'static Algorithm,
        base: &[u8; HEADER_SIZE],
        first_nonce: u32,
        ctx: &mut WorkerContext,
        out: &mut [[u8; FINAL_DIGEST]],
    ) {
        // SAFETY: only bound by `bind` after `Tier::detect` reported Mid or
        // better, which requires AVX2 and AES.
        unsafe { hash_nonces_avx2(algo, base, first_nonce, ctx, out) }
    }

    pub(super) fn sweep_widest(
        algo: &'static Algorithm,
        base: &[u8; HEADER_SIZE],
        first_nonce: u32,
        ctx: &mut WorkerContext,
        out: &mut [[u8; FINAL_DIGEST]],
    ) {
        // SAFETY: only bound by `bind` after `Tier::detect` reported Widest,
        // which requires AVX-512 F/VL/DQ/BW.
        unsafe { hash_nonces_avx512(algo, base, first_nonce, ctx, out) }
    }
}

/// Pick the sweep for `tier`; accelerated only when the CPU has the features
fn bind(tier: Tier, detected: Tier) -> (SweepFn, bool) {
    #[cfg(target_arch = "x86_64")]
    {
        if tier <= detected {
            match tier {
                Tier::Mid => return (accel::sweep_mid as SweepFn, true),
                Tier::Widest => return (accel::sweep_widest as SweepFn, true),
                Tier::Baseline => {}
            }
        }
    }
    #[cfg(not(target_arch = "x86_64"))]
    let _ = detected;

    match tier {
        Tier::Baseline => (sweep_scalar as SweepFn, false),
        Tier::Mid => (sweep_portable::<4> as SweepFn, false),
        Tier::Widest => (sweep_portable::<8> as SweepFn, false),
    }
}

/// One algorithm bound to one tier
///
/// Immutable and cheap to copy; share it freely between workers.
#[derive(Clone, Copy)]
pub struct Descriptor {
    algorithm: &'static Algorithm,
    tier: Tier,
    accelerated: bool,
    sweep: SweepFn,
}

impl Descriptor {
    pub fn name(&self) -> &'static str {
        self.algorithm.name
    }

    pub fn algorithm(&self) -> &'static Algorithm {
        self.algorithm
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Nonces per batch (K)
    pub fn lanes(&self) -> usize {
        self.tier.lanes()
    }

    pub fn optimizations(&self) -> Optimizations {
        self.algorithm.optimizations
    }

    /// True when the batched path runs with the tier's target features
    pub fn is_accelerated(&self) -> bool {
        self.accelerated
    }

    /// Scratch one worker needs, in bytes
    pub fn scratch_bytes(&self) -> usize {
        self.algorithm.scratch_words() * self.lanes() * 8
    }

    /// Build the per-thread context every hash call borrows
    pub fn worker_context(&self, thread_id: usize) -> Result<WorkerContext> {
        let words = self.algorithm.scratch_words() * self.lanes();
        if words == 0 {
            Ok(WorkerContext::new(thread_id))
        } else {
            WorkerContext::with_scratch(thread_id, words)
        }
    }

    /// Hash one header on the scalar path
    pub fn hash(
        &self,
        out: &mut [u8; FINAL_DIGEST],
        header: &[u8; HEADER_SIZE],
        ctx: &mut WorkerContext,
    ) {
        *out = Composer::new(self.algorithm).hash(header, ctx);
    }

    /// Hash `lanes()` consecutive nonces starting at `first_nonce`
    ///
    /// The nonce bytes of `base` are ignored. Entry `j` of `out` receives
    /// the digest of nonce `first_nonce + j`; entries past `lanes()` are left
    /// untouched.
    pub fn hash_lanes(
        &self,
        base: &[u8; HEADER_SIZE],
        first_nonce: u32,
        ctx: &mut WorkerContext,
        out: &mut [[u8; FINAL_DIGEST]; MAX_LANES],
    ) {
        (self.sweep)(self.algorithm, base, first_nonce, ctx, out);
    }

    /// Search nonces `[work.nonce(), max_nonce)`; see [`scan::scanhash`]
    pub fn scanhash(
        &self,
        work: &mut WorkItem,
        max_nonce: u32,
        hashes_done: &mut u64,
        ctx: &mut WorkerContext,
        cancel: &AtomicBool,
    ) -> bool {
        scan::scanhash(self, work, max_nonce, hashes_done, ctx, cancel)
    }

    /// Like [`Descriptor::scanhash`], also returning the winning digest
    pub fn scan(
        &self,
        work: &mut WorkItem,
        max_nonce: u32,
        ctx: &mut WorkerContext,
        cancel: &AtomicBool,
    ) -> ScanOutcome {
        scan::search(self, work, max_nonce, ctx, cancel)
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("algorithm", &self.algorithm.name)
            .field("tier", &self.tier)
            .field("lanes", &self.lanes())
            .field("accelerated", &self.accelerated)
            .field("optimizations", &self.optimizations().to_string())
            .finish()
    }
}

/// Registration options
#[derive(Debug, Clone, Copy, Default)]
pub struct Gate {
    tier: Option<Tier>,
}

impl Gate {
    pub fn builder() -> Self {
        Self::default()
    }

    /// Use `tier` instead of the detected one
    pub fn tier(mut self, tier: Tier) -> Self {
        self.tier = Some(tier);
        self
    }

    pub fn register(&self, name: &str) -> Result<Descriptor> {
        let algorithm = find(name).ok_or_else(|| Error::UnknownAlgorithm {
            name: name.to_string(),
            available: algorithms().collect::<Vec<_>>().join(", "),
        })?;

        let detected = Tier::detect();
        let tier = self.tier.unwrap_or(detected);
        let (sweep, accelerated) = bind(tier, detected);

        info!(
            algorithm = algorithm.name,
            tier = %tier,
            lanes = tier.lanes(),
            accelerated,
            optimizations = %algorithm.optimizations,
            "registered algorithm"
        );

        Ok(Descriptor {
            algorithm,
            tier,
            accelerated,
            sweep,
        })
    }
}

/// Register `name` on the detected tier
pub fn register(name: &str) -> Result<Descriptor> {
    Gate::builder().register(name)
}

/// Names of every registered algorithm
pub fn algorithms() -> impl Iterator<Item = &'static str> {
    ALGORITHMS.iter().map(|a| a.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_algorithm_is_configuration_error() {
        let err = register("x11").unwrap_err();
        assert!(err.is_configuration());
        let msg = err.to_string();
        assert!(msg.contains("x11") && msg.contains("keccak"), "{msg}");
    }

    #[test]
    fn test_forced_tier_sets_lane_width() {
        for tier in Tier::ALL {
            let desc = Gate::builder().tier(tier).register("keccak").unwrap();
            assert_eq!(desc.tier(), tier);
            assert_eq!(desc.lanes(), tier.lanes());
            assert_eq!(desc.name(), "keccak");
        }
    }

    #[test]
    fn test_tier_above_detected_is_portable() {
        let detected = Tier::detect();
        for tier in Tier::ALL {
            let desc = Gate::builder().tier(tier).register("sha3d").unwrap();
            if tier > detected || tier == Tier::Baseline {
                assert!(!desc.is_accelerated(), "{tier} on a {detected} cpu");
            }
        }
    }

    #[test]
    fn test_accelerated_sweep_matches_portable() {
        let base = [0x5a; HEADER_SIZE];
        for tier in [Tier::Mid, Tier::Widest] {
            for name in ["keccak", "x8"] {
                let desc = Gate::builder().tier(tier).register(name).unwrap();
                let mut ctx = desc.worker_context(0).unwrap();
                let mut bound = [[0u8; FINAL_DIGEST]; MAX_LANES];
                let mut portable = [[0u8; FINAL_DIGEST]; MAX_LANES];
                desc.hash_lanes(&base, 9, &mut ctx, &mut bound);
                let algo = desc.algorithm;
                match tier.lanes() {
                    4 => batch::hash_nonces::<4>(algo, &base, 9, &mut ctx, &mut portable),
                    _ => batch::hash_nonces::<8>(algo, &base, 9, &mut ctx, &mut portable),
                }
                assert_eq!(
                    bound, portable,
                    "{name} on {tier} (accelerated: {})",
                    desc.is_accelerated()
                );
            }
        }
    }

    #[test]
    fn test_tier_parsing() {
        assert_eq!("MID".parse::<Tier>().unwrap(), Tier::Mid);
        assert_eq!(Tier::Widest.to_string(), "widest");
        assert!(matches!("avx".parse::<Tier>(), Err(Error::UnknownTier(_))));
    }

    #[test]
    fn test_optimizations_display() {
        let o = Optimizations::SSE2 | Optimizations::AVX2;
        assert_eq!(o.to_string(), "SSE2 AVX2");
        assert!(o.contains(Optimizations::AVX2));
        assert!(!o.contains(Optimizations::AES));
        assert_eq!(Optimizations::NONE.to_string(), "none");
    }

    #[test]
    fn test_worker_context_sized_for_lanes() {
        let desc = Gate::builder().tier(Tier::Mid).register("x15lz").unwrap();
        let ctx = desc.worker_context(2).unwrap();
        assert_eq!(ctx.scratch_bytes(), desc.scratch_bytes());
        assert_eq!(desc.scratch_bytes(), 66 * 66 * 12 * 8 * 4);

        let desc = register("keccak").unwrap();
        assert_eq!(desc.worker_context(0).unwrap().scratch_bytes(), 0);
    }

    #[test]
    fn test_descriptor_is_shareable() {
        fn assert_send_sync<T: Send + Sync + Copy>() {}
        assert_send_sync::<Descriptor>();
    }
}
