//! Search and benchmark results, printable as text or JSON

use serde::Serialize;
use std::fmt;

use crate::engine::{Descriptor, Share};

/// A winning nonce and the worker that found it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoundShare {
    pub nonce: u32,
    /// Digest, big-endian hex
    pub digest: String,
    pub thread_id: usize,
}

impl FoundShare {
    pub fn new(share: &Share, thread_id: usize) -> Self {
        Self {
            nonce: share.nonce,
            digest: hex::encode(share.digest),
            thread_id,
        }
    }
}

/// Outcome of a multi-threaded search
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub algorithm: String,
    pub tier: String,
    pub lanes: usize,
    pub threads: usize,
    pub start: u32,
    pub max_nonce: u32,
    pub target: String,
    pub found: Option<FoundShare>,
    pub hashes: u64,
    pub elapsed_secs: f64,
}

impl SearchReport {
    pub fn hashrate(&self) -> f64 {
        if self.elapsed_secs > 0.0 {
            self.hashes as f64 / self.elapsed_secs
        } else {
            0.0
        }
    }
}

impl fmt::Display for SearchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Algorithm: {} ({} tier, {} lanes)", self.algorithm, self.tier, self.lanes)?;
        writeln!(f, "Threads:   {}", self.threads)?;
        writeln!(f, "Range:     [{}, {})", self.start, self.max_nonce)?;
        writeln!(f, "Target:    {}", self.target)?;
        match &self.found {
            Some(share) => {
                writeln!(f, "Found:     nonce {} (thread {})", share.nonce, share.thread_id)?;
                writeln!(f, "Digest:    {}", share.digest)?;
            }
            None => writeln!(f, "Found:     nothing")?,
        }
        writeln!(f, "Hashes:    {}", self.hashes)?;
        write!(
            f,
            "Time:      {:.2}s ({:.2} H/s)",
            self.elapsed_secs,
            self.hashrate()
        )
    }
}

/// Scalar vs bound entry point throughput for one descriptor
#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    pub algorithm: String,
    pub tier: String,
    pub lanes: usize,
    pub accelerated: bool,
    pub optimizations: String,
    pub scratch_bytes: usize,
    pub count: u32,
    pub scalar_hashrate: f64,
    pub batched_hashrate: f64,
}

impl BenchReport {
    pub fn new(desc: &Descriptor, count: u32, scalar_hashrate: f64, batched_hashrate: f64) -> Self {
        Self {
            algorithm: desc.name().to_string(),
            tier: desc.tier().to_string(),
            lanes: desc.lanes(),
            accelerated: desc.is_accelerated(),
            optimizations: desc.optimizations().to_string(),
            scratch_bytes: desc.scratch_bytes(),
            count,
            scalar_hashrate,
            batched_hashrate,
        }
    }
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Results for {}:", self.algorithm)?;
        writeln!(f, "  Tier: {} ({} lanes)", self.tier, self.lanes)?;
        writeln!(f, "  Accelerated: {}", self.accelerated)?;
        writeln!(f, "  Optimizations: {}", self.optimizations)?;
        writeln!(f, "  Scratch per worker: {} KB", self.scratch_bytes / 1024)?;
        writeln!(f, "  Hashes per path: {}", self.count)?;
        writeln!(f, "  Scalar:  {:.2} H/s", self.scalar_hashrate)?;
        write!(f, "  Batched: {:.2} H/s", self.batched_hashrate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_report_json_fields() {
        let report = SearchReport {
            algorithm: "keccak".into(),
            tier: "mid".into(),
            lanes: 4,
            threads: 2,
            start: 0,
            max_nonce: 100,
            target: "00".into(),
            found: Some(FoundShare {
                nonce: 7,
                digest: "ab".into(),
                thread_id: 1,
            }),
            hashes: 8,
            elapsed_secs: 2.0,
        };
        let json: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json["found"]["nonce"], 7);
        assert_eq!(json["lanes"], 4);
        assert_eq!(report.hashrate(), 4.0);
        assert!(report.to_string().contains("nonce 7 (thread 1)"));
    }

    #[test]
    fn test_zero_elapsed_hashrate() {
        let report = SearchReport {
            algorithm: "sha3d".into(),
            tier: "baseline".into(),
            lanes: 1,
            threads: 1,
            start: 5,
            max_nonce: 5,
            target: "ff".into(),
            found: None,
            hashes: 0,
            elapsed_secs: 0.0,
        };
        assert_eq!(report.hashrate(), 0.0);
        assert!(report.to_string().contains("nothing"));
    }
}
