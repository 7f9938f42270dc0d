//! Multi-threaded nonce search
//!
//! Each worker owns a disjoint slice of the nonce range and its own
//! [`WorkerContext`](crate::engine::WorkerContext). All workers share the
//! descriptor and one cancellation flag; the first finder raises the flag.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use tracing::{debug, info};

use crate::engine::{Descriptor, WorkItem, WorkerContext};
use crate::report::{FoundShare, SearchReport};

/// Nonces one worker scans between progress updates
const CHUNK: u32 = 1 << 16;

/// How often the controller logs the running hash rate
const REPORT_INTERVAL: Duration = Duration::from_secs(5);

/// Search range and parallelism
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    pub threads: usize,
    pub start: u32,
    /// Exclusive upper bound
    pub max_nonce: u32,
}

/// Split `[start, end)` into `parts` contiguous slices, earlier slices one
/// nonce longer when the length does not divide evenly
pub fn split_range(start: u32, end: u32, parts: usize) -> Vec<(u32, u32)> {
    let parts = parts.max(1) as u64;
    let len = end.saturating_sub(start) as u64;
    let base = len / parts;
    let extra = len % parts;

    let mut slices = Vec::with_capacity(parts as usize);
    let mut lo = start as u64;
    for i in 0..parts {
        let hi = lo + base + u64::from(i < extra);
        slices.push((lo as u32, hi as u32));
        lo = hi;
    }
    slices
}

/// Scan one slice in chunks, adding to `total` as it goes
fn run_worker(
    desc: Descriptor,
    mut ctx: WorkerContext,
    template: WorkItem,
    thread_id: usize,
    (lo, hi): (u32, u32),
    cancel: &AtomicBool,
    total: &AtomicU64,
) -> Option<FoundShare> {
    let mut work = template;
    let mut next = lo;

    debug!(thread_id, lo, hi, "worker started");
    while next < hi && !cancel.load(Ordering::Relaxed) {
        let end = next.saturating_add(CHUNK).min(hi);
        work.set_nonce(next);
        let outcome = desc.scan(&mut work, end, &mut ctx, cancel);
        total.fetch_add(outcome.hashes_done, Ordering::Relaxed);

        if let Some(share) = outcome.found {
            cancel.store(true, Ordering::Relaxed);
            return Some(FoundShare::new(&share, thread_id));
        }
        next = end;
    }
    None
}

/// Search `[config.start, config.max_nonce)` for a nonce meeting the target
/// of `template`
///
/// Clears `cancel` first; raising it from another thread stops every worker
/// within one batch. When several workers find a share before seeing the
/// flag, the lowest thread id wins.
pub fn search(
    desc: &Descriptor,
    template: &WorkItem,
    config: &SearchConfig,
    cancel: &Arc<AtomicBool>,
) -> anyhow::Result<SearchReport> {
    search_with(desc, template, config, cancel, |desc, thread_id| {
        Ok(desc.worker_context(thread_id)?)
    })
}

/// [`search`] with the per-thread context built by `start_worker`
///
/// A worker whose startup fails raises `cancel`, so the others stop within
/// one batch and the error is returned.
fn search_with<F>(
    desc: &Descriptor,
    template: &WorkItem,
    config: &SearchConfig,
    cancel: &Arc<AtomicBool>,
    start_worker: F,
) -> anyhow::Result<SearchReport>
where
    F: Fn(&Descriptor, usize) -> anyhow::Result<WorkerContext> + Clone + Send + 'static,
{
    cancel.store(false, Ordering::Relaxed);
    let total_hashes = Arc::new(AtomicU64::new(0));
    let found = Arc::new(Mutex::new(Vec::<FoundShare>::new()));
    let start = Instant::now();

    let slices = split_range(config.start, config.max_nonce, config.threads);
    info!(
        algorithm = desc.name(),
        tier = %desc.tier(),
        threads = slices.len(),
        start = config.start,
        max_nonce = config.max_nonce,
        "search started"
    );

    let mut handles = Vec::with_capacity(slices.len());
    for (thread_id, slice) in slices.iter().copied().enumerate() {
        let desc = *desc;
        let template = template.clone();
        let cancel = Arc::clone(cancel);
        let total = Arc::clone(&total_hashes);
        let found = Arc::clone(&found);
        let start_worker = start_worker.clone();

        let handle = thread::Builder::new()
            .name(format!("lanehash-{}", thread_id))
            .spawn(move || -> anyhow::Result<()> {
                let result = start_worker(&desc, thread_id)
                    .with_context(|| format!("worker {} could not start", thread_id))
                    .and_then(|ctx| {
                        let share =
                            run_worker(desc, ctx, template, thread_id, slice, &cancel, &total);
                        if let Some(share) = share {
                            found
                                .lock()
                                .map_err(|_| anyhow::anyhow!("share list poisoned"))?
                                .push(share);
                        }
                        Ok(())
                    });
                if result.is_err() {
                    cancel.store(true, Ordering::Relaxed);
                }
                result
            })
            .context("failed to spawn worker thread")?;
        handles.push(handle);
    }

    let mut last_report = Instant::now();
    while !handles.iter().all(|h| h.is_finished()) {
        thread::sleep(Duration::from_millis(20));
        if last_report.elapsed() >= REPORT_INTERVAL {
            let hashes = total_hashes.load(Ordering::Relaxed);
            let elapsed = start.elapsed().as_secs_f64();
            info!(hashes, hashrate = hashes as f64 / elapsed, "progress");
            last_report = Instant::now();
        }
    }

    let mut failure = None;
    for handle in handles {
        let result = handle
            .join()
            .map_err(|_| anyhow::anyhow!("worker thread panicked"))?;
        if let Err(e) = result {
            cancel.store(true, Ordering::Relaxed);
            failure.get_or_insert(e);
        }
    }
    if let Some(e) = failure {
        return Err(e);
    }

    let winner = found
        .lock()
        .map_err(|_| anyhow::anyhow!("share list poisoned"))?
        .iter()
        .min_by_key(|s| s.thread_id)
        .cloned();

    Ok(SearchReport {
        algorithm: desc.name().to_string(),
        tier: desc.tier().to_string(),
        lanes: desc.lanes(),
        threads: slices.len(),
        start: config.start,
        max_nonce: config.max_nonce,
        target: template.target.to_string(),
        found: winner,
        hashes: total_hashes.load(Ordering::Relaxed),
        elapsed_secs: start.elapsed().as_secs_f64(),
    })
}
