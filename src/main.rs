//! lanehash CLI
//!
//! A command-line controller for the lane-parallel proof-of-work engine.
//!
//! # Commands
//!
//! - `algorithms` - List registered algorithms
//! - `tiers` - Show the detected CPU tier
//! - `bench` - Compare scalar and batched hash rates
//! - `scan` - Multi-threaded search over a synthetic work item

use clap::{Parser, Subcommand};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use lanehash::engine::{
    algorithms, Descriptor, Gate, Target, Tier, WorkItem, FINAL_DIGEST, HEADER_SIZE,
    HEADER_WORDS, MAX_LANES, NONCE_OFFSET,
};
use lanehash::miner::{search, SearchConfig};
use lanehash::report::BenchReport;

#[derive(Parser)]
#[command(name = "lanehash")]
#[command(author = "Cyberia")]
#[command(version = "0.1.0")]
#[command(about = "Lane-parallel CPU proof-of-work search")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Algorithm to run
    #[arg(long, global = true, default_value = "keccak")]
    algo: String,

    /// Force a tier (baseline, mid, widest) instead of the detected one
    #[arg(long, global = true)]
    tier: Option<Tier>,

    /// Number of worker threads (default: number of CPU cores)
    #[arg(short, long, global = true)]
    threads: Option<usize>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered algorithms
    Algorithms,

    /// Show the detected CPU tier and lane width
    Tiers,

    /// Compare scalar and batched hash rates
    Bench {
        /// Number of hashes per path
        #[arg(short, long, default_value = "1000")]
        count: u32,
    },

    /// Search a synthetic work item for a share
    Scan {
        /// Leading zero bits required of the digest
        #[arg(short, long, default_value = "16")]
        zeros: u32,

        /// First nonce
        #[arg(long, default_value = "0")]
        start: u32,

        /// Exclusive upper bound of the nonce range
        #[arg(long, default_value_t = u32::MAX)]
        max_nonce: u32,

        /// Header template: 80 bytes of hex (default: all zeros)
        #[arg(long)]
        header: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Commands::Algorithms => cmd_algorithms(cli.json),
        Commands::Tiers => cmd_tiers(cli.json),
        Commands::Bench { count } => cmd_bench(&cli.algo, cli.tier, count, cli.json),
        Commands::Scan {
            zeros,
            start,
            max_nonce,
            header,
        } => cmd_scan(
            &cli.algo,
            cli.tier,
            cli.threads,
            zeros,
            start,
            max_nonce,
            header.as_deref(),
            cli.json,
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Logs go to stderr, filtered by `RUST_LOG` (default `info`)
fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_thread_names(true),
        )
        .init();
}

fn register(algo: &str, tier: Option<Tier>) -> anyhow::Result<Descriptor> {
    let gate = match tier {
        Some(t) => Gate::builder().tier(t),
        None => Gate::builder(),
    };
    Ok(gate.register(algo)?)
}

fn cmd_algorithms(json: bool) -> anyhow::Result<()> {
    let names: Vec<_> = algorithms().collect();
    if json {
        println!("{}", serde_json::to_string_pretty(&names)?);
    } else {
        for name in names {
            println!("{}", name);
        }
    }
    Ok(())
}

fn cmd_tiers(json: bool) -> anyhow::Result<()> {
    let detected = Tier::detect();
    if json {
        let tiers: Vec<_> = Tier::ALL
            .iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name(),
                    "lanes": t.lanes(),
                    "detected": *t == detected,
                    "usable": *t <= detected,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&tiers)?);
        return Ok(());
    }

    println!("Detected tier: {} ({} lanes)", detected, detected.lanes());
    for tier in Tier::ALL {
        let mark = if tier <= detected { "native" } else { "portable" };
        println!("  {:<8} {} lanes  {}", tier.name(), tier.lanes(), mark);
    }
    Ok(())
}

fn cmd_bench(algo: &str, tier: Option<Tier>, count: u32, json: bool) -> anyhow::Result<()> {
    if count == 0 {
        anyhow::bail!("--count must be at least 1");
    }
    let desc = register(algo, tier)?;
    let mut ctx = desc.worker_context(0)?;

    if !json {
        println!(
            "Running {} benchmark with {} hashes per path...",
            desc.name(),
            count
        );
    }

    let mut header = [0u8; HEADER_SIZE];
    let mut digest = [0u8; FINAL_DIGEST];
    let start = Instant::now();
    for nonce in 0..count {
        header[NONCE_OFFSET..].copy_from_slice(&nonce.to_be_bytes());
        desc.hash(&mut digest, &header, &mut ctx);
    }
    let scalar = count as f64 / start.elapsed().as_secs_f64();

    let mut digests = [[0u8; FINAL_DIGEST]; MAX_LANES];
    let batches = count.div_ceil(desc.lanes() as u32);
    let start = Instant::now();
    for batch in 0..batches {
        desc.hash_lanes(&header, batch * desc.lanes() as u32, &mut ctx, &mut digests);
    }
    let batched = (batches as usize * desc.lanes()) as f64 / start.elapsed().as_secs_f64();

    let report = BenchReport::new(&desc, count, scalar, batched);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("\n{}", report);
    }
    Ok(())
}

fn parse_header(hex_str: &str) -> anyhow::Result<[u8; HEADER_SIZE]> {
    let bytes = hex::decode(hex_str.trim())?;
    bytes.as_slice().try_into().map_err(|_| {
        anyhow::anyhow!(
            "header must be {} bytes, got {}",
            HEADER_SIZE,
            bytes.len()
        )
    })
}

#[allow(clippy::too_many_arguments)]
fn cmd_scan(
    algo: &str,
    tier: Option<Tier>,
    threads: Option<usize>,
    zeros: u32,
    start: u32,
    max_nonce: u32,
    header: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    if zeros > 256 {
        anyhow::bail!("--zeros must be at most 256");
    }
    let desc = register(algo, tier)?;
    let target = Target::from_leading_zeros(zeros);
    let work = match header {
        Some(h) => WorkItem::from_wire(&parse_header(h)?, target),
        None => WorkItem::new([0; HEADER_WORDS], target),
    };
    let config = SearchConfig {
        threads: threads.unwrap_or_else(num_cpus::get),
        start,
        max_nonce,
    };

    if !json {
        println!("\n=== lanehash scan ===");
        println!("Algorithm: {}", desc.name());
        println!("Tier: {} ({} lanes)", desc.tier(), desc.lanes());
        println!("Difficulty: {} bits", zeros);
        println!("Threads: {}", config.threads);
        println!("=====================\n");
    }

    let cancel = Arc::new(AtomicBool::new(false));
    let report = search(&desc, &work, &config, &cancel)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report);
    }
    Ok(())
}
