//! Coin Flip Example
//!
//! Conducts a batch of keyed coin-flip trials across a worker pool and
//! prints the observed frequency of heads next to the batch record.
//!
//! Run with: RUST_LOG=info cargo run --example coin_flips -- [trials] [p]

use anyhow::{Context, Result};
use serde_json::json;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use trial_conductor::trial::{KeyedTrial, TrialRegistry};
use trial_conductor::{Engine, EngineConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let trials: usize = args.next().map_or(Ok(10_000), |s| s.parse()).context("trials")?;
    let p: f64 = args.next().map_or(Ok(0.2), |s| s.parse()).context("p")?;

    println!("=== trial-conductor: Coin Flips ===\n");

    // -------------------------------------------------------------------------
    // 1. Register the experiment kind
    // -------------------------------------------------------------------------
    let registry = Arc::new(TrialRegistry::new());
    registry.register("coin", |t| Ok(rand::random::<f64>() < t.f64("p")?))?;
    println!("1. Registered tags: {:?}", registry.tags());

    // -------------------------------------------------------------------------
    // 2. Build the batch
    // -------------------------------------------------------------------------
    let batch = (0..trials)
        .map(|_| KeyedTrial::new(&registry, "coin", json!({ "p": p })))
        .collect::<trial_conductor::Result<Vec<_>>>()?;
    println!("2. Built {} trials with p = {p}", batch.len());

    // -------------------------------------------------------------------------
    // 3. Conduct
    // -------------------------------------------------------------------------
    let engine = Engine::new(
        EngineConfig::default()
            .with_workers(4)
            .with_thread_name("coin"),
    )?;
    println!("3. Conducting on {} workers...", engine.workers());

    let (outcome, record) = engine.conduct_recorded("coin-flips", batch).await;
    let results = outcome?;

    let heads = results.iter().filter(|v| v.as_bool() == Some(true)).count();
    #[allow(clippy::cast_precision_loss)]
    let fraction = heads as f64 / results.len().max(1) as f64;

    println!("\n   Heads: {heads} / {}", results.len());
    println!("   Observed fraction: {fraction:.4} (expected {p})");
    println!("\n4. Batch record:\n{}", record.to_json()?);

    Ok(())
}
