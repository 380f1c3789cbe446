//! Property-based tests for the batch engine
//!
//! - Result collection length equals batch length for any N >= 0
//! - Parallel results equal the sequential results as a multiset
//! - Progress advances exactly once per collected result
//!
//! Each case builds its own runtime, so case counts stay small.

use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use trial_conductor::{Engine, EngineConfig, ProgressSink, Trial};

/// Trial with a cheap deterministic computation
struct Mix(u32);

impl Trial for Mix {
    type Output = u64;

    fn conduct(&self) -> trial_conductor::Result<u64> {
        Ok(u64::from(self.0).wrapping_mul(2_654_435_761) % 1_000)
    }
}

#[derive(Clone, Default)]
struct Advances(Arc<AtomicUsize>);

impl ProgressSink for Advances {
    fn start(&mut self, _total: usize) {}

    fn advance(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

fn engine(workers: usize) -> Engine {
    Engine::new(
        EngineConfig::default()
            .with_workers(workers)
            .with_progress_steps(0),
    )
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Property: parallel execution changes order only, never the multiset
    #[test]
    fn prop_results_match_sequential_multiset(
        values in proptest::collection::vec(any::<u32>(), 0..300),
        workers in 1usize..6
    ) {
        let mut expected: Vec<u64> = values.iter().map(|&v| Mix(v).conduct().unwrap()).collect();

        let mut results = engine(workers)
            .conduct_blocking(values.into_iter().map(Mix).collect())
            .unwrap();

        prop_assert_eq!(results.len(), expected.len());
        expected.sort_unstable();
        results.sort_unstable();
        prop_assert_eq!(results, expected);
    }

    /// Property: progress advances exactly N times
    #[test]
    fn prop_progress_advances_n_times(n in 0usize..400, workers in 1usize..6) {
        let sink = Advances::default();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let results = runtime
            .block_on(engine(workers).conduct_with((0..n).map(|i| Mix(i as u32)).collect(), sink.clone()))
            .unwrap();

        prop_assert_eq!(results.len(), n);
        prop_assert_eq!(sink.0.load(Ordering::SeqCst), n);
    }
}
