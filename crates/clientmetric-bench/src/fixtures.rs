//! Registry fixtures for benchmarks.
//!
//! Generators are seeded so runs are reproducible.

use std::sync::Arc;

use clientmetric_core::{Metric, Registry};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Number of registered metrics.
#[derive(Clone, Copy, Debug)]
pub enum Scale {
    /// A handful of metrics, like a small client.
    Small,
    /// Typical for a long-running client daemon.
    Medium,
    /// Far more than any real client registers.
    Large,
}

impl Scale {
    /// Get the metric count for this scale.
    pub fn count(&self) -> usize {
        match self {
            Scale::Small => 16,
            Scale::Medium => 256,
            Scale::Large => 4_096,
        }
    }
}

/// Register `scale` metrics, alternating counters and gauges.
pub fn populate(registry: &Registry, scale: Scale) -> Vec<Arc<Metric>> {
    (0..scale.count())
        .map(|i| {
            let name = format!("bench_metric_{i:05}");
            if i % 2 == 0 {
                registry.new_counter(&name)
            } else {
                registry.new_gauge(&name)
            }
        })
        .collect()
}

/// Change roughly `fraction` of `metrics` by a random amount.
pub fn touch(metrics: &[Arc<Metric>], fraction: f64, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    for m in metrics {
        if rng.gen_bool(fraction) {
            m.add(rng.gen_range(1..1_000));
        }
    }
}
