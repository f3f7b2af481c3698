//! The process-wide registry.
//!
//! Producers anywhere in the process register and update metrics through
//! these functions without threading a handle around. The registry is built
//! on first use with the system clock and the wire-compatible defaults.
//! Tests that need isolation should construct their own
//! [`Registry`](crate::Registry).

use std::io::{self, Write};
use std::sync::{Arc, OnceLock};

use crate::delta::DeltaFrame;
use crate::metric::Metric;
use crate::registry::{new_shared_registry, SharedRegistry};

static GLOBAL: OnceLock<SharedRegistry> = OnceLock::new();

/// The process-wide registry.
pub fn global() -> &'static SharedRegistry {
    GLOBAL.get_or_init(new_shared_registry)
}

/// Create and register a counter in the process-wide registry.
///
/// # Panics
///
/// Panics on an empty, illegal or duplicate name.
pub fn new_counter(name: &str) -> Arc<Metric> {
    global().new_counter(name)
}

/// Create and register a gauge in the process-wide registry.
///
/// # Panics
///
/// Panics on an empty, illegal or duplicate name.
pub fn new_gauge(name: &str) -> Arc<Metric> {
    global().new_gauge(name)
}

/// Register an already constructed metric in the process-wide registry.
///
/// # Panics
///
/// Panics if the name is already registered.
pub fn publish(metric: Arc<Metric>) {
    global().publish(metric)
}

/// All metrics in the process-wide registry, ordered by name.
pub fn metrics() -> Arc<[Arc<Metric>]> {
    global().list()
}

/// Encode the process-wide metric changes since the previous call.
///
/// See [`Registry::encode_delta`](crate::Registry::encode_delta).
pub fn encode_log_tail_metrics_delta() -> DeltaFrame {
    global().encode_delta()
}

/// Write all process-wide metrics to `w` in the Prometheus text format.
pub fn write_prometheus_exposition_format<W: Write + ?Sized>(w: &mut W) -> io::Result<()> {
    global().write_prometheus(w)
}
