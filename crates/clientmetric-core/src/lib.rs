//! Client metrics: counters and gauges whose changes get occasionally logged.
//!
//! This crate provides a registry of named integer metrics with lock-free
//! updates, a delta encoder that turns "what changed since last time" into a
//! compact frame for a log shipper, and a Prometheus text exporter.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use clientmetric_core::{ManualClock, Registry};
//!
//! let clock = Arc::new(ManualClock::new());
//! let registry = Registry::new().with_clock(clock.clone());
//!
//! // Register once, update from anywhere
//! let requests = registry.new_counter("foo_total");
//! requests.add(10);
//!
//! // Ship the changes
//! let frame = registry.encode_delta();
//! assert_eq!(frame.as_str(), "N12foo_totalS0214");
//!
//! // Export to Prometheus format
//! assert_eq!(registry.to_prometheus(), "# TYPE foo_total counter\nfoo_total 10\n");
//! ```
//!
//! The process-wide registry is reached through [`global()`] and the free
//! functions [`new_counter`], [`new_gauge`], [`metrics`] and
//! [`encode_log_tail_metrics_delta`].

mod clock;
pub mod config;
mod delta;
pub mod error;
mod exposition;
mod global;
mod metric;
mod pool;
mod registry;
mod reporter;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{EncoderConfig, ReporterConfig};
pub use delta::DeltaFrame;
pub use error::Error;
pub use exposition::render_prometheus;
pub use global::{
    encode_log_tail_metrics_delta, global, metrics, new_counter, new_gauge, publish,
    write_prometheus_exposition_format,
};
pub use metric::{Metric, MetricType};
pub use pool::{BufferPool, PooledWriter};
pub use registry::{new_shared_registry, Registry, SharedRegistry};
pub use reporter::{DeltaReporter, FrameSink};

/// Re-export protocol types.
pub use clientmetric_proto as proto;
