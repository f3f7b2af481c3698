//! Metric values.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use clientmetric_proto::first_illegal_index;

use crate::error::Error;

/// Metric type: counter or gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricType {
    /// Value may move in either direction.
    Gauge,
    /// Value is expected to only increase.
    Counter,
}

impl MetricType {
    /// Name used in the exposition format.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Gauge => "gauge",
            MetricType::Counter => "counter",
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An integer metric value that's tracked over time.
///
/// Updates are lock-free and safe from any number of threads. Delta
/// bookkeeping lives in the [`Registry`](crate::Registry) that owns the
/// metric, never here.
#[derive(Debug)]
pub struct Metric {
    value: AtomicI64,
    name: String,
    kind: MetricType,
}

impl Metric {
    /// Create a metric that is not yet registered.
    pub fn try_new(name: impl Into<String>, kind: MetricType) -> Result<Self, Error> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::EmptyName);
        }
        if let Some(index) = first_illegal_index(&name) {
            return Err(Error::IllegalName { name, index });
        }
        Ok(Self {
            value: AtomicI64::new(0),
            name,
            kind,
        })
    }

    /// Create a metric that is not yet registered.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty or contains characters outside
    /// `[A-Za-z0-9_]`.
    pub fn new_unpublished(name: impl Into<String>, kind: MetricType) -> Arc<Self> {
        match Self::try_new(name, kind) {
            Ok(metric) => Arc::new(metric),
            Err(e) => panic!("{e}"),
        }
    }

    /// The metric's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The metric's type.
    pub fn kind(&self) -> MetricType {
        self.kind
    }

    /// The current value.
    #[inline]
    pub fn value(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }

    /// Increment the value by `n`.
    ///
    /// Counters should not be given a negative `n`. Overflow wraps.
    #[inline]
    pub fn add(&self, n: i64) {
        self.value.fetch_add(n, Ordering::Relaxed);
    }

    /// Set the value to `v`.
    ///
    /// Meant for gauges; counters should only use [`add`](Self::add).
    #[inline]
    pub fn set(&self, v: i64) {
        self.value.store(v, Ordering::Relaxed);
    }
}
