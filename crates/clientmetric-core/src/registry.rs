//! Metric registry.
//!
//! The registry maps names to metrics and owns the delta encoder's per-metric
//! bookkeeping. Membership, the sorted view, wire IDs and encode timestamps
//! are guarded by one mutex; metric values are atomics and are never touched
//! under it.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::config::EncoderConfig;
use crate::error::Error;
use crate::metric::{Metric, MetricType};
use crate::pool::BufferPool;

/// Registry of named metrics.
pub struct Registry {
    pub(crate) inner: Mutex<Inner>,
    pub(crate) pool: Arc<BufferPool>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) config: EncoderConfig,
}

/// State guarded by the registry lock.
pub(crate) struct Inner {
    pub(crate) entries: HashMap<String, Entry>,
    /// Number of wire IDs handed out; the last one issued.
    pub(crate) wire_ids_issued: i64,
    /// Time of the last encode that scanned the registry.
    pub(crate) last_encode: Option<Instant>,
    sorted: Arc<[Arc<Metric>]>,
    sorted_dirty: bool,
}

/// A registered metric plus the encoder's bookkeeping for it.
pub(crate) struct Entry {
    pub(crate) metric: Arc<Metric>,
    /// Zero until the metric first appears in a frame.
    pub(crate) wire_id: i64,
    pub(crate) last_named: Option<Instant>,
    pub(crate) last_sent: i64,
}

impl Registry {
    /// Create a registry using the system clock and default encoder settings.
    pub fn new() -> Self {
        Self::with_config(EncoderConfig::default())
    }

    /// Create a registry with the given encoder settings.
    pub fn with_config(config: EncoderConfig) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                wire_ids_issued: 0,
                last_encode: None,
                sorted: Arc::from(Vec::new()),
                sorted_dirty: false,
            }),
            pool: Arc::new(BufferPool::new(config.pool_capacity)),
            clock: Arc::new(SystemClock),
            config,
        }
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The encoder settings.
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Register `metric`.
    ///
    /// Fails without registering anything if the name is already taken.
    pub fn try_publish(&self, metric: Arc<Metric>) -> Result<(), Error> {
        let mut inner = self.inner.lock();
        if inner.entries.contains_key(metric.name()) {
            return Err(Error::DuplicateName(metric.name().to_string()));
        }

        debug!(name = metric.name(), kind = %metric.kind(), "published metric");
        inner.entries.insert(
            metric.name().to_string(),
            Entry {
                metric,
                wire_id: 0,
                last_named: None,
                last_sent: 0,
            },
        );
        inner.sorted_dirty = true;
        Ok(())
    }

    /// Register `metric`.
    ///
    /// # Panics
    ///
    /// Panics if a metric with the same name is already registered. Metric
    /// names identify series downstream, so a collision is never resolved
    /// silently.
    pub fn publish(&self, metric: Arc<Metric>) {
        if let Err(e) = self.try_publish(metric) {
            panic!("{e}");
        }
    }

    /// Create and register a metric.
    pub fn try_register(&self, name: &str, kind: MetricType) -> Result<Arc<Metric>, Error> {
        let metric = Arc::new(Metric::try_new(name, kind)?);
        self.try_publish(Arc::clone(&metric))?;
        Ok(metric)
    }

    /// Create and register a counter.
    ///
    /// # Panics
    ///
    /// Panics on an empty, illegal or duplicate name.
    pub fn new_counter(&self, name: &str) -> Arc<Metric> {
        self.register_or_panic(name, MetricType::Counter)
    }

    /// Create and register a gauge.
    ///
    /// # Panics
    ///
    /// Panics on an empty, illegal or duplicate name.
    pub fn new_gauge(&self, name: &str) -> Arc<Metric> {
        self.register_or_panic(name, MetricType::Gauge)
    }

    fn register_or_panic(&self, name: &str, kind: MetricType) -> Arc<Metric> {
        match self.try_register(name, kind) {
            Ok(metric) => metric,
            Err(e) => panic!("{e}"),
        }
    }

    /// All registered metrics, ordered by name.
    ///
    /// The list is a membership snapshot; values keep changing after it is
    /// returned.
    pub fn list(&self) -> Arc<[Arc<Metric>]> {
        let mut inner = self.inner.lock();
        if inner.sorted_dirty {
            let mut sorted: Vec<Arc<Metric>> = inner
                .entries
                .values()
                .map(|entry| Arc::clone(&entry.metric))
                .collect();
            sorted.sort_by(|a, b| a.name().cmp(b.name()));
            inner.sorted = sorted.into();
            inner.sorted_dirty = false;
        }
        Arc::clone(&inner.sorted)
    }

    /// Look up a metric by name.
    pub fn get(&self, name: &str) -> Option<Arc<Metric>> {
        self.inner
            .lock()
            .entries
            .get(name)
            .map(|entry| Arc::clone(&entry.metric))
    }

    /// Wire ID assigned to `name`, if it has appeared in a frame.
    pub fn wire_id(&self, name: &str) -> Option<i64> {
        self.inner
            .lock()
            .entries
            .get(name)
            .map(|entry| entry.wire_id)
            .filter(|&id| id != 0)
    }

    /// Number of registered metrics.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Whether no metrics are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("metrics", &self.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Shared registry handle.
pub type SharedRegistry = Arc<Registry>;

/// Create a new shared registry.
pub fn new_shared_registry() -> SharedRegistry {
    Arc::new(Registry::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(registry: &Registry) -> Vec<String> {
        registry
            .list()
            .iter()
            .map(|m| m.name().to_string())
            .collect()
    }

    #[test]
    fn test_register_distinct_names() {
        let registry = Registry::new();
        registry.new_counter("requests_total");
        registry.new_gauge("connections");

        assert_eq!(registry.len(), 2);
        assert_eq!(names(&registry), vec!["connections", "requests_total"]);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let registry = Registry::new();
        let first = registry.new_counter("dup");
        first.add(3);

        let err = registry
            .try_register("dup", MetricType::Gauge)
            .unwrap_err();
        assert_eq!(err, Error::DuplicateName("dup".to_string()));

        // The original registration is untouched.
        let kept = registry.get("dup").unwrap();
        assert!(Arc::ptr_eq(&kept, &first));
        assert_eq!(kept.kind(), MetricType::Counter);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    #[should_panic(expected = "duplicate metric dup")]
    fn test_duplicate_name_panics() {
        let registry = Registry::new();
        registry.new_counter("dup");
        registry.new_gauge("dup");
    }

    #[test]
    #[should_panic(expected = "duplicate metric shared")]
    fn test_publish_duplicate_panics() {
        let registry = Registry::new();
        registry.publish(Metric::new_unpublished("shared", MetricType::Counter));
        registry.publish(Metric::new_unpublished("shared", MetricType::Counter));
    }

    #[test]
    fn test_invalid_names_rejected() {
        let registry = Registry::new();
        for name in ["", "has space", "has-dash"] {
            assert!(registry.try_register(name, MetricType::Counter).is_err());
        }
        assert!(registry.is_empty());

        registry.new_counter("valid_Name123");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    #[should_panic(expected = "illegal metric name")]
    fn test_new_counter_illegal_name_panics() {
        Registry::new().new_counter("has space");
    }

    #[test]
    fn test_deferred_publish() {
        let registry = Registry::new();
        let metric = Metric::new_unpublished("deferred", MetricType::Gauge);
        metric.set(7);
        assert!(registry.get("deferred").is_none());

        registry.publish(Arc::clone(&metric));
        assert_eq!(registry.get("deferred").unwrap().value(), 7);
    }

    #[test]
    fn test_list_cache_rebuilt_after_register() {
        let registry = Registry::new();
        registry.new_counter("b");
        let first = registry.list();
        let again = registry.list();
        assert!(Arc::ptr_eq(&first, &again));

        registry.new_counter("a");
        assert_eq!(first.len(), 1);
        assert_eq!(names(&registry), vec!["a", "b"]);
    }

    #[test]
    fn test_list_reflects_live_values() {
        let registry = Registry::new();
        let gauge = registry.new_gauge("temp");
        let list = registry.list();
        gauge.set(42);
        assert_eq!(list[0].value(), 42);
    }

    #[test]
    fn test_concurrent_adds() {
        let registry = Registry::new();
        let counter = registry.new_counter("hits");

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..1000 {
                        counter.add(1);
                    }
                });
            }
            s.spawn(|| {
                for _ in 0..100 {
                    assert!(registry.list().len() <= 1);
                }
            });
        });

        assert_eq!(counter.value(), 8000);
    }

    #[test]
    fn test_concurrent_registration() {
        let registry = Registry::new();
        std::thread::scope(|s| {
            for t in 0..4 {
                let registry = &registry;
                s.spawn(move || {
                    for i in 0..50 {
                        registry.new_counter(&format!("t{t}_m{i}"));
                    }
                });
            }
        });
        let list = registry.list();
        assert_eq!(list.len(), 200);
        assert!(list.windows(2).all(|w| w[0].name() < w[1].name()));
    }

    #[test]
    fn test_shared_registry() {
        let registry = new_shared_registry();
        let counter = registry.new_counter("shared_total");
        counter.add(1);

        let registry2 = Arc::clone(&registry);
        registry2.get("shared_total").unwrap().add(1);
        assert_eq!(counter.value(), 2);
    }
}
