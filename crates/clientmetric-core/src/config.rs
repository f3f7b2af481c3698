//! Encoder and reporter configuration.

use std::time::Duration;

/// Minimum interval between two encodes that scan the registry (15 seconds).
pub const DEFAULT_MIN_ENCODE_INTERVAL: Duration = Duration::from_secs(15);

/// How often a metric's name is redundantly re-sent (4 hours).
///
/// This bounds how far back in the log a consumer has to read to recover
/// the name of every wire ID it sees.
pub const DEFAULT_NAME_REFRESH_INTERVAL: Duration = Duration::from_secs(4 * 60 * 60);

/// Default number of idle encode buffers kept for reuse.
pub const DEFAULT_POOL_CAPACITY: usize = 4;

/// Default interval between reporter ticks.
pub const DEFAULT_POLL_INTERVAL: Duration = DEFAULT_MIN_ENCODE_INTERVAL;

/// Delta encoder configuration.
///
/// The defaults are the values existing log consumers expect; change them
/// only for streams with no such consumer.
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    /// Encodes closer together than this return an empty frame.
    pub min_encode_interval: Duration,

    /// A changed metric whose name was last sent longer ago than this gets
    /// a fresh name record.
    pub name_refresh_interval: Duration,

    /// Idle encode buffers retained by the pool.
    pub pool_capacity: usize,
}

impl EncoderConfig {
    /// Create a configuration with the wire-compatible defaults.
    pub fn new() -> Self {
        Self {
            min_encode_interval: DEFAULT_MIN_ENCODE_INTERVAL,
            name_refresh_interval: DEFAULT_NAME_REFRESH_INTERVAL,
            pool_capacity: DEFAULT_POOL_CAPACITY,
        }
    }

    /// Set the minimum encode interval.
    pub fn with_min_encode_interval(mut self, interval: Duration) -> Self {
        self.min_encode_interval = interval;
        self
    }

    /// Set the name refresh interval.
    pub fn with_name_refresh_interval(mut self, interval: Duration) -> Self {
        self.name_refresh_interval = interval;
        self
    }

    /// Set how many idle buffers the pool keeps.
    pub fn with_pool_capacity(mut self, capacity: usize) -> Self {
        self.pool_capacity = capacity;
        self
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for the background [`DeltaReporter`](crate::DeltaReporter).
#[derive(Debug, Clone)]
pub struct ReporterConfig {
    /// How often the reporter asks the registry for a frame.
    pub poll_interval: Duration,
}

impl ReporterConfig {
    /// Create a configuration with the default poll interval.
    pub fn new() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Set the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self::new()
    }
}
