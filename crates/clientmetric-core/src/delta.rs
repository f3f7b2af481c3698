//! Delta encoding of metric changes for log shipping.
//!
//! Each call to [`Registry::encode_delta`] produces one frame holding the
//! changes since the previous call. The frame is made of records described
//! in [`clientmetric_proto::record`]:
//!
//! - a metric seen for the first time gets the next wire ID and is sent as
//!   a name record followed by a set record
//! - a metric whose name was last sent more than the name refresh interval
//!   ago is sent the same way again
//! - any other changed metric is sent as an increment record
//!
//! Unchanged metrics cost nothing. Calls closer together than the minimum
//! encode interval return an empty frame without scanning.

use std::fmt;
use std::ops::Deref;

use tracing::{debug, trace};

use crate::pool::PooledWriter;
use crate::registry::{Inner, Registry};

/// One encoded delta frame.
///
/// Dereferences to the frame text. The underlying buffer goes back to the
/// registry's pool when the frame is dropped.
pub struct DeltaFrame {
    writer: Option<PooledWriter>,
}

impl DeltaFrame {
    fn empty() -> Self {
        Self { writer: None }
    }

    /// The encoded frame; empty when nothing changed or the call was
    /// rate-limited.
    pub fn as_str(&self) -> &str {
        self.writer.as_ref().map_or("", |w| w.as_str())
    }

    /// Number of records in the frame.
    pub fn records(&self) -> usize {
        self.writer.as_ref().map_or(0, |w| w.records())
    }

    /// Copy the frame out, releasing the pooled buffer.
    pub fn into_string(self) -> String {
        self.as_str().to_owned()
    }
}

impl Deref for DeltaFrame {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<str> for DeltaFrame {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for DeltaFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for DeltaFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DeltaFrame").field(&self.as_str()).finish()
    }
}

impl PartialEq<str> for DeltaFrame {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for DeltaFrame {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl Registry {
    /// Encode the metric changes since the previous call.
    ///
    /// The output is safe to embed in a JSON string literal without
    /// escaping. An empty frame means either nothing changed or the previous
    /// scan was less than the minimum encode interval ago.
    pub fn encode_delta(&self) -> DeltaFrame {
        let mut guard = self.inner.lock();
        let now = self.clock.now();

        if let Some(last) = guard.last_encode {
            let since = now.saturating_duration_since(last);
            if since < self.config.min_encode_interval {
                trace!(since_ms = since.as_millis() as u64, "metrics delta rate-limited");
                return DeltaFrame::empty();
            }
        }
        guard.last_encode = Some(now);

        let Inner {
            entries,
            wire_ids_issued,
            ..
        } = &mut *guard;
        let mut enc: Option<PooledWriter> = None;

        for entry in entries.values_mut() {
            let value = entry.metric.value();
            let delta = value.wrapping_sub(entry.last_sent);
            if delta == 0 {
                continue;
            }
            let writer = enc.get_or_insert_with(|| self.pool.get());
            entry.last_sent = value;

            if entry.wire_id == 0 {
                *wire_ids_issued += 1;
                entry.wire_id = *wire_ids_issued;
            }

            let needs_name = match entry.last_named {
                None => true,
                Some(named) => {
                    now.saturating_duration_since(named) > self.config.name_refresh_interval
                }
            };
            if needs_name {
                writer.write_name(entry.metric.name());
                entry.last_named = Some(now);
                writer.write_value(entry.wire_id, value);
            } else {
                writer.write_delta(entry.wire_id, delta);
            }
        }

        match enc {
            Some(writer) => {
                debug!(
                    records = writer.records(),
                    bytes = writer.len(),
                    "encoded metrics delta"
                );
                DeltaFrame {
                    writer: Some(writer),
                }
            }
            None => DeltaFrame::empty(),
        }
    }
}
