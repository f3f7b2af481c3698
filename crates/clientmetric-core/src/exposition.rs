//! Prometheus text exposition.
//!
//! See <https://github.com/prometheus/docs/blob/main/content/docs/instrumenting/exposition_formats.md>.

use std::io::{self, Write};
use std::sync::Arc;

use crate::metric::Metric;
use crate::registry::Registry;

/// Render `metrics` in the Prometheus text format.
///
/// Each metric becomes a `# TYPE` line followed by its current value.
pub fn render_prometheus(metrics: &[Arc<Metric>]) -> String {
    let mut out = String::new();
    for m in metrics {
        out.push_str(&format!("# TYPE {} {}\n", m.name(), m.kind()));
        out.push_str(&format!("{} {}\n", m.name(), m.value()));
    }
    out
}

impl Registry {
    /// Export all metrics, ordered by name, in the Prometheus text format.
    ///
    /// Reflects current absolute values and leaves delta bookkeeping alone.
    pub fn to_prometheus(&self) -> String {
        render_prometheus(&self.list())
    }

    /// Write [`to_prometheus`](Self::to_prometheus) to `w`.
    pub fn write_prometheus<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(self.to_prometheus().as_bytes())
    }
}
