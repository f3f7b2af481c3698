//! Core error types.

use thiserror::Error;

/// Registration errors.
///
/// These are programmer errors. The panicking registration API reports them
/// by panicking with this message; the `try_*` variants return them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Metric constructed with an empty name.
    #[error("unnamed metric")]
    EmptyName,

    /// Metric name contains a character outside `[A-Za-z0-9_]`.
    #[error("illegal metric name {name:?} (index {index})")]
    IllegalName { name: String, index: usize },

    /// A metric with this name is already registered.
    #[error("duplicate metric {0}")]
    DuplicateName(String),
}
