//! Client metrics benchmark suite
//!
//! Criterion benchmarks for the client metrics crates.
//!
//! # Benchmark Categories
//!
//! - **Hot path**: `add`/`set` on a metric, contended and uncontended
//! - **Encode**: delta frames at different registry sizes and change rates,
//!   plus the raw record writer

pub mod fixtures;

pub use fixtures::{populate, touch, Scale};
